//! Database models split into domain-specific modules.

pub mod availability;
pub mod booking;
pub mod common;
pub mod hotel;
pub mod review;
pub mod room;
pub mod user;

pub use availability::*;
pub use booking::*;
pub use common::*;
pub use hotel::*;
pub use review::*;
pub use room::*;
pub use user::*;
