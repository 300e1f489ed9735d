//! Booking engine: pricing, availability, search and the booking lifecycle.
//!
//! Operations take the caller as a [`Viewer`] and enforce role and ownership
//! rules themselves, so every surface (GraphQL, CLI) gets the same checks.

pub mod availability;
pub mod lifecycle;
pub mod pricing;
pub mod reviews;
pub mod search;

pub use availability::{covers_range, room_available, set_room_availability, DateRange};
pub use lifecycle::{
    approve_booking, cancel_booking, complete_finished, create_booking, list_bookings,
    next_status, BookingAction, StayRequest,
};
pub use pricing::{calculate, nights_between, PricingPolicy, Quote};
pub use reviews::leave_review;
pub use search::{search_hotels, HotelFilter};

use crate::db::{Role, User};
use crate::error::{Error, Result};

/// The caller of an operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Viewer {
    #[default]
    Anonymous,
    User { id: String, role: Role },
}

impl Viewer {
    pub fn user(id: impl Into<String>, role: Role) -> Self {
        Viewer::User {
            id: id.into(),
            role,
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self::user(user.id.clone(), user.role)
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User { id, .. } => Some(id.as_str()),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Viewer::User { role, .. } if role.is_admin())
    }

    pub fn require_user(&self) -> Result<(&str, Role)> {
        match self {
            Viewer::Anonymous => Err(Error::AuthenticationRequired),
            Viewer::User { id, role } => Ok((id.as_str(), *role)),
        }
    }

    pub fn require_admin(&self) -> Result<&str> {
        let (id, role) = self.require_user()?;
        if !role.is_admin() {
            return Err(Error::forbidden("Admin access required"));
        }
        Ok(id)
    }

    /// The user themselves or an admin
    pub fn can_see_user(&self, user_id: &str) -> bool {
        self.is_admin() || self.id() == Some(user_id)
    }
}
