//! Booking lifecycle.
//!
//! ```text
//! PENDING ──approve──▶ CONFIRMED ──complete──▶ COMPLETED
//!    │                     │
//!    └──────cancel─────────┴──────▶ CANCELLED
//! ```
//!
//! Every other transition is rejected with a conflict and leaves the booking
//! untouched. Each transition is a single UPDATE guarded by the source state.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::availability::{room_available, DateRange};
use super::Viewer;
use crate::config::BookingConfig;
use crate::db::{begin_write, format_timestamp, Booking, BookingStatus, DbPool, NewBooking, Room};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Approve,
    Cancel,
    Complete,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Approve => "approve",
            BookingAction::Cancel => "cancel",
            BookingAction::Complete => "complete",
        }
    }
}

impl std::fmt::Display for BookingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The transition table. `None` means the action is not allowed from `current`.
pub fn next_status(current: BookingStatus, action: BookingAction) -> Option<BookingStatus> {
    use BookingAction::*;
    use BookingStatus::*;

    match (current, action) {
        (Pending, Approve) => Some(Confirmed),
        (Pending, Cancel) | (Confirmed, Cancel) => Some(Cancelled),
        (Confirmed, Complete) => Some(Completed),
        _ => None,
    }
}

/// A stay request with parsed instants
#[derive(Debug, Clone)]
pub struct StayRequest {
    pub room_id: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: i64,
}

impl StayRequest {
    fn validate(&self) -> Result<()> {
        let mut errors = crate::error::ValidationErrors::new();
        if self.guests < 1 {
            errors.add("guests", "Guests must be at least 1");
        }
        if self.check_out <= self.check_in {
            errors.add("checkOut", "Check-out must be after check-in");
        }
        errors.finish()
    }
}

/// Create a PENDING booking for the caller.
///
/// Runs in one transaction: the room must exist and no active booking of the
/// room may overlap the stay. With `enforce_availability`, every night of the
/// stay must also be marked available.
pub async fn create_booking(
    db: &DbPool,
    viewer: &Viewer,
    request: &StayRequest,
    options: &BookingConfig,
) -> Result<Booking> {
    let (user_id, _) = viewer.require_user()?;
    request.validate()?;

    let check_in = format_timestamp(request.check_in);
    let check_out = format_timestamp(request.check_out);

    let mut tx = begin_write(db).await?;

    if Room::find_by_id(&mut *tx, &request.room_id).await?.is_none() {
        return Err(Error::not_found(format!("Room not found: {}", request.room_id)));
    }

    if options.enforce_availability {
        let nights = DateRange::for_stay(request.check_in, request.check_out);
        if !room_available(&mut *tx, &request.room_id, &nights).await? {
            return Err(Error::conflict("Room is not available for the selected dates"));
        }
    }

    let overlapping =
        Booking::count_overlapping(&mut *tx, &request.room_id, &check_in, &check_out).await?;
    if overlapping > 0 {
        return Err(Error::conflict(
            "Room is already booked for an overlapping stay",
        ));
    }

    let booking = Booking::create(
        &mut *tx,
        &NewBooking {
            user_id: user_id.to_string(),
            room_id: request.room_id.clone(),
            check_in,
            check_out,
            guests: request.guests,
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        booking_id = %booking.id,
        room_id = %booking.room_id,
        user_id = %booking.user_id,
        guests = booking.guests,
        "Booking created"
    );
    Ok(booking)
}

/// Admin only: PENDING -> CONFIRMED
pub async fn approve_booking(db: &DbPool, viewer: &Viewer, id: &str) -> Result<Booking> {
    viewer.require_admin()?;
    let booking = load(db, id).await?;
    apply(db, booking, BookingAction::Approve).await
}

/// Owner or admin: PENDING/CONFIRMED -> CANCELLED
pub async fn cancel_booking(db: &DbPool, viewer: &Viewer, id: &str) -> Result<Booking> {
    let (user_id, role) = viewer.require_user()?;
    let booking = load(db, id).await?;
    if booking.user_id != user_id && !role.is_admin() {
        return Err(Error::forbidden("Only the guest or an admin can cancel this booking"));
    }
    apply(db, booking, BookingAction::Cancel).await
}

/// Mark every confirmed booking that checked out by `now` as completed
pub async fn complete_finished(db: &DbPool, now: DateTime<Utc>) -> Result<Vec<Booking>> {
    let ended = Booking::list_confirmed_ended_by(db, &format_timestamp(now)).await?;

    let mut completed = Vec::with_capacity(ended.len());
    for booking in ended {
        let id = booking.id.clone();
        match apply(db, booking, BookingAction::Complete).await {
            Ok(done) => completed.push(done),
            // Cancelled between the listing and the update
            Err(Error::Conflict(message)) => warn!(booking_id = %id, "{}", message),
            Err(e) => return Err(e),
        }
    }

    info!(count = completed.len(), "Completed finished bookings");
    Ok(completed)
}

/// Bookings visible to the caller, newest first
pub async fn list_bookings(db: &DbPool, viewer: &Viewer) -> Result<Vec<Booking>> {
    let (user_id, role) = viewer.require_user()?;
    let bookings = if role.is_admin() {
        Booking::list_all(db).await?
    } else {
        Booking::list_by_user(db, user_id).await?
    };
    Ok(bookings)
}

async fn load(db: &DbPool, id: &str) -> Result<Booking> {
    Booking::find_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Booking not found: {}", id)))
}

async fn apply(db: &DbPool, booking: Booking, action: BookingAction) -> Result<Booking> {
    let next = next_status(booking.status, action).ok_or_else(|| {
        Error::conflict(format!(
            "Cannot {} a booking that is {}",
            action, booking.status
        ))
    })?;

    let updated = Booking::transition(db, &booking.id, booking.status, next)
        .await?
        .ok_or_else(|| {
            Error::conflict(format!(
                "Booking {} changed while it was being updated",
                booking.id
            ))
        })?;

    info!(
        booking_id = %updated.id,
        from = %booking.status,
        to = %updated.status,
        "Booking status changed"
    );
    Ok(updated)
}
