//! Booking models and queries.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};

use super::common::{new_id, now_timestamp};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, async_graphql::Enum,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    /// Bookings in these states hold the room
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub room_id: String,
    /// RFC 3339 UTC instant
    pub check_in: String,
    /// RFC 3339 UTC instant
    pub check_out: String,
    pub guests: i64,
    pub status: BookingStatus,
    pub created_at: String,
}

/// A validated booking request with normalized timestamps
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: String,
    pub room_id: String,
    pub check_in: String,
    pub check_out: String,
    pub guests: i64,
}

impl Booking {
    pub async fn find_by_id(
        db: impl SqliteExecutor<'_>,
        id: &str,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn list_all(db: impl SqliteExecutor<'_>) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM bookings ORDER BY created_at DESC, id ASC")
            .fetch_all(db)
            .await
    }

    pub async fn list_by_user(
        db: impl SqliteExecutor<'_>,
        user_id: &str,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM bookings WHERE user_id = ? ORDER BY created_at DESC, id ASC")
            .bind(user_id)
            .fetch_all(db)
            .await
    }

    /// Insert a new booking in PENDING state
    pub async fn create(
        db: impl SqliteExecutor<'_>,
        booking: &NewBooking,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO bookings (id, user_id, room_id, check_in, check_out, guests, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&booking.user_id)
        .bind(&booking.room_id)
        .bind(&booking.check_in)
        .bind(&booking.check_out)
        .bind(booking.guests)
        .bind(BookingStatus::Pending)
        .bind(now_timestamp())
        .fetch_one(db)
        .await
    }

    /// Move a booking from `from` to `to`.
    ///
    /// Returns `None` when the booking is missing or no longer in `from`.
    pub async fn transition(
        db: impl SqliteExecutor<'_>,
        id: &str,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as("UPDATE bookings SET status = ? WHERE id = ? AND status = ? RETURNING *")
            .bind(to)
            .bind(id)
            .bind(from)
            .fetch_optional(db)
            .await
    }

    /// Count active bookings of a room that overlap `[check_in, check_out)`
    pub async fn count_overlapping(
        db: impl SqliteExecutor<'_>,
        room_id: &str,
        check_in: &str,
        check_out: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE room_id = ?
              AND status IN (?, ?)
              AND check_in < ?
              AND check_out > ?
            "#,
        )
        .bind(room_id)
        .bind(BookingStatus::Pending)
        .bind(BookingStatus::Confirmed)
        .bind(check_out)
        .bind(check_in)
        .fetch_one(db)
        .await
    }

    /// Confirmed bookings whose check-out is at or before `cutoff`
    pub async fn list_confirmed_ended_by(
        db: impl SqliteExecutor<'_>,
        cutoff: &str,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM bookings WHERE status = ? AND check_out <= ? ORDER BY check_out ASC",
        )
        .bind(BookingStatus::Confirmed)
        .bind(cutoff)
        .fetch_all(db)
        .await
    }
}
