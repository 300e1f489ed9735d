//! Per-room, per-date availability calendar.

use chrono::NaiveDate;
use sqlx::{FromRow, SqliteExecutor};

/// Storage format of calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Availability {
    pub room_id: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    pub is_available: bool,
}

impl Availability {
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    pub async fn list_for_room(
        db: impl SqliteExecutor<'_>,
        room_id: &str,
    ) -> Result<Vec<Availability>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM availability WHERE room_id = ? ORDER BY date ASC")
            .bind(room_id)
            .fetch_all(db)
            .await
    }

    /// Records for the inclusive range `[from, to]`
    pub async fn list_in_range(
        db: impl SqliteExecutor<'_>,
        room_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Availability>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM availability WHERE room_id = ? AND date BETWEEN ? AND ? ORDER BY date ASC",
        )
        .bind(room_id)
        .bind(from.format(DATE_FORMAT).to_string())
        .bind(to.format(DATE_FORMAT).to_string())
        .fetch_all(db)
        .await
    }

    /// Insert or overwrite the flag for `(room_id, date)`
    pub async fn upsert(
        db: impl SqliteExecutor<'_>,
        room_id: &str,
        date: NaiveDate,
        is_available: bool,
    ) -> Result<Availability, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO availability (room_id, date, is_available)
            VALUES (?, ?, ?)
            ON CONFLICT (room_id, date)
            DO UPDATE SET is_available = excluded.is_available
            RETURNING *
            "#,
        )
        .bind(room_id)
        .bind(date.format(DATE_FORMAT).to_string())
        .bind(is_available)
        .fetch_one(db)
        .await
    }
}
