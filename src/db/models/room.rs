//! Room models and queries.

use sqlx::{FromRow, SqliteExecutor};

use super::common::{new_id, now_timestamp};

pub const DEFAULT_ROOM_TYPE: &str = "Standard";

#[derive(Debug, Clone, FromRow)]
pub struct Room {
    pub id: String,
    pub hotel_id: String,
    pub room_number: Option<String>,
    /// Free-text label such as "Deluxe" or "Suite"
    #[sqlx(rename = "type")]
    pub room_type: String,
    pub capacity: i64,
    /// Nightly price
    pub price: f64,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewRoom {
    pub hotel_id: String,
    pub room_number: Option<String>,
    pub room_type: Option<String>,
    pub capacity: i64,
    pub price: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RoomChanges {
    pub hotel_id: Option<String>,
    pub room_number: Option<String>,
    pub room_type: Option<String>,
    pub capacity: Option<i64>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

impl Room {
    pub async fn find_by_id(
        db: impl SqliteExecutor<'_>,
        id: &str,
    ) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM rooms WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn list_by_hotel(
        db: impl SqliteExecutor<'_>,
        hotel_id: &str,
    ) -> Result<Vec<Room>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM rooms WHERE hotel_id = ? ORDER BY price ASC, created_at ASC")
            .bind(hotel_id)
            .fetch_all(db)
            .await
    }

    pub async fn list_all(db: impl SqliteExecutor<'_>) -> Result<Vec<Room>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM rooms ORDER BY hotel_id ASC, price ASC")
            .fetch_all(db)
            .await
    }

    pub async fn create(db: impl SqliteExecutor<'_>, room: &NewRoom) -> Result<Room, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO rooms (id, hotel_id, room_number, type, capacity, price, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&room.hotel_id)
        .bind(&room.room_number)
        .bind(room.room_type.as_deref().unwrap_or(DEFAULT_ROOM_TYPE))
        .bind(room.capacity)
        .bind(room.price)
        .bind(&room.description)
        .bind(now_timestamp())
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: impl SqliteExecutor<'_>,
        id: &str,
        changes: &RoomChanges,
    ) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE rooms SET
                hotel_id = COALESCE(?, hotel_id),
                room_number = COALESCE(?, room_number),
                type = COALESCE(?, type),
                capacity = COALESCE(?, capacity),
                price = COALESCE(?, price),
                description = COALESCE(?, description)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&changes.hotel_id)
        .bind(&changes.room_number)
        .bind(&changes.room_type)
        .bind(changes.capacity)
        .bind(changes.price)
        .bind(&changes.description)
        .bind(id)
        .fetch_optional(db)
        .await
    }
}
