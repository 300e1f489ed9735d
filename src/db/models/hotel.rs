//! Hotel models and queries.

use sqlx::{FromRow, SqliteExecutor};

use super::common::{new_id, now_timestamp, parse_string_list, serialize_string_list};

#[derive(Debug, Clone, FromRow)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    /// JSON array of amenity names
    pub amenities: String,
    /// JSON array of image URLs, in display order
    pub images: String,
    /// Average review rating, NULL until the first review
    pub rating: Option<f64>,
    pub created_at: String,
}

impl Hotel {
    pub fn amenity_list(&self) -> Vec<String> {
        parse_string_list(&self.amenities)
    }

    pub fn image_list(&self) -> Vec<String> {
        parse_string_list(&self.images)
    }
}

/// Validated input for a new hotel
#[derive(Debug, Clone)]
pub struct NewHotel {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct HotelChanges {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

impl Hotel {
    pub async fn find_by_id(
        db: impl SqliteExecutor<'_>,
        id: &str,
    ) -> Result<Option<Hotel>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM hotels WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn exists(db: impl SqliteExecutor<'_>, id: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM hotels WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row.is_some())
    }

    pub async fn create(db: impl SqliteExecutor<'_>, hotel: &NewHotel) -> Result<Hotel, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO hotels (id, name, location, description, amenities, images, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&hotel.name)
        .bind(&hotel.location)
        .bind(&hotel.description)
        .bind(serialize_string_list(&hotel.amenities))
        .bind(serialize_string_list(&hotel.images))
        .bind(now_timestamp())
        .fetch_one(db)
        .await
    }

    /// Apply a partial update, returning the updated row if the hotel exists
    pub async fn update(
        db: impl SqliteExecutor<'_>,
        id: &str,
        changes: &HotelChanges,
    ) -> Result<Option<Hotel>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE hotels SET
                name = COALESCE(?, name),
                location = COALESCE(?, location),
                description = COALESCE(?, description),
                amenities = COALESCE(?, amenities),
                images = COALESCE(?, images)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.location)
        .bind(&changes.description)
        .bind(changes.amenities.as_deref().map(serialize_string_list))
        .bind(changes.images.as_deref().map(serialize_string_list))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Delete a hotel and, through foreign keys, its rooms, bookings and reviews
    pub async fn delete(db: impl SqliteExecutor<'_>, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM hotels WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Recompute the cached rating from the hotel's reviews
    pub async fn refresh_rating(db: impl SqliteExecutor<'_>, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE hotels SET rating = (SELECT AVG(rating) FROM reviews WHERE hotel_id = ?) WHERE id = ?",
        )
        .bind(id)
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }
}
