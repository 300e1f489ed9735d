//! Hotel reviews. One review per user per hotel.

use sqlx::{FromRow, SqliteExecutor};

use super::common::{new_id, now_timestamp};

#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub hotel_id: String,
    /// 1 to 5
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: String,
    pub hotel_id: String,
    pub rating: i64,
    pub comment: Option<String>,
}

impl Review {
    pub async fn list_by_hotel(
        db: impl SqliteExecutor<'_>,
        hotel_id: &str,
    ) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM reviews WHERE hotel_id = ? ORDER BY created_at DESC, id ASC")
            .bind(hotel_id)
            .fetch_all(db)
            .await
    }

    pub async fn exists_for(
        db: impl SqliteExecutor<'_>,
        user_id: &str,
        hotel_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM reviews WHERE user_id = ? AND hotel_id = ?")
                .bind(user_id)
                .bind(hotel_id)
                .fetch_optional(db)
                .await?;
        Ok(row.is_some())
    }

    pub async fn create(db: impl SqliteExecutor<'_>, review: &NewReview) -> Result<Review, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO reviews (id, user_id, hotel_id, rating, comment, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&review.user_id)
        .bind(&review.hotel_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(now_timestamp())
        .fetch_one(db)
        .await
    }
}
