//! Hotel reviews and the cached hotel rating.

use tracing::info;

use super::Viewer;
use crate::db::{begin_write, DbPool, Hotel, NewReview, Review};
use crate::error::{Error, Result};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Record the caller's review of a hotel and refresh the hotel's rating.
///
/// A caller may review each hotel once; a second attempt is a duplicate.
pub async fn leave_review(
    db: &DbPool,
    viewer: &Viewer,
    hotel_id: &str,
    rating: i64,
    comment: Option<String>,
) -> Result<Review> {
    let (user_id, _) = viewer.require_user()?;
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(Error::validation_field(
            "rating",
            format!("Rating must be between {} and {}", MIN_RATING, MAX_RATING),
        ));
    }

    let mut tx = begin_write(db).await?;

    if !Hotel::exists(&mut *tx, hotel_id).await? {
        return Err(Error::not_found(format!("Hotel not found: {}", hotel_id)));
    }
    if Review::exists_for(&mut *tx, user_id, hotel_id).await? {
        return Err(Error::duplicate("You have already reviewed this hotel"));
    }

    let review = Review::create(
        &mut *tx,
        &NewReview {
            user_id: user_id.to_string(),
            hotel_id: hotel_id.to_string(),
            rating,
            comment,
        },
    )
    .await
    .map_err(Error::from)
    .map_err(|e| {
        if e.is_unique_violation() {
            Error::duplicate("You have already reviewed this hotel")
        } else {
            e
        }
    })?;
    Hotel::refresh_rating(&mut *tx, hotel_id).await?;

    tx.commit().await?;

    info!(
        review_id = %review.id,
        hotel_id = %hotel_id,
        rating = review.rating,
        "Review recorded"
    );
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{self, TestDb};
    use crate::db::Role;

    #[tokio::test]
    async fn test_duplicate_review_is_rejected_without_second_row() {
        let db = TestDb::new().await;
        let hotel = testing::hotel(&db.pool, "H", "Ooty", &[]).await;
        let alice = Viewer::from_user(&testing::user(&db.pool, "a@example.com", Role::Customer).await);

        leave_review(&db.pool, &alice, &hotel.id, 4, Some("Nice".to_string()))
            .await
            .unwrap();
        let again = leave_review(&db.pool, &alice, &hotel.id, 1, None).await;
        assert!(matches!(again, Err(Error::Duplicate(_))));

        let reviews = Review::list_by_hotel(&db.pool, &hotel.id).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 4);
    }

    #[tokio::test]
    async fn test_rating_is_refreshed() {
        let db = TestDb::new().await;
        let hotel = testing::hotel(&db.pool, "H", "Ooty", &[]).await;
        let alice = Viewer::from_user(&testing::user(&db.pool, "a@example.com", Role::Customer).await);
        let bob = Viewer::from_user(&testing::user(&db.pool, "b@example.com", Role::Staff).await);

        leave_review(&db.pool, &alice, &hotel.id, 5, None).await.unwrap();
        leave_review(&db.pool, &bob, &hotel.id, 4, None).await.unwrap();

        let hotel = Hotel::find_by_id(&db.pool, &hotel.id).await.unwrap().unwrap();
        assert_eq!(hotel.rating, Some(4.5));
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let db = TestDb::new().await;
        let hotel = testing::hotel(&db.pool, "H", "Ooty", &[]).await;
        let alice = Viewer::from_user(&testing::user(&db.pool, "a@example.com", Role::Customer).await);

        let out_of_range = leave_review(&db.pool, &alice, &hotel.id, 6, None).await;
        assert!(matches!(out_of_range, Err(Error::ValidationFailed { .. })));

        let missing = leave_review(&db.pool, &alice, "nope", 3, None).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));

        let anonymous = leave_review(&db.pool, &Viewer::Anonymous, &hotel.id, 3, None).await;
        assert!(matches!(anonymous, Err(Error::AuthenticationRequired)));
    }
}
