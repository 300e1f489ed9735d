//! Hotel search.
//!
//! Every filter dimension is optional and dimensions combine with AND.
//! Within the amenity dimension any listed amenity matches. The price bounds
//! and the availability range must be met by the same room of the hotel.

use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use super::availability::{push_available_rooms, DateRange};
use crate::db::{DbPool, Hotel};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelFilter {
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Empty means no amenity filter
    pub amenities: Vec<String>,
    pub min_rating: Option<f64>,
    pub available: Option<DateRange>,
}

impl HotelFilter {
    fn has_room_predicates(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some() || self.available.is_some()
    }
}

/// Build the parameterized search query for `filter`
pub fn build_query(filter: &HotelFilter) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT h.* FROM hotels h WHERE 1 = 1");

    if let Some(location) = &filter.location {
        qb.push(" AND h.location = ").push_bind(location.clone());
    }

    if !filter.amenities.is_empty() {
        qb.push(" AND EXISTS (SELECT 1 FROM json_each(h.amenities) am WHERE am.value IN (");
        let mut values = qb.separated(", ");
        for amenity in &filter.amenities {
            values.push_bind(amenity.clone());
        }
        qb.push("))");
    }

    if let Some(min_rating) = filter.min_rating {
        qb.push(" AND h.rating >= ").push_bind(min_rating);
    }

    if filter.has_room_predicates() {
        qb.push(" AND EXISTS (SELECT 1 FROM rooms r WHERE r.hotel_id = h.id");
        if let Some(min_price) = filter.min_price {
            qb.push(" AND r.price >= ").push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            qb.push(" AND r.price <= ").push_bind(max_price);
        }
        if let Some(range) = &filter.available {
            qb.push(" AND ");
            push_available_rooms(&mut qb, "r.id", range);
        }
        qb.push(")");
    }

    // Unrated hotels sort last
    qb.push(" ORDER BY h.rating DESC, h.name ASC");
    qb
}

pub async fn search_hotels(db: &DbPool, filter: &HotelFilter) -> Result<Vec<Hotel>> {
    let mut qb = build_query(filter);
    let hotels: Vec<Hotel> = qb.build_query_as().fetch_all(db).await?;
    debug!(matches = hotels.len(), ?filter, "Hotel search");
    Ok(hotels)
}
