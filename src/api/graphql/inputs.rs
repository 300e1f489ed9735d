//! GraphQL input objects and their conversion into validated domain values.

use async_graphql::{InputObject, ID};
use chrono::NaiveDate;

use crate::api::validation::{
    normalize_amenities, parse_calendar_date, parse_instant, validate_capacity,
    validate_guests, validate_image_urls, validate_price, validate_rating_bound,
    validate_required, validate_uuid,
};
use crate::db::{HotelChanges, NewHotel, NewRoom, RoomChanges};
use crate::engine::{DateRange, HotelFilter, StayRequest};
use crate::error::{Error, Result, ValidationErrors};

const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Default, InputObject)]
#[graphql(name = "HotelFilter")]
pub struct HotelFilterInput {
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub min_rating: Option<f64>,
    /// `YYYY-MM-DD`; applied together with `availableTo`
    pub available_from: Option<String>,
    /// `YYYY-MM-DD`, inclusive
    pub available_to: Option<String>,
}

impl HotelFilterInput {
    pub fn into_filter(self) -> Result<HotelFilter> {
        let mut errors = ValidationErrors::new();

        if let Some(price) = self.min_price {
            errors.check("minPrice", validate_price(price));
        }
        if let Some(price) = self.max_price {
            errors.check("maxPrice", validate_price(price));
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                errors.add("minPrice", "Minimum price exceeds maximum price");
            }
        }
        if let Some(rating) = self.min_rating {
            errors.check("minRating", validate_rating_bound(rating));
        }

        let available = match (&self.available_from, &self.available_to) {
            (Some(from), Some(to)) => {
                let from = errors.check("availableFrom", parse_calendar_date(from, "availableFrom"));
                let to = errors.check("availableTo", parse_calendar_date(to, "availableTo"));
                match (from, to) {
                    (Some(from), Some(to)) => errors.check("availableTo", DateRange::new(from, to)),
                    _ => None,
                }
            }
            _ => None,
        };

        errors.finish()?;

        Ok(HotelFilter {
            location: self
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            min_price: self.min_price,
            max_price: self.max_price,
            amenities: normalize_amenities(&self.amenities.unwrap_or_default()),
            min_rating: self.min_rating,
            available,
        })
    }
}

#[derive(Debug, InputObject)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, InputObject)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, InputObject)]
pub struct AddHotelInput {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    /// Image URLs in display order
    pub images: Option<Vec<String>>,
}

impl AddHotelInput {
    pub fn into_new_hotel(self) -> Result<NewHotel> {
        let mut errors = ValidationErrors::new();
        errors.check("name", validate_required(&self.name, "Name", MAX_NAME_LEN));
        errors.check("location", validate_required(&self.location, "Location", MAX_NAME_LEN));
        let images = self.images.unwrap_or_default();
        errors.check("images", validate_image_urls(&images));
        errors.finish()?;

        Ok(NewHotel {
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            description: self.description,
            amenities: normalize_amenities(&self.amenities.unwrap_or_default()),
            images,
        })
    }
}

/// Partial hotel update; omitted fields keep their value
#[derive(Debug, Default, InputObject)]
pub struct UpdateHotelInput {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

impl UpdateHotelInput {
    pub fn into_changes(self) -> Result<HotelChanges> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check("name", validate_required(name, "Name", MAX_NAME_LEN));
        }
        if let Some(location) = &self.location {
            errors.check("location", validate_required(location, "Location", MAX_NAME_LEN));
        }
        if let Some(images) = &self.images {
            errors.check("images", validate_image_urls(images));
        }
        errors.finish()?;

        Ok(HotelChanges {
            name: self.name.map(|n| n.trim().to_string()),
            location: self.location.map(|l| l.trim().to_string()),
            description: self.description,
            amenities: self.amenities.as_deref().map(normalize_amenities),
            images: self.images,
        })
    }
}

#[derive(Debug, InputObject)]
pub struct AddRoomInput {
    pub hotel_id: ID,
    pub room_number: Option<String>,
    /// Free-text room type, "Standard" when omitted
    #[graphql(name = "type")]
    pub room_type: Option<String>,
    pub capacity: i64,
    /// Nightly price
    pub price: f64,
    pub description: Option<String>,
}

impl AddRoomInput {
    pub fn into_new_room(self) -> Result<NewRoom> {
        let mut errors = ValidationErrors::new();
        errors.check("hotelId", validate_uuid(&self.hotel_id, "hotelId"));
        errors.check("capacity", validate_capacity(self.capacity));
        errors.check("price", validate_price(self.price));
        errors.finish()?;

        Ok(NewRoom {
            hotel_id: self.hotel_id.0,
            room_number: self.room_number,
            room_type: self
                .room_type
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            capacity: self.capacity,
            price: self.price,
            description: self.description,
        })
    }
}

#[derive(Debug, Default, InputObject)]
pub struct UpdateRoomInput {
    pub hotel_id: Option<ID>,
    pub room_number: Option<String>,
    #[graphql(name = "type")]
    pub room_type: Option<String>,
    pub capacity: Option<i64>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

impl UpdateRoomInput {
    pub fn into_changes(self) -> Result<RoomChanges> {
        let mut errors = ValidationErrors::new();
        if let Some(hotel_id) = &self.hotel_id {
            errors.check("hotelId", validate_uuid(hotel_id, "hotelId"));
        }
        if let Some(capacity) = self.capacity {
            errors.check("capacity", validate_capacity(capacity));
        }
        if let Some(price) = self.price {
            errors.check("price", validate_price(price));
        }
        errors.finish()?;

        Ok(RoomChanges {
            hotel_id: self.hotel_id.map(|id| id.0),
            room_number: self.room_number,
            room_type: self.room_type,
            capacity: self.capacity,
            price: self.price,
            description: self.description,
        })
    }
}

#[derive(Debug, InputObject)]
pub struct SetAvailabilityInput {
    pub room_id: ID,
    /// `YYYY-MM-DD`
    pub date: String,
    pub is_available: bool,
}

impl SetAvailabilityInput {
    pub fn parse(&self) -> Result<NaiveDate> {
        let mut errors = ValidationErrors::new();
        errors.check("roomId", validate_uuid(&self.room_id, "roomId"));
        let date = errors.check("date", parse_calendar_date(&self.date, "date"));
        errors.finish()?;
        date.ok_or_else(|| Error::Internal("Unparsed date passed validation".to_string()))
    }
}

#[derive(Debug, InputObject)]
pub struct BookRoomInput {
    pub room_id: ID,
    /// RFC 3339, `YYYY-MM-DDTHH:MM:SS` (UTC) or `YYYY-MM-DD`
    pub check_in: String,
    pub check_out: String,
    pub guests: i64,
}

impl BookRoomInput {
    pub fn into_request(self) -> Result<StayRequest> {
        stay_request(&self.room_id, &self.check_in, &self.check_out, self.guests)
    }
}

/// A prospective stay to price
#[derive(Debug, InputObject)]
pub struct QuoteInput {
    pub room_id: ID,
    pub check_in: String,
    pub check_out: String,
    pub guests: i64,
}

impl QuoteInput {
    pub fn into_request(self) -> Result<StayRequest> {
        stay_request(&self.room_id, &self.check_in, &self.check_out, self.guests)
    }
}

fn stay_request(room_id: &str, check_in: &str, check_out: &str, guests: i64) -> Result<StayRequest> {
    let mut errors = ValidationErrors::new();
    errors.check("roomId", validate_uuid(room_id, "roomId"));
    errors.check("guests", validate_guests(guests));
    let check_in = errors.check("checkIn", parse_instant(check_in, "checkIn"));
    let check_out = errors.check("checkOut", parse_instant(check_out, "checkOut"));

    if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
        if check_out <= check_in {
            errors.add("checkOut", "Check-out must be after check-in");
        }
    }
    errors.finish()?;

    let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
        return Err(Error::Internal("Unparsed stay dates passed validation".to_string()));
    };
    Ok(StayRequest {
        room_id: room_id.to_string(),
        check_in,
        check_out,
        guests,
    })
}

#[derive(Debug, InputObject)]
#[graphql(name = "ReviewInput")]
pub struct LeaveReviewInput {
    pub hotel_id: ID,
    /// 1 to 5
    pub rating: i64,
    pub comment: Option<String>,
}

impl LeaveReviewInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        errors.check("hotelId", validate_uuid(&self.hotel_id, "hotelId"));
        errors.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn fields(err: Error) -> Vec<String> {
        match err {
            Error::ValidationFailed { fields, .. } => {
                let mut keys: Vec<String> = fields.into_keys().collect();
                keys.sort();
                keys
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_requires_both_dates() {
        let filter = HotelFilterInput {
            available_from: Some("2024-01-01".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert!(filter.available.is_none());

        let filter = HotelFilterInput {
            available_from: Some("2024-01-01".to_string()),
            available_to: Some("2024-01-03".to_string()),
            amenities: Some(vec!["pool".to_string(), " ".to_string()]),
            location: Some("  ".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.available.map(|r| r.days()), Some(3));
        assert_eq!(filter.amenities, vec!["pool"]);
        assert_eq!(filter.location, None);
    }

    #[test]
    fn test_filter_rejects_bad_bounds() {
        let err = HotelFilterInput {
            min_price: Some(500.0),
            max_price: Some(100.0),
            min_rating: Some(7.0),
            available_from: Some("2024-01-05".to_string()),
            available_to: Some("2024-01-01".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();
        assert_eq!(fields(err), vec!["availableTo", "minPrice", "minRating"]);
    }

    #[test]
    fn test_stay_request_normalizes_instants() {
        let request = BookRoomInput {
            room_id: ID::from(ROOM),
            check_in: "2024-01-01".to_string(),
            check_out: "2024-01-03T11:00:00".to_string(),
            guests: 2,
        }
        .into_request()
        .unwrap();
        assert_eq!(request.check_in.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(request.check_out.to_rfc3339(), "2024-01-03T11:00:00+00:00");
    }

    #[test]
    fn test_stay_request_validation() {
        let err = BookRoomInput {
            room_id: ID::from("room-1"),
            check_in: "2024-01-03".to_string(),
            check_out: "2024-01-01".to_string(),
            guests: 0,
        }
        .into_request()
        .unwrap_err();
        assert_eq!(fields(err), vec!["checkOut", "guests", "roomId"]);

        let err = QuoteInput {
            room_id: ID::from(ROOM),
            check_in: "soon".to_string(),
            check_out: "2024-01-01".to_string(),
            guests: 1,
        }
        .into_request()
        .unwrap_err();
        assert_eq!(fields(err), vec!["checkIn"]);
    }

    #[test]
    fn test_room_input_validation() {
        let err = AddRoomInput {
            hotel_id: ID::from(ROOM),
            room_number: None,
            room_type: None,
            capacity: -1,
            price: -5.0,
            description: None,
        }
        .into_new_room()
        .unwrap_err();
        assert_eq!(fields(err), vec!["capacity", "price"]);
    }

    #[test]
    fn test_hotel_input_validation() {
        let err = AddHotelInput {
            name: "".to_string(),
            location: "Goa".to_string(),
            description: None,
            amenities: None,
            images: Some(vec!["nope".to_string()]),
        }
        .into_new_hotel()
        .unwrap_err();
        assert_eq!(fields(err), vec!["images", "name"]);

        let changes = UpdateHotelInput {
            amenities: Some(vec!["spa".to_string(), "spa".to_string()]),
            ..Default::default()
        }
        .into_changes()
        .unwrap();
        assert_eq!(changes.amenities, Some(vec!["spa".to_string()]));
        assert!(changes.name.is_none());
    }
}
