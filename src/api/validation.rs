//! Input validation for GraphQL arguments.
//!
//! Validators return `Err(message)` and are collected per field with
//! [`crate::error::ValidationErrors`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::db::DATE_FORMAT;

lazy_static! {
    /// Loose email shape: local part, @, dotted domain
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?)+$"
    ).unwrap();

    /// HTTP/HTTPS image URLs
    static ref IMAGE_URL_REGEX: Regex = Regex::new(
        r"^https?://[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)*(:\d+)?(/[^\s]*)?$"
    ).unwrap();
}

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Validate a UUID string
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}

/// Validate a required free-text field such as a name or location
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} is required", field_name));
    }
    if trimmed.chars().count() > max_len {
        return Err(format!(
            "{} is too long (max {} characters)",
            field_name, max_len
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Passwords need 8 to 128 characters with at least one letter and one digit
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.chars().count() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err("Password must contain at least one letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    Ok(())
}

pub fn validate_capacity(capacity: i64) -> Result<(), String> {
    if capacity < 1 {
        return Err("Capacity must be at least 1".to_string());
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price < 0.0 {
        return Err("Price must be a non-negative number".to_string());
    }
    Ok(())
}

pub fn validate_guests(guests: i64) -> Result<(), String> {
    if guests < 1 {
        return Err("Guests must be at least 1".to_string());
    }
    Ok(())
}

/// Rating bound used by hotel search
pub fn validate_rating_bound(rating: f64) -> Result<(), String> {
    if !(0.0..=5.0).contains(&rating) {
        return Err("Rating must be between 0 and 5".to_string());
    }
    Ok(())
}

pub fn validate_image_urls(urls: &[String]) -> Result<(), String> {
    match urls.iter().find(|u| !IMAGE_URL_REGEX.is_match(u)) {
        Some(bad) => Err(format!("Invalid image URL: {}", bad)),
        None => Ok(()),
    }
}

/// Trim amenity names and drop blanks and repeats, keeping order
pub fn normalize_amenities(amenities: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(amenities.len());
    for amenity in amenities {
        let amenity = amenity.trim();
        if !amenity.is_empty() && !seen.iter().any(|s: &String| s == amenity) {
            seen.push(amenity.to_string());
        }
    }
    seen
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_calendar_date(value: &str, field_name: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| format!("{} must be a date in YYYY-MM-DD format", field_name))
}

/// Parse a check-in/check-out instant.
///
/// Accepts RFC 3339 (`2024-01-01T14:00:00+05:30`), a naive date-time taken as
/// UTC (`2024-01-01T14:00:00`) or a plain date at midnight UTC (`2024-01-01`).
pub fn parse_instant(value: &str, field_name: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(at.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(format!(
        "{} must be an ISO 8601 date or date-time",
        field_name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "roomId").is_ok());
        assert!(validate_uuid("", "roomId").is_err());
        assert!(validate_uuid("not-a-uuid", "roomId").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("guest@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.co.in").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("guest").is_err());
        assert!(validate_email("guest@localhost").is_err());
        assert!(validate_email("guest@@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("sunrise42").is_ok());

        assert!(validate_password("short1").is_err());
        assert!(validate_password("onlyletters").is_err());
        assert!(validate_password("1234567890").is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Lakeview", "Name", 10).is_ok());
        assert!(validate_required("   ", "Name", 10).is_err());
        assert!(validate_required("A very long hotel name", "Name", 10).is_err());
    }

    #[test]
    fn test_numeric_bounds() {
        assert!(validate_capacity(1).is_ok());
        assert!(validate_capacity(0).is_err());
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_guests(0).is_err());
        assert!(validate_rating_bound(4.5).is_ok());
        assert!(validate_rating_bound(5.5).is_err());
    }

    #[test]
    fn test_image_urls() {
        let good = vec![
            "https://img.example.com/a.jpg".to_string(),
            "http://cdn.example.com:8080/rooms/1.png?w=400".to_string(),
        ];
        assert!(validate_image_urls(&good).is_ok());
        assert!(validate_image_urls(&["ftp://example.com/a.jpg".to_string()]).is_err());
        assert!(validate_image_urls(&["not a url".to_string()]).is_err());
    }

    #[test]
    fn test_normalize_amenities() {
        let raw = vec![
            " wifi ".to_string(),
            "pool".to_string(),
            "".to_string(),
            "wifi".to_string(),
        ];
        assert_eq!(normalize_amenities(&raw), vec!["wifi", "pool"]);
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(
            parse_calendar_date("2024-02-29", "date"),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert!(parse_calendar_date("2023-02-29", "date").is_err());
        assert!(parse_calendar_date("29/02/2024", "date").is_err());
    }

    #[test]
    fn test_parse_instant_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap();
        assert_eq!(parse_instant("2024-01-01T14:00:00Z", "checkIn"), Ok(expected));
        assert_eq!(parse_instant("2024-01-01T19:30:00+05:30", "checkIn"), Ok(expected));
        assert_eq!(parse_instant("2024-01-01T14:00:00", "checkIn"), Ok(expected));
        assert_eq!(parse_instant("2024-01-01T14:00:00.000", "checkIn"), Ok(expected));
        assert_eq!(
            parse_instant("2024-01-01", "checkIn"),
            Ok(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(parse_instant("tomorrow", "checkIn").is_err());
    }
}
