//! Stay cost computation.
//!
//! The cost of a stay is the nightly room price times the number of nights,
//! plus a flat surcharge per guest above the room's capacity per night, plus
//! tax on both. Inputs are expected to be validated by the caller
//! (`nights >= 1`, `guests >= 1`, `capacity >= 1`, `price >= 0`).

use chrono::{DateTime, Utc};

use crate::config::PricingConfig;

/// Surcharge per extra guest per night
pub const EXTRA_GUEST_FEE: f64 = 500.0;

/// Tax applied to room price plus surcharges
pub const TAX_RATE: f64 = 0.10;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PricingPolicy {
    pub extra_guest_fee: f64,
    pub tax_rate: f64,
    pub currency_symbol: String,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            extra_guest_fee: EXTRA_GUEST_FEE,
            tax_rate: TAX_RATE,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl From<&PricingConfig> for PricingPolicy {
    fn from(config: &PricingConfig) -> Self {
        Self {
            extra_guest_fee: config.extra_guest_fee,
            tax_rate: config.tax_rate,
            currency_symbol: config.currency_symbol.clone(),
        }
    }
}

/// Cost breakdown of a stay
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub nights: i64,
    pub base: f64,
    pub extra_guests: i64,
    pub extra_charge: f64,
    pub tax: f64,
    /// Unrounded total; only the summary lines are rounded
    pub total: f64,
    /// Human-readable lines: room price, extra guests (if any), tax, total
    pub summary: Vec<String>,
}

impl Quote {
    pub fn summary_text(&self) -> String {
        self.summary.join("\n")
    }
}

impl PricingPolicy {
    pub fn quote(&self, price: f64, capacity: i64, guests: i64, nights: i64) -> Quote {
        let base = price * nights as f64;
        let extra_guests = (guests - capacity).max(0);
        let extra_charge = extra_guests as f64 * nights as f64 * self.extra_guest_fee;
        let tax = self.tax_rate * (base + extra_charge);
        let total = base + extra_charge + tax;

        let currency = &self.currency_symbol;
        let mut summary = vec![format!(
            "Room Price: {}{} x {} {}",
            currency,
            whole(price),
            nights,
            plural(nights, "night", "nights")
        )];
        if extra_guests > 0 {
            summary.push(format!(
                "Extra Guest Charge: {}{} ({} extra {})",
                currency,
                whole(extra_charge),
                extra_guests,
                plural(extra_guests, "guest", "guests")
            ));
        }
        summary.push(format!(
            "Tax ({}%): {}{}",
            percent(self.tax_rate),
            currency,
            whole(tax)
        ));
        summary.push(format!("Total: {}{}", currency, whole(total)));

        Quote {
            nights,
            base,
            extra_guests,
            extra_charge,
            tax,
            total,
            summary,
        }
    }
}

/// Quote with the default surcharge and tax rate
pub fn calculate(price: f64, capacity: i64, guests: i64, nights: i64) -> Quote {
    PricingPolicy::default().quote(price, capacity, guests, nights)
}

/// Nights charged for a stay: elapsed days rounded to the nearest whole, at least one
pub fn nights_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i64 {
    let days = (check_out - check_in).num_seconds() as f64 / SECONDS_PER_DAY;
    (days.round() as i64).max(1)
}

fn whole(value: f64) -> String {
    format!("{:.0}", value.round())
}

fn percent(rate: f64) -> String {
    // 0.1 -> "10", 0.125 -> "12.5"
    format!("{}", (rate * 10_000.0).round() / 100.0)
}

fn plural<'a>(count: i64, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_extra_guest_example() {
        let quote = calculate(1000.0, 2, 3, 2);
        assert_eq!(quote.extra_guests, 1);
        assert!(close(quote.base, 2000.0));
        assert!(close(quote.extra_charge, 1000.0));
        assert!(close(quote.tax, 300.0));
        assert!(close(quote.total, 3300.0));
        assert_eq!(
            quote.summary,
            vec![
                "Room Price: ₹1000 x 2 nights",
                "Extra Guest Charge: ₹1000 (1 extra guest)",
                "Tax (10%): ₹300",
                "Total: ₹3300",
            ]
        );
    }

    #[test]
    fn test_no_surcharge_within_capacity() {
        for (price, capacity, guests, nights) in
            [(1000.0, 2, 2, 1), (2499.0, 4, 1, 3), (0.0, 1, 1, 7), (1234.5, 3, 2, 10)]
        {
            let quote = calculate(price, capacity, guests, nights);
            assert_eq!(quote.extra_guests, 0);
            assert_eq!(quote.extra_charge, 0.0);
            assert!(close(quote.total, price * nights as f64 * 1.10));
            assert_eq!(quote.summary.len(), 3);
        }
    }

    #[test]
    fn test_total_is_not_rounded() {
        let quote = calculate(999.99, 2, 2, 1);
        assert!(close(quote.total, 1099.989));
        assert_eq!(quote.summary.last().unwrap(), "Total: ₹1100");
    }

    #[test]
    fn test_single_night_wording() {
        let quote = calculate(100.0, 1, 3, 1);
        assert_eq!(quote.summary[0], "Room Price: ₹100 x 1 night");
        assert_eq!(quote.summary[1], "Extra Guest Charge: ₹1000 (2 extra guests)");
    }

    #[test]
    fn test_custom_policy() {
        let policy = PricingPolicy {
            extra_guest_fee: 10.0,
            tax_rate: 0.125,
            currency_symbol: "$".to_string(),
        };
        let quote = policy.quote(100.0, 1, 2, 2);
        assert!(close(quote.extra_charge, 20.0));
        assert!(close(quote.tax, 27.5));
        assert_eq!(quote.summary[2], "Tax (12.5%): $28");
        assert_eq!(quote.summary_text().lines().count(), 4);
    }

    #[test]
    fn test_nights_between() {
        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap();
        assert_eq!(nights_between(at(1, 0), at(3, 0)), 2);
        // 14:00 to 11:00 two days later rounds to two nights
        assert_eq!(nights_between(at(1, 14), at(3, 11)), 2);
        // same-day or inverted stays are charged one night
        assert_eq!(nights_between(at(1, 10), at(1, 18)), 1);
        assert_eq!(nights_between(at(3, 0), at(1, 0)), 1);
    }
}
