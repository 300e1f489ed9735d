//! Date-range availability matching.
//!
//! A room is available for an inclusive date range only when every calendar
//! date in the range has an explicit availability record flagged available.
//! Missing dates count as unavailable. The same rule is expressed twice: as a
//! pure check over fetched records, and as a SQL predicate for hotel search.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};
use tracing::info;

use super::Viewer;
use crate::db::{begin_write, Availability, DbPool, Room, DATE_FORMAT};
use crate::error::{Error, Result};

/// Inclusive range of calendar dates, `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> std::result::Result<Self, String> {
        if from > to {
            return Err(format!(
                "Range start {} is after range end {}",
                from.format(DATE_FORMAT),
                to.format(DATE_FORMAT)
            ));
        }
        Ok(Self { from, to })
    }

    /// The nights of a stay: check-in date up to the day before check-out.
    /// Same-day stays occupy the check-in date.
    pub fn for_stay(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Self {
        let from = check_in.date_naive();
        let last_night = check_out.date_naive() - Duration::days(1);
        Self {
            from,
            to: last_night.max(from),
        }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Number of calendar dates in the range
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// True when `records` mark every date of `range` as available
pub fn covers_range(records: &[Availability], range: &DateRange) -> bool {
    let available: BTreeSet<NaiveDate> = records
        .iter()
        .filter(|r| r.is_available)
        .filter_map(Availability::calendar_date)
        .filter(|d| range.contains(*d))
        .collect();

    available.len() as i64 == range.days()
}

pub async fn room_available(
    db: impl SqliteExecutor<'_>,
    room_id: &str,
    range: &DateRange,
) -> Result<bool> {
    let records = Availability::list_in_range(db, room_id, range.from, range.to).await?;
    Ok(covers_range(&records, range))
}

/// Append `<room_column> IN (rooms available for every date of range)`
pub fn push_available_rooms(qb: &mut QueryBuilder<'_, Sqlite>, room_column: &str, range: &DateRange) {
    qb.push(room_column)
        .push(
            " IN (SELECT a.room_id FROM availability a \
             WHERE a.is_available = 1 AND a.date BETWEEN ",
        )
        .push_bind(range.from.format(DATE_FORMAT).to_string())
        .push(" AND ")
        .push_bind(range.to.format(DATE_FORMAT).to_string())
        .push(" GROUP BY a.room_id HAVING COUNT(DISTINCT a.date) = ")
        .push_bind(range.days())
        .push(")");
}

/// Admin operation: set the availability flag of one room on one date
pub async fn set_room_availability(
    db: &DbPool,
    viewer: &Viewer,
    room_id: &str,
    date: NaiveDate,
    is_available: bool,
) -> Result<Availability> {
    viewer.require_admin()?;

    let mut tx = begin_write(db).await?;
    if Room::find_by_id(&mut *tx, room_id).await?.is_none() {
        return Err(Error::not_found(format!("Room not found: {}", room_id)));
    }
    let record = Availability::upsert(&mut *tx, room_id, date, is_available).await?;
    tx.commit().await?;

    info!(
        room_id = %room_id,
        date = %record.date,
        is_available,
        "Room availability updated"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{self, TestDb};
    use crate::db::Role;
    use chrono::TimeZone;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn range(from: &str, to: &str) -> DateRange {
        DateRange::new(day(from), day(to)).unwrap()
    }

    fn record(date: &str, is_available: bool) -> Availability {
        Availability {
            room_id: "r".to_string(),
            date: date.to_string(),
            is_available,
        }
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(DateRange::new(day("2024-01-03"), day("2024-01-01")).is_err());
        assert_eq!(range("2024-01-01", "2024-01-01").days(), 1);
        assert_eq!(range("2024-02-28", "2024-03-01").days(), 3);
    }

    #[test]
    fn test_gap_is_unavailable() {
        let records = vec![record("2024-01-01", true), record("2024-01-03", true)];
        assert!(!covers_range(&records, &range("2024-01-01", "2024-01-03")));
    }

    #[test]
    fn test_blocked_date_is_unavailable() {
        let records = vec![
            record("2024-01-01", true),
            record("2024-01-02", false),
            record("2024-01-03", true),
        ];
        assert!(!covers_range(&records, &range("2024-01-01", "2024-01-03")));
    }

    #[test]
    fn test_full_coverage_ignores_dates_outside_range() {
        let records = vec![
            record("2023-12-31", false),
            record("2024-01-01", true),
            record("2024-01-02", true),
            record("2024-01-02", true),
            record("2024-01-05", true),
        ];
        assert!(covers_range(&records, &range("2024-01-01", "2024-01-02")));
    }

    #[test]
    fn test_stay_nights() {
        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap();
        let stay = DateRange::for_stay(at(1, 14), at(3, 11));
        assert_eq!(stay, range("2024-01-01", "2024-01-02"));

        let same_day = DateRange::for_stay(at(4, 9), at(4, 18));
        assert_eq!(same_day, range("2024-01-04", "2024-01-04"));
    }

    #[tokio::test]
    async fn test_store_backed_check_matches_pure_check() {
        let db = TestDb::new().await;
        let hotel = testing::hotel(&db.pool, "H", "Shimla", &[]).await;
        let room = testing::room(&db.pool, &hotel.id, 100.0, 2).await;
        testing::mark(&db.pool, &room.id, &["2024-01-01", "2024-01-03"], true).await;

        let wide = range("2024-01-01", "2024-01-03");
        assert!(!room_available(&db.pool, &room.id, &wide).await.unwrap());

        testing::mark(&db.pool, &room.id, &["2024-01-02"], true).await;
        assert!(room_available(&db.pool, &room.id, &wide).await.unwrap());
    }

    #[tokio::test]
    async fn test_sql_predicate_requires_every_date() {
        let db = TestDb::new().await;
        let hotel = testing::hotel(&db.pool, "H", "Shimla", &[]).await;
        let full = testing::room(&db.pool, &hotel.id, 100.0, 2).await;
        let gappy = testing::room(&db.pool, &hotel.id, 100.0, 2).await;
        testing::mark(&db.pool, &full.id, &["2024-01-01", "2024-01-02", "2024-01-03"], true).await;
        testing::mark(&db.pool, &gappy.id, &["2024-01-01", "2024-01-03"], true).await;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT r.id FROM rooms r WHERE ");
        push_available_rooms(&mut qb, "r.id", &range("2024-01-01", "2024-01-03"));
        let ids: Vec<(String,)> = qb.build_query_as().fetch_all(&db.pool).await.unwrap();

        assert_eq!(ids, vec![(full.id.clone(),)]);
    }

    #[tokio::test]
    async fn test_set_availability_requires_admin_and_room() {
        let db = TestDb::new().await;
        let admin = testing::user(&db.pool, "admin@example.com", Role::Admin).await;
        let guest = testing::user(&db.pool, "guest@example.com", Role::Customer).await;
        let hotel = testing::hotel(&db.pool, "H", "Shimla", &[]).await;
        let room = testing::room(&db.pool, &hotel.id, 100.0, 2).await;
        let admin = Viewer::from_user(&admin);
        let guest = Viewer::from_user(&guest);

        let denied =
            set_room_availability(&db.pool, &guest, &room.id, day("2024-01-01"), true).await;
        assert!(matches!(denied, Err(Error::AuthorizationDenied(_))));

        let missing =
            set_room_availability(&db.pool, &admin, "no-such-room", day("2024-01-01"), true).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));

        let record = set_room_availability(&db.pool, &admin, &room.id, day("2024-01-01"), false)
            .await
            .unwrap();
        assert!(!record.is_available);
    }
}
