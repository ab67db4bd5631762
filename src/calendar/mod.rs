//! Calendar helpers
//!
//! Deterministic bucket math in the reference time zone (UTC). Months are
//! the normalized interval; the all-time sentinel spans 300 years from the
//! Unix epoch. All helpers are pure functions of their inputs.

mod interval;

pub use interval::DateInterval;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};

/// First day of the week for week-interval math
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum WeekAnchor {
    Sunday,
    Monday,
}

impl Default for WeekAnchor {
    fn default() -> Self {
        Self::Monday
    }
}

/// Year the all-time sentinel starts in (the Unix epoch year)
const SENTINEL_START_YEAR: i32 = 1970;
/// Span of the all-time sentinel in years
const SENTINEL_SPAN_YEARS: i32 = 300;

fn from_ymd(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
}

pub fn start_of_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(
        &instant
            .date_naive()
            .and_hms_opt(instant.hour(), 0, 0)
            .unwrap(),
    )
}

pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&instant.date_naive().and_hms_opt(0, 0, 0).unwrap())
}

pub fn start_of_week(instant: DateTime<Utc>, anchor: WeekAnchor) -> DateTime<Utc> {
    let days_into_week = match anchor {
        WeekAnchor::Monday => instant.weekday().num_days_from_monday(),
        WeekAnchor::Sunday => instant.weekday().num_days_from_sunday(),
    };
    start_of_day(instant) - Duration::days(i64::from(days_into_week))
}

pub fn start_of_month(instant: DateTime<Utc>) -> DateTime<Utc> {
    from_ymd(instant.year(), instant.month(), 1)
}

pub fn start_of_year(instant: DateTime<Utc>) -> DateTime<Utc> {
    from_ymd(instant.year(), 1, 1)
}

fn start_of_next_month(instant: DateTime<Utc>) -> DateTime<Utc> {
    if instant.month() == 12 {
        from_ymd(instant.year() + 1, 1, 1)
    } else {
        from_ymd(instant.year(), instant.month() + 1, 1)
    }
}

/// The calendar hour containing `instant`
pub fn hour_containing(instant: DateTime<Utc>) -> DateInterval {
    let start = start_of_hour(instant);
    DateInterval::new(start, start + Duration::hours(1) - Duration::seconds(1))
}

/// The calendar day containing `instant`
pub fn day_containing(instant: DateTime<Utc>) -> DateInterval {
    let start = start_of_day(instant);
    DateInterval::new(start, start + Duration::days(1) - Duration::seconds(1))
}

/// The week containing `instant`; ends at start-of-week plus seven days
/// minus one second
pub fn week_containing(instant: DateTime<Utc>, anchor: WeekAnchor) -> DateInterval {
    let start = start_of_week(instant, anchor);
    DateInterval::new(start, start + Duration::days(7) - Duration::seconds(1))
}

/// The calendar month containing `instant`; ends at start-of-next-month
/// minus one second. This is the normalized interval for state buckets.
pub fn month_containing(instant: DateTime<Utc>) -> DateInterval {
    let start = start_of_month(instant);
    DateInterval::new(start, start_of_next_month(instant) - Duration::seconds(1))
}

/// The calendar year containing `instant`
pub fn year_containing(instant: DateTime<Utc>) -> DateInterval {
    let start = start_of_year(instant);
    DateInterval::new(
        start,
        from_ymd(instant.year() + 1, 1, 1) - Duration::seconds(1),
    )
}

pub fn month_before(interval: &DateInterval) -> DateInterval {
    month_containing(interval.start - Duration::seconds(1))
}

pub fn month_after(interval: &DateInterval) -> DateInterval {
    month_containing(interval.end + Duration::seconds(1))
}

pub fn week_before(interval: &DateInterval, anchor: WeekAnchor) -> DateInterval {
    week_containing(interval.start - Duration::seconds(1), anchor)
}

pub fn week_after(interval: &DateInterval, anchor: WeekAnchor) -> DateInterval {
    week_containing(interval.end + Duration::seconds(1), anchor)
}

/// The all-time sentinel interval
pub fn all_time() -> DateInterval {
    DateInterval::new(
        from_ymd(SENTINEL_START_YEAR, 1, 1),
        from_ymd(SENTINEL_START_YEAR + SENTINEL_SPAN_YEARS, 1, 1),
    )
}

/// True iff `interval` is a state-bucket interval: a calendar month or the
/// all-time sentinel
pub fn is_normalized(interval: &DateInterval) -> bool {
    *interval == month_containing(interval.start) || *interval == all_time()
}

/// The monthly intervals touching `interval`, in ascending order
pub fn months_covering(interval: &DateInterval) -> Vec<DateInterval> {
    let mut months = Vec::new();
    let mut month = month_containing(interval.start);
    while month.start <= interval.end {
        months.push(month);
        month = month_after(&month);
    }
    months
}

/// Serde codec for absolute time as seconds since the Unix epoch (double)
pub mod unix_seconds {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        instant: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let seconds =
            instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_nanos()) / 1e9;
        serializer.serialize_f64(seconds)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        let whole = seconds.floor();
        let mut secs = whole as i64;
        let mut nanos = ((seconds - whole) * 1e9).round() as u32;
        if nanos >= 1_000_000_000 {
            secs += 1;
            nanos = 0;
        }
        DateTime::from_timestamp(secs, nanos)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {seconds}")))
    }
}
