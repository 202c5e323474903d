use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError, ensure};

const MIN_VALIDITY_HOURS: i64 = 1;
const MAX_VALIDITY_HOURS: i64 = 48;
const SECONDS_PER_HOUR: i64 = 3600;

static VALIDITY_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<fd>\d{2})(?P<fh>\d{2})/(?P<td>\d{2})(?P<th>\d{2})$").expect("validity pattern must compile")
});

/// Half-open forecast window `[valid_from, valid_to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityPeriod {
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
}

impl ValidityPeriod {
    pub fn new(valid_from: DateTime<Utc>, valid_to: DateTime<Utc>) -> Result<Self> {
        ensure(valid_from < valid_to, || {
            format!(
                "Validity start time ({}) must be before end time ({})",
                valid_from.to_rfc3339(),
                valid_to.to_rfc3339()
            )
        })?;
        let hours = (valid_to - valid_from).num_hours();
        ensure(hours >= MIN_VALIDITY_HOURS, || {
            format!("Validity period too short ({hours} hours). Minimum is {MIN_VALIDITY_HOURS} hour(s)")
        })?;
        ensure(hours <= MAX_VALIDITY_HOURS, || {
            format!("Validity period too long ({hours} hours). Maximum is {MAX_VALIDITY_HOURS} hours")
        })?;

        Ok(Self { valid_from, valid_to })
    }

    pub fn of(valid_from: DateTime<Utc>, valid_to: DateTime<Utc>) -> Result<Self> {
        Self::new(valid_from, valid_to)
    }

    pub fn from_duration(valid_from: DateTime<Utc>, duration: Duration) -> Result<Self> {
        Self::new(valid_from, valid_from + duration)
    }

    pub fn standard_24_hour(valid_from: DateTime<Utc>) -> Result<Self> {
        Self::from_duration(valid_from, Duration::hours(24))
    }

    pub fn thirty_hour(valid_from: DateTime<Utc>) -> Result<Self> {
        Self::from_duration(valid_from, Duration::hours(30))
    }

    /// Parse `ddHH/ddHH`, resolving both ends to the first matching instant at or after `issued`'s day.
    pub fn parse(token: &str, issued: DateTime<Utc>) -> Result<Self> {
        let caps = VALIDITY_GROUP
            .captures(token.trim())
            .ok_or_else(|| WeatherError::parse("validity period", format!("unrecognized token '{token}'")))?;
        let field = |name: &str| -> Result<u32> {
            caps[name]
                .parse::<u32>()
                .map_err(|_| WeatherError::parse("validity period", &caps[name]))
        };

        let from = instant_on_or_after(issued, field("fd")?, field("fh")?, 0)?;
        let to = instant_on_or_after(from, field("td")?, field("th")?, 0)?;
        Self::new(from, to)
    }

    pub fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    pub fn valid_to(&self) -> DateTime<Utc> {
        self.valid_to
    }

    pub fn duration(&self) -> Duration {
        self.valid_to - self.valid_from
    }

    pub fn duration_hours(&self) -> i64 {
        self.duration().num_hours()
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.valid_from && time < self.valid_to
    }

    pub fn is_currently_valid(&self, now: DateTime<Utc>) -> bool {
        self.contains(now)
    }

    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_to
    }

    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        now < self.valid_from
    }

    pub fn is_standard_24_hour(&self) -> bool {
        self.duration_hours() == 24
    }

    pub fn is_30_hour(&self) -> bool {
        self.duration_hours() == 30
    }

    /// Windows that merely touch at an endpoint count as overlapping.
    pub fn overlaps(&self, other: &ValidityPeriod) -> bool {
        self.valid_to >= other.valid_from && other.valid_to >= self.valid_from
    }

    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Option<Duration> {
        (now <= self.valid_to).then(|| self.valid_to - now)
    }

    pub fn time_since_expiration(&self, now: DateTime<Utc>) -> Option<Duration> {
        (now >= self.valid_to).then(|| now - self.valid_to)
    }

    /// Hourly storage buckets covering the window: the start truncated to the
    /// hour, then every hour strictly before `valid_to`.
    pub fn hourly_buckets(&self) -> Vec<DateTime<Utc>> {
        let start = self.valid_from.timestamp();
        let end = self.valid_to.timestamp();
        let mut bucket = start - start.rem_euclid(SECONDS_PER_HOUR);
        let mut buckets = Vec::new();
        while bucket < end {
            if let Some(instant) = Utc.timestamp_opt(bucket, 0).single() {
                buckets.push(instant);
            }
            bucket += SECONDS_PER_HOUR;
        }
        buckets
    }

    pub fn to_taf_format(&self) -> String {
        format!(
            "{}/{}",
            self.valid_from.format("%d%H"),
            self.valid_to.format("%d%H")
        )
    }

    pub fn to_full_format(&self) -> String {
        format!(
            "{} to {}",
            self.valid_from.format("%Y-%m-%d %H:%MZ"),
            self.valid_to.format("%Y-%m-%d %H:%MZ")
        )
    }

    pub fn summary(&self, now: DateTime<Utc>) -> String {
        let status = if self.is_currently_valid(now) {
            "Currently active"
        } else if self.has_expired(now) {
            "Expired"
        } else {
            "Future"
        };
        format!(
            "Valid {} ({} hours) - {}",
            self.to_taf_format(),
            self.duration_hours(),
            status
        )
    }
}

impl std::fmt::Display for ValidityPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} hours)", self.to_taf_format(), self.duration_hours())
    }
}

/// First `day`/`hour`:`minute` at or after the day of `anchor`.
///
/// A day earlier than the anchor's day rolls into the next month, and hour 24
/// means 00 of the following day.
pub(crate) fn instant_on_or_after(anchor: DateTime<Utc>, day: u32, hour: u32, minute: u32) -> Result<DateTime<Utc>> {
    ensure(hour <= 24 && minute <= 59, || format!("Invalid time {hour:02}{minute:02}"))?;
    let (year, month) = if day < anchor.day() {
        next_month(anchor.year(), anchor.month())
    } else {
        (anchor.year(), anchor.month())
    };
    at(year, month, day, hour, minute)
}

/// Most recent `day`/`hour`:`minute` not after the day of `reference`.
///
/// A day later than the reference day belongs to the previous month.
pub(crate) fn instant_on_or_before(reference: DateTime<Utc>, day: u32, hour: u32, minute: u32) -> Result<DateTime<Utc>> {
    ensure(hour <= 24 && minute <= 59, || format!("Invalid time {hour:02}{minute:02}"))?;
    let (year, month) = if day > reference.day() {
        previous_month(reference.year(), reference.month())
    } else {
        (reference.year(), reference.month())
    };
    at(year, month, day, hour, minute)
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| WeatherError::validation(format!("Invalid day {day} for {year}-{month:02}")))?;
    let (hour, carry) = if hour == 24 { (0, Duration::days(1)) } else { (hour, Duration::zero()) };
    let naive = date
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| WeatherError::validation(format!("Invalid time {hour:02}{minute:02}")))?;
    Ok(Utc.from_utc_datetime(&naive) + carry)
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).single().expect("valid instant")
    }

    #[test]
    fn standard_window() {
        let period = ValidityPeriod::standard_24_hour(utc(2025, 1, 15, 12, 0)).expect("valid");
        assert_eq!(period.duration_hours(), 24);
        assert!(period.is_standard_24_hour());
        assert!(!period.is_30_hour());
        assert_eq!(period.to_taf_format(), "1512/1612");
        assert_eq!(period.to_full_format(), "2025-01-15 12:00Z to 2025-01-16 12:00Z");
        assert!(ValidityPeriod::thirty_hour(utc(2025, 1, 15, 12, 0)).expect("valid").is_30_hour());
    }

    #[test]
    fn end_must_follow_start() {
        let t = utc(2025, 1, 15, 12, 0);
        let err = ValidityPeriod::new(t, t).unwrap_err();
        assert!(err.to_string().contains("must be before end time"));
        assert!(ValidityPeriod::new(t, t - Duration::hours(2)).is_err());
    }

    #[test]
    fn duration_bounds() {
        let t = utc(2025, 1, 15, 12, 0);
        let err = ValidityPeriod::from_duration(t, Duration::minutes(30)).unwrap_err();
        assert!(err.to_string().contains("too short"));
        let err = ValidityPeriod::from_duration(t, Duration::hours(49)).unwrap_err();
        assert!(err.to_string().contains("too long"));
        assert!(ValidityPeriod::from_duration(t, Duration::hours(48)).is_ok());
        assert!(ValidityPeriod::from_duration(t, Duration::hours(1)).is_ok());
    }

    #[test]
    fn containment_is_half_open() {
        let period = ValidityPeriod::standard_24_hour(utc(2025, 1, 15, 12, 0)).expect("valid");
        assert!(period.contains(utc(2025, 1, 15, 12, 0)));
        assert!(period.contains(utc(2025, 1, 16, 11, 59)));
        assert!(!period.contains(utc(2025, 1, 16, 12, 0)));

        let now = utc(2025, 1, 15, 18, 0);
        assert!(period.is_currently_valid(now));
        assert!(!period.has_expired(now));
        assert!(!period.is_future(now));
        assert_eq!(period.time_until_expiration(now), Some(Duration::hours(18)));
        assert_eq!(period.time_since_expiration(now), None);
        assert_eq!(period.summary(now), "Valid 1512/1612 (24 hours) - Currently active");

        let later = utc(2025, 1, 17, 0, 0);
        assert!(period.has_expired(later));
        assert_eq!(period.time_since_expiration(later), Some(Duration::hours(12)));
        assert_eq!(period.summary(later), "Valid 1512/1612 (24 hours) - Expired");
        assert!(period.is_future(utc(2025, 1, 14, 0, 0)));
    }

    #[test]
    fn overlap_detection() {
        let a = ValidityPeriod::standard_24_hour(utc(2025, 1, 15, 12, 0)).expect("valid");
        let b = ValidityPeriod::standard_24_hour(utc(2025, 1, 16, 6, 0)).expect("valid");
        let c = ValidityPeriod::standard_24_hour(utc(2025, 1, 18, 0, 0)).expect("valid");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn parses_taf_window_across_month_end() {
        let issued = utc(2025, 1, 31, 17, 20);
        let period = ValidityPeriod::parse("3118/0124", issued).expect("valid");
        assert_eq!(period.valid_from(), utc(2025, 1, 31, 18, 0));
        assert_eq!(period.valid_to(), utc(2025, 2, 2, 0, 0));
        assert_eq!(period.duration_hours(), 30);
    }

    #[test]
    fn parses_hour_24_as_next_midnight() {
        let issued = utc(2025, 3, 10, 11, 30);
        let period = ValidityPeriod::parse("1012/1024", issued).expect("valid");
        assert_eq!(period.valid_to(), utc(2025, 3, 11, 0, 0));
        assert!(ValidityPeriod::parse("10-12", issued).is_err());
    }

    #[test]
    fn hourly_buckets_truncate_start() {
        let period = ValidityPeriod::new(utc(2025, 1, 15, 12, 30), utc(2025, 1, 15, 15, 0)).expect("valid");
        let buckets = period.hourly_buckets();
        assert_eq!(
            buckets,
            vec![utc(2025, 1, 15, 12, 0), utc(2025, 1, 15, 13, 0), utc(2025, 1, 15, 14, 0)]
        );

        let day = ValidityPeriod::standard_24_hour(utc(2025, 1, 15, 12, 0)).expect("valid");
        assert_eq!(day.hourly_buckets().len(), 24);
    }

    #[test]
    fn observation_day_rolls_back_a_month() {
        let reference = utc(2025, 3, 1, 2, 0);
        let observed = instant_on_or_before(reference, 28, 23, 53).expect("valid");
        assert_eq!(observed, utc(2025, 2, 28, 23, 53));
        let same_day = instant_on_or_before(reference, 1, 1, 51).expect("valid");
        assert_eq!(same_day, utc(2025, 3, 1, 1, 51));
        assert!(instant_on_or_before(reference, 30, 0, 0).is_err());
    }
}
