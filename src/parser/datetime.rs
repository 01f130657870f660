/*!
Resolving BIRD timestamps.

BIRD prints times relative to the age of the event, and the exact notation depends on the
release and on the `timeformat` configuration:

- `2019-12-10 10:12:19` and `2019-12-10` (BIRD 2, or `timeformat ... iso long`)
- `10-12-2019 10:12:19` and `10-12-2019` (old BIRD 1 releases)
- `14:20` or `14:20:05`, for events within the last day
- `Jun29`, for events within the last year
- `2017`, for anything older

All of them are resolved against a reference instant, normally the local time of the query.
*/
use crate::error::BirdError;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Turn a BIRD timestamp into an absolute point in time, resolving partial notations against
/// `now`.
///
/// ```
/// use bgpkit_birdc::parser::resolve_timestamp;
/// use chrono::NaiveDate;
///
/// let now = NaiveDate::from_ymd_opt(2019, 12, 10).unwrap().and_hms_opt(10, 12, 19).unwrap();
/// let ts = resolve_timestamp("14:20", now).unwrap();
/// assert_eq!(ts, NaiveDate::from_ymd_opt(2019, 12, 9).unwrap().and_hms_opt(14, 20, 0).unwrap());
/// ```
pub fn resolve_timestamp(value: &str, now: NaiveDateTime) -> Result<NaiveDateTime, BirdError> {
    let value = value.trim();
    parse_positional(value)
        .or_else(|| parse_clock_time(value, now))
        .or_else(|| parse_month_day(value, now))
        .or_else(|| parse_year(value))
        .ok_or_else(|| BirdError::InvalidTimestamp(value.to_string()))
}

/// Digits at a fixed position. Any non-digit makes the whole field invalid.
fn field(value: &str, start: usize, end: usize) -> Option<u32> {
    let s = value.get(start..end)?;
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(field(value, 0, 4)? as i32, field(value, 5, 7)?, field(value, 8, 10)?)
}

fn legacy_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(field(value, 6, 10)? as i32, field(value, 3, 5)?, field(value, 0, 2)?)
}

fn time_at(value: &str) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(
        field(value, 11, 13)?,
        field(value, 14, 16)?,
        field(value, 17, 19)?,
    )
}

/// `YYYY-MM-DD[ HH:MM:SS]`, falling back to the legacy `DD-MM-YYYY[ HH:MM:SS]`.
fn parse_positional(value: &str) -> Option<NaiveDateTime> {
    let notations: [fn(&str) -> Option<NaiveDate>; 2] = [iso_date, legacy_date];
    for date_fn in notations {
        let Some(date) = date_fn(value) else {
            continue;
        };
        if let Some(time) = time_at(value) {
            return Some(date.and_time(time));
        }
        if value.len() == 10 {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// `HH:MM`, `HH:MM:SS` or `HH:MM:SS.fff` on the reference day. A time later than the reference
/// time-of-day belongs to the previous day.
fn parse_clock_time(value: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let time = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())?;
    let time = time.with_nanosecond(0)?;

    let candidate = now.date().and_time(time);
    if time > now.time() {
        candidate.checked_sub_days(Days::new(1))
    } else {
        Some(candidate)
    }
}

/// `MonDD`, e.g. `Jun29`. BIRD prints a clock time for events of the current day, so a date
/// that is not strictly before today's day of this month belongs to the previous year.
fn parse_month_day(value: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let month_str = value.get(0..3)?.to_ascii_lowercase();
    let month = MONTHS.iter().position(|m| *m == month_str)? as u32 + 1;
    let day_str = value.get(3..)?;
    if day_str.is_empty() || day_str.len() > 2 || !day_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = day_str.parse().ok()?;

    let year = if now.month() > month || (now.month() == month && now.day() > day) {
        now.year()
    } else {
        now.year() - 1
    };
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(NaiveTime::MIN))
}

/// A plain year, e.g. `2017`.
fn parse_year(value: &str) -> Option<NaiveDateTime> {
    let year: i32 = value.parse().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1).map(|d| d.and_time(NaiveTime::MIN))
}
