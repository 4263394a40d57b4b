//! Spreadsheet date and time normalization.
//!
//! Dates arrive as spreadsheet serial day counts, day-first strings
//! (`15/03/2024 14:30`) or year-first strings (`2024-03-15`). Times arrive
//! separately as fractions of a day, full timestamps or bare `HH:mm`.
//! Everything normalizes to an absolute [`DateTime<Utc>`].
//!
//! A date with no time component is anchored at 12:00 UTC so that it reads
//! as the same calendar day in every timezone within ±11 hours. Explicit
//! wall-clock times are interpreted in the caller-supplied [`FixedOffset`].
//!
//! None of these functions fail: anything unparseable yields `None`.

use super::CellValue;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Days between the spreadsheet serial epoch (1899-12-30) and 1970-01-01.
pub const SERIAL_EPOCH_OFFSET_DAYS: i64 = 25_569;

/// Added to serial values before flooring so that values such as
/// `44999.99999999` land on the intended day.
const SERIAL_EPSILON: f64 = 1e-6;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Serial for 9999-12-31; larger values are not calendar dates.
const MAX_SERIAL_DAYS: f64 = 2_958_465.0;

/// Hour used to anchor dates that carry no time of day.
const DATE_ONLY_ANCHOR_HOUR: u32 = 12;

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static DAY_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{2,4})(?:[\sT]+(\d{1,2}):(\d{2})(?::(\d{2}))?)?\s*$",
    )
    .expect("valid day-first date pattern")
});

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static YEAR_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})[/.\-](\d{1,2})[/.\-](\d{1,2})(?:[\sT]+(\d{1,2}):(\d{2})(?::(\d{2}))?)?\s*$")
        .expect("valid year-first date pattern")
});

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static BARE_CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("valid clock pattern")
});

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static EMBEDDED_CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2})(?::(\d{2}))?").expect("valid embedded clock pattern")
});

const NAIVE_TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

/// Parses a spreadsheet date cell into an absolute timestamp.
///
/// Numbers are serial day counts and resolve to noon UTC of that day.
/// Strings are matched day-first then year-first; an explicit `HH:mm` is
/// read as wall-clock time in `wall`, otherwise the date is anchored at
/// noon UTC.
#[must_use]
pub fn parse_date(raw: &CellValue, wall: FixedOffset) -> Option<DateTime<Utc>> {
    match raw {
        CellValue::Number(serial) => from_serial(*serial),
        CellValue::Text(text) => parse_date_text(text.trim(), wall),
        CellValue::Empty => None,
    }
}

/// Overlays a separately recorded time of day onto a resolved date.
///
/// The calendar day is read from `date` in `wall`; hour and minute come from
/// `time`. A missing date yields `None`. A blank or unparseable time leaves
/// the date unchanged.
#[must_use]
pub fn combine_date_and_time(
    date: Option<DateTime<Utc>>,
    time: Option<&CellValue>,
    wall: FixedOffset,
) -> Option<DateTime<Utc>> {
    let resolved = date?;
    let Some(time_of_day) = time
        .filter(|value| !value.is_blank())
        .and_then(parse_time_of_day)
    else {
        return Some(resolved);
    };

    let day = resolved.with_timezone(&wall).date_naive();
    at_wall_clock(day, time_of_day, wall).or(Some(resolved))
}

/// Parses a time-of-day cell.
///
/// Numbers are fractions of a day (whole days are ignored). Strings may be
/// full timestamps or bare `HH:mm[:ss]`.
#[must_use]
pub fn parse_time_of_day(raw: &CellValue) -> Option<NaiveTime> {
    match raw {
        CellValue::Number(fraction) => time_from_day_fraction(*fraction),
        CellValue::Text(text) => parse_time_text(text.trim()),
        CellValue::Empty => None,
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "serial values are bounds-checked before conversion"
)]
fn from_serial(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() {
        return None;
    }
    let days = (serial + SERIAL_EPSILON).floor();
    if !(1.0..=MAX_SERIAL_DAYS).contains(&days) {
        return None;
    }
    let since_unix_epoch = TimeDelta::try_days(days as i64 - SERIAL_EPOCH_OFFSET_DAYS)?;
    let date = NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(since_unix_epoch)?;
    anchor_date_only(date)
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the day fraction is reduced into 0..86400 before conversion"
)]
fn time_from_day_fraction(value: f64) -> Option<NaiveTime> {
    if !value.is_finite() {
        return None;
    }
    let fraction = value.rem_euclid(1.0);
    let seconds = (fraction * SECONDS_PER_DAY).round().rem_euclid(SECONDS_PER_DAY);
    NaiveTime::from_num_seconds_from_midnight_opt(seconds as u32, 0)
}

fn parse_date_text(text: &str, wall: FixedOffset) -> Option<DateTime<Utc>> {
    DAY_FIRST
        .captures(text)
        .and_then(|caps| {
            let year = promote_two_digit_year(capture_number(&caps, 3)?);
            build_date(year, capture_number(&caps, 2)?, capture_number(&caps, 1)?, &caps, wall)
        })
        .or_else(|| {
            YEAR_FIRST.captures(text).and_then(|caps| {
                let year = capture_number(&caps, 1)?;
                build_date(year, capture_number(&caps, 2)?, capture_number(&caps, 3)?, &caps, wall)
            })
        })
}

/// Builds a timestamp from captured parts. Time captures are groups 4-6 in
/// both date patterns.
fn build_date(
    year: u32,
    month: u32,
    day: u32,
    caps: &Captures<'_>,
    wall: FixedOffset,
) -> Option<DateTime<Utc>> {
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;
    match capture_number(caps, 4) {
        Some(hour) => {
            let minute = capture_number(caps, 5)?;
            let second = capture_number(caps, 6).unwrap_or(0);
            at_wall_clock(date, NaiveTime::from_hms_opt(hour, minute, second)?, wall)
        }
        None => anchor_date_only(date),
    }
}

fn parse_time_text(text: &str) -> Option<NaiveTime> {
    if text.contains('T') || text.contains('/') {
        if let Some(time) = parse_timestamp_time(text) {
            return Some(time);
        }
        return EMBEDDED_CLOCK
            .captures(text)
            .and_then(|caps| clock_from_captures(&caps));
    }
    BARE_CLOCK
        .captures(text)
        .and_then(|caps| clock_from_captures(&caps))
}

/// Extracts the time of day from a full timestamp. Zoned timestamps are read
/// in UTC; unzoned ones keep their written hour.
fn parse_timestamp_time(text: &str) -> Option<NaiveTime> {
    if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
        return Some(zoned.with_timezone(&Utc).time());
    }
    let (body, utc_marker) = match text.strip_suffix(['Z', 'z']) {
        Some(body) => (body, true),
        None => (text, false),
    };
    let naive = NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(body, format).ok())?;
    if utc_marker {
        Some(naive.and_utc().time())
    } else {
        Some(naive.time())
    }
}

fn clock_from_captures(caps: &Captures<'_>) -> Option<NaiveTime> {
    let hour = capture_number(caps, 1)?;
    let minute = capture_number(caps, 2)?;
    let second = capture_number(caps, 3).unwrap_or(0);
    NaiveTime::from_hms_opt(hour, minute, second)
}

fn capture_number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group).and_then(|m| m.as_str().parse().ok())
}

const fn promote_two_digit_year(year: u32) -> u32 {
    if year < 100 { year + 2000 } else { year }
}

fn anchor_date_only(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(DATE_ONLY_ANCHOR_HOUR, 0, 0)
        .map(|naive| naive.and_utc())
}

fn at_wall_clock(date: NaiveDate, time: NaiveTime, wall: FixedOffset) -> Option<DateTime<Utc>> {
    date.and_time(time)
        .and_local_timezone(wall)
        .single()
        .map(|local| local.with_timezone(&Utc))
}
