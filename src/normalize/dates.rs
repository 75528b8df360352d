//! Flexible date parsing for listings that mix date formats across records.
//!
//! [`parse_flexible_date`] tries three strategies, most confident first:
//!
//! 1. an ISO-8601-like substring anywhere in the text
//! 2. the whole string against `DD-MM-YYYY`, `YYYY-MM-DD`, `DD/MM/YYYY`, `YYYY/MM/DD`
//! 3. a loose `YYYY?MM?DD` digit run (may false-positive on phone numbers, so it goes last)
//!
//! All instants are naive and expressed in UTC.

use crate::error::{AppError, Result};
use crate::utils::first_hit;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

static EMBEDDED_ISO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d{4}-\d{2}-\d{2})(?:[T\s](\d{2}:\d{2}:\d{2})(\.\d+)?(Z|[+-]\d{2}:?\d{2})?)?",
    )
    .unwrap()
});

static DIGIT_GROUPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})\D?(\d{2})\D?(\d{2})").unwrap());

const EXPLICIT_FORMATS: [&str; 4] = ["%d-%m-%Y", "%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

type Strategy = fn(&str) -> Option<NaiveDateTime>;

/// Parse a date out of arbitrary text; `None` when nothing date-like is found.
///
/// # Arguments
///
/// * `text` - Free text that may contain a date anywhere in it
///
/// # Returns
///
/// The first date found by the embedded-ISO, explicit-format and digit-group
/// strategies, tried in that order. Date-only matches land on midnight and
/// offsets are converted to UTC.
///
/// # Examples
///
/// ```ignore
/// let dt = parse_flexible_date("Posted on 2023-05-10T14:00:00 by HR").unwrap();
/// assert_eq!(dt.to_string(), "2023-05-10 14:00:00");
/// assert!(parse_flexible_date("no date here").is_none());
/// ```
pub fn parse_flexible_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let strategies: [Strategy; 3] = [embedded_iso, explicit_format, digit_groups];
    let parsed = first_hit(strategies, |strategy| strategy(text));
    if parsed.is_none() {
        debug!(text, "No date found");
    }
    parsed
}

/// Interpret seconds since the Unix epoch.
pub fn from_unix_timestamp(secs: f64) -> Option<NaiveDateTime> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0).map(|dt| dt.naive_utc())
}

fn embedded_iso(text: &str) -> Option<NaiveDateTime> {
    let caps = EMBEDDED_ISO.captures(text)?;
    let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()?;
    let Some(time) = caps.get(2) else {
        return Some(date.and_time(NaiveTime::MIN));
    };
    let time = match caps.get(3) {
        Some(frac) => {
            NaiveTime::parse_from_str(&format!("{}{}", time.as_str(), frac.as_str()), "%H:%M:%S%.f")
        }
        None => NaiveTime::parse_from_str(time.as_str(), "%H:%M:%S"),
    }
    .ok()?;
    let local = date.and_time(time);
    Some(local - utc_offset(&caps)?)
}

/// Offset carried by the match; absent and `Z` are both zero.
fn utc_offset(caps: &Captures<'_>) -> Option<TimeDelta> {
    let Some(offset) = caps.get(4).map(|m| m.as_str()) else {
        return Some(TimeDelta::zero());
    };
    if offset == "Z" {
        return Some(TimeDelta::zero());
    }
    let sign = if offset.starts_with('-') { -1 } else { 1 };
    let digits: String = offset[1..].chars().filter(char::is_ascii_digit).collect();
    let hours: i64 = digits.get(..2)?.parse().ok()?;
    let minutes: i64 = digits.get(2..4)?.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(TimeDelta::minutes(sign * (hours * 60 + minutes)))
}

fn explicit_format(text: &str) -> Option<NaiveDateTime> {
    first_hit(EXPLICIT_FORMATS, |fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

fn digit_groups(text: &str) -> Option<NaiveDateTime> {
    let caps = DIGIT_GROUPS.captures(text)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.and_time(NaiveTime::MIN))
}

/// Inclusive instant range used by date-bounded aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Build a range from user-supplied arguments.
    ///
    /// An end that lands exactly on midnight (a bare date) covers that whole
    /// day.
    ///
    /// # Errors
    ///
    /// [`AppError::InvalidDate`] if either argument has no recognizable date,
    /// [`AppError::InvalidRange`] if the end precedes the start.
    pub fn from_args(start: &str, end: &str) -> Result<Self> {
        let from = parse_flexible_date(start).ok_or_else(|| AppError::InvalidDate(start.to_string()))?;
        let to = parse_flexible_date(end).ok_or_else(|| AppError::InvalidDate(end.to_string()))?;
        let to = if to.time() == NaiveTime::MIN {
            to + Duration::days(1) - Duration::nanoseconds(1)
        } else {
            to
        };
        if to < from {
            return Err(AppError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start: from, end: to })
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}
