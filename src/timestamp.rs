//! The lease-file time grammar.
//!
//! dhcpd writes every time statement as
//!
//! ```text
//! starts 6 2019/04/27 03:24:45;
//! ends 6 2019/04/27 03:34:45 MDT;
//! cltt epoch 1556335485; # Sat Apr 27 03:24:45 2019
//! ```
//!
//! The leading digit is the day of the week (0 = Sunday). It is positional
//! only and is skipped without being checked against the date. An optional
//! zone suffix follows the time: a zone name, a numeric `±HHMM` offset, or
//! both. Without a suffix the time is UTC. Servers configured with
//! `db-time-format local` write `epoch <seconds>` instead.
//!
//! Zone abbreviations (`MDT`, `CET`, ...) map to the fixed offset they name
//! and never apply daylight saving: `CET` is always +01:00, even in summer.
//! Other names (`EST5EDT`, `America/Denver`, `Etc/GMT+5`) are looked up in
//! the tz database and do follow its rules for the given date.

use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::trace;

use crate::error::{Error, Result};

const DATE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

const EPOCH_PREFIX: &str = "epoch ";

/// Rendered in place of an unset time.
pub(crate) const ZERO_TIME: &str = "0001/01/01 00:00:00";

/// Zone abbreviations dhcpd and the C library commonly emit, with their UTC
/// offsets in minutes. Names not listed here are looked up as tz database
/// names.
const ZONE_ABBREVIATIONS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("UT", 0),
    ("GMT", 0),
    ("WET", 0),
    ("WEST", 60),
    ("BST", 60),
    ("CET", 60),
    ("CEST", 120),
    ("EET", 120),
    ("EEST", 180),
    ("MSK", 180),
    ("JST", 540),
    ("KST", 540),
    ("AWST", 480),
    ("ACST", 570),
    ("ACDT", 630),
    ("AEST", 600),
    ("AEDT", 660),
    ("NZST", 720),
    ("NZDT", 780),
    ("HST", -600),
    ("AKST", -540),
    ("AKDT", -480),
    ("PST", -480),
    ("PDT", -420),
    ("MST", -420),
    ("MDT", -360),
    ("CST", -360),
    ("CDT", -300),
    ("EST", -300),
    ("EDT", -240),
    ("AST", -240),
    ("ADT", -180),
    ("NST", -210),
    ("NDT", -150),
];

/// Parses a time statement value such as `6 2019/04/27 03:34:45 MDT`.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] if the value does not follow the
/// grammar, including the literal `never` dhcpd writes for infinite leases.
pub fn parse(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Some(seconds) = value.strip_prefix(EPOCH_PREFIX) {
        return parse_epoch(value, seconds);
    }

    let rest = skip_weekday(value).ok_or_else(|| invalid(value, "missing weekday prefix"))?;
    let mut tokens = rest.split_whitespace();
    let (Some(date), Some(time)) = (tokens.next(), tokens.next()) else {
        return Err(invalid(value, "missing date or time"));
    };

    let naive = NaiveDateTime::parse_from_str(&format!("{date} {time}"), DATE_TIME_FORMAT)
        .map_err(|error| invalid(value, &error.to_string()))?;

    let zone: Vec<&str> = tokens.collect();
    match zone.as_slice() {
        [] => Ok(naive.and_utc()),
        [offset] if is_numeric_offset(offset) => in_offset(value, naive, offset),
        [name] => in_named_zone(value, naive, name),
        [offset, _] if is_numeric_offset(offset) => in_offset(value, naive, offset),
        _ => Err(invalid(value, "unrecognized zone suffix")),
    }
}

/// Lenient form of [`parse`]: a malformed value yields `None`.
///
/// This is what the field decoders use, so one bad statement leaves a single
/// field unset instead of failing the whole block.
pub fn decode(value: &str) -> Option<DateTime<Utc>> {
    match parse(value) {
        Ok(time) => Some(time),
        Err(error) => {
            trace!(%error, "leaving time field unset");
            None
        }
    }
}

/// Formats a time in the canonical lease-file grammar, with the weekday
/// digit derived from the date.
///
/// `decode(&format(&t)) == Some(t)` for every whole-second instant.
pub fn format(time: &DateTime<Utc>) -> String {
    format!(
        "{} {}",
        time.weekday().num_days_from_sunday(),
        time.format(DATE_TIME_FORMAT)
    )
}

/// Date and time without the weekday prefix, [`ZERO_TIME`] when unset.
pub(crate) fn format_date_time(time: Option<&DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.format(DATE_TIME_FORMAT).to_string(),
        None => ZERO_TIME.to_string(),
    }
}

fn skip_weekday(value: &str) -> Option<&str> {
    let mut chars = value.char_indices();
    let (_, weekday) = chars.next()?;
    if weekday.is_whitespace() {
        return None;
    }
    let (index, separator) = chars.next()?;
    (separator == ' ').then(|| &value[index + 1..])
}

fn parse_epoch(value: &str, seconds: &str) -> Result<DateTime<Utc>> {
    let seconds: i64 = seconds
        .trim()
        .parse()
        .map_err(|error: std::num::ParseIntError| invalid(value, &error.to_string()))?;
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| invalid(value, "epoch out of range"))
}

fn is_numeric_offset(token: &str) -> bool {
    token.starts_with(['+', '-'])
}

fn is_zone_name(token: &str) -> bool {
    token.len() >= 2 && token.bytes().all(|byte| byte.is_ascii_alphabetic())
}

fn in_named_zone(value: &str, naive: NaiveDateTime, name: &str) -> Result<DateTime<Utc>> {
    if let Some(&(_, minutes)) = ZONE_ABBREVIATIONS
        .iter()
        .find(|(abbreviation, _)| abbreviation.eq_ignore_ascii_case(name))
    {
        return in_fixed_offset(value, naive, minutes * 60);
    }

    if let Ok(tz) = Tz::from_str(name) {
        return tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|time| time.with_timezone(&Utc))
            .ok_or_else(|| invalid(value, "local time does not exist in zone"));
    }

    if is_zone_name(name) {
        trace!(zone = name, "unknown zone name, reading time as UTC");
        return Ok(naive.and_utc());
    }

    Err(invalid(value, "unrecognized zone suffix"))
}

fn in_offset(value: &str, naive: NaiveDateTime, offset: &str) -> Result<DateTime<Utc>> {
    let bytes = offset.as_bytes();
    let sign = match bytes.first() {
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return Err(invalid(value, "zone offset must start with + or -")),
    };
    if bytes.len() != 5 || !bytes[1..].iter().all(u8::is_ascii_digit) {
        return Err(invalid(value, "zone offset must be ±HHMM"));
    }
    let hours: i32 = offset[1..3]
        .parse()
        .map_err(|error: std::num::ParseIntError| invalid(value, &error.to_string()))?;
    let minutes: i32 = offset[3..5]
        .parse()
        .map_err(|error: std::num::ParseIntError| invalid(value, &error.to_string()))?;
    in_fixed_offset(value, naive, sign * (hours * 3600 + minutes * 60))
}

fn in_fixed_offset(value: &str, naive: NaiveDateTime, seconds: i32) -> Result<DateTime<Utc>> {
    let offset =
        FixedOffset::east_opt(seconds).ok_or_else(|| invalid(value, "zone offset out of range"))?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|time| time.with_timezone(&Utc))
        .ok_or_else(|| invalid(value, "local time out of range"))
}

fn invalid(value: &str, reason: &str) -> Error {
    Error::InvalidTimestamp(format!("{:?}: {}", value, reason))
}
