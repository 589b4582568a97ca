//! Coercion of raw form fields into domain values.
//!
//! Numeric fields never fail: absent, non-numeric or zero input falls back to
//! a default. Dates and ids are stricter since there is no sensible default
//! for a malformed one.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::{Error, Result};

/// Importance and urgency when not given.
pub const DEFAULT_SCORE: i32 = 3;
pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;
/// Estimated minutes when not given.
pub const DEFAULT_ESTIMATE: i32 = 0;
/// Years a due date may fall in. Stored dates are four-digit.
pub const DUE_YEARS: RangeInclusive<i32> = 0..=9999;

/// The trimmed value if present and non-empty.
pub fn required(raw: Option<&str>) -> Option<&str> {
  raw.map(str::trim).filter(|s| !s.is_empty())
}

fn number(raw: Option<&str>) -> Option<i32> {
  let value: f64 = raw?.trim().parse().ok()?;
  value.is_finite().then(|| value.trunc() as i32)
}

/// Importance/urgency: defaults to 3, clamped into 1..=5.
pub fn score(raw: Option<&str>) -> i32 {
  match number(raw) {
    Some(0) | None => DEFAULT_SCORE,
    Some(n) => n.clamp(MIN_SCORE, MAX_SCORE),
  }
}

/// A duration in minutes: defaults to 0, never negative.
pub fn minutes(raw: Option<&str>) -> i32 {
  number(raw).map_or(DEFAULT_ESTIMATE, |n| n.max(0))
}

/// Parse a due date as sent by a date or datetime-local input, or as
/// RFC 3339. Empty input clears the date. Sub-microsecond precision is
/// dropped.
pub fn due_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  let Some(s) = required(raw) else {
    return Ok(None);
  };

  let parsed = parse_date(s)
    .ok_or_else(|| Error::Validation(format!("unrecognised date: {s:?}")))?;
  if !DUE_YEARS.contains(&parsed.year()) {
    return Err(Error::Validation(format!("date out of range: {s:?}")));
  }
  Ok(Some(parsed.trunc_subsecs(6)))
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
      return Some(naive.and_utc());
    }
  }
  let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
  date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// Parse an id field, naming the field in the error.
pub fn id(raw: &str, field: &str) -> Result<Uuid> {
  Uuid::parse_str(raw.trim())
    .map_err(|_| Error::Validation(format!("malformed {field}: {raw:?}")))
}

/// Emails are compared trimmed and lower-cased.
pub fn normalize_email(raw: &str) -> String { raw.trim().to_lowercase() }
