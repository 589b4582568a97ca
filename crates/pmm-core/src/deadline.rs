//! Human-readable time remaining until a due date.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Time left before (or since) a task's deadline. A due date covers the whole
/// day, so the deadline is the start of the following day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum TimeLeft {
  DaysLeft(i64),
  DaysOverdue(i64),
  HoursLeft(i64),
  HoursOverdue(i64),
  UnderAnHour,
  Expired,
}

impl TimeLeft {
  pub fn until(due: DateTime<Utc>, now: DateTime<Utc>) -> Self {
    let deadline = due
      .date_naive()
      .succ_opt()
      .and_then(|day| day.and_hms_opt(0, 0, 0))
      .map_or(due, |midnight| midnight.and_utc());

    let remaining = deadline - now;
    let overdue = remaining < chrono::TimeDelta::zero();
    let remaining = remaining.abs();

    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;

    match (days, hours, overdue) {
      (d, _, false) if d >= 1 => Self::DaysLeft(d),
      (d, _, true) if d >= 1 => Self::DaysOverdue(d),
      (_, h, false) if h >= 1 => Self::HoursLeft(h),
      (_, h, true) if h >= 1 => Self::HoursOverdue(h),
      (_, _, false) => Self::UnderAnHour,
      (_, _, true) => Self::Expired,
    }
  }

  pub fn is_overdue(self) -> bool {
    matches!(self, Self::DaysOverdue(_) | Self::HoursOverdue(_) | Self::Expired)
  }
}

fn plural(n: i64, unit: &str) -> String {
  if n == 1 { format!("1 {unit}") } else { format!("{n} {unit}s") }
}

impl fmt::Display for TimeLeft {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Self::DaysLeft(n) => write!(f, "{} left", plural(n, "day")),
      Self::DaysOverdue(n) => write!(f, "{} overdue", plural(n, "day")),
      Self::HoursLeft(n) => write!(f, "{} left", plural(n, "hour")),
      Self::HoursOverdue(n) => write!(f, "{} overdue", plural(n, "hour")),
      Self::UnderAnHour => f.write_str("under an hour left"),
      Self::Expired => f.write_str("expired"),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
  }

  #[test]
  fn due_date_counts_whole_day() {
    // Due today at noon: the deadline is tomorrow 00:00, ten hours away.
    let now = at(2025, 6, 1, 14, 0);
    assert_eq!(TimeLeft::until(at(2025, 6, 1, 12, 0), now), TimeLeft::HoursLeft(10));
  }

  #[test]
  fn days_left_and_overdue() {
    let now = at(2025, 6, 1, 0, 0);
    assert_eq!(TimeLeft::until(at(2025, 6, 3, 0, 0), now), TimeLeft::DaysLeft(3));
    assert_eq!(TimeLeft::until(at(2025, 5, 28, 0, 0), now), TimeLeft::DaysOverdue(3));
  }

  #[test]
  fn short_intervals() {
    let due = at(2025, 6, 1, 0, 0);
    assert_eq!(TimeLeft::until(due, at(2025, 6, 1, 23, 30)), TimeLeft::UnderAnHour);
    assert_eq!(TimeLeft::until(due, at(2025, 6, 2, 0, 30)), TimeLeft::Expired);
    assert_eq!(TimeLeft::until(due, at(2025, 6, 2, 5, 0)), TimeLeft::HoursOverdue(5));
    assert!(TimeLeft::Expired.is_overdue());
  }

  #[test]
  fn labels() {
    assert_eq!(TimeLeft::DaysLeft(1).to_string(), "1 day left");
    assert_eq!(TimeLeft::DaysOverdue(4).to_string(), "4 days overdue");
    assert_eq!(TimeLeft::HoursLeft(2).to_string(), "2 hours left");
  }
}
