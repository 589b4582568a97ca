//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that
//! lexical order in SQL matches chronological order. Status enums are stored
//! as their upper-case names. UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use pmm_core::{
  identity::Identity,
  project::{Project, ProjectMember, ProjectStatus},
  task::{Task, TaskStatus},
  user::User,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Cut to the precision a stored timestamp keeps, so a value handed back
/// from a write equals the one read later.
pub fn stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

/// The current time at stored precision.
pub fn now() -> DateTime<Utc> { stored_precision(Utc::now()) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn encode_opt_dt(dt: Option<DateTime<Utc>>) -> Option<String> {
  dt.map(encode_dt)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── Status enums ────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| Error::UnknownValue {
    column,
    value: s.to_owned(),
  })
}

// ─── Column lists ────────────────────────────────────────────────────────────
//
// Every query selects these in this order, with the table aliased as shown,
// so the `Raw*::from_row` readers below can be shared.

pub const USER_COLUMNS: &str = "u.user_id, u.email, u.name, u.created_at";

pub const PROJECT_COLUMNS: &str = "p.project_id, p.title, p.description, \
   p.due_date, p.status, p.owner_id, p.created_at";

pub const TASK_COLUMNS: &str = "t.task_id, t.project_id, t.parent_id, \
   t.title, t.status, t.importance, t.urgency, t.estimated_minutes, \
   t.actual_minutes, t.reflection, t.due_date, t.created_at";

/// Number of columns in [`TASK_COLUMNS`]; extra selected values follow.
pub const TASK_COLUMN_COUNT: usize = 12;

/// Visibility predicate on an aliased `projects p` row for the user bound
/// at `?1`.
pub const ACCESSIBLE_BY_USER: &str = "(p.owner_id = ?1 OR EXISTS (
     SELECT 1 FROM project_members m
     WHERE m.project_id = p.project_id AND m.user_id = ?1))";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub email:      String,
  pub name:       String,
  pub created_at: String,
}

impl RawUser {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      email:      row.get(1)?,
      name:       row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      email:      self.email,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `projects` row.
pub struct RawProject {
  pub project_id:  String,
  pub title:       String,
  pub description: String,
  pub due_date:    Option<String>,
  pub status:      String,
  pub owner_id:    String,
  pub created_at:  String,
}

impl RawProject {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      project_id:  row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      due_date:    row.get(3)?,
      status:      row.get(4)?,
      owner_id:    row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_project(self) -> Result<Project> {
    Ok(Project {
      project_id:  decode_uuid(&self.project_id)?,
      title:       self.title,
      description: self.description,
      due_date:    decode_opt_dt(self.due_date)?,
      status:      decode_enum::<ProjectStatus>("project status", &self.status)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `project_members` row.
pub struct RawMember {
  pub member_id:  String,
  pub project_id: String,
  pub user_id:    String,
  pub created_at: String,
}

impl RawMember {
  pub fn into_member(self) -> Result<ProjectMember> {
    Ok(ProjectMember {
      member_id:  decode_uuid(&self.member_id)?,
      project_id: decode_uuid(&self.project_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `tasks` row.
pub struct RawTask {
  pub task_id:           String,
  pub project_id:        String,
  pub parent_id:         Option<String>,
  pub title:             String,
  pub status:            String,
  pub importance:        i32,
  pub urgency:           i32,
  pub estimated_minutes: i32,
  pub actual_minutes:    Option<i32>,
  pub reflection:        Option<String>,
  pub due_date:          Option<String>,
  pub created_at:        String,
}

impl RawTask {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      task_id:           row.get(0)?,
      project_id:        row.get(1)?,
      parent_id:         row.get(2)?,
      title:             row.get(3)?,
      status:            row.get(4)?,
      importance:        row.get(5)?,
      urgency:           row.get(6)?,
      estimated_minutes: row.get(7)?,
      actual_minutes:    row.get(8)?,
      reflection:        row.get(9)?,
      due_date:          row.get(10)?,
      created_at:        row.get(11)?,
    })
  }

  pub fn into_task(self) -> Result<Task> {
    Ok(Task {
      task_id:           decode_uuid(&self.task_id)?,
      project_id:        decode_uuid(&self.project_id)?,
      parent_id:         decode_opt_uuid(self.parent_id)?,
      title:             self.title,
      status:            decode_enum::<TaskStatus>("task status", &self.status)?,
      importance:        self.importance,
      urgency:           self.urgency,
      estimated_minutes: self.estimated_minutes,
      actual_minutes:    self.actual_minutes,
      reflection:        self.reflection,
      due_date:          decode_opt_dt(self.due_date)?,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings for an account joined from `accounts` or `sessions`.
pub struct RawIdentity {
  pub user_id: String,
  pub email:   String,
}

impl RawIdentity {
  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      user_id: decode_uuid(&self.user_id)?,
      email:   self.email,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let b = a + chrono::TimeDelta::milliseconds(250);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn unknown_status_is_reported() {
    let err = decode_enum::<TaskStatus>("task status", "LATER").unwrap_err();
    assert!(matches!(err, Error::UnknownValue { column: "task status", .. }));
    assert_eq!(
      decode_enum::<TaskStatus>("task status", "DONE").unwrap(),
      TaskStatus::Done
    );
  }
}
