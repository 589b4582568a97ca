//! Parent tasks and their child tasks.
//!
//! The relation is a nullable `parent_id`. The schema would allow arbitrarily
//! deep chains; the action layer only ever creates one level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
  #[default]
  Todo,
  Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  pub task_id:           Uuid,
  pub project_id:        Uuid,
  /// `None` for a parent task, `Some` for a child task.
  pub parent_id:         Option<Uuid>,
  pub title:             String,
  pub status:            TaskStatus,
  /// 1..=5
  pub importance:        i32,
  /// 1..=5
  pub urgency:           i32,
  pub estimated_minutes: i32,
  /// Only set while `status` is `Done`.
  pub actual_minutes:    Option<i32>,
  pub reflection:        Option<String>,
  pub due_date:          Option<DateTime<Utc>>,
  pub created_at:        DateTime<Utc>,
}

impl Task {
  pub fn is_done(&self) -> bool { self.status == TaskStatus::Done }

  pub fn is_child(&self) -> bool { self.parent_id.is_some() }
}

/// Which side of the parent/child split a task sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskLevel {
  Parent,
  Child,
}

/// Input to [`crate::store::WorkspaceStore::create_task`]. New tasks always
/// start as `Todo`.
#[derive(Debug, Clone)]
pub struct NewTask {
  pub project_id:        Uuid,
  pub parent_id:         Option<Uuid>,
  pub title:             String,
  pub importance:        i32,
  pub urgency:           i32,
  pub estimated_minutes: i32,
  pub due_date:          Option<DateTime<Utc>>,
}

/// The editable planning fields of a task.
#[derive(Debug, Clone)]
pub struct TaskDetails {
  pub title:             String,
  pub importance:        i32,
  pub urgency:           i32,
  pub estimated_minutes: i32,
  pub due_date:          Option<DateTime<Utc>>,
}
