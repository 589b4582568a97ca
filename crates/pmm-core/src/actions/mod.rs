//! Mutation actions.
//!
//! Every action follows the same four steps: resolve the caller's identity,
//! apply the matching access check, perform exactly one write, and report the
//! views whose data changed.
//!
//! | Action | Access |
//! |--------|--------|
//! | [`tasks::create_task`] | member or owner of the target project |
//! | [`tasks::complete_task`], [`tasks::undo_task`] | member or owner (via task) |
//! | [`tasks::update_task`], [`tasks::update_task_due_date`] | member or owner (via task) |
//! | [`tasks::delete_task`] | member or owner (via task) |
//! | [`projects::create_project`] | any authenticated user |
//! | [`projects::update_project`], [`projects::update_project_due_date`] | member or owner |
//! | [`projects::complete_project`], [`projects::reopen_project`] | member or owner |
//! | [`projects::delete_project`] | owner |
//! | [`members::add_member`], [`members::remove_member`] | owner |

pub mod members;
pub mod projects;
pub mod tasks;

use std::fmt;

use serde::{Serialize, Serializer};
use uuid::Uuid;

// ─── Revalidation ────────────────────────────────────────────────────────────

/// A presentation path whose data is stale after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPath {
  /// The project list, urgent list and dashboard.
  Root,
  /// One project's detail page.
  Project(Uuid),
}

impl fmt::Display for ViewPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Root => f.write_str("/"),
      Self::Project(id) => write!(f, "/project/{id}"),
    }
  }
}

impl Serialize for ViewPath {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// The views touched by a write to `project_id`.
pub(crate) fn stale_views(project_id: Uuid) -> Vec<ViewPath> {
  vec![ViewPath::Root, ViewPath::Project(project_id)]
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// The outcome of a successful write plus the views it invalidated.
#[derive(Debug, Clone, Serialize)]
pub struct Mutation<T> {
  pub data:       T,
  pub revalidate: Vec<ViewPath>,
}

impl<T> Mutation<T> {
  pub(crate) fn new(data: T, revalidate: Vec<ViewPath>) -> Self {
    Self { data, revalidate }
  }
}

/// A user-facing result: expected failures (unknown email, owner as member)
/// are reported here rather than raised as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
  pub ok:      bool,
  pub message: String,
}

impl ActionResult {
  pub fn ok(message: impl Into<String>) -> Self {
    Self { ok: true, message: message.into() }
  }

  pub fn rejected(message: impl Into<String>) -> Self {
    Self { ok: false, message: message.into() }
  }
}
