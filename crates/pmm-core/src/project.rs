//! Projects and project membership.

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
pub enum ProjectStatus {
  #[default]
  Active,
  Completed,
}

/// A project and its owning user. Tasks and memberships hang off it and are
/// removed with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub project_id:  Uuid,
  pub title:       String,
  /// Empty when the creator gave none.
  pub description: String,
  pub due_date:    Option<DateTime<Utc>>,
  pub status:      ProjectStatus,
  pub owner_id:    Uuid,
  pub created_at:  DateTime<Utc>,
}

impl Project {
  pub fn is_owned_by(&self, user_id: Uuid) -> bool { self.owner_id == user_id }
}

/// Input to [`crate::store::WorkspaceStore::create_project`].
/// `project_id`, `status` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewProject {
  pub title:       String,
  pub description: String,
  pub due_date:    Option<DateTime<Utc>>,
  pub owner_id:    Uuid,
}

/// The editable fields of a project.
#[derive(Debug, Clone)]
pub struct ProjectUpdate {
  pub title:       String,
  pub description: String,
  pub due_date:    Option<DateTime<Utc>>,
}

/// A non-owner's access grant. Unique per (project, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
  pub member_id:  Uuid,
  pub project_id: Uuid,
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,
}
