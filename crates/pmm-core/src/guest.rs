//! Guest mode: a workspace that lives entirely in per-session client storage.
//!
//! There is no identity and no workspace store behind it. The whole workspace
//! is one JSON document saved under [`STORAGE_KEY`]; it disappears when the
//! session storage does.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key the workspace is saved under.
pub const STORAGE_KEY: &str = "guest_pm_data_v1";

const ID_LEN: usize = 8;

// ─── Storage ─────────────────────────────────────────────────────────────────

/// A per-session string key/value store (a browser's session storage, or an
/// in-memory stand-in).
pub trait SessionStorage {
  fn get_item(&self, key: &str) -> Option<String>;
  fn set_item(&mut self, key: &str, value: String);
}

/// Session storage held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  items: HashMap<String, String>,
}

impl SessionStorage for MemoryStorage {
  fn get_item(&self, key: &str) -> Option<String> { self.items.get(key).cloned() }

  fn set_item(&mut self, key: &str, value: String) {
    self.items.insert(key.to_owned(), value);
  }
}

// ─── Model ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestTask {
  pub id:    String,
  pub title: String,
  pub done:  bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestProject {
  pub id:          String,
  pub title:       String,
  pub description: String,
  pub tasks:       Vec<GuestTask>,
}

/// The guest's projects, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestWorkspace {
  pub projects: Vec<GuestProject>,
}

fn short_id() -> String {
  Uuid::new_v4().simple().to_string()[..ID_LEN].to_owned()
}

impl GuestWorkspace {
  /// Load from storage. Missing or unreadable data yields an empty
  /// workspace.
  pub fn load(storage: &impl SessionStorage) -> Self {
    storage
      .get_item(STORAGE_KEY)
      .and_then(|raw| serde_json::from_str(&raw).ok())
      .unwrap_or_default()
  }

  pub fn save(&self, storage: &mut impl SessionStorage) -> serde_json::Result<()> {
    storage.set_item(STORAGE_KEY, serde_json::to_string(self)?);
    Ok(())
  }

  /// Prepend a project. Blank titles are ignored.
  pub fn add_project(&mut self, title: &str, description: &str) -> Option<&GuestProject> {
    let title = title.trim();
    if title.is_empty() {
      return None;
    }

    self.projects.insert(0, GuestProject {
      id:          short_id(),
      title:       title.to_owned(),
      description: description.trim().to_owned(),
      tasks:       Vec::new(),
    });
    self.projects.first()
  }

  pub fn delete_project(&mut self, project_id: &str) {
    self.projects.retain(|p| p.id != project_id);
  }

  fn project_mut(&mut self, project_id: &str) -> Option<&mut GuestProject> {
    self.projects.iter_mut().find(|p| p.id == project_id)
  }

  /// Append a task to a project. Blank titles and unknown projects are
  /// ignored.
  pub fn add_task(&mut self, project_id: &str, title: &str) -> Option<&GuestTask> {
    let title = title.trim();
    if title.is_empty() {
      return None;
    }

    let project = self.project_mut(project_id)?;
    project.tasks.push(GuestTask {
      id:    short_id(),
      title: title.to_owned(),
      done:  false,
    });
    project.tasks.last()
  }

  pub fn toggle_task(&mut self, project_id: &str, task_id: &str) {
    if let Some(task) = self
      .project_mut(project_id)
      .and_then(|p| p.tasks.iter_mut().find(|t| t.id == task_id))
    {
      task.done = !task.done;
    }
  }

  pub fn delete_task(&mut self, project_id: &str, task_id: &str) {
    if let Some(project) = self.project_mut(project_id) {
      project.tasks.retain(|t| t.id != task_id);
    }
  }

  pub fn total_tasks(&self) -> usize {
    self.projects.iter().map(|p| p.tasks.len()).sum()
  }

  pub fn done_tasks(&self) -> usize {
    self
      .projects
      .iter()
      .map(|p| p.tasks.iter().filter(|t| t.done).count())
      .sum()
  }
}
