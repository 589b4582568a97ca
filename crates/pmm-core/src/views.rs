//! Read models assembled for the presentation layer.
//!
//! Nothing here is stored; every view is derived on request from several
//! independent store reads. The reads are not wrapped in a transaction, so a
//! concurrent write may leave counts momentarily out of step with each other.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{Access, can_access_project},
  dashboard::Dashboard,
  deadline::TimeLeft,
  identity::{Identity, current_identity, resolve_user},
  project::Project,
  store::WorkspaceStore,
  task::{Task, TaskLevel, TaskStatus},
  user::User,
};

/// How far ahead the urgent list looks.
pub const URGENT_WINDOW_DAYS: i64 = 3;
/// Maximum length of the urgent list.
pub const URGENT_LIMIT: usize = 5;

// ─── Home ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
  pub parent_remaining: u64,
  pub child_remaining:  u64,
  pub parent_completed: u64,
  pub child_completed:  u64,
}

impl TaskCounts {
  pub fn completed(&self) -> u64 { self.parent_completed + self.child_completed }
}

/// A project card on the home view.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
  pub project:   Project,
  pub counts:    TaskCounts,
  /// The earliest-due incomplete child task.
  pub next_task: Option<Task>,
  pub is_owner:  bool,
}

/// An incomplete child task close to (or past) its due date.
#[derive(Debug, Clone, Serialize)]
pub struct UrgentTask {
  pub task:          Task,
  pub project_title: String,
  pub time_left:     TimeLeft,
  pub label:         String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
  pub user:      User,
  pub projects:  Vec<ProjectSummary>,
  pub urgent:    Vec<UrgentTask>,
  pub dashboard: Dashboard,
}

/// Task counts for one project, one count query per bucket.
pub async fn task_counts<S>(store: &S, project_id: Uuid) -> Result<TaskCounts>
where
  S: WorkspaceStore,
{
  let count = |level: TaskLevel, status: TaskStatus| async move {
    store
      .count_tasks(project_id, level, status)
      .await
      .map_err(Error::store)
  };

  Ok(TaskCounts {
    parent_remaining: count(TaskLevel::Parent, TaskStatus::Todo).await?,
    child_remaining:  count(TaskLevel::Child, TaskStatus::Todo).await?,
    parent_completed: count(TaskLevel::Parent, TaskStatus::Done).await?,
    child_completed:  count(TaskLevel::Child, TaskStatus::Done).await?,
  })
}

/// Every project owned by or shared with `user_id`, annotated for the home
/// view. Ordering is the store's: due date ascending, then newest first.
pub async fn project_summaries<S>(
  store: &S,
  user_id: Uuid,
) -> Result<Vec<ProjectSummary>>
where
  S: WorkspaceStore,
{
  let projects = store
    .list_accessible_projects(user_id)
    .await
    .map_err(Error::store)?;

  let mut summaries = Vec::with_capacity(projects.len());
  for project in projects {
    let counts = task_counts(store, project.project_id).await?;
    let next_task = store
      .next_open_child_task(project.project_id)
      .await
      .map_err(Error::store)?;
    let is_owner = project.is_owned_by(user_id);

    summaries.push(ProjectSummary { project, counts, next_task, is_owner });
  }

  Ok(summaries)
}

/// Incomplete child tasks due within [`URGENT_WINDOW_DAYS`] of `now`
/// (overdue ones included), soonest first, at most [`URGENT_LIMIT`].
pub async fn urgent_tasks<S>(
  store: &S,
  user_id: Uuid,
  now: DateTime<Utc>,
) -> Result<Vec<UrgentTask>>
where
  S: WorkspaceStore,
{
  let deadline = now + TimeDelta::days(URGENT_WINDOW_DAYS);

  let due = store
    .due_child_tasks(user_id, deadline, URGENT_LIMIT)
    .await
    .map_err(Error::store)?;

  Ok(
    due
      .into_iter()
      .filter_map(|pt| {
        let time_left = TimeLeft::until(pt.task.due_date?, now);
        Some(UrgentTask {
          label: time_left.to_string(),
          time_left,
          task: pt.task,
          project_title: pt.project_title,
        })
      })
      .collect(),
  )
}

/// Estimate accuracy over every completed task the user can see.
pub async fn dashboard<S>(store: &S, user_id: Uuid) -> Result<Dashboard>
where
  S: WorkspaceStore,
{
  let completed = store
    .completed_tasks(user_id)
    .await
    .map_err(Error::store)?;
  Ok(Dashboard::from_tasks(&completed))
}

/// The home view. Mirrors the caller into the user table on first visit.
pub async fn home<S>(
  store: &S,
  session: Option<&Identity>,
  now: DateTime<Utc>,
) -> Result<HomeView>
where
  S: WorkspaceStore,
{
  let user = resolve_user(store, session).await?;

  let projects = project_summaries(store, user.user_id).await?;
  let urgent = urgent_tasks(store, user.user_id, now).await?;
  let dashboard = dashboard(store, user.user_id).await?;

  Ok(HomeView { user, projects, urgent, dashboard })
}

// ─── Project detail ──────────────────────────────────────────────────────────

/// A parent task with its children.
#[derive(Debug, Clone, Serialize)]
pub struct TaskNode {
  #[serde(flatten)]
  pub task:     Task,
  pub children: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
  pub project: Project,
  pub owner:   Option<User>,
  pub members: Vec<User>,
  pub tasks:   Vec<TaskNode>,
  pub access:  Access,
}

/// Group an ordered task list into parent nodes. Order is preserved at both
/// levels. Tasks nested deeper than one level are not shown.
pub fn task_tree(tasks: Vec<Task>) -> Vec<TaskNode> {
  let (parents, children): (Vec<Task>, Vec<Task>) =
    tasks.into_iter().partition(|t| t.parent_id.is_none());

  let mut by_parent: HashMap<Uuid, Vec<Task>> = HashMap::new();
  for child in children {
    if let Some(parent_id) = child.parent_id {
      by_parent.entry(parent_id).or_default().push(child);
    }
  }

  parents
    .into_iter()
    .map(|task| {
      let children = by_parent.remove(&task.task_id).unwrap_or_default();
      TaskNode { task, children }
    })
    .collect()
}

/// A project's detail page, or `None` if the caller cannot access it.
pub async fn project_detail<S>(
  store: &S,
  session: Option<&Identity>,
  project_id: Uuid,
) -> Result<Option<ProjectDetail>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;

  let Some(project) =
    can_access_project(store, project_id, identity.user_id).await?
  else {
    return Ok(None);
  };

  let owner = store
    .get_user(project.owner_id)
    .await
    .map_err(Error::store)?;
  let members = store
    .list_members(project_id)
    .await
    .map_err(Error::store)?;
  let tasks = store.list_tasks(project_id).await.map_err(Error::store)?;

  // Reaching here means owner or member.
  let access = Access::of(project.owner_id, true, identity.user_id);

  Ok(Some(ProjectDetail {
    project,
    owner,
    members,
    tasks: task_tree(tasks),
    access,
  }))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn task(parent_id: Option<Uuid>, title: &str) -> Task {
    Task {
      task_id: Uuid::new_v4(),
      project_id: Uuid::nil(),
      parent_id,
      title: title.into(),
      status: TaskStatus::Todo,
      importance: 3,
      urgency: 3,
      estimated_minutes: 0,
      actual_minutes: None,
      reflection: None,
      due_date: None,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn tree_groups_children_under_parents() {
    let a = task(None, "a");
    let b = task(None, "b");
    let a1 = task(Some(a.task_id), "a1");
    let b1 = task(Some(b.task_id), "b1");
    let a2 = task(Some(a.task_id), "a2");
    let orphan = task(Some(a1.task_id), "too deep");

    let tree = task_tree(vec![
      a1.clone(),
      a.clone(),
      b1.clone(),
      orphan,
      b.clone(),
      a2.clone(),
    ]);

    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].task.title, "a");
    let a_children: Vec<_> = tree[0].children.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(a_children, ["a1", "a2"]);
    assert_eq!(tree[1].task.title, "b");
    assert_eq!(tree[1].children.len(), 1);
  }

  #[test]
  fn completed_sums_both_levels() {
    let counts = TaskCounts {
      parent_remaining: 1,
      child_remaining:  2,
      parent_completed: 3,
      child_completed:  4,
    };
    assert_eq!(counts.completed(), 7);
  }
}
