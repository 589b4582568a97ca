//! The `WorkspaceStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `pmm-store-sqlite`).
//! Access checks, actions and views are written against this abstraction and
//! receive the store handle explicitly.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  project::{NewProject, Project, ProjectMember, ProjectStatus, ProjectUpdate},
  task::{NewTask, Task, TaskDetails, TaskLevel, TaskStatus},
  user::User,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// A task together with the ownership facts needed to authorise it.
#[derive(Debug, Clone)]
pub struct TaskAccess {
  pub task:      Task,
  /// Owner of the task's project.
  pub owner_id:  Uuid,
  /// Whether the asking user holds a membership in the task's project.
  pub is_member: bool,
}

/// A task annotated with the title of its project.
#[derive(Debug, Clone)]
pub struct ProjectTask {
  pub task:          Task,
  pub project_title: String,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational workspace store.
///
/// Each method is a single statement (or a single read); callers that issue
/// several in a row get no transactional guarantee across them.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait WorkspaceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Exact match on the stored (already normalised) email.
  fn find_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Persist a user record. Fails if the id or email is taken.
  fn insert_user(
    &self,
    user: User,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Projects ──────────────────────────────────────────────────────────

  fn create_project(
    &self,
    input: NewProject,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  fn get_project(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// The project if `user_id` owns it or is a member of it.
  fn find_accessible_project(
    &self,
    project_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// Every project owned by or shared with `user_id`, ordered by due date
  /// ascending (undated last), then newest first.
  fn list_accessible_projects(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  fn update_project(
    &self,
    project_id: Uuid,
    update: ProjectUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_project_due_date(
    &self,
    project_id: Uuid,
    due_date: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_project_status(
    &self,
    project_id: Uuid,
    status: ProjectStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a project; its tasks and memberships go with it.
  fn delete_project(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Members ───────────────────────────────────────────────────────────

  /// Insert the membership if absent and return the stored row.
  fn upsert_member(
    &self,
    project_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<ProjectMember, Self::Error>> + Send + '_;

  /// Delete membership rows for the pair; returns how many were removed.
  fn remove_member(
    &self,
    project_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Member users of a project, in the order they joined.
  fn list_members(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Tasks ─────────────────────────────────────────────────────────────

  fn create_task(
    &self,
    input: NewTask,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  fn get_task(
    &self,
    task_id: Uuid,
  ) -> impl Future<Output = Result<Option<Task>, Self::Error>> + Send + '_;

  /// The task with its project's owner and `user_id`'s membership loaded.
  /// `None` if the task does not exist.
  fn task_access(
    &self,
    task_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<TaskAccess>, Self::Error>> + Send + '_;

  fn update_task_details(
    &self,
    task_id: Uuid,
    details: TaskDetails,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_task_due_date(
    &self,
    task_id: Uuid,
    due_date: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Mark `Done` with the recorded minutes and reflection.
  fn complete_task(
    &self,
    task_id: Uuid,
    actual_minutes: i32,
    reflection: Option<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Mark `Todo` and clear the recorded minutes.
  fn reopen_task(
    &self,
    task_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a task; its child tasks go with it.
  fn delete_task(
    &self,
    task_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All tasks of a project, ordered by due date ascending (undated last),
  /// then oldest first.
  fn list_tasks(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Task>, Self::Error>> + Send + '_;

  fn count_tasks(
    &self,
    project_id: Uuid,
    level: TaskLevel,
    status: TaskStatus,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// The earliest-due incomplete child task of a project.
  fn next_open_child_task(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Option<Task>, Self::Error>> + Send + '_;

  /// Incomplete child tasks across `user_id`'s accessible projects that are
  /// due at or before `deadline`, soonest first, at most `limit`.
  fn due_child_tasks(
    &self,
    user_id: Uuid,
    deadline: DateTime<Utc>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ProjectTask>, Self::Error>> + Send + '_;

  /// Completed tasks with actual minutes recorded, across `user_id`'s
  /// accessible projects.
  fn completed_tasks(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Task>, Self::Error>> + Send + '_;
}
