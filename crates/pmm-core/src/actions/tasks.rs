//! Task lifecycle actions. Parent and child tasks share every action; the
//! only difference is whether `parent_id` was given at creation.

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{assert_project_access, assert_task_access},
  actions::{Mutation, stale_views},
  form,
  identity::{Identity, current_identity},
  store::WorkspaceStore,
  task::{NewTask, Task, TaskDetails},
};

/// Form fields accepted when creating a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskForm {
  pub project_id:        Option<String>,
  /// Set to create a child task under this parent.
  pub parent_id:         Option<String>,
  pub title:             Option<String>,
  pub importance:        Option<String>,
  pub urgency:           Option<String>,
  pub estimated_minutes: Option<String>,
  pub due_date:          Option<String>,
}

/// Form fields accepted when editing a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskDetailsForm {
  pub title:             Option<String>,
  pub importance:        Option<String>,
  pub urgency:           Option<String>,
  pub estimated_minutes: Option<String>,
  pub due_date:          Option<String>,
}

/// Body of a completion request.
#[derive(Debug, Clone, Deserialize)]
pub struct Completion {
  pub actual_minutes: i32,
  #[serde(default)]
  pub reflection:     Option<String>,
}

/// Create a task in a project the caller can access. Missing title or
/// project id is a silent no-op.
///
/// With a `parent_id`, the parent must exist, live in the same project, and be
/// a top-level task itself.
pub async fn create_task<S>(
  store: &S,
  session: Option<&Identity>,
  input: TaskForm,
) -> Result<Option<Mutation<Task>>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;

  let (Some(title), Some(project_raw)) = (
    form::required(input.title.as_deref()),
    form::required(input.project_id.as_deref()),
  ) else {
    return Ok(None);
  };
  let project_id = form::id(project_raw, "project id")?;

  assert_project_access(store, project_id, identity.user_id).await?;

  let parent_id = match form::required(input.parent_id.as_deref()) {
    None => None,
    Some(raw) => {
      let parent_id = form::id(raw, "parent id")?;
      let parent = store
        .get_task(parent_id)
        .await
        .map_err(Error::store)?
        .ok_or(Error::NotFound(parent_id))?;

      if parent.project_id != project_id {
        return Err(Error::Validation(
          "parent task belongs to another project".to_string(),
        ));
      }
      if parent.is_child() {
        return Err(Error::Validation(
          "child tasks cannot have children of their own".to_string(),
        ));
      }
      Some(parent_id)
    }
  };

  let task = store
    .create_task(NewTask {
      project_id,
      parent_id,
      title: title.to_owned(),
      importance: form::score(input.importance.as_deref()),
      urgency: form::score(input.urgency.as_deref()),
      estimated_minutes: form::minutes(input.estimated_minutes.as_deref()),
      due_date: form::due_date(input.due_date.as_deref())?,
    })
    .await
    .map_err(Error::store)?;

  Ok(Some(Mutation::new(task, stale_views(project_id))))
}

/// Mark a task done with the time it actually took.
pub async fn complete_task<S>(
  store: &S,
  session: Option<&Identity>,
  task_id: Uuid,
  completion: Completion,
) -> Result<Mutation<()>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;
  let access = assert_task_access(store, task_id, identity.user_id).await?;

  let reflection =
    form::required(completion.reflection.as_deref()).map(str::to_owned);

  store
    .complete_task(task_id, completion.actual_minutes.max(0), reflection)
    .await
    .map_err(Error::store)?;

  Ok(Mutation::new((), stale_views(access.task.project_id)))
}

/// Reopen a task; the recorded actual minutes are cleared.
pub async fn undo_task<S>(
  store: &S,
  session: Option<&Identity>,
  task_id: Uuid,
) -> Result<Mutation<()>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;
  let access = assert_task_access(store, task_id, identity.user_id).await?;

  store.reopen_task(task_id).await.map_err(Error::store)?;

  Ok(Mutation::new((), stale_views(access.task.project_id)))
}

/// Overwrite the planning fields. A missing title is a silent no-op.
pub async fn update_task<S>(
  store: &S,
  session: Option<&Identity>,
  task_id: Uuid,
  input: TaskDetailsForm,
) -> Result<Option<Mutation<()>>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;
  let access = assert_task_access(store, task_id, identity.user_id).await?;

  let Some(title) = form::required(input.title.as_deref()) else {
    return Ok(None);
  };
  let details = TaskDetails {
    title:             title.to_owned(),
    importance:        form::score(input.importance.as_deref()),
    urgency:           form::score(input.urgency.as_deref()),
    estimated_minutes: form::minutes(input.estimated_minutes.as_deref()),
    due_date:          form::due_date(input.due_date.as_deref())?,
  };

  store
    .update_task_details(task_id, details)
    .await
    .map_err(Error::store)?;

  Ok(Some(Mutation::new((), stale_views(access.task.project_id))))
}

/// Replace only the due date; empty input clears it.
pub async fn update_task_due_date<S>(
  store: &S,
  session: Option<&Identity>,
  task_id: Uuid,
  due_date: Option<&str>,
) -> Result<Mutation<()>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;
  let access = assert_task_access(store, task_id, identity.user_id).await?;

  let due_date = form::due_date(due_date)?;
  store
    .set_task_due_date(task_id, due_date)
    .await
    .map_err(Error::store)?;

  Ok(Mutation::new((), stale_views(access.task.project_id)))
}

/// Delete a task. Deleting a parent task removes its children.
pub async fn delete_task<S>(
  store: &S,
  session: Option<&Identity>,
  task_id: Uuid,
) -> Result<Mutation<()>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;
  let access = assert_task_access(store, task_id, identity.user_id).await?;

  store.delete_task(task_id).await.map_err(Error::store)?;

  Ok(Mutation::new((), stale_views(access.task.project_id)))
}
