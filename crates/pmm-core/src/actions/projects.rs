//! Project lifecycle actions.

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{assert_project_access, assert_project_owner},
  actions::{Mutation, stale_views},
  form,
  identity::{Identity, current_identity, resolve_user},
  project::{NewProject, Project, ProjectStatus, ProjectUpdate},
  store::WorkspaceStore,
};

/// Form fields accepted when creating or editing a project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectForm {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub due_date:    Option<String>,
}

/// Create a project owned by the caller. A missing title is a silent no-op.
pub async fn create_project<S>(
  store: &S,
  session: Option<&Identity>,
  input: ProjectForm,
) -> Result<Option<Mutation<Project>>>
where
  S: WorkspaceStore,
{
  let owner = resolve_user(store, session).await?;

  let Some(title) = form::required(input.title.as_deref()) else {
    return Ok(None);
  };
  let due_date = form::due_date(input.due_date.as_deref())?;

  let project = store
    .create_project(NewProject {
      title: title.to_owned(),
      description: input
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_owned(),
      due_date,
      owner_id: owner.user_id,
    })
    .await
    .map_err(Error::store)?;

  let stale = stale_views(project.project_id);
  Ok(Some(Mutation::new(project, stale)))
}

/// Overwrite title, description and due date. A missing title is a silent
/// no-op.
pub async fn update_project<S>(
  store: &S,
  session: Option<&Identity>,
  project_id: Uuid,
  input: ProjectForm,
) -> Result<Option<Mutation<()>>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;
  assert_project_access(store, project_id, identity.user_id).await?;

  let Some(title) = form::required(input.title.as_deref()) else {
    return Ok(None);
  };
  let update = ProjectUpdate {
    title:       title.to_owned(),
    description: input
      .description
      .as_deref()
      .map(str::trim)
      .unwrap_or_default()
      .to_owned(),
    due_date:    form::due_date(input.due_date.as_deref())?,
  };

  store
    .update_project(project_id, update)
    .await
    .map_err(Error::store)?;

  Ok(Some(Mutation::new((), stale_views(project_id))))
}

/// Replace only the due date; empty input clears it.
pub async fn update_project_due_date<S>(
  store: &S,
  session: Option<&Identity>,
  project_id: Uuid,
  due_date: Option<&str>,
) -> Result<Mutation<()>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;
  assert_project_access(store, project_id, identity.user_id).await?;

  let due_date = form::due_date(due_date)?;
  store
    .set_project_due_date(project_id, due_date)
    .await
    .map_err(Error::store)?;

  Ok(Mutation::new((), stale_views(project_id)))
}

async fn set_status<S>(
  store: &S,
  session: Option<&Identity>,
  project_id: Uuid,
  status: ProjectStatus,
) -> Result<Mutation<ProjectStatus>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;
  assert_project_access(store, project_id, identity.user_id).await?;

  store
    .set_project_status(project_id, status)
    .await
    .map_err(Error::store)?;

  Ok(Mutation::new(status, stale_views(project_id)))
}

pub async fn complete_project<S>(
  store: &S,
  session: Option<&Identity>,
  project_id: Uuid,
) -> Result<Mutation<ProjectStatus>>
where
  S: WorkspaceStore,
{
  set_status(store, session, project_id, ProjectStatus::Completed).await
}

pub async fn reopen_project<S>(
  store: &S,
  session: Option<&Identity>,
  project_id: Uuid,
) -> Result<Mutation<ProjectStatus>>
where
  S: WorkspaceStore,
{
  set_status(store, session, project_id, ProjectStatus::Active).await
}

/// Owner only. Tasks and memberships are removed with the project.
pub async fn delete_project<S>(
  store: &S,
  session: Option<&Identity>,
  project_id: Uuid,
) -> Result<Mutation<()>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;
  assert_project_owner(store, project_id, identity.user_id).await?;

  store
    .delete_project(project_id)
    .await
    .map_err(Error::store)?;

  Ok(Mutation::new((), stale_views(project_id)))
}
