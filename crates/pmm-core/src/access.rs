//! Access-control checks.
//!
//! Two capability tiers: the owner may do everything, a member may do
//! everything except delete the project and manage its membership. All checks
//! are read-only.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  project::Project,
  store::{TaskAccess, WorkspaceStore},
};

/// A user's standing with respect to one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
  Owner,
  Member,
  None,
}

impl Access {
  /// Ownership wins over a (stray) membership row for the same user.
  pub fn of(owner_id: Uuid, is_member: bool, user_id: Uuid) -> Self {
    if owner_id == user_id {
      Self::Owner
    } else if is_member {
      Self::Member
    } else {
      Self::None
    }
  }

  /// View and edit rights: owner or member.
  pub fn can_access(self) -> bool { !matches!(self, Self::None) }

  pub fn is_owner(self) -> bool { matches!(self, Self::Owner) }
}

/// The project if `user_id` owns it or is a member; `None` otherwise.
pub async fn can_access_project<S>(
  store: &S,
  project_id: Uuid,
  user_id: Uuid,
) -> Result<Option<Project>>
where
  S: WorkspaceStore,
{
  store
    .find_accessible_project(project_id, user_id)
    .await
    .map_err(Error::store)
}

/// Like [`can_access_project`], but absence is [`Error::Forbidden`].
pub async fn assert_project_access<S>(
  store: &S,
  project_id: Uuid,
  user_id: Uuid,
) -> Result<Project>
where
  S: WorkspaceStore,
{
  can_access_project(store, project_id, user_id)
    .await?
    .ok_or(Error::Forbidden)
}

/// The project if `user_id` is exactly its owner. Membership does not
/// suffice, and a missing project is also [`Error::Forbidden`].
pub async fn assert_project_owner<S>(
  store: &S,
  project_id: Uuid,
  user_id: Uuid,
) -> Result<Project>
where
  S: WorkspaceStore,
{
  match store.get_project(project_id).await.map_err(Error::store)? {
    Some(project) if project.is_owned_by(user_id) => Ok(project),
    _ => Err(Error::Forbidden),
  }
}

/// The task with its project's ownership loaded.
///
/// Fails [`Error::NotFound`] when the task does not exist, before any access
/// predicate is evaluated, and [`Error::Forbidden`] when `user_id` is neither
/// owner nor member of the task's project.
pub async fn assert_task_access<S>(
  store: &S,
  task_id: Uuid,
  user_id: Uuid,
) -> Result<TaskAccess>
where
  S: WorkspaceStore,
{
  let access = store
    .task_access(task_id, user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound(task_id))?;

  if !Access::of(access.owner_id, access.is_member, user_id).can_access() {
    return Err(Error::Forbidden);
  }

  Ok(access)
}
