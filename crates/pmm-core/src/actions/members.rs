//! Membership management. Owner only.

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  access::assert_project_owner,
  actions::{ActionResult, Mutation, stale_views},
  form,
  identity::{Identity, current_identity},
  store::WorkspaceStore,
};

/// Form fields accepted when inviting a member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberForm {
  pub email: Option<String>,
}

/// Grant `email`'s user access to the project.
///
/// Rejected (no write) when the email is empty, unknown, or the owner's.
/// Adding an existing member again succeeds without creating a second row.
pub async fn add_member<S>(
  store: &S,
  session: Option<&Identity>,
  project_id: Uuid,
  input: MemberForm,
) -> Result<Mutation<ActionResult>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;
  let project = assert_project_owner(store, project_id, identity.user_id).await?;

  let email = form::normalize_email(input.email.as_deref().unwrap_or_default());
  if email.is_empty() {
    return Ok(Mutation::new(
      ActionResult::rejected("Enter an email address."),
      Vec::new(),
    ));
  }

  let Some(user) = store
    .find_user_by_email(email.clone())
    .await
    .map_err(Error::store)?
  else {
    return Ok(Mutation::new(
      ActionResult::rejected(format!("No user is registered as {email}.")),
      Vec::new(),
    ));
  };

  if project.is_owned_by(user.user_id) {
    return Ok(Mutation::new(
      ActionResult::rejected("The owner already has access to this project."),
      Vec::new(),
    ));
  }

  store
    .upsert_member(project_id, user.user_id)
    .await
    .map_err(Error::store)?;

  Ok(Mutation::new(
    ActionResult::ok(format!("Added {email} to the project.")),
    stale_views(project_id),
  ))
}

/// Revoke a member's access. The owner can never be removed.
pub async fn remove_member<S>(
  store: &S,
  session: Option<&Identity>,
  project_id: Uuid,
  user_id: Uuid,
) -> Result<Mutation<ActionResult>>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;
  let project = assert_project_owner(store, project_id, identity.user_id).await?;

  if project.is_owned_by(user_id) {
    return Ok(Mutation::new(
      ActionResult::rejected("The owner cannot be removed from a project."),
      Vec::new(),
    ));
  }

  store
    .remove_member(project_id, user_id)
    .await
    .map_err(Error::store)?;

  Ok(Mutation::new(
    ActionResult::ok("Member removed."),
    stale_views(project_id),
  ))
}
