//! Handlers for project membership. Owner only.
//!
//! Expected refusals (unknown email, owner as member) come back as
//! `200 {"data": {"ok": false, "message": ...}, "revalidate": []}`.

use axum::{
  Form, Json,
  extract::{Path, State},
};
use pmm_core::actions::{
  ActionResult, Mutation,
  members::{self, MemberForm},
};
use uuid::Uuid;

use crate::{AppState, Backend, Session, error::ApiError, revalidated};

fn log_outcome(action: &'static str, project_id: Uuid, result: &ActionResult) {
  if result.ok {
    tracing::info!(action, %project_id, "{}", result.message);
  } else {
    tracing::info!(action, %project_id, "refused: {}", result.message);
  }
}

/// `POST /projects/{id}/members`
pub async fn add<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
  Form(body): Form<MemberForm>,
) -> Result<Json<Mutation<ActionResult>>, ApiError>
where
  S: Backend,
{
  let mutation = members::add_member(&*state.store, session.identity(), id, body).await?;
  log_outcome("add_member", id, &mutation.data);
  Ok(revalidated("add_member", mutation))
}

/// `DELETE /projects/{id}/members/{user_id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Mutation<ActionResult>>, ApiError>
where
  S: Backend,
{
  let mutation =
    members::remove_member(&*state.store, session.identity(), id, user_id).await?;
  log_outcome("remove_member", id, &mutation.data);
  Ok(revalidated("remove_member", mutation))
}
