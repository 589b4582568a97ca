//! Handlers for `/projects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/projects` | Form: `title`, `description`, `due_date`. 204 if title blank |
//! | `GET`    | `/projects/{id}` | 404 if missing or not shared with the caller |
//! | `PUT`    | `/projects/{id}` | Same form as create; 204 if title blank |
//! | `PUT`    | `/projects/{id}/due-date` | Form: `due_date` |
//! | `POST`   | `/projects/{id}/complete` | |
//! | `POST`   | `/projects/{id}/reopen` | |
//! | `DELETE` | `/projects/{id}` | Owner only |

use axum::{
  Form, Json,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use pmm_core::{
  actions::{
    Mutation,
    projects::{self, ProjectForm},
  },
  project::ProjectStatus,
  views::{self, ProjectDetail},
};
use uuid::Uuid;

use crate::{AppState, Backend, DueDateForm, Session, error::ApiError, revalidated};

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /projects`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Form(body): Form<ProjectForm>,
) -> Result<Response, ApiError>
where
  S: Backend,
{
  let created = projects::create_project(&*state.store, session.identity(), body).await?;

  Ok(match created {
    Some(mutation) => {
      tracing::info!(project_id = %mutation.data.project_id, "project created");
      (StatusCode::CREATED, revalidated("create_project", mutation)).into_response()
    }
    None => StatusCode::NO_CONTENT.into_response(),
  })
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /projects/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetail>, ApiError>
where
  S: Backend,
{
  views::project_detail(&*state.store, session.identity(), id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("project {id} not found")))
}

// ─── Edit ────────────────────────────────────────────────────────────────────

/// `PUT /projects/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
  Form(body): Form<ProjectForm>,
) -> Result<Response, ApiError>
where
  S: Backend,
{
  let updated = projects::update_project(&*state.store, session.identity(), id, body).await?;

  Ok(match updated {
    Some(mutation) => revalidated("update_project", mutation).into_response(),
    None => StatusCode::NO_CONTENT.into_response(),
  })
}

/// `PUT /projects/{id}/due-date`
pub async fn set_due_date<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
  Form(body): Form<DueDateForm>,
) -> Result<Json<Mutation<()>>, ApiError>
where
  S: Backend,
{
  let mutation = projects::update_project_due_date(
    &*state.store,
    session.identity(),
    id,
    body.due_date.as_deref(),
  )
  .await?;
  Ok(revalidated("update_project_due_date", mutation))
}

/// `POST /projects/{id}/complete`
pub async fn complete<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<Json<Mutation<ProjectStatus>>, ApiError>
where
  S: Backend,
{
  let mutation = projects::complete_project(&*state.store, session.identity(), id).await?;
  Ok(revalidated("complete_project", mutation))
}

/// `POST /projects/{id}/reopen`
pub async fn reopen<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<Json<Mutation<ProjectStatus>>, ApiError>
where
  S: Backend,
{
  let mutation = projects::reopen_project(&*state.store, session.identity(), id).await?;
  Ok(revalidated("reopen_project", mutation))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /projects/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<Json<Mutation<()>>, ApiError>
where
  S: Backend,
{
  let mutation = projects::delete_project(&*state.store, session.identity(), id).await?;
  tracing::info!(project_id = %id, "project deleted");
  Ok(revalidated("delete_project", mutation))
}
