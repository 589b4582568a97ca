//! Handlers for `/tasks` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/tasks` | Form; `parent_id` makes a child task. 204 if title or project blank |
//! | `PUT`    | `/tasks/{id}` | Form: planning fields. 204 if title blank |
//! | `PUT`    | `/tasks/{id}/due-date` | Form: `due_date` |
//! | `POST`   | `/tasks/{id}/complete` | JSON: `{"actual_minutes": 30, "reflection": "..."}` |
//! | `POST`   | `/tasks/{id}/undo` | |
//! | `DELETE` | `/tasks/{id}` | Children go with their parent |

use axum::{
  Form, Json,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use pmm_core::actions::{
  Mutation,
  tasks::{self, Completion, TaskDetailsForm, TaskForm},
};
use uuid::Uuid;

use crate::{AppState, Backend, DueDateForm, Session, error::ApiError, revalidated};

/// `POST /tasks`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Form(body): Form<TaskForm>,
) -> Result<Response, ApiError>
where
  S: Backend,
{
  let created = tasks::create_task(&*state.store, session.identity(), body).await?;

  Ok(match created {
    Some(mutation) => {
      (StatusCode::CREATED, revalidated("create_task", mutation)).into_response()
    }
    None => StatusCode::NO_CONTENT.into_response(),
  })
}

/// `PUT /tasks/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
  Form(body): Form<TaskDetailsForm>,
) -> Result<Response, ApiError>
where
  S: Backend,
{
  let updated = tasks::update_task(&*state.store, session.identity(), id, body).await?;

  Ok(match updated {
    Some(mutation) => revalidated("update_task", mutation).into_response(),
    None => StatusCode::NO_CONTENT.into_response(),
  })
}

/// `PUT /tasks/{id}/due-date`
pub async fn set_due_date<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
  Form(body): Form<DueDateForm>,
) -> Result<Json<Mutation<()>>, ApiError>
where
  S: Backend,
{
  let mutation = tasks::update_task_due_date(
    &*state.store,
    session.identity(),
    id,
    body.due_date.as_deref(),
  )
  .await?;
  Ok(revalidated("update_task_due_date", mutation))
}

/// `POST /tasks/{id}/complete`
pub async fn complete<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
  Json(body): Json<Completion>,
) -> Result<Json<Mutation<()>>, ApiError>
where
  S: Backend,
{
  let mutation = tasks::complete_task(&*state.store, session.identity(), id, body).await?;
  Ok(revalidated("complete_task", mutation))
}

/// `POST /tasks/{id}/undo`
pub async fn undo<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<Json<Mutation<()>>, ApiError>
where
  S: Backend,
{
  let mutation = tasks::undo_task(&*state.store, session.identity(), id).await?;
  Ok(revalidated("undo_task", mutation))
}

/// `DELETE /tasks/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<Json<Mutation<()>>, ApiError>
where
  S: Backend,
{
  let mutation = tasks::delete_task(&*state.store, session.identity(), id).await?;
  Ok(revalidated("delete_task", mutation))
}
