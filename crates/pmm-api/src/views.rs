//! `GET /home`: the signed-in landing view.

use axum::{Json, extract::State};
use chrono::Utc;
use pmm_core::views::{self, HomeView};

use crate::{AppState, Backend, Session, error::ApiError};

/// `GET /home`
pub async fn home<S>(
  State(state): State<AppState<S>>,
  session: Session,
) -> Result<Json<HomeView>, ApiError>
where
  S: Backend,
{
  let view = views::home(&*state.store, session.identity(), Utc::now()).await?;
  Ok(Json(view))
}
