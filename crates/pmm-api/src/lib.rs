//! JSON/form HTTP API for PM-Master.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`WorkspaceStore`] and [`IdentityStore`]. TLS and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(pmm_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod views;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{delete, get, post, put},
};
use pmm_core::{actions::Mutation, identity::IdentityStore, store::WorkspaceStore};
use serde::Serialize;

pub use auth::{Session, SessionConfig};
pub use error::ApiError;

/// Everything a handler needs from the storage backend.
pub trait Backend: WorkspaceStore + IdentityStore + Clone + Send + Sync + 'static {}

impl<T> Backend for T where T: WorkspaceStore + IdentityStore + Clone + Send + Sync + 'static {}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub sessions: Arc<SessionConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: S, sessions: SessionConfig) -> Self {
    Self {
      store:    Arc::new(store),
      sessions: Arc::new(sessions),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: Backend,
{
  Router::new()
    // Identity
    .route("/auth/sign-up", post(auth::sign_up::<S>))
    .route("/auth/sign-in", post(auth::sign_in::<S>))
    .route("/auth/sign-out", post(auth::sign_out::<S>))
    .route("/auth/session", get(auth::current))
    // Views
    .route("/home", get(views::home::<S>))
    // Projects
    .route("/projects", post(projects::create::<S>))
    .route(
      "/projects/{id}",
      get(projects::get_one::<S>)
        .put(projects::update::<S>)
        .delete(projects::delete_one::<S>),
    )
    .route("/projects/{id}/due-date", put(projects::set_due_date::<S>))
    .route("/projects/{id}/complete", post(projects::complete::<S>))
    .route("/projects/{id}/reopen", post(projects::reopen::<S>))
    // Members
    .route("/projects/{id}/members", post(members::add::<S>))
    .route("/projects/{id}/members/{user_id}", delete(members::remove::<S>))
    // Tasks
    .route("/tasks", post(tasks::create::<S>))
    .route(
      "/tasks/{id}",
      put(tasks::update::<S>).delete(tasks::delete_one::<S>),
    )
    .route("/tasks/{id}/due-date", put(tasks::set_due_date::<S>))
    .route("/tasks/{id}/complete", post(tasks::complete::<S>))
    .route("/tasks/{id}/undo", post(tasks::undo::<S>))
    .with_state(state)
}

/// Respond with a mutation, logging the views it invalidated.
pub(crate) fn revalidated<T: Serialize>(
  action: &'static str,
  mutation: Mutation<T>,
) -> Json<Mutation<T>> {
  tracing::debug!(action, revalidate = ?mutation.revalidate, "mutation applied");
  Json(mutation)
}

/// Body of the `due-date` endpoints. An absent or empty value clears the date.
#[derive(Debug, Default, serde::Deserialize)]
pub struct DueDateForm {
  pub due_date: Option<String>,
}
