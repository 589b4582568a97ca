//! Error types for `pmm-core`.

use thiserror::Error;
use uuid::Uuid;

/// Conditions raised by the identity resolver, the access checks, and the
/// actions built on them.
///
/// User-facing validation of member operations is *not* an error; it is
/// reported through [`crate::actions::ActionResult`].
#[derive(Debug, Error)]
pub enum Error {
  /// No valid session.
  #[error("unauthorized")]
  Unauthorized,

  /// Authenticated, but neither owner nor member (or not the owner, for
  /// owner-only operations).
  #[error("forbidden")]
  Forbidden,

  /// The referenced task does not exist.
  #[error("task not found: {0}")]
  NotFound(Uuid),

  /// Malformed input that cannot be silently defaulted.
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
