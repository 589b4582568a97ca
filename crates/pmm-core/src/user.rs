//! The application-side mirror of an authenticated identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name given to users mirrored on their first visit.
pub const DEFAULT_USER_NAME: &str = "New User";

/// A user known to the workspace. The `user_id` is the identity
/// collaborator's id, so the two never diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  /// Normalised (trimmed, lower-cased); unique.
  pub email:      String,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}
