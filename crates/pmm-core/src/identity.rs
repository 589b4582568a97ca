//! Authenticated identities, the identity store, and the resolver every
//! action starts with.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  store::WorkspaceStore,
  user::{DEFAULT_USER_NAME, User},
};

// ─── Types ───────────────────────────────────────────────────────────────────

/// What the identity collaborator knows about a signed-in caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub user_id: Uuid,
  pub email:   String,
}

/// A stored credential.
#[derive(Debug, Clone)]
pub struct Account {
  pub identity:      Identity,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Input to [`IdentityStore::create_session`]. Only the digest of the token
/// handed to the client is ever persisted.
#[derive(Debug, Clone)]
pub struct NewSession {
  pub token_digest: String,
  pub user_id:      Uuid,
  pub expires_at:   DateTime<Utc>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Storage for accounts and sessions. Kept apart from [`WorkspaceStore`]: the
/// identity side knows nothing about projects, and the workspace side only
/// sees the [`Identity`] a session resolves to.
pub trait IdentityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create an account with a fresh user id. `None` if the email is
  /// already registered.
  fn create_account(
    &self,
    email: String,
    password_hash: String,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  fn find_account(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn create_session(
    &self,
    session: NewSession,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The identity behind an unexpired session, if any.
  fn session_identity(
    &self,
    token_digest: String,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  fn delete_session(
    &self,
    token_digest: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// The caller's identity, or [`Error::Unauthorized`] when there is no session.
pub fn current_identity(session: Option<&Identity>) -> Result<&Identity> {
  session.ok_or(Error::Unauthorized)
}

/// The caller's [`User`] record, mirroring the identity into the workspace on
/// first visit.
pub async fn resolve_user<S>(store: &S, session: Option<&Identity>) -> Result<User>
where
  S: WorkspaceStore,
{
  let identity = current_identity(session)?;

  if let Some(user) = store
    .get_user(identity.user_id)
    .await
    .map_err(Error::store)?
  {
    return Ok(user);
  }

  store
    .insert_user(User {
      user_id:    identity.user_id,
      email:      identity.email.clone(),
      name:       DEFAULT_USER_NAME.to_string(),
      created_at: Utc::now(),
    })
    .await
    .map_err(Error::store)
}
