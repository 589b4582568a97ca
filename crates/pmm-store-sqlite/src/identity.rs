//! [`IdentityStore`] impl: accounts and bearer sessions.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, ffi};
use uuid::Uuid;

use pmm_core::identity::{Account, Identity, IdentityStore, NewSession};

use crate::{
  Error, Result, SqliteStore,
  encode::{RawIdentity, encode_dt, encode_uuid, now},
};

/// True if `err` is a UNIQUE/PRIMARY KEY violation.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.code == rusqlite::ErrorCode::ConstraintViolation
        && (e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
          || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
  )
}

impl IdentityStore for SqliteStore {
  type Error = Error;

  async fn create_account(
    &self,
    email: String,
    password_hash: String,
  ) -> Result<Option<Identity>> {
    let identity = Identity { user_id: Uuid::new_v4(), email };

    let id_str = encode_uuid(identity.user_id);
    let email  = identity.email.clone();
    let at_str = encode_dt(now());

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO accounts (user_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email, password_hash, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(inserted.then_some(identity))
  }

  async fn find_account(&self, email: String) -> Result<Option<Account>> {
    let raw: Option<(RawIdentity, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, password_hash FROM accounts WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok((
                  RawIdentity { user_id: row.get(0)?, email: row.get(1)? },
                  row.get(2)?,
                ))
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(identity, password_hash)| {
        Ok(Account { identity: identity.into_identity()?, password_hash })
      })
      .transpose()
  }

  async fn create_session(&self, session: NewSession) -> Result<()> {
    let user_str    = encode_uuid(session.user_id);
    let created_str = encode_dt(now());
    let expires_str = encode_dt(session.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_digest, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![session.token_digest, user_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn session_identity(
    &self,
    token_digest: String,
    now: DateTime<Utc>,
  ) -> Result<Option<Identity>> {
    let now_str = encode_dt(now);

    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT a.user_id, a.email
               FROM sessions s
               JOIN accounts a ON a.user_id = s.user_id
               WHERE s.token_digest = ?1 AND s.expires_at > ?2",
              rusqlite::params![token_digest, now_str],
              |row| Ok(RawIdentity { user_id: row.get(0)?, email: row.get(1)? }),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIdentity::into_identity).transpose()
  }

  async fn delete_session(&self, token_digest: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE token_digest = ?1",
          rusqlite::params![token_digest],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
