//! Sign-up, sign-in and bearer sessions.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/sign-up` | Form: `email`, `password`. 409 if taken |
//! | `POST` | `/auth/sign-in` | Form: `email`, `password`. 401 on mismatch |
//! | `POST` | `/auth/sign-out` | Always 204; clears the cookie |
//! | `GET`  | `/auth/session` | The caller's identity, or 401 |
//!
//! A session token is handed to the client once, both as the
//! [`SESSION_COOKIE`] cookie and in the response body for bearer clients.
//! Only its SHA-256 digest is stored.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  Form, Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
  response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use chrono::{TimeDelta, Utc};
use pmm_core::{
  form,
  identity::{Identity, NewSession},
};
use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::{AppState, Backend, error::ApiError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "pmm_session";

const TOKEN_BYTES: usize = 32;
const MIN_PASSWORD_LEN: usize = 6;

/// How sessions are issued.
#[derive(Debug, Clone)]
pub struct SessionConfig {
  pub ttl:            TimeDelta,
  /// Add `Secure` to the session cookie (HTTPS deployments).
  pub secure_cookies: bool,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      ttl:            TimeDelta::hours(168),
      secure_cookies: false,
    }
  }
}

// ─── Tokens and passwords ────────────────────────────────────────────────────

/// A fresh random session token, base64url without padding.
pub fn new_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  B64.encode(bytes)
}

/// Hex SHA-256 of a token; the only form in which tokens are stored.
pub fn token_digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Store(e.to_string().into()))
}

pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc).is_ok_and(|parsed| {
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  })
}

/// The session token from the `Authorization: Bearer` header, falling back to
/// the session cookie.
pub fn request_token(headers: &HeaderMap) -> Option<&str> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty());
  if bearer.is_some() {
    return bearer;
  }

  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == SESSION_COOKIE)
    .map(|(_, value)| value)
    .filter(|t| !t.is_empty())
}

fn session_cookie(token: &str, config: &SessionConfig) -> Result<HeaderValue, ApiError> {
  let mut cookie = format!(
    "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
    config.ttl.num_seconds()
  );
  if config.secure_cookies {
    cookie.push_str("; Secure");
  }
  HeaderValue::from_str(&cookie).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn cleared_cookie() -> HeaderValue {
  HeaderValue::from_static("pmm_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The caller's session, if the request carried a live one.
///
/// Extraction never fails for a missing or expired token; handlers pass
/// [`Session::identity`] on and the actions decide whether anonymity is
/// acceptable.
#[derive(Debug, Clone, Default)]
pub struct Session {
  identity:     Option<Identity>,
  token_digest: Option<String>,
}

impl Session {
  pub fn identity(&self) -> Option<&Identity> { self.identity.as_ref() }
}

impl<S> FromRequestParts<AppState<S>> for Session
where
  S: Backend,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(token) = request_token(&parts.headers) else {
      return Ok(Self::default());
    };
    let digest = token_digest(token);

    let identity = state
      .store
      .session_identity(digest.clone(), Utc::now())
      .await
      .map_err(ApiError::store)?;

    Ok(Self { identity, token_digest: Some(digest) })
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Credentials {
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// Body returned on sign-up and sign-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignedIn {
  #[serde(flatten)]
  pub identity: Identity,
  pub token:    String,
}

async fn start_session<S>(
  state: &AppState<S>,
  identity: Identity,
  status: StatusCode,
) -> Result<Response, ApiError>
where
  S: Backend,
{
  let token = new_token();
  state
    .store
    .create_session(NewSession {
      token_digest: token_digest(&token),
      user_id:      identity.user_id,
      expires_at:   Utc::now() + state.sessions.ttl,
    })
    .await
    .map_err(ApiError::store)?;

  let cookie = session_cookie(&token, &state.sessions)?;
  Ok(
    (
      status,
      [(header::SET_COOKIE, cookie)],
      Json(SignedIn { identity, token }),
    )
      .into_response(),
  )
}

/// `POST /auth/sign-up`
pub async fn sign_up<S>(
  State(state): State<AppState<S>>,
  Form(body): Form<Credentials>,
) -> Result<Response, ApiError>
where
  S: Backend,
{
  let email = form::normalize_email(body.email.as_deref().unwrap_or_default());
  let password = body.password.unwrap_or_default();

  if email.is_empty() || !email.contains('@') {
    return Err(ApiError::BadRequest("a valid email is required".into()));
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }

  if state
    .store
    .find_account(email.clone())
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict(format!("{email} is already registered")));
  }

  let identity = state
    .store
    .create_account(email.clone(), hash_password(&password)?)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Conflict(format!("{email} is already registered")))?;

  tracing::info!(user_id = %identity.user_id, "account created");
  start_session(&state, identity, StatusCode::CREATED).await
}

/// `POST /auth/sign-in`
pub async fn sign_in<S>(
  State(state): State<AppState<S>>,
  Form(body): Form<Credentials>,
) -> Result<Response, ApiError>
where
  S: Backend,
{
  let email = form::normalize_email(body.email.as_deref().unwrap_or_default());
  let password = body.password.unwrap_or_default();

  let account = state
    .store
    .find_account(email)
    .await
    .map_err(ApiError::store)?;

  match account {
    Some(account) if verify_password(&password, &account.password_hash) => {
      tracing::info!(user_id = %account.identity.user_id, "signed in");
      start_session(&state, account.identity, StatusCode::OK).await
    }
    _ => {
      tracing::warn!("sign-in rejected");
      Err(ApiError::Unauthorized)
    }
  }
}

/// `POST /auth/sign-out`
pub async fn sign_out<S>(
  State(state): State<AppState<S>>,
  session: Session,
) -> Result<Response, ApiError>
where
  S: Backend,
{
  if let Some(digest) = session.token_digest {
    state
      .store
      .delete_session(digest)
      .await
      .map_err(ApiError::store)?;
  }
  Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cleared_cookie())]).into_response())
}

/// `GET /auth/session`
pub async fn current(session: Session) -> Result<Json<Identity>, ApiError> {
  session.identity.map(Json).ok_or(ApiError::Unauthorized)
}
