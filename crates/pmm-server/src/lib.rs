//! Server assembly for PM-Master: configuration and the top-level router.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, ensure};
use axum::Router;
use chrono::TimeDelta;
use pmm_api::{AppState, Backend, SessionConfig};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PMM_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours: i64,
  #[serde(default)]
  pub secure_cookies:    bool,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("pm-master.db") }

fn default_session_ttl_hours() -> i64 { 168 }

/// Longest accepted session lifetime: ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Session settings, or an error if `session_ttl_hours` is outside
  /// `1..=MAX_SESSION_TTL_HOURS`.
  pub fn sessions(&self) -> anyhow::Result<SessionConfig> {
    let hours = self.session_ttl_hours;
    ensure!(
      (1..=MAX_SESSION_TTL_HOURS).contains(&hours),
      "session_ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}, got {hours}"
    );
    let ttl = TimeDelta::try_hours(hours).context("session_ttl_hours out of range")?;

    Ok(SessionConfig {
      ttl,
      secure_cookies: self.secure_cookies,
    })
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: Backend,
{
  pmm_api::api_router(state).layer(TraceLayer::new_for_http())
}
