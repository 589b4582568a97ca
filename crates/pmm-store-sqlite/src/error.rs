//! Error type for `pmm-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column held a value no variant matches.
  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },

  #[error("project not found: {0}")]
  ProjectNotFound(uuid::Uuid),

  #[error("task not found: {0}")]
  TaskNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
