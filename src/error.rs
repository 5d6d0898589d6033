//! Engine error taxonomy.

use std::fmt;

/// Errors surfaced by engine operations.
///
/// `Validation` and `NotFound` reject the request before anything is
/// persisted. `Conflict` means the review transaction lost a race on the
/// mastery row and the whole call can be retried once.
#[derive(Debug)]
pub enum EngineError {
  Validation(String),
  NotFound(String),
  Conflict(String),
  Storage(rusqlite::Error),
}

impl EngineError {
  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn not_found(msg: impl Into<String>) -> Self {
    Self::NotFound(msg.into())
  }
}

impl fmt::Display for EngineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Validation(msg) => write!(f, "Invalid input: {}", msg),
      Self::NotFound(msg) => write!(f, "Not found: {}", msg),
      Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
      Self::Storage(e) => write!(f, "Storage error: {}", e),
    }
  }
}

impl std::error::Error for EngineError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Storage(e) => Some(e),
      _ => None,
    }
  }
}

impl From<rusqlite::Error> for EngineError {
  fn from(e: rusqlite::Error) -> Self {
    // A busy/locked database means another review transaction holds the
    // row; the caller should retry the whole call once.
    if let rusqlite::Error::SqliteFailure(err, _) = &e {
      match err.code {
        rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
          return Self::Conflict("mastery row is locked by a concurrent review".into());
        }
        _ => {}
      }
    }
    Self::Storage(e)
  }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
