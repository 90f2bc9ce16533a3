//! Error types for `stocktake-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required submission field was absent or empty.
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("invalid week: {0:?}")]
  InvalidWeek(String),

  /// Failure reported by the storage backend, including constraint
  /// violations that aborted a whole batch.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  /// `true` for errors caused by the caller's input rather than the backend.
  pub fn is_caller_error(&self) -> bool {
    matches!(self, Self::MissingField(_) | Self::InvalidWeek(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
