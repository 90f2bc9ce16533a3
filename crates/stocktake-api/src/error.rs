//! API error type and its JSON rendering.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Renders as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
  /// A store or product id with no row behind it.
  #[error("{kind} {id} not found")]
  NotFound { kind: &'static str, id: String },

  /// The request was malformed or failed validation. Nothing was written.
  #[error("{0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
    Self::NotFound { kind, id: id.into() }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound { .. } => StatusCode::NOT_FOUND,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<stocktake_core::Error> for ApiError {
  fn from(err: stocktake_core::Error) -> Self {
    match err {
      e if e.is_caller_error() => Self::BadRequest(e.to_string()),
      stocktake_core::Error::Store(inner) => Self::Store(inner),
      other => Self::store(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if let Self::Store(e) = &self {
      tracing::error!(error = %e, "store failure");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
