//! HTTP server for stocktake.
//!
//! Mounts the JSON API under `/api` with request tracing, and provides the
//! pieces `main` wires together: configuration, a log-backed notifier, and
//! sample-data seeding.

pub mod notifier;
pub mod seed;

use std::path::{Path, PathBuf};

use axum::Router;
use serde::Deserialize;
use stocktake_api::{ApiState, api_router};
use stocktake_core::{notify::Notifier, store::StockStore};
use tower_http::trace::TraceLayer;

pub use notifier::LogNotifier;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `STOCKTAKE_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// Public URL of the count sheet, linked from reminders.
  pub app_url:          String,
  /// Seed the sample stores and products when no active store exists.
  pub seed_sample_data: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_string(),
      port:             3000,
      store_path:       PathBuf::from("stocktake.db"),
      app_url:          "http://localhost:3000".to_string(),
      seed_sample_data: true,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
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

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level router: the API under `/api`, every request traced.
pub fn router<S, N>(state: ApiState<S, N>) -> Router
where
  S: StockStore + 'static,
  N: Notifier + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}
