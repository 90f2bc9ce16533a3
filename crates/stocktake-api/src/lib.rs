//! JSON REST API for stocktake.
//!
//! Exposes an axum [`Router`] backed by any [`StockStore`] and [`Notifier`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stocktake_api::api_router(state))
//! ```

pub mod dispatch;
pub mod error;
pub mod extract;
pub mod reference;
pub mod submissions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use stocktake_core::{WeekKey, notify::Notifier, store::StockStore};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S, N> {
  pub store:    Arc<S>,
  pub notifier: Arc<N>,
  /// Public URL of the count sheet, linked from reminders.
  pub app_url:  Arc<str>,
}

impl<S, N> ApiState<S, N> {
  pub fn new(store: Arc<S>, notifier: Arc<N>, app_url: impl Into<Arc<str>>) -> Self {
    Self { store, notifier, app_url: app_url.into() }
  }
}

impl<S, N> Clone for ApiState<S, N> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      notifier: Arc::clone(&self.notifier),
      app_url:  Arc::clone(&self.app_url),
    }
  }
}

/// `?week=YYYY-MM-DD`; any date is snapped to the start of its week.
#[derive(Debug, Default, Deserialize)]
pub struct WeekParams {
  pub week: Option<WeekKey>,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N>(state: ApiState<S, N>) -> Router<()>
where
  S: StockStore + 'static,
  N: Notifier + 'static,
{
  Router::new()
    // Submissions and reports
    .route("/submit", post(submissions::submit::<S, N>))
    .route("/status", get(submissions::status::<S, N>))
    .route("/report", get(submissions::report::<S, N>))
    .route("/weeks", get(submissions::weeks::<S, N>))
    .route("/submissions", get(submissions::list::<S, N>))
    .route("/submission-log", get(submissions::log::<S, N>))
    .route("/last-week-closing/{store_id}", get(submissions::last_week_closing::<S, N>))
    // Reference data
    .route("/stores", get(reference::list_stores::<S, N>).post(reference::upsert_store::<S, N>))
    .route(
      "/stores/{id}",
      get(reference::get_store::<S, N>).delete(reference::deactivate_store::<S, N>),
    )
    .route(
      "/products",
      get(reference::list_products::<S, N>).post(reference::upsert_product::<S, N>),
    )
    .route(
      "/products/{id}",
      get(reference::get_product::<S, N>).delete(reference::deactivate_product::<S, N>),
    )
    // Notification triggers
    .route("/trigger-reminders", post(dispatch::trigger_reminders::<S, N>))
    .route("/trigger-report", post(dispatch::trigger_report::<S, N>))
    .with_state(state)
}
