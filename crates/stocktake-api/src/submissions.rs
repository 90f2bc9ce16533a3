//! Handlers for count submission, status and reporting.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/submit` | Body: [`SubmissionRequest`]; records for the current week |
//! | `GET`  | `/status` | Optional `?week=` |
//! | `GET`  | `/report` | Optional `?week=` |
//! | `GET`  | `/weeks` | Weeks with data, newest first |
//! | `GET`  | `/submissions` | Optional `?week=`, `?store_id=` |
//! | `GET`  | `/submission-log` | Optional `?week=` |
//! | `GET`  | `/last-week-closing/:store_id` | Optional `?week=` |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use stocktake_core::{
  WeekKey,
  notify::Notifier,
  report::{PilferageReport, pilferage_report},
  status::{StoreStatus, submission_status},
  store::StockStore,
  submission::{
    self, ClosingCount, SubmissionFact, SubmissionLogEntry, SubmissionRequest, record_submission,
  },
};

use crate::{
  ApiState, WeekParams,
  error::ApiError,
  extract::{JsonBody, Query},
};

/// Upper bound on weeks offered by `GET /weeks`.
pub const MAX_WEEKS: usize = 52;

// ─── Submit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
  pub week_start: WeekKey,
  pub store_id:   String,
  pub item_count: usize,
}

/// `POST /submit`: records the sheet for the current reporting week.
pub async fn submit<S, N>(
  State(state): State<ApiState<S, N>>,
  JsonBody(body): JsonBody<SubmissionRequest>,
) -> Result<Json<SubmitResponse>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  let week = WeekKey::current();
  let store_id = body.store_id.clone().unwrap_or_default();
  let item_count = record_submission(state.store.as_ref(), week, body).await?;

  tracing::info!(%week, %store_id, item_count, "submission recorded");
  Ok(Json(SubmitResponse { week_start: week, store_id, item_count }))
}

// ─── Status & report ──────────────────────────────────────────────────────────

/// `GET /status[?week=...]`
pub async fn status<S, N>(
  State(state): State<ApiState<S, N>>,
  Query(params): Query<WeekParams>,
) -> Result<Json<Vec<StoreStatus>>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  Ok(Json(submission_status(state.store.as_ref(), params.week).await?))
}

/// `GET /report[?week=...]`
pub async fn report<S, N>(
  State(state): State<ApiState<S, N>>,
  Query(params): Query<WeekParams>,
) -> Result<Json<PilferageReport>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  Ok(Json(pilferage_report(state.store.as_ref(), params.week).await?))
}

/// `GET /weeks`
pub async fn weeks<S, N>(
  State(state): State<ApiState<S, N>>,
) -> Result<Json<Vec<WeekKey>>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  let weeks = state
    .store
    .available_weeks(MAX_WEEKS)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(weeks))
}

// ─── Raw facts ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub week:     Option<WeekKey>,
  pub store_id: Option<String>,
}

/// `GET /submissions[?week=...][&store_id=...]`
pub async fn list<S, N>(
  State(state): State<ApiState<S, N>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<SubmissionFact>>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  let week = params.week.unwrap_or_else(WeekKey::current);
  let facts = state
    .store
    .facts_for_week(week, params.store_id.as_deref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(facts))
}

/// `GET /submission-log[?week=...]`
pub async fn log<S, N>(
  State(state): State<ApiState<S, N>>,
  Query(params): Query<WeekParams>,
) -> Result<Json<Vec<SubmissionLogEntry>>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  let week = params.week.unwrap_or_else(WeekKey::current);
  let entries = state
    .store
    .submission_log(week)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}

/// `GET /last-week-closing/:store_id[?week=...]`: counts from the week
/// before `week`, keyed by product id.
pub async fn last_week_closing<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(store_id): Path<String>,
  Query(params): Query<WeekParams>,
) -> Result<Json<BTreeMap<String, ClosingCount>>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  let closing =
    submission::last_week_closing(state.store.as_ref(), &store_id, params.week).await?;
  Ok(Json(closing))
}
