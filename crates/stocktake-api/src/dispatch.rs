//! Notification dispatch: submission reminders and the weekly report.
//!
//! These are the entry points an external scheduler calls (directly or via
//! the `/trigger-*` routes). Delivery failures are logged and counted but
//! never fail the call; recorded data is never touched here.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use stocktake_core::{
  Result, WeekKey,
  notify::{Notice, Notifier},
  report::pilferage_report,
  status::{self, submission_status},
  store::StockStore,
};
use tracing::{info, warn};

use crate::{ApiState, error::ApiError, extract::Query};

// ─── Outcomes ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderOutcome {
  pub week:         WeekKey,
  /// Active stores without a submission.
  pub pending:      usize,
  pub reminded:     usize,
  /// Pending stores with no manager email on file.
  pub skipped:      usize,
  pub failed:       usize,
  pub summary_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOutcome {
  pub week:        WeekKey,
  pub total_items: usize,
  pub sent:        bool,
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// Remind every pending store for `week`, then send the status summary.
///
/// Nothing is sent when every active store has submitted.
pub async fn remind_pending<S, N>(
  store: &S,
  notifier: &N,
  week: WeekKey,
  app_url: &str,
) -> Result<ReminderOutcome>
where
  S: StockStore,
  N: Notifier,
{
  let statuses = submission_status(store, Some(week)).await?;
  let pending: Vec<_> = status::pending(&statuses).cloned().collect();

  let mut outcome = ReminderOutcome {
    week,
    pending: pending.len(),
    reminded: 0,
    skipped: 0,
    failed: 0,
    summary_sent: false,
  };

  if pending.is_empty() {
    info!(%week, "all stores submitted");
    return Ok(outcome);
  }
  info!(%week, pending = pending.len(), "stores pending");

  for store_status in pending {
    let has_email = store_status
      .manager_email
      .as_deref()
      .is_some_and(|e| !e.trim().is_empty());
    if !has_email {
      outcome.skipped += 1;
      continue;
    }

    let notice = Notice::StoreReminder {
      store: store_status,
      week,
      app_url: app_url.to_owned(),
    };
    if deliver(notifier, &notice).await {
      outcome.reminded += 1;
    } else {
      outcome.failed += 1;
    }
  }

  outcome.summary_sent = deliver(notifier, &Notice::StatusSummary { week, statuses }).await;
  Ok(outcome)
}

/// Build the pilferage report for `week` and deliver it. With `skip_empty`,
/// a week without data is not sent.
pub async fn send_report<S, N>(
  store: &S,
  notifier: &N,
  week: WeekKey,
  skip_empty: bool,
) -> Result<ReportOutcome>
where
  S: StockStore,
  N: Notifier,
{
  let report = pilferage_report(store, Some(week)).await?;
  let total_items = report.summary.total_items;

  if skip_empty && report.is_empty() {
    info!(%week, "no submissions, report not sent");
    return Ok(ReportOutcome { week, total_items, sent: false });
  }

  let sent = deliver(notifier, &Notice::PilferageReport(report)).await;
  Ok(ReportOutcome { week, total_items, sent })
}

async fn deliver<N: Notifier>(notifier: &N, notice: &Notice) -> bool {
  match notifier.deliver(notice).await {
    Ok(()) => true,
    Err(e) => {
      warn!(kind = notice.kind(), error = %e, "notification failed");
      false
    }
  }
}

// ─── Triggers ─────────────────────────────────────────────────────────────────

/// `POST /trigger-reminders`: reminders for the current week.
pub async fn trigger_reminders<S, N>(
  State(state): State<ApiState<S, N>>,
) -> Result<Json<ReminderOutcome>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  let outcome = remind_pending(
    state.store.as_ref(),
    state.notifier.as_ref(),
    WeekKey::current(),
    &state.app_url,
  )
  .await?;
  Ok(Json(outcome))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
  pub week:       Option<WeekKey>,
  #[serde(default)]
  pub skip_empty: bool,
}

/// `POST /trigger-report[?week=...][&skip_empty=true]`
pub async fn trigger_report<S, N>(
  State(state): State<ApiState<S, N>>,
  Query(params): Query<ReportParams>,
) -> Result<Json<ReportOutcome>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  let week = params.week.unwrap_or_else(WeekKey::current);
  let outcome = send_report(
    state.store.as_ref(),
    state.notifier.as_ref(),
    week,
    params.skip_empty,
  )
  .await?;
  Ok(Json(outcome))
}
