//! Notifier port.
//!
//! The core decides *what* to tell people; delivery (mail transport, chat
//! bots, recipient lists) belongs to whoever implements [`Notifier`].

use std::future::Future;

use serde::Serialize;

use crate::{report::PilferageReport, status::StoreStatus, week::WeekKey};

/// Something worth telling a stakeholder about.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
  /// A store has not submitted its count for `week`.
  StoreReminder {
    store:   StoreStatus,
    week:    WeekKey,
    /// Where the count sheet can be filled in.
    app_url: String,
  },
  /// Which stores have and have not submitted.
  StatusSummary {
    week:     WeekKey,
    statuses: Vec<StoreStatus>,
  },
  /// The weekly variance report.
  PilferageReport(PilferageReport),
}

impl Notice {
  /// Short discriminant for logs.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::StoreReminder { .. } => "store_reminder",
      Self::StatusSummary { .. } => "status_summary",
      Self::PilferageReport(_) => "pilferage_report",
    }
  }
}

/// Delivers [`Notice`]s. One attempt per call; failures are reported to the
/// caller, who must not let them affect recorded data.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn deliver<'a>(
    &'a self,
    notice: &'a Notice,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
