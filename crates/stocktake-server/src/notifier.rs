//! A [`Notifier`] that writes notices to the log.

use std::convert::Infallible;

use stocktake_core::{
  notify::{Notice, Notifier},
  status,
};
use tracing::{info, warn};

/// Logs each notice as structured tracing events. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  type Error = Infallible;

  async fn deliver(&self, notice: &Notice) -> Result<(), Infallible> {
    match notice {
      Notice::StoreReminder { store, week, app_url } => {
        info!(
          %week,
          store_id = %store.store_id,
          store_name = %store.store_name,
          manager = store.manager_name.as_deref().unwrap_or("-"),
          email = store.manager_email.as_deref().unwrap_or("-"),
          %app_url,
          "stock count pending"
        );
      }
      Notice::StatusSummary { week, statuses } => {
        let missing: Vec<&str> = status::pending(statuses)
          .map(|s| s.store_name.as_str())
          .collect();
        info!(
          %week,
          submitted = statuses.len() - missing.len(),
          missing = missing.len(),
          stores = ?missing,
          "submission status"
        );
      }
      Notice::PilferageReport(report) => {
        let s = &report.summary;
        info!(
          week = %report.week_start,
          total = s.total_items,
          losses = s.loss_items,
          excess = s.excess_items,
          ok = s.ok_items,
          loss_qty = s.total_loss_qty,
          excess_qty = s.total_excess_qty,
          "pilferage report"
        );
        for row in report.losses() {
          warn!(
            store_id = %row.store_id,
            product_id = %row.product_id,
            product = row.product_name.as_deref().unwrap_or("-"),
            expected = row.closing_calculated,
            counted = row.physical_count,
            variance = row.variance,
            pct = %row.variance_pct,
            "stock loss"
          );
        }
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use stocktake_core::{WeekKey, report::build_report, status::StoreStatus};

  use super::*;

  fn week() -> WeekKey { "2024-03-10".parse().unwrap() }

  #[tokio::test]
  async fn every_notice_is_accepted() {
    let store = StoreStatus {
      store_id:      "S001".into(),
      store_name:    "Downtown Store".into(),
      manager_name:  Some("John Smith".into()),
      manager_email: Some("john@example.com".into()),
      submitted:     false,
      submitted_by:  None,
      submitted_at:  None,
    };
    let notices = [
      Notice::StoreReminder {
        store:   store.clone(),
        week:    week(),
        app_url: "http://localhost:3000".into(),
      },
      Notice::StatusSummary { week: week(), statuses: vec![store] },
      Notice::PilferageReport(build_report(week(), vec![], vec![])),
    ];

    for notice in &notices {
      assert!(LogNotifier.deliver(notice).await.is_ok());
    }
  }
}
