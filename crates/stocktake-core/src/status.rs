//! Per-store submission status for a reporting week.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  reference::Store,
  store::StockStore,
  submission::SubmittedStore,
  week::WeekKey,
};

/// Whether one active store has submitted for the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStatus {
  pub store_id:      String,
  pub store_name:    String,
  pub manager_name:  Option<String>,
  pub manager_email: Option<String>,
  pub submitted:     bool,
  pub submitted_by:  Option<String>,
  pub submitted_at:  Option<DateTime<Utc>>,
}

/// Pair every active store with its submission, if any.
///
/// Output order follows `stores`. Submissions from stores not in `stores`
/// (deactivated or unknown ids) are ignored.
pub fn compile_status(stores: Vec<Store>, submitted: Vec<SubmittedStore>) -> Vec<StoreStatus> {
  let mut by_store: HashMap<String, SubmittedStore> = submitted
    .into_iter()
    .map(|s| (s.store_id.clone(), s))
    .collect();

  stores
    .into_iter()
    .map(|store| {
      let found = by_store.remove(&store.store_id);
      StoreStatus {
        submitted:     found.is_some(),
        submitted_by:  found.as_ref().and_then(|s| s.submitted_by.clone()),
        submitted_at:  found.map(|s| s.submitted_at),
        store_id:      store.store_id,
        store_name:    store.store_name,
        manager_name:  store.manager_name,
        manager_email: store.manager_email,
      }
    })
    .collect()
}

/// Submission status of every active store for `week` (default: current).
pub async fn submission_status<S: StockStore>(
  store: &S,
  week: Option<WeekKey>,
) -> Result<Vec<StoreStatus>> {
  let week = week.unwrap_or_else(WeekKey::current);
  let stores = store.list_stores().await.map_err(Error::store)?;
  let submitted = store.submitted_stores(week).await.map_err(Error::store)?;
  Ok(compile_status(stores, submitted))
}

/// Stores in `statuses` that have not submitted.
pub fn pending(statuses: &[StoreStatus]) -> impl Iterator<Item = &StoreStatus> {
  statuses.iter().filter(|s| !s.submitted)
}
