//! Weekly count sheets and the submission recorder.
//!
//! A store submits one sheet per reporting week. Each line becomes a
//! [`SubmissionFact`] keyed by (week, store, product); resubmitting the same
//! triple overwrites the earlier values in place. Every recorder call also
//! leaves one append-only [`SubmissionLogEntry`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{Error, Result, store::StockStore, week::WeekKey};

// ─── Wire input ──────────────────────────────────────────────────────────────

/// One product line of a count sheet as supplied by the caller.
///
/// Quantities are kept as raw JSON values: numbers, numeric strings, blanks
/// and junk are all accepted and coerced by [`parse_quantity`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
  /// An empty id is rejected by the store, failing the whole batch.
  #[serde(default)]
  pub product_id:     String,
  #[serde(default)]
  pub product_name:   Option<String>,
  #[serde(default)]
  pub opening_stock:  Value,
  #[serde(default)]
  pub received:       Value,
  #[serde(default)]
  pub sold:           Value,
  #[serde(default)]
  pub physical_count: Value,
}

/// A full count sheet for one store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionRequest {
  pub store_id:     Option<String>,
  pub store_name:   Option<String>,
  pub submitted_by: Option<String>,
  pub items:        Option<Vec<LineItem>>,
}

impl SubmissionRequest {
  /// Check required fields and derive the batch to persist for `week`.
  pub fn into_batch(self, week: WeekKey) -> Result<SubmissionBatch> {
    let store_id = required(self.store_id, "store_id")?;
    let submitted_by = required(self.submitted_by, "submitted_by")?;
    let items = self.items.ok_or(Error::MissingField("items"))?;

    Ok(SubmissionBatch {
      week,
      store_id,
      store_name: self.store_name,
      submitted_by,
      lines: items.iter().map(FactLine::from_item).collect(),
    })
  }
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
  value
    .filter(|v| !v.trim().is_empty())
    .ok_or(Error::MissingField(field))
}

// ─── Coercion ────────────────────────────────────────────────────────────────

/// Coerce a caller-supplied quantity to `f64`.
///
/// JSON numbers pass through. Strings contribute their leading decimal
/// literal, so `"12 kg"` reads as 12. Anything else, and any non-finite
/// result, reads as 0.
pub fn parse_quantity(raw: &Value) -> f64 {
  let parsed = match raw {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => leading_decimal(s),
    _ => None,
  };
  parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn leading_decimal(s: &str) -> Option<f64> {
  let s = s.trim_start();
  let bytes = s.as_bytes();

  let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
  let mut seen_digit = false;
  let mut seen_dot = false;
  while let Some(&b) = bytes.get(end) {
    match b {
      b'0'..=b'9' => seen_digit = true,
      b'.' if !seen_dot => seen_dot = true,
      _ => break,
    }
    end += 1;
  }
  if !seen_digit {
    return None;
  }

  if matches!(bytes.get(end), Some(b'e' | b'E')) {
    let mut exp = end + 1;
    if matches!(bytes.get(exp), Some(b'+' | b'-')) {
      exp += 1;
    }
    let digits = bytes[exp..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 {
      end = exp + digits;
    }
  }

  s[..end].parse().ok()
}

// ─── Derived rows ────────────────────────────────────────────────────────────

/// A coerced line with its derived fields, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactLine {
  pub product_id:         String,
  pub product_name:       Option<String>,
  pub opening_stock:      f64,
  pub received:           f64,
  pub sold:               f64,
  /// `opening_stock + received - sold`.
  pub closing_calculated: f64,
  pub physical_count:     f64,
  /// `physical_count - closing_calculated`; negative means loss.
  pub variance:           f64,
}

impl FactLine {
  pub fn new(
    product_id: impl Into<String>,
    opening_stock: f64,
    received: f64,
    sold: f64,
    physical_count: f64,
  ) -> Self {
    let closing_calculated = opening_stock + received - sold;
    Self {
      product_id: product_id.into(),
      product_name: None,
      opening_stock,
      received,
      sold,
      closing_calculated,
      physical_count,
      variance: physical_count - closing_calculated,
    }
  }

  pub fn from_item(item: &LineItem) -> Self {
    let mut line = Self::new(
      item.product_id.clone(),
      parse_quantity(&item.opening_stock),
      parse_quantity(&item.received),
      parse_quantity(&item.sold),
      parse_quantity(&item.physical_count),
    );
    line.product_name = item.product_name.clone();
    line
  }
}

/// Everything one recorder call writes, committed as a unit.
#[derive(Debug, Clone)]
pub struct SubmissionBatch {
  pub week:         WeekKey,
  pub store_id:     String,
  /// Display name snapshot; stored as given, never re-joined on read.
  pub store_name:   Option<String>,
  pub submitted_by: String,
  pub lines:        Vec<FactLine>,
}

// ─── Persisted records ───────────────────────────────────────────────────────

/// The latest count of one product at one store for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionFact {
  pub week_start_date:    WeekKey,
  pub store_id:           String,
  pub store_name:         Option<String>,
  pub product_id:         String,
  pub product_name:       Option<String>,
  pub opening_stock:      f64,
  pub received:           f64,
  pub sold:               f64,
  pub closing_calculated: f64,
  pub physical_count:     f64,
  pub variance:           f64,
  pub submitted_by:       Option<String>,
  pub submitted_at:       DateTime<Utc>,
}

/// A store that has at least one fact in a week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedStore {
  pub store_id:     String,
  pub store_name:   Option<String>,
  pub submitted_by: Option<String>,
  pub submitted_at: DateTime<Utc>,
}

/// Audit record of one recorder call. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionLogEntry {
  pub entry_id:        Uuid,
  pub week_start_date: WeekKey,
  pub store_id:        String,
  pub submitted_by:    Option<String>,
  pub submitted_at:    DateTime<Utc>,
  pub item_count:      usize,
}

/// Last week's closing count of one product, for form pre-fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosingCount {
  pub physical_count: f64,
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// Validate `request` and commit it for `week` as one atomic batch.
///
/// Returns the number of lines processed. Product and store ids are not
/// checked against reference data.
pub async fn record_submission<S: StockStore>(
  store: &S,
  week: WeekKey,
  request: SubmissionRequest,
) -> Result<usize> {
  let batch = request.into_batch(week)?;
  store.record_batch(batch).await.map_err(Error::store)
}

/// Physical counts `store_id` recorded in the week before `week` (default:
/// the current week), keyed by product id.
pub async fn last_week_closing<S: StockStore>(
  store: &S,
  store_id: &str,
  week: Option<WeekKey>,
) -> Result<BTreeMap<String, ClosingCount>> {
  let previous = week.unwrap_or_else(WeekKey::current).previous();
  let facts = store
    .facts_for_week(previous, Some(store_id))
    .await
    .map_err(Error::store)?;

  Ok(
    facts
      .into_iter()
      .map(|f| (f.product_id, ClosingCount { physical_count: f.physical_count }))
      .collect(),
  )
}
