//! Pilferage report: per-item variance for a week, cross-referenced against
//! the previous week and summarised.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  store::StockStore,
  submission::SubmissionFact,
  week::WeekKey,
};

// ─── Classification ──────────────────────────────────────────────────────────

/// How a row's physical count compares to its expected closing stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Flag {
  /// Fewer units on hand than expected.
  Loss,
  /// More units on hand than expected.
  Excess,
  Ok,
}

impl Flag {
  pub fn classify(variance: f64) -> Self {
    if variance < 0.0 {
      Self::Loss
    } else if variance > 0.0 {
      Self::Excess
    } else {
      Self::Ok
    }
  }
}

/// `variance / closing * 100` with two decimals.
///
/// A zero expected closing yields `"0.00"` whatever the variance, so a count
/// of 5 against an expected 0 still reports 0%.
///
/// Rounding is half away from zero on the exact value of the double, so
/// 1 against 800 (exactly 0.125%) reads `"0.13"` and -1 reads `"-0.13"`.
pub fn variance_pct(variance: f64, closing: f64) -> String {
  if closing == 0.0 {
    return "0.00".to_owned();
  }
  let pct = variance / closing * 100.0;
  let sign = if pct < 0.0 { "-" } else { "" };

  match Decimal::from_f64_retain(pct.abs()) {
    Some(exact) => {
      let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
      format!("{sign}{rounded:.2}")
    }
    // Out of `Decimal` range or non-finite.
    None => format!("{pct:.2}"),
  }
}

// ─── Report types ────────────────────────────────────────────────────────────

/// One (store, product) line of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
  pub store_id:           String,
  pub store_name:         Option<String>,
  pub product_id:         String,
  pub product_name:       Option<String>,
  #[serde(rename = "opening")]
  pub opening_stock:      f64,
  pub received:           f64,
  pub sold:               f64,
  #[serde(rename = "expected_closing")]
  pub closing_calculated: f64,
  pub physical_count:     f64,
  pub variance:           f64,
  pub variance_pct:       String,
  /// Physical count from the previous week, if that week had this pair.
  pub last_week_physical: Option<f64>,
  /// `physical_count - last_week_physical`.
  pub week_over_week:     Option<f64>,
  pub flag:               Flag,
}

impl ReportRow {
  fn new(fact: SubmissionFact, last_week_physical: Option<f64>) -> Self {
    Self {
      variance_pct: variance_pct(fact.variance, fact.closing_calculated),
      week_over_week: last_week_physical.map(|prev| fact.physical_count - prev),
      flag: Flag::classify(fact.variance),
      last_week_physical,
      store_id: fact.store_id,
      store_name: fact.store_name,
      product_id: fact.product_id,
      product_name: fact.product_name,
      opening_stock: fact.opening_stock,
      received: fact.received,
      sold: fact.sold,
      closing_calculated: fact.closing_calculated,
      physical_count: fact.physical_count,
      variance: fact.variance,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
  pub total_items:      usize,
  pub loss_items:       usize,
  pub excess_items:     usize,
  pub ok_items:         usize,
  /// Sum of `|variance|` over loss rows.
  pub total_loss_qty:   f64,
  /// Sum of `variance` over excess rows.
  pub total_excess_qty: f64,
}

impl ReportSummary {
  pub fn from_rows(rows: &[ReportRow]) -> Self {
    rows.iter().fold(Self::default(), |mut acc, row| {
      acc.total_items += 1;
      match row.flag {
        Flag::Loss => {
          acc.loss_items += 1;
          acc.total_loss_qty += row.variance.abs();
        }
        Flag::Excess => {
          acc.excess_items += 1;
          acc.total_excess_qty += row.variance;
        }
        Flag::Ok => acc.ok_items += 1,
      }
      acc
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilferageReport {
  pub week_start: WeekKey,
  pub prev_week:  WeekKey,
  /// Sorted by variance ascending: the largest loss comes first.
  pub data:       Vec<ReportRow>,
  pub summary:    ReportSummary,
}

impl PilferageReport {
  pub fn is_empty(&self) -> bool { self.data.is_empty() }

  pub fn losses(&self) -> impl Iterator<Item = &ReportRow> {
    self.data.iter().filter(|r| r.flag == Flag::Loss)
  }
}

// ─── Building ────────────────────────────────────────────────────────────────

/// Join `current` facts for `week` against `previous` facts by (store,
/// product) and summarise.
pub fn build_report(
  week: WeekKey,
  current: Vec<SubmissionFact>,
  previous: Vec<SubmissionFact>,
) -> PilferageReport {
  let last_week: HashMap<(String, String), f64> = previous
    .into_iter()
    .map(|f| ((f.store_id, f.product_id), f.physical_count))
    .collect();

  let mut data: Vec<ReportRow> = current
    .into_iter()
    .map(|fact| {
      let prev = last_week
        .get(&(fact.store_id.clone(), fact.product_id.clone()))
        .copied();
      ReportRow::new(fact, prev)
    })
    .collect();

  // Stable, so equal variances keep the store/product name order.
  data.sort_by(|a, b| a.variance.total_cmp(&b.variance));

  let summary = ReportSummary::from_rows(&data);
  PilferageReport { week_start: week, prev_week: week.previous(), data, summary }
}

/// Build the pilferage report for `week` (default: current).
pub async fn pilferage_report<S: StockStore>(
  store: &S,
  week: Option<WeekKey>,
) -> Result<PilferageReport> {
  let week = week.unwrap_or_else(WeekKey::current);
  let current = store.facts_for_week(week, None).await.map_err(Error::store)?;
  let previous = store
    .facts_for_week(week.previous(), None)
    .await
    .map_err(Error::store)?;
  Ok(build_report(week, current, previous))
}
