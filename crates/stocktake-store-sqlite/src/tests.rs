//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use serde_json::json;
use stocktake_core::{
  WeekKey,
  reference::{ProductInput, StoreInput},
  report::{Flag, pilferage_report},
  status::submission_status,
  store::StockStore,
  submission::{FactLine, SubmissionBatch, SubmissionRequest, record_submission},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn week() -> WeekKey {
  WeekKey::containing(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap())
}

fn batch(store_id: &str, submitted_by: &str, lines: Vec<FactLine>) -> SubmissionBatch {
  SubmissionBatch {
    week: week(),
    store_id: store_id.into(),
    store_name: Some(format!("Store {store_id}")),
    submitted_by: submitted_by.into(),
    lines,
  }
}

fn named(product_id: &str, counts: (f64, f64, f64, f64)) -> FactLine {
  let mut line = FactLine::new(product_id, counts.0, counts.1, counts.2, counts.3);
  line.product_name = Some(format!("Product {product_id}"));
  line
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_and_get_store() {
  let s = store().await;

  let created = s
    .upsert_store(
      StoreInput::new("S001", "Downtown Store")
        .with_manager("John Smith", Some("john@example.com".into())),
    )
    .await
    .unwrap();
  assert!(created.is_active);

  let fetched = s.get_store("S001").await.unwrap().unwrap();
  assert_eq!(fetched, created);
  assert!(s.get_store("S999").await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_replaces_by_external_id() {
  let s = store().await;
  s.upsert_store(StoreInput::new("S001", "Old Name")).await.unwrap();
  s.upsert_store(StoreInput::new("S001", "New Name")).await.unwrap();

  let all = s.list_stores().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].store_name, "New Name");
  assert_eq!(all[0].manager_name, None);
}

#[tokio::test]
async fn list_stores_orders_by_name_and_hides_inactive() {
  let s = store().await;
  s.upsert_store(StoreInput::new("S001", "Mall Outlet")).await.unwrap();
  s.upsert_store(StoreInput::new("S002", "Airport Kiosk")).await.unwrap();
  s.upsert_store(StoreInput::new("S003", "Beach Store")).await.unwrap();

  assert!(s.deactivate_store("S003").await.unwrap());
  assert!(!s.deactivate_store("S404").await.unwrap());

  let names: Vec<String> = s
    .list_stores()
    .await
    .unwrap()
    .into_iter()
    .map(|st| st.store_name)
    .collect();
  assert_eq!(names, ["Airport Kiosk", "Mall Outlet"]);

  // Still fetchable by id, just inactive.
  let gone = s.get_store("S003").await.unwrap().unwrap();
  assert!(!gone.is_active);
}

#[tokio::test]
async fn upsert_reactivates_store() {
  let s = store().await;
  s.upsert_store(StoreInput::new("S001", "Downtown")).await.unwrap();
  s.deactivate_store("S001").await.unwrap();
  assert!(s.list_stores().await.unwrap().is_empty());

  let back = s.upsert_store(StoreInput::new("S001", "Downtown")).await.unwrap();
  assert!(back.is_active);
  assert_eq!(s.list_stores().await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_store_id_is_a_constraint_error() {
  let s = store().await;
  let err = s.upsert_store(StoreInput::new("", "Nameless")).await.unwrap_err();
  assert!(err.is_constraint_violation());
}

#[tokio::test]
async fn products_default_unit_and_sort_by_category() {
  let s = store().await;
  s.upsert_product(ProductInput::new("P005", "Bread Loaf").with_category("Bakery", "Pcs"))
    .await
    .unwrap();
  s.upsert_product(ProductInput::new("P002", "Cooking Oil 1L").with_category("Grocery", "Bottles"))
    .await
    .unwrap();
  s.upsert_product(ProductInput::new("P004", "Milk 500ml").with_category("Dairy", "Packets"))
    .await
    .unwrap();
  let plain = s.upsert_product(ProductInput::new("P011", "Mystery Box")).await.unwrap();
  assert_eq!(plain.unit, "Pcs");
  assert_eq!(plain.category, None);

  let ids: Vec<String> = s
    .list_products()
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.product_id)
    .collect();
  // NULL categories sort first.
  assert_eq!(ids, ["P011", "P005", "P004", "P002"]);

  assert!(s.deactivate_product("P004").await.unwrap());
  assert_eq!(s.list_products().await.unwrap().len(), 3);
  assert!(!s.get_product("P004").await.unwrap().unwrap().is_active);
}

#[tokio::test]
async fn catalogue_upsert_writes_everything() {
  let s = store().await;
  s.upsert_catalogue(
    vec![StoreInput::new("S001", "Downtown Store"), StoreInput::new("S002", "Mall Outlet")],
    vec![ProductInput::new("P001", "Rice 5kg Bag").with_category("Grocery", "Bags")],
  )
  .await
  .unwrap();

  assert_eq!(s.list_stores().await.unwrap().len(), 2);
  assert_eq!(s.get_product("P001").await.unwrap().unwrap().unit, "Bags");
}

#[tokio::test]
async fn catalogue_upsert_is_all_or_nothing() {
  let s = store().await;
  let err = s
    .upsert_catalogue(
      vec![StoreInput::new("S001", "Downtown Store"), StoreInput::new("S002", "Mall Outlet")],
      vec![ProductInput::new("P001", "Rice 5kg Bag"), ProductInput::new("", "Nameless")],
    )
    .await
    .unwrap_err();

  assert!(err.is_constraint_violation());
  assert!(s.list_stores().await.unwrap().is_empty());
  assert!(s.list_products().await.unwrap().is_empty());
}

// ─── Facts ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_batch_persists_derived_fields() {
  let s = store().await;
  let n = s
    .record_batch(batch("S001", "John", vec![named("P001", (10.0, 5.0, 3.0, 11.0))]))
    .await
    .unwrap();
  assert_eq!(n, 1);

  let facts = s.facts_for_week(week(), None).await.unwrap();
  assert_eq!(facts.len(), 1);
  let f = &facts[0];
  assert_eq!(f.week_start_date, week());
  assert_eq!(f.closing_calculated, 12.0);
  assert_eq!(f.variance, -1.0);
  assert_eq!(f.store_name.as_deref(), Some("Store S001"));
  assert_eq!(f.product_name.as_deref(), Some("Product P001"));
  assert_eq!(f.submitted_by.as_deref(), Some("John"));
}

#[tokio::test]
async fn resubmission_overwrites_in_place() {
  let s = store().await;
  s.record_batch(batch("S001", "John", vec![named("P001", (10.0, 0.0, 0.0, 10.0))]))
    .await
    .unwrap();
  let first = s.facts_for_week(week(), None).await.unwrap().remove(0);

  let mut renamed = batch("S001", "Jane", vec![named("P001", (10.0, 0.0, 0.0, 7.0))]);
  renamed.store_name = Some("Renamed Store".into());
  s.record_batch(renamed).await.unwrap();

  let facts = s.facts_for_week(week(), None).await.unwrap();
  assert_eq!(facts.len(), 1);
  let f = &facts[0];
  assert_eq!(f.physical_count, 7.0);
  assert_eq!(f.variance, -3.0);
  assert_eq!(f.submitted_by.as_deref(), Some("Jane"));
  assert!(f.submitted_at >= first.submitted_at);
  // Display names are a snapshot from the first write.
  assert_eq!(f.store_name.as_deref(), Some("Store S001"));

  let log = s.submission_log(week()).await.unwrap();
  assert_eq!(log.len(), 2);
  assert_eq!(log[1].submitted_by.as_deref(), Some("Jane"));
}

#[tokio::test]
async fn constraint_violation_rolls_back_batch_and_log() {
  let s = store().await;
  let lines = vec![
    named("P001", (1.0, 1.0, 1.0, 1.0)),
    named("P002", (1.0, 1.0, 1.0, 1.0)),
    named("", (1.0, 1.0, 1.0, 1.0)),
  ];

  let err = s.record_batch(batch("S001", "John", lines)).await.unwrap_err();
  assert!(err.is_constraint_violation());

  assert!(s.facts_for_week(week(), None).await.unwrap().is_empty());
  assert!(s.submission_log(week()).await.unwrap().is_empty());
  assert!(s.submitted_stores(week()).await.unwrap().is_empty());
}

#[tokio::test]
async fn facts_can_be_narrowed_to_one_store() {
  let s = store().await;
  s.record_batch(batch("S001", "a", vec![named("P001", (1.0, 0.0, 0.0, 1.0))]))
    .await
    .unwrap();
  s.record_batch(batch(
    "S002",
    "b",
    vec![named("P002", (1.0, 0.0, 0.0, 1.0)), named("P001", (1.0, 0.0, 0.0, 1.0))],
  ))
  .await
  .unwrap();

  assert_eq!(s.facts_for_week(week(), None).await.unwrap().len(), 3);

  let only = s.facts_for_week(week(), Some("S002")).await.unwrap();
  let products: Vec<&str> = only.iter().map(|f| f.product_id.as_str()).collect();
  assert_eq!(products, ["P001", "P002"]);

  assert!(s.facts_for_week(week().next(), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn submitted_stores_reports_latest_submitter() {
  let s = store().await;
  s.record_batch(batch("S001", "early", vec![named("P001", (1.0, 0.0, 0.0, 1.0))]))
    .await
    .unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  s.record_batch(batch("S001", "late", vec![named("P002", (1.0, 0.0, 0.0, 1.0))]))
    .await
    .unwrap();
  s.record_batch(batch("S002", "other", vec![named("P001", (1.0, 0.0, 0.0, 1.0))]))
    .await
    .unwrap();

  let submitted = s.submitted_stores(week()).await.unwrap();
  assert_eq!(submitted.len(), 2);
  let s1 = submitted.iter().find(|x| x.store_id == "S001").unwrap();
  assert_eq!(s1.submitted_by.as_deref(), Some("late"));
}

#[tokio::test]
async fn available_weeks_newest_first() {
  let s = store().await;
  for w in [week(), week().next(), week().next().next()] {
    let mut b = batch("S001", "x", vec![named("P001", (0.0, 0.0, 0.0, 0.0))]);
    b.week = w;
    s.record_batch(b).await.unwrap();
  }

  let weeks = s.available_weeks(2).await.unwrap();
  assert_eq!(weeks, vec![week().next().next(), week().next()]);
}

#[tokio::test]
async fn empty_batch_still_logs() {
  let s = store().await;
  assert_eq!(s.record_batch(batch("S001", "x", vec![])).await.unwrap(), 0);

  let log = s.submission_log(week()).await.unwrap();
  assert_eq!(log.len(), 1);
  assert_eq!(log[0].item_count, 0);
  assert!(s.submitted_stores(week()).await.unwrap().is_empty());
}

// ─── End to end through the core ─────────────────────────────────────────────

#[tokio::test]
async fn recorder_status_and_report_against_sqlite() {
  let s = store().await;
  for i in 1..=8 {
    s.upsert_store(StoreInput::new(format!("S00{i}"), format!("Store {i}")))
      .await
      .unwrap();
  }
  s.upsert_store(StoreInput::new("S009", "Closed Store")).await.unwrap();
  s.deactivate_store("S009").await.unwrap();

  for store_id in ["S001", "S004", "S009"] {
    let req: SubmissionRequest = serde_json::from_value(json!({
      "store_id": store_id,
      "store_name": format!("Store {store_id}"),
      "submitted_by": "counter",
      "items": [
        { "product_id": "P001", "product_name": "Rice", "opening_stock": "10",
          "received": 5, "sold": "3", "physical_count": 11 },
        { "product_id": "P002", "product_name": "Oil", "opening_stock": 0,
          "received": "", "sold": null, "physical_count": "0" }
      ]
    }))
    .unwrap();
    assert_eq!(record_submission(&s, week(), req).await.unwrap(), 2);
  }

  let status = submission_status(&s, Some(week())).await.unwrap();
  assert_eq!(status.len(), 8);
  assert_eq!(status.iter().filter(|x| x.submitted).count(), 2);
  assert!(status.iter().all(|x| x.store_id != "S009"));

  let report = pilferage_report(&s, Some(week())).await.unwrap();
  // Facts of deactivated stores are history and stay in the report.
  assert_eq!(report.summary.total_items, 6);
  assert_eq!(report.summary.loss_items, 3);
  assert_eq!(report.summary.ok_items, 3);
  assert_eq!(report.summary.total_loss_qty, 3.0);
  assert_eq!(report.data[0].flag, Flag::Loss);
  assert_eq!(report.data[0].variance_pct, "-8.33");
  assert!(report.data.iter().all(|r| r.last_week_physical.is_none()));
}
