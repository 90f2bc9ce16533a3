//! The `StockStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `stocktake-store-sqlite`). The recorder, status tracker and reporter in
//! this crate, as well as the HTTP layer, depend on this abstraction rather
//! than on any concrete backend.

use std::future::Future;

use crate::{
  reference::{Product, ProductInput, Store, StoreInput},
  submission::{SubmissionBatch, SubmissionFact, SubmissionLogEntry, SubmittedStore},
  week::WeekKey,
};

/// Abstraction over the system of record.
///
/// Reference rows and submission facts are both written by natural key with
/// insert-or-update semantics. Audit log entries are append-only.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait StockStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Stores ────────────────────────────────────────────────────────────

  /// Active stores ordered by display name.
  fn list_stores(&self) -> impl Future<Output = Result<Vec<Store>, Self::Error>> + Send + '_;

  /// Fetch a store by external id, active or not.
  fn get_store<'a>(
    &'a self,
    store_id: &'a str,
  ) -> impl Future<Output = Result<Option<Store>, Self::Error>> + Send + 'a;

  /// Insert or replace the store keyed by `input.store_id`. An upsert of a
  /// deactivated store reactivates it.
  fn upsert_store(
    &self,
    input: StoreInput,
  ) -> impl Future<Output = Result<Store, Self::Error>> + Send + '_;

  /// Soft-delete. Returns `false` when no store has that id.
  fn deactivate_store<'a>(
    &'a self,
    store_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Products ──────────────────────────────────────────────────────────

  /// Active products ordered by category, then display name.
  fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + '_;

  fn get_product<'a>(
    &'a self,
    product_id: &'a str,
  ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send + 'a;

  fn upsert_product(
    &self,
    input: ProductInput,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  fn deactivate_product<'a>(
    &'a self,
    product_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Upsert every store and product in one transaction; a failure on any
  /// row leaves the catalogue untouched.
  fn upsert_catalogue(
    &self,
    stores: Vec<StoreInput>,
    products: Vec<ProductInput>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Facts ─────────────────────────────────────────────────────────────

  /// All facts for `week`, optionally narrowed to one store, ordered by store
  /// name then product name.
  fn facts_for_week<'a>(
    &'a self,
    week: WeekKey,
    store_id: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<SubmissionFact>, Self::Error>> + Send + 'a;

  /// Distinct stores with at least one fact for `week`, each carrying the
  /// submitter and timestamp of its most recent fact.
  fn submitted_stores(
    &self,
    week: WeekKey,
  ) -> impl Future<Output = Result<Vec<SubmittedStore>, Self::Error>> + Send + '_;

  /// Upsert every line of `batch` keyed by (week, store, product) and append
  /// one audit log entry, all in a single transaction. Either everything is
  /// committed or nothing is. Returns the number of lines written.
  fn record_batch(
    &self,
    batch: SubmissionBatch,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Audit log entries for `week`, oldest first.
  fn submission_log(
    &self,
    week: WeekKey,
  ) -> impl Future<Output = Result<Vec<SubmissionLogEntry>, Self::Error>> + Send + '_;

  /// Distinct weeks that have facts, newest first, at most `limit`.
  fn available_weeks(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<WeekKey>, Self::Error>> + Send + '_;
}
