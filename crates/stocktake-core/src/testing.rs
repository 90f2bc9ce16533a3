//! An in-memory [`StockStore`] for exercising the core logic in unit tests.

use std::{collections::BTreeMap, sync::Mutex};

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  reference::{Product, ProductInput, Store, StoreInput},
  store::StockStore,
  submission::{SubmissionBatch, SubmissionFact, SubmissionLogEntry, SubmittedStore},
  week::WeekKey,
};

/// A fixed reporting week `n` weeks after 2024-03-10.
pub fn week(n: u32) -> WeekKey {
  let base = WeekKey::containing(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
  (0..n).fold(base, |w, _| w.next())
}

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("constraint violated: {0} must not be empty")]
  EmptyKey(&'static str),
}

#[derive(Default)]
struct State {
  stores:   BTreeMap<String, Store>,
  products: BTreeMap<String, Product>,
  facts:    BTreeMap<(WeekKey, String, String), SubmissionFact>,
  log:      Vec<SubmissionLogEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
  state: Mutex<State>,
}

impl MemoryStore {
  fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
    let mut guard = self.state.lock().unwrap();
    f(&mut guard)
  }
}

impl StockStore for MemoryStore {
  type Error = MemoryError;

  async fn list_stores(&self) -> Result<Vec<Store>, MemoryError> {
    let mut stores: Vec<Store> =
      self.with(|s| s.stores.values().filter(|s| s.is_active).cloned().collect());
    stores.sort_by(|a, b| a.store_name.cmp(&b.store_name));
    Ok(stores)
  }

  async fn get_store<'a>(&'a self, store_id: &'a str) -> Result<Option<Store>, MemoryError> {
    Ok(self.with(|s| s.stores.get(store_id).cloned()))
  }

  async fn upsert_store(&self, input: StoreInput) -> Result<Store, MemoryError> {
    if input.store_id.is_empty() {
      return Err(MemoryError::EmptyKey("store_id"));
    }
    let store = Store {
      store_id:      input.store_id,
      store_name:    input.store_name,
      manager_name:  input.manager_name,
      manager_email: input.manager_email,
      is_active:     true,
      created_at:    Utc::now(),
    };
    self.with(|s| s.stores.insert(store.store_id.clone(), store.clone()));
    Ok(store)
  }

  async fn deactivate_store<'a>(&'a self, store_id: &'a str) -> Result<bool, MemoryError> {
    Ok(self.with(|s| {
      s.stores
        .get_mut(store_id)
        .map(|store| store.is_active = false)
        .is_some()
    }))
  }

  async fn list_products(&self) -> Result<Vec<Product>, MemoryError> {
    let mut products: Vec<Product> =
      self.with(|s| s.products.values().filter(|p| p.is_active).cloned().collect());
    products.sort_by(|a, b| {
      (&a.category, &a.product_name).cmp(&(&b.category, &b.product_name))
    });
    Ok(products)
  }

  async fn get_product<'a>(&'a self, product_id: &'a str) -> Result<Option<Product>, MemoryError> {
    Ok(self.with(|s| s.products.get(product_id).cloned()))
  }

  async fn upsert_product(&self, input: ProductInput) -> Result<Product, MemoryError> {
    if input.product_id.is_empty() {
      return Err(MemoryError::EmptyKey("product_id"));
    }
    let product = Product {
      unit:         input.unit_or_default().to_owned(),
      product_id:   input.product_id,
      product_name: input.product_name,
      category:     input.category,
      is_active:    true,
      created_at:   Utc::now(),
    };
    self.with(|s| s.products.insert(product.product_id.clone(), product.clone()));
    Ok(product)
  }

  async fn deactivate_product<'a>(&'a self, product_id: &'a str) -> Result<bool, MemoryError> {
    Ok(self.with(|s| {
      s.products
        .get_mut(product_id)
        .map(|product| product.is_active = false)
        .is_some()
    }))
  }

  async fn upsert_catalogue(
    &self,
    stores: Vec<StoreInput>,
    products: Vec<ProductInput>,
  ) -> Result<(), MemoryError> {
    if stores.iter().any(|s| s.store_id.is_empty()) {
      return Err(MemoryError::EmptyKey("store_id"));
    }
    if products.iter().any(|p| p.product_id.is_empty()) {
      return Err(MemoryError::EmptyKey("product_id"));
    }
    for store in stores {
      self.upsert_store(store).await?;
    }
    for product in products {
      self.upsert_product(product).await?;
    }
    Ok(())
  }

  async fn facts_for_week<'a>(
    &'a self,
    week: WeekKey,
    store_id: Option<&'a str>,
  ) -> Result<Vec<SubmissionFact>, MemoryError> {
    let mut facts: Vec<SubmissionFact> = self.with(|s| {
      s.facts
        .values()
        .filter(|f| f.week_start_date == week)
        .filter(|f| store_id.is_none_or(|id| f.store_id == id))
        .cloned()
        .collect()
    });
    facts.sort_by(|a, b| (&a.store_name, &a.product_name).cmp(&(&b.store_name, &b.product_name)));
    Ok(facts)
  }

  async fn submitted_stores(&self, week: WeekKey) -> Result<Vec<SubmittedStore>, MemoryError> {
    let mut latest: BTreeMap<String, SubmittedStore> = BTreeMap::new();
    for fact in self.facts_for_week(week, None).await? {
      let newer = latest
        .get(&fact.store_id)
        .is_none_or(|seen| fact.submitted_at > seen.submitted_at);
      if newer {
        latest.insert(fact.store_id.clone(), SubmittedStore {
          store_id:     fact.store_id,
          store_name:   fact.store_name,
          submitted_by: fact.submitted_by,
          submitted_at: fact.submitted_at,
        });
      }
    }
    Ok(latest.into_values().collect())
  }

  async fn record_batch(&self, batch: SubmissionBatch) -> Result<usize, MemoryError> {
    if batch.store_id.is_empty() {
      return Err(MemoryError::EmptyKey("store_id"));
    }
    if batch.lines.iter().any(|l| l.product_id.is_empty()) {
      return Err(MemoryError::EmptyKey("product_id"));
    }

    let now = Utc::now();
    let count = batch.lines.len();
    self.with(|s| {
      for line in batch.lines {
        let key = (batch.week, batch.store_id.clone(), line.product_id.clone());
        s.facts.insert(key, SubmissionFact {
          week_start_date:    batch.week,
          store_id:           batch.store_id.clone(),
          store_name:         batch.store_name.clone(),
          product_id:         line.product_id,
          product_name:       line.product_name,
          opening_stock:      line.opening_stock,
          received:           line.received,
          sold:               line.sold,
          closing_calculated: line.closing_calculated,
          physical_count:     line.physical_count,
          variance:           line.variance,
          submitted_by:       Some(batch.submitted_by.clone()),
          submitted_at:       now,
        });
      }
      s.log.push(SubmissionLogEntry {
        entry_id:        Uuid::new_v4(),
        week_start_date: batch.week,
        store_id:        batch.store_id,
        submitted_by:    Some(batch.submitted_by),
        submitted_at:    now,
        item_count:      count,
      });
    });
    Ok(count)
  }

  async fn submission_log(&self, week: WeekKey) -> Result<Vec<SubmissionLogEntry>, MemoryError> {
    Ok(self.with(|s| {
      s.log
        .iter()
        .filter(|e| e.week_start_date == week)
        .cloned()
        .collect()
    }))
  }

  async fn available_weeks(&self, limit: usize) -> Result<Vec<WeekKey>, MemoryError> {
    let mut weeks: Vec<WeekKey> = self.with(|s| s.facts.keys().map(|(w, _, _)| *w).collect());
    weeks.dedup();
    weeks.reverse();
    weeks.truncate(limit);
    Ok(weeks)
  }
}
