//! [`SqliteStore`]: the SQLite implementation of [`StockStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use stocktake_core::{
  WeekKey,
  reference::{Product, ProductInput, Store, StoreInput},
  store::StockStore,
  submission::{SubmissionBatch, SubmissionFact, SubmissionLogEntry, SubmittedStore},
};

use crate::{
  Result,
  encode::{
    RawFact, RawLogEntry, RawProduct, RawStore, RawSubmitted, decode_week, encode_dt,
    encode_uuid, encode_week,
  },
  schema::{
    APPEND_LOG, FACT_COLUMNS, PRODUCT_COLUMNS, SCHEMA, STORE_COLUMNS, UPSERT_FACT,
    UPSERT_PRODUCT, UPSERT_STORE,
  },
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The stocktake system of record backed by a single SQLite file.
///
/// Open once at startup and hand clones to whoever needs it. Cloning is
/// cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Flush and close the connection thread.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── StockStore impl ─────────────────────────────────────────────────────────

impl StockStore for SqliteStore {
  type Error = crate::Error;

  // ── Stores ────────────────────────────────────────────────────────────────

  async fn list_stores(&self) -> Result<Vec<Store>> {
    let raws: Vec<RawStore> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STORE_COLUMNS} FROM stores WHERE is_active = 1 ORDER BY store_name"
        ))?;
        let rows = stmt
          .query_map([], RawStore::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStore::into_store).collect()
  }

  async fn get_store<'a>(&'a self, store_id: &'a str) -> Result<Option<Store>> {
    let id = store_id.to_owned();

    let raw: Option<RawStore> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {STORE_COLUMNS} FROM stores WHERE store_id = ?1"),
              rusqlite::params![id],
              RawStore::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStore::into_store).transpose()
  }

  async fn upsert_store(&self, input: StoreInput) -> Result<Store> {
    let now = encode_dt(Utc::now());

    let raw: RawStore = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("{UPSERT_STORE} RETURNING {STORE_COLUMNS}"),
          rusqlite::params![
            input.store_id,
            input.store_name,
            input.manager_name,
            input.manager_email,
            now,
          ],
          RawStore::from_row,
        )?)
      })
      .await?;

    raw.into_store()
  }

  async fn deactivate_store<'a>(&'a self, store_id: &'a str) -> Result<bool> {
    let id = store_id.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE stores SET is_active = 0 WHERE store_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Products ──────────────────────────────────────────────────────────────

  async fn list_products(&self) -> Result<Vec<Product>> {
    let raws: Vec<RawProduct> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1
           ORDER BY category, product_name"
        ))?;
        let rows = stmt
          .query_map([], RawProduct::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProduct::into_product).collect()
  }

  async fn get_product<'a>(&'a self, product_id: &'a str) -> Result<Option<Product>> {
    let id = product_id.to_owned();

    let raw: Option<RawProduct> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ?1"),
              rusqlite::params![id],
              RawProduct::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProduct::into_product).transpose()
  }

  async fn upsert_product(&self, input: ProductInput) -> Result<Product> {
    let now = encode_dt(Utc::now());
    let unit = input.unit_or_default().to_owned();

    let raw: RawProduct = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("{UPSERT_PRODUCT} RETURNING {PRODUCT_COLUMNS}"),
          rusqlite::params![input.product_id, input.product_name, input.category, unit, now],
          RawProduct::from_row,
        )?)
      })
      .await?;

    raw.into_product()
  }

  async fn deactivate_product<'a>(&'a self, product_id: &'a str) -> Result<bool> {
    let id = product_id.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE products SET is_active = 0 WHERE product_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn upsert_catalogue(
    &self,
    stores: Vec<StoreInput>,
    products: Vec<ProductInput>,
  ) -> Result<()> {
    let now = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut upsert = tx.prepare_cached(UPSERT_STORE)?;
          for store in &stores {
            upsert.execute(rusqlite::params![
              store.store_id,
              store.store_name,
              store.manager_name,
              store.manager_email,
              now,
            ])?;
          }
          let mut upsert = tx.prepare_cached(UPSERT_PRODUCT)?;
          for product in &products {
            upsert.execute(rusqlite::params![
              product.product_id,
              product.product_name,
              product.category,
              product.unit_or_default(),
              now,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  // ── Facts ─────────────────────────────────────────────────────────────────

  async fn facts_for_week<'a>(
    &'a self,
    week: WeekKey,
    store_id: Option<&'a str>,
  ) -> Result<Vec<SubmissionFact>> {
    let week_str = encode_week(week);
    let store_id = store_id.map(str::to_owned);

    let raws: Vec<RawFact> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(id) = store_id {
          let mut stmt = conn.prepare(&format!(
            "SELECT {FACT_COLUMNS} FROM stock_submissions
             WHERE week_start_date = ?1 AND store_id = ?2
             ORDER BY store_name, product_name"
          ))?;
          stmt
            .query_map(rusqlite::params![week_str, id], RawFact::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {FACT_COLUMNS} FROM stock_submissions
             WHERE week_start_date = ?1
             ORDER BY store_name, product_name"
          ))?;
          stmt
            .query_map(rusqlite::params![week_str], RawFact::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFact::into_fact).collect()
  }

  async fn submitted_stores(&self, week: WeekKey) -> Result<Vec<SubmittedStore>> {
    let week_str = encode_week(week);

    let raws: Vec<RawSubmitted> = self
      .conn
      .call(move |conn| {
        // With a lone MAX() aggregate, SQLite takes the bare columns from the
        // row holding the maximum, i.e. the most recent fact.
        let mut stmt = conn.prepare(
          "SELECT store_id, store_name, submitted_by, MAX(submitted_at) AS submitted_at
           FROM stock_submissions
           WHERE week_start_date = ?1
           GROUP BY store_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![week_str], |row| {
            Ok(RawSubmitted {
              store_id:     row.get(0)?,
              store_name:   row.get(1)?,
              submitted_by: row.get(2)?,
              submitted_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmitted::into_submitted).collect()
  }

  async fn record_batch(&self, batch: SubmissionBatch) -> Result<usize> {
    let week_str = encode_week(batch.week);
    let now = encode_dt(Utc::now());
    let entry_id = encode_uuid(Uuid::new_v4());
    let count = batch.lines.len();
    let count_i64 = i64::try_from(count).unwrap_or(i64::MAX);

    self
      .conn
      .call(move |conn| {
        // Dropping `tx` on any early return rolls the whole batch back.
        let tx = conn.transaction()?;
        {
          let mut upsert = tx.prepare_cached(UPSERT_FACT)?;
          for line in &batch.lines {
            upsert.execute(rusqlite::params![
              week_str,
              batch.store_id,
              batch.store_name,
              line.product_id,
              line.product_name,
              line.opening_stock,
              line.received,
              line.sold,
              line.closing_calculated,
              line.physical_count,
              line.variance,
              batch.submitted_by,
              now,
            ])?;
          }
        }
        tx.execute(
          APPEND_LOG,
          rusqlite::params![
            entry_id,
            week_str,
            batch.store_id,
            batch.submitted_by,
            now,
            count_i64
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(count)
  }

  async fn submission_log(&self, week: WeekKey) -> Result<Vec<SubmissionLogEntry>> {
    let week_str = encode_week(week);

    let raws: Vec<RawLogEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT entry_id, week_start_date, store_id, submitted_by, submitted_at, item_count
           FROM submission_log
           WHERE week_start_date = ?1
           ORDER BY submitted_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![week_str], |row| {
            Ok(RawLogEntry {
              entry_id:        row.get(0)?,
              week_start_date: row.get(1)?,
              store_id:        row.get(2)?,
              submitted_by:    row.get(3)?,
              submitted_at:    row.get(4)?,
              item_count:      row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLogEntry::into_entry).collect()
  }

  async fn available_weeks(&self, limit: usize) -> Result<Vec<WeekKey>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT week_start_date FROM stock_submissions
           ORDER BY week_start_date DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.iter().map(|s| decode_week(s)).collect()
  }
}
