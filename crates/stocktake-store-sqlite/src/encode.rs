//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that
//! lexical order is chronological (`MAX(submitted_at)` relies on this).
//! Week keys are stored as `YYYY-MM-DD`. UUIDs are hyphenated lowercase.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use stocktake_core::{
  WeekKey,
  reference::{Product, Store},
  submission::{SubmissionFact, SubmissionLogEntry, SubmittedStore},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_week(week: WeekKey) -> String { week.to_string() }

pub fn decode_week(s: &str) -> Result<WeekKey> { Ok(s.parse()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `stores` row (columns in `STORE_COLUMNS` order).
pub struct RawStore {
  pub store_id:      String,
  pub store_name:    String,
  pub manager_name:  Option<String>,
  pub manager_email: Option<String>,
  pub is_active:     bool,
  pub created_at:    String,
}

impl RawStore {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      store_id:      row.get(0)?,
      store_name:    row.get(1)?,
      manager_name:  row.get(2)?,
      manager_email: row.get(3)?,
      is_active:     row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_store(self) -> Result<Store> {
    Ok(Store {
      created_at:    decode_dt(&self.created_at)?,
      store_id:      self.store_id,
      store_name:    self.store_name,
      manager_name:  self.manager_name,
      manager_email: self.manager_email,
      is_active:     self.is_active,
    })
  }
}

/// Raw values read from a `products` row (columns in `PRODUCT_COLUMNS` order).
pub struct RawProduct {
  pub product_id:   String,
  pub product_name: String,
  pub category:     Option<String>,
  pub unit:         String,
  pub is_active:    bool,
  pub created_at:   String,
}

impl RawProduct {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id:   row.get(0)?,
      product_name: row.get(1)?,
      category:     row.get(2)?,
      unit:         row.get(3)?,
      is_active:    row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  pub fn into_product(self) -> Result<Product> {
    Ok(Product {
      created_at:   decode_dt(&self.created_at)?,
      product_id:   self.product_id,
      product_name: self.product_name,
      category:     self.category,
      unit:         self.unit,
      is_active:    self.is_active,
    })
  }
}

/// Raw values read from a `stock_submissions` row (`FACT_COLUMNS` order).
pub struct RawFact {
  pub week_start_date:    String,
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
  pub submitted_at:       String,
}

impl RawFact {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      week_start_date:    row.get(0)?,
      store_id:           row.get(1)?,
      store_name:         row.get(2)?,
      product_id:         row.get(3)?,
      product_name:       row.get(4)?,
      opening_stock:      row.get(5)?,
      received:           row.get(6)?,
      sold:               row.get(7)?,
      closing_calculated: row.get(8)?,
      physical_count:     row.get(9)?,
      variance:           row.get(10)?,
      submitted_by:       row.get(11)?,
      submitted_at:       row.get(12)?,
    })
  }

  pub fn into_fact(self) -> Result<SubmissionFact> {
    Ok(SubmissionFact {
      week_start_date:    decode_week(&self.week_start_date)?,
      submitted_at:       decode_dt(&self.submitted_at)?,
      store_id:           self.store_id,
      store_name:         self.store_name,
      product_id:         self.product_id,
      product_name:       self.product_name,
      opening_stock:      self.opening_stock,
      received:           self.received,
      sold:               self.sold,
      closing_calculated: self.closing_calculated,
      physical_count:     self.physical_count,
      variance:           self.variance,
      submitted_by:       self.submitted_by,
    })
  }
}

/// One row of the per-week submitted-stores aggregate.
pub struct RawSubmitted {
  pub store_id:     String,
  pub store_name:   Option<String>,
  pub submitted_by: Option<String>,
  pub submitted_at: String,
}

impl RawSubmitted {
  pub fn into_submitted(self) -> Result<SubmittedStore> {
    Ok(SubmittedStore {
      submitted_at: decode_dt(&self.submitted_at)?,
      store_id:     self.store_id,
      store_name:   self.store_name,
      submitted_by: self.submitted_by,
    })
  }
}

/// Raw values read from a `submission_log` row.
pub struct RawLogEntry {
  pub entry_id:        String,
  pub week_start_date: String,
  pub store_id:        String,
  pub submitted_by:    Option<String>,
  pub submitted_at:    String,
  pub item_count:      i64,
}

impl RawLogEntry {
  pub fn into_entry(self) -> Result<SubmissionLogEntry> {
    let item_count = usize::try_from(self.item_count)
      .map_err(|_| Error::Decode(format!("negative item_count {}", self.item_count)))?;

    Ok(SubmissionLogEntry {
      entry_id: decode_uuid(&self.entry_id)?,
      week_start_date: decode_week(&self.week_start_date)?,
      store_id: self.store_id,
      submitted_by: self.submitted_by,
      submitted_at: decode_dt(&self.submitted_at)?,
      item_count,
    })
  }
}
