//! SQL schema for the stocktake SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// There are no foreign keys between facts and reference tables: facts keep
/// their own snapshot of display names and outlive deactivated stores and
/// products.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS stores (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    store_id      TEXT NOT NULL UNIQUE CHECK (length(store_id) > 0),
    store_name    TEXT NOT NULL,
    manager_name  TEXT,
    manager_email TEXT,
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id   TEXT NOT NULL UNIQUE CHECK (length(product_id) > 0),
    product_name TEXT NOT NULL,
    category     TEXT,
    unit         TEXT NOT NULL DEFAULT 'Pcs',
    is_active    INTEGER NOT NULL DEFAULT 1,
    created_at   TEXT NOT NULL
);

-- One row per (week, store, product); resubmission updates in place.
CREATE TABLE IF NOT EXISTS stock_submissions (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    week_start_date    TEXT NOT NULL CHECK (length(week_start_date) > 0),
    store_id           TEXT NOT NULL CHECK (length(store_id) > 0),
    store_name         TEXT,           -- snapshot at first submission
    product_id         TEXT NOT NULL CHECK (length(product_id) > 0),
    product_name       TEXT,           -- snapshot at first submission
    opening_stock      REAL NOT NULL DEFAULT 0,
    received           REAL NOT NULL DEFAULT 0,
    sold               REAL NOT NULL DEFAULT 0,
    closing_calculated REAL NOT NULL DEFAULT 0,
    physical_count     REAL NOT NULL DEFAULT 0,
    variance           REAL NOT NULL DEFAULT 0,
    submitted_by       TEXT,
    submitted_at       TEXT NOT NULL,  -- RFC 3339 UTC, fixed width
    UNIQUE (week_start_date, store_id, product_id)
);

-- Strictly append-only; one row per recorder call.
CREATE TABLE IF NOT EXISTS submission_log (
    entry_id        TEXT PRIMARY KEY,
    week_start_date TEXT NOT NULL,
    store_id        TEXT NOT NULL,
    submitted_by    TEXT,
    submitted_at    TEXT NOT NULL,
    item_count      INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_sub_week       ON stock_submissions(week_start_date);
CREATE INDEX IF NOT EXISTS idx_sub_store      ON stock_submissions(store_id);
CREATE INDEX IF NOT EXISTS idx_sub_week_store ON stock_submissions(week_start_date, store_id);
CREATE INDEX IF NOT EXISTS idx_log_week       ON submission_log(week_start_date);

PRAGMA user_version = 1;
";

/// Insert-or-update of one fact keyed by the natural triple. Names keep the
/// snapshot taken when the row was first created.
pub const UPSERT_FACT: &str = "
INSERT INTO stock_submissions (
    week_start_date, store_id, store_name, product_id, product_name,
    opening_stock, received, sold, closing_calculated, physical_count, variance,
    submitted_by, submitted_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
ON CONFLICT (week_start_date, store_id, product_id) DO UPDATE SET
    opening_stock      = excluded.opening_stock,
    received           = excluded.received,
    sold               = excluded.sold,
    closing_calculated = excluded.closing_calculated,
    physical_count     = excluded.physical_count,
    variance           = excluded.variance,
    submitted_by       = excluded.submitted_by,
    submitted_at       = excluded.submitted_at
";

/// Insert-or-update of a store by external id; reactivates, keeps `created_at`.
pub const UPSERT_STORE: &str = "
INSERT INTO stores (store_id, store_name, manager_name, manager_email, is_active, created_at)
VALUES (?1, ?2, ?3, ?4, 1, ?5)
ON CONFLICT (store_id) DO UPDATE SET
    store_name    = excluded.store_name,
    manager_name  = excluded.manager_name,
    manager_email = excluded.manager_email,
    is_active     = 1
";

pub const UPSERT_PRODUCT: &str = "
INSERT INTO products (product_id, product_name, category, unit, is_active, created_at)
VALUES (?1, ?2, ?3, ?4, 1, ?5)
ON CONFLICT (product_id) DO UPDATE SET
    product_name = excluded.product_name,
    category     = excluded.category,
    unit         = excluded.unit,
    is_active    = 1
";

pub const APPEND_LOG: &str = "
INSERT INTO submission_log (entry_id, week_start_date, store_id, submitted_by, submitted_at, item_count)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
";

pub const STORE_COLUMNS: &str =
  "store_id, store_name, manager_name, manager_email, is_active, created_at";

pub const PRODUCT_COLUMNS: &str =
  "product_id, product_name, category, unit, is_active, created_at";

pub const FACT_COLUMNS: &str = "week_start_date, store_id, store_name, product_id, product_name, \
   opening_stock, received, sold, closing_calculated, physical_count, variance, \
   submitted_by, submitted_at";
