//! Reference data: the stores that submit counts and the products counted.
//!
//! Both are keyed by a caller-supplied external id and are never hard
//! deleted. Deactivation hides them from listings and status computation
//! while leaving historical submission facts untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit label applied to products that do not specify one.
pub const DEFAULT_UNIT: &str = "Pcs";

// ─── Stores ──────────────────────────────────────────────────────────────────

/// A retail location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
  pub store_id:      String,
  pub store_name:    String,
  pub manager_name:  Option<String>,
  pub manager_email: Option<String>,
  pub is_active:     bool,
  pub created_at:    DateTime<Utc>,
}

/// Input for an insert-or-update keyed on `store_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInput {
  pub store_id:      String,
  pub store_name:    String,
  #[serde(default)]
  pub manager_name:  Option<String>,
  #[serde(default)]
  pub manager_email: Option<String>,
}

impl StoreInput {
  pub fn new(store_id: impl Into<String>, store_name: impl Into<String>) -> Self {
    Self {
      store_id:      store_id.into(),
      store_name:    store_name.into(),
      manager_name:  None,
      manager_email: None,
    }
  }

  pub fn with_manager(
    mut self,
    name: impl Into<String>,
    email: Option<String>,
  ) -> Self {
    self.manager_name = Some(name.into());
    self.manager_email = email;
    self
  }
}

// ─── Products ────────────────────────────────────────────────────────────────

/// A counted product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub product_id:   String,
  pub product_name: String,
  pub category:     Option<String>,
  /// Unit-of-measure label, e.g. `"Bags"` or `"Bottles"`.
  pub unit:         String,
  pub is_active:    bool,
  pub created_at:   DateTime<Utc>,
}

/// Input for an insert-or-update keyed on `product_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
  pub product_id:   String,
  pub product_name: String,
  #[serde(default)]
  pub category:     Option<String>,
  #[serde(default)]
  pub unit:         Option<String>,
}

impl ProductInput {
  pub fn new(product_id: impl Into<String>, product_name: impl Into<String>) -> Self {
    Self {
      product_id:   product_id.into(),
      product_name: product_name.into(),
      category:     None,
      unit:         None,
    }
  }

  pub fn with_category(mut self, category: impl Into<String>, unit: impl Into<String>) -> Self {
    self.category = Some(category.into());
    self.unit = Some(unit.into());
    self
  }

  /// The unit label to persist, falling back to [`DEFAULT_UNIT`].
  pub fn unit_or_default(&self) -> &str {
    self
      .unit
      .as_deref()
      .filter(|u| !u.trim().is_empty())
      .unwrap_or(DEFAULT_UNIT)
  }
}
