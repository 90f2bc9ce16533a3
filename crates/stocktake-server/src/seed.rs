//! Sample stores and products for a fresh install.

use stocktake_core::{
  reference::{ProductInput, StoreInput},
  store::StockStore,
};
use tracing::info;

const STORES: [(&str, &str, &str); 8] = [
  ("S001", "Downtown Store", "John Smith"),
  ("S002", "Mall Outlet", "Sarah Johnson"),
  ("S003", "Airport Kiosk", "Mike Brown"),
  ("S004", "Highway Store", "Emily Davis"),
  ("S005", "Central Market", "David Wilson"),
  ("S006", "Suburb Branch", "Lisa Anderson"),
  ("S007", "Beach Store", "Tom Garcia"),
  ("S008", "University Shop", "Anna Martinez"),
];

const PRODUCTS: [(&str, &str, &str, &str); 10] = [
  ("P001", "Rice 5kg Bag", "Grocery", "Bags"),
  ("P002", "Cooking Oil 1L", "Grocery", "Bottles"),
  ("P003", "Sugar 1kg", "Grocery", "Packs"),
  ("P004", "Milk 500ml", "Dairy", "Packets"),
  ("P005", "Bread Loaf", "Bakery", "Pcs"),
  ("P006", "Eggs (Dozen)", "Dairy", "Dozens"),
  ("P007", "Detergent 500g", "Household", "Packs"),
  ("P008", "Soap Bar", "Household", "Pcs"),
  ("P009", "Bottled Water 1L", "Beverages", "Bottles"),
  ("P010", "Instant Noodles", "Grocery", "Packs"),
];

/// Upsert the sample catalogue unless an active store already exists.
///
/// All rows go in one transaction, so a failed seed leaves the store empty
/// and the next start tries again. Returns whether anything was written.
/// Managers are seeded without email, so reminders skip them until one is set.
pub async fn seed_sample_data<S: StockStore>(store: &S) -> Result<bool, S::Error> {
  if !store.list_stores().await?.is_empty() {
    return Ok(false);
  }

  let stores = STORES
    .iter()
    .map(|&(id, name, manager)| StoreInput::new(id, name).with_manager(manager, None))
    .collect();
  let products = PRODUCTS
    .iter()
    .map(|&(id, name, category, unit)| ProductInput::new(id, name).with_category(category, unit))
    .collect();
  store.upsert_catalogue(stores, products).await?;

  info!(stores = STORES.len(), products = PRODUCTS.len(), "sample data seeded");
  Ok(true)
}
