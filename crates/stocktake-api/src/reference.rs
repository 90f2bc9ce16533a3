//! Handlers for `/stores` and `/products`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/stores` | Active stores |
//! | `POST`   | `/stores` | Body: [`StoreInput`]; insert or replace by `store_id` |
//! | `GET`    | `/stores/:id` | 404 if unknown; inactive stores are returned |
//! | `DELETE` | `/stores/:id` | Soft delete; 204, or 404 if unknown |
//!
//! `/products` mirrors the same shape with [`ProductInput`].

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use stocktake_core::{
  notify::Notifier,
  reference::{Product, ProductInput, Store, StoreInput},
  store::StockStore,
};

use crate::{ApiState, error::ApiError, extract::JsonBody};

// ─── Stores ───────────────────────────────────────────────────────────────────

/// `GET /stores`
pub async fn list_stores<S, N>(
  State(state): State<ApiState<S, N>>,
) -> Result<Json<Vec<Store>>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  let stores = state.store.list_stores().await.map_err(ApiError::store)?;
  Ok(Json(stores))
}

/// `POST /stores`
pub async fn upsert_store<S, N>(
  State(state): State<ApiState<S, N>>,
  JsonBody(body): JsonBody<StoreInput>,
) -> Result<Json<Store>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  if body.store_id.trim().is_empty() {
    return Err(ApiError::BadRequest("store_id is required".into()));
  }
  let store = state.store.upsert_store(body).await.map_err(ApiError::store)?;
  tracing::info!(store_id = %store.store_id, "store upserted");
  Ok(Json(store))
}

/// `GET /stores/:id`
pub async fn get_store<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<String>,
) -> Result<Json<Store>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  let store = state
    .store
    .get_store(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("store", id))?;
  Ok(Json(store))
}

/// `DELETE /stores/:id`
pub async fn deactivate_store<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  if !state.store.deactivate_store(&id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("store", id));
  }
  tracing::info!(store_id = %id, "store deactivated");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Products ─────────────────────────────────────────────────────────────────

/// `GET /products`
pub async fn list_products<S, N>(
  State(state): State<ApiState<S, N>>,
) -> Result<Json<Vec<Product>>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  let products = state.store.list_products().await.map_err(ApiError::store)?;
  Ok(Json(products))
}

/// `POST /products`
pub async fn upsert_product<S, N>(
  State(state): State<ApiState<S, N>>,
  JsonBody(body): JsonBody<ProductInput>,
) -> Result<Json<Product>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  if body.product_id.trim().is_empty() {
    return Err(ApiError::BadRequest("product_id is required".into()));
  }
  let product = state.store.upsert_product(body).await.map_err(ApiError::store)?;
  tracing::info!(product_id = %product.product_id, "product upserted");
  Ok(Json(product))
}

/// `GET /products/:id`
pub async fn get_product<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<String>,
) -> Result<Json<Product>, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  let product = state
    .store
    .get_product(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("product", id))?;
  Ok(Json(product))
}

/// `DELETE /products/:id`
pub async fn deactivate_product<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: StockStore,
  N: Notifier,
{
  if !state.store.deactivate_product(&id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("product", id));
  }
  tracing::info!(product_id = %id, "product deactivated");
  Ok(StatusCode::NO_CONTENT)
}
