//! Inventory routes beyond generic CRUD: catalog queries, quantity patch and aggregates.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use common::{
    to_page,
    types::{TotalQuantityBody, TotalValueBody},
    Page, PageRequest,
};
use models::product;
use serde::Deserialize;
use service::{
    product::{ProductService, SeaOrmProductRepository, DEFAULT_LOW_STOCK_THRESHOLD},
    resource::ResourceService,
};
use tracing::info;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct InventoryState {
    pub products: Arc<ProductService>,
}

impl FromRef<InventoryState> for Arc<ProductService> {
    fn from_ref(state: &InventoryState) -> Self { Arc::clone(&state.products) }
}

impl FromRef<InventoryState> for Arc<ResourceService<product::Model, SeaOrmProductRepository>> {
    fn from_ref(state: &InventoryState) -> Self { state.products.core() }
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeQuery {
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Deserialize)]
pub struct ThresholdQuery {
    #[serde(default = "default_threshold")]
    pub threshold: i32,
}

fn default_threshold() -> i32 { DEFAULT_LOW_STOCK_THRESHOLD }

#[derive(Debug, Deserialize)]
pub struct QuantityBody {
    pub quantity: i32,
}

type Products = State<Arc<ProductService>>;

pub async fn search(
    State(svc): Products,
    Query(q): Query<NameQuery>,
    Query(paging): Query<PageRequest>,
) -> Result<Json<Page<product::Model>>, ApiError> {
    info!(name = %q.name, "GET search products");
    let slice = svc
        .search_by_name(&q.name, paging)
        .await
        .map_err(ApiError::during(format!("search products by name {}", q.name)))?;
    Ok(Json(to_page(slice)))
}

pub async fn price_range(
    State(svc): Products,
    Query(q): Query<PriceRangeQuery>,
    Query(paging): Query<PageRequest>,
) -> Result<Json<Page<product::Model>>, ApiError> {
    info!(min = q.min_price, max = q.max_price, "GET products by price range");
    let slice = svc
        .by_price_range(q.min_price, q.max_price, paging)
        .await
        .map_err(ApiError::during(format!("products priced {}..={}", q.min_price, q.max_price)))?;
    Ok(Json(to_page(slice)))
}

pub async fn low_stock(
    State(svc): Products,
    Query(q): Query<ThresholdQuery>,
    Query(paging): Query<PageRequest>,
) -> Result<Json<Page<product::Model>>, ApiError> {
    info!(threshold = q.threshold, "GET low stock products");
    let slice = svc
        .low_stock(q.threshold, paging)
        .await
        .map_err(ApiError::during(format!("low stock below {}", q.threshold)))?;
    Ok(Json(to_page(slice)))
}

/// Sets only `quantity`; responds with the stored record.
pub async fn update_quantity(
    State(svc): Products,
    Path(id): Path<i64>,
    Json(body): Json<QuantityBody>,
) -> Result<Json<product::Model>, ApiError> {
    info!(id, quantity = body.quantity, "PATCH product quantity");
    let updated = svc
        .update_quantity(id, body.quantity)
        .await
        .map_err(ApiError::during(format!("update quantity of product {id}")))?;
    Ok(Json(updated))
}

pub async fn inventory_value(State(svc): Products) -> Result<Json<TotalValueBody>, ApiError> {
    info!("GET inventory value");
    let total_value = svc
        .total_inventory_value()
        .await
        .map_err(ApiError::during("total inventory value"))?;
    Ok(Json(TotalValueBody { total_value }))
}

pub async fn inventory_quantity(
    State(svc): Products,
) -> Result<Json<TotalQuantityBody>, ApiError> {
    info!("GET inventory quantity");
    let total_quantity = svc
        .total_inventory_quantity()
        .await
        .map_err(ApiError::during("total inventory quantity"))?;
    Ok(Json(TotalQuantityBody { total_quantity }))
}

/// Relative to `/api/products`; merged with the generic resource routes.
pub fn product_routes() -> Router<InventoryState> {
    Router::new()
        .route("/search", get(search))
        .route("/price-range", get(price_range))
        .route("/low-stock", get(low_stock))
        .route("/inventory/value", get(inventory_value))
        .route("/inventory/quantity", get(inventory_quantity))
        .route("/:id/quantity", patch(update_quantity))
}
