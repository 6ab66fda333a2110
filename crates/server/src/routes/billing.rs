use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use common::Page;
use service::billing::{BillingService, Product};
use tracing::info;

use crate::errors::ApiError;

pub async fn list_products(
    State(billing): State<Arc<BillingService>>,
) -> Result<Json<Page<Product>>, ApiError> {
    info!("GET billing products");
    let page = billing.products().await.map_err(ApiError::during("list inventory products"))?;
    Ok(Json(page))
}

/// 404 when inventory reports the product absent, 500 when inventory is unreachable.
pub async fn get_product(
    State(billing): State<Arc<BillingService>>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    info!(id, "GET billing product");
    let product = billing
        .product(id)
        .await
        .map_err(ApiError::during(format!("fetch inventory product {id}")))?;
    Ok(Json(product))
}

/// Relative to `/api/billing`.
pub fn billing_routes() -> Router<Arc<BillingService>> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
}
