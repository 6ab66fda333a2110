use std::sync::Arc;

use axum::{routing::get, Json, Router};
use models::{customer, product};
use service::{
    billing::BillingService,
    customer::{CustomerService, SeaOrmCustomerRepository},
    product::{ProductService, SeaOrmProductRepository},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod billing;
pub mod products;
pub mod resources;

pub use products::InventoryState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Shared outer layers: health check, permissive CORS and request tracing.
fn finish(app: Router) -> Router {
    app.route("/health", get(health))
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http()
                // one span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

/// Customer service: `/api/customers`.
pub fn customer_app(customers: Arc<CustomerService>) -> Router {
    let api = Router::new()
        .nest(
            "/api/customers",
            resources::resource_routes::<
                customer::Model,
                SeaOrmCustomerRepository,
                Arc<CustomerService>,
            >("email"),
        )
        .with_state(customers);
    finish(api)
}

/// Inventory service: `/api/products`.
pub fn inventory_app(service: Arc<ProductService>) -> Router {
    let state = InventoryState { products: service };
    let routes = resources::resource_routes::<
        product::Model,
        SeaOrmProductRepository,
        InventoryState,
    >("name")
    .merge(products::product_routes());
    let api = Router::new().nest("/api/products", routes).with_state(state);
    finish(api)
}

/// Billing service: `/api/billing/products`, read through from inventory.
pub fn billing_app(billing: Arc<BillingService>) -> Router {
    let api = Router::new()
        .nest("/api/billing", billing::billing_routes())
        .with_state(billing);
    finish(api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    async fn customers() -> anyhow::Result<Router> {
        let db = models::db::connect_in_memory().await?;
        crate::startup::customer_router(db).await
    }

    #[tokio::test]
    async fn health_is_ok() -> anyhow::Result<()> {
        let resp = customers().await?
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;
        assert_eq!(resp.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_id_is_404_with_empty_body() -> anyhow::Result<()> {
        let resp = customers().await?
            .oneshot(Request::builder().uri("/api/customers/nope").body(Body::empty())?)
            .await?;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(resp.into_body(), 1024).await?;
        assert!(body.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn create_returns_201() -> anyhow::Result<()> {
        let req = Request::builder()
            .method("POST")
            .uri("/api/customers")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"Ada","email":"ada@example.com"}"#))?;
        let resp = customers().await?.oneshot(req).await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
        Ok(())
    }
}
