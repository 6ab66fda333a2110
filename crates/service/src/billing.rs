//! Billing-side view of inventory products, read from the inventory service.

use std::{sync::Arc, time::Duration};

use common::Page;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::remote::{HttpResourceClient, RemoteResourceClient};

/// Product fields billing relies on; anything else the peer sends is ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: i32,
}

pub type ProductClient = dyn RemoteResourceClient<Item = Product, Id = i64>;

/// Path of the product collection on the inventory service.
pub const INVENTORY_PRODUCTS: &str = "api/products";

pub fn inventory_client(
    base_url: &str,
    timeout: Duration,
) -> Result<HttpResourceClient<Product, i64>, ServiceError> {
    HttpResourceClient::new(base_url, INVENTORY_PRODUCTS, timeout)
}

pub struct BillingService {
    products: Arc<ProductClient>,
}

impl BillingService {
    pub fn new(products: Arc<ProductClient>) -> Self { Self { products } }

    #[instrument(skip(self))]
    pub async fn product(&self, id: i64) -> Result<Product, ServiceError> {
        info!("fetching product from inventory");
        self.products.get_by_id(&id).await
    }

    pub async fn products(&self) -> Result<Page<Product>, ServiceError> {
        info!("listing products from inventory");
        self.products.list_all().await
    }
}
