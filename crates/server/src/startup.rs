use std::{sync::Arc, time::Duration};

use axum::Router;
use configs::{AppConfig, PeerConfig};
use models::{db, product::demo_catalog, schema};
use sea_orm::DatabaseConnection;
use service::{
    billing::{inventory_client, BillingService},
    customer::{CustomerService, SeaOrmCustomerRepository},
    product::{ProductService, SeaOrmProductRepository},
};
use tokio::net::TcpListener;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;

/// The three deployable services built from this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceKind {
    Customer,
    Inventory,
    Billing,
}

impl ServiceKind {
    /// Also the config file stem: `config/<name>.toml`.
    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::Customer => "customer-service",
            ServiceKind::Inventory => "inventory-service",
            ServiceKind::Billing => "billing-service",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            ServiceKind::Customer => 8081,
            ServiceKind::Inventory => 8082,
            ServiceKind::Billing => 8083,
        }
    }

    /// Billing owns no table; it only reads inventory over the network.
    pub fn needs_database(self) -> bool { !matches!(self, ServiceKind::Billing) }
}

/// Where the effective configuration came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    File(String),
    /// No config file; `reason` names the missing path.
    Env { reason: String },
}

/// Config file for `kind`, then the checks `kind` needs.
pub fn resolve_config(kind: ServiceKind) -> Result<(AppConfig, ConfigSource), StartupError> {
    resolve_config_at(kind, &configs::config_path_for(kind.name()))
}

/// Environment variables stand in only when `path` does not exist; a file
/// that exists but does not parse stops startup.
pub fn resolve_config_at(
    kind: ServiceKind,
    path: &str,
) -> Result<(AppConfig, ConfigSource), StartupError> {
    let loaded = configs::load_optional(path)
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let (mut cfg, source) = match loaded {
        Some(cfg) => (cfg, ConfigSource::File(path.to_string())),
        None => {
            let reason = format!("{path} not found");
            (AppConfig::from_env(kind.default_port()), ConfigSource::Env { reason })
        }
    };
    validate_for(kind, &mut cfg)?;
    Ok((cfg, source))
}

pub fn validate_for(kind: ServiceKind, cfg: &mut AppConfig) -> Result<(), StartupError> {
    let invalid = |e: anyhow::Error| StartupError::InvalidConfig(e.to_string());
    cfg.server.normalize().map_err(invalid)?;
    if kind.needs_database() {
        cfg.database.normalize_from_env();
        cfg.database.validate().map_err(invalid)?;
    }
    if kind == ServiceKind::Billing {
        cfg.inventory.normalize_from_env();
        cfg.inventory.validate("inventory").map_err(invalid)?;
    }
    Ok(())
}

pub async fn customer_router(db: DatabaseConnection) -> anyhow::Result<Router> {
    schema::ensure_customer_table(&db).await?;
    let customers = CustomerService::new(Arc::new(SeaOrmCustomerRepository::new(db)));
    Ok(routes::customer_app(Arc::new(customers)))
}

/// With `seed`, an empty product table gets the demo catalog.
pub async fn inventory_router(db: DatabaseConnection, seed: bool) -> anyhow::Result<Router> {
    schema::ensure_product_table(&db).await?;
    let products = ProductService::new(Arc::new(SeaOrmProductRepository::new(db)));
    if seed {
        let inserted = products.seed(demo_catalog()).await?;
        info!(inserted, "demo catalog seeded");
    }
    Ok(routes::inventory_app(Arc::new(products)))
}

pub fn billing_router(inventory: &PeerConfig) -> anyhow::Result<Router> {
    let timeout = Duration::from_millis(inventory.timeout_ms);
    let client = inventory_client(&inventory.base_url, timeout)?;
    info!(
        inventory = %client.base_url(),
        timeout_ms = inventory.timeout_ms,
        "inventory client ready"
    );
    Ok(routes::billing_app(Arc::new(BillingService::new(Arc::new(client)))))
}

/// Build the router for `kind` from a validated config.
pub async fn build_app(kind: ServiceKind, cfg: &AppConfig) -> anyhow::Result<Router> {
    match kind {
        ServiceKind::Customer => {
            let db = db::connect_with_config(&cfg.database).await?;
            customer_router(db).await
        }
        ServiceKind::Inventory => {
            let db = db::connect_with_config(&cfg.database).await?;
            inventory_router(db, cfg.server.seed_demo_data).await
        }
        ServiceKind::Billing => billing_router(&cfg.inventory),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, draining connections");
}

/// Build the app and serve it until Ctrl+C.
pub async fn run(kind: ServiceKind, cfg: AppConfig) -> Result<(), StartupError> {
    let app = build_app(kind, &cfg).await?;
    let listener = TcpListener::bind((cfg.server.host.as_str(), cfg.server.port))
        .await
        .map_err(|e| anyhow::anyhow!("bind {}:{}: {e}", cfg.server.host, cfg.server.port))?;
    let addr = listener.local_addr().map_err(anyhow::Error::from)?;
    info!(service = kind.name(), %addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)?;
    Ok(())
}
