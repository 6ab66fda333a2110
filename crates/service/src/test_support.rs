#![cfg(test)]
use sea_orm::DatabaseConnection;
use models::{db::connect_in_memory, schema};

/// Fresh in-memory database per test with both tables created.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_in_memory().await?;
    schema::ensure_customer_table(&db).await?;
    schema::ensure_product_table(&db).await?;
    Ok(db)
}
