//! Table bootstrap from the entity definitions.
//!
//! Creates missing tables (with their unique indexes) at startup. There is no
//! versioned migration; schema changes are applied out of band.

use sea_orm::{ConnectionTrait, DatabaseConnection, EntityName, EntityTrait, Schema};
use tracing::info;

use crate::{customer, errors::ModelError, product};

async fn create_if_missing<E: EntityTrait>(
    db: &DatabaseConnection,
    entity: E,
) -> Result<(), ModelError> {
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await.map_err(|e| ModelError::Db(e.to_string()))?;
    info!(table = entity.table_name(), "table ensured");
    Ok(())
}

pub async fn ensure_customer_table(db: &DatabaseConnection) -> Result<(), ModelError> {
    create_if_missing(db, customer::Entity).await
}

pub async fn ensure_product_table(db: &DatabaseConnection) -> Result<(), ModelError> {
    create_if_missing(db, product::Entity).await
}
