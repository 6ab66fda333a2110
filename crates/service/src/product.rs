use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use common::{PageRequest, Slice};
use models::{non_blank, product};
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::resource::{fetch_slice, Resource, ResourceRepository, ResourceService};

impl Resource for product::Model {
    type Id = i64;

    const KIND: &'static str = "product";
    const UNIQUE_FIELD: &'static str = "name";

    fn id(&self) -> i64 { self.id }

    fn unique_value(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// Price is checked before quantity so the first offending field is reported.
    fn validate(&self) -> Result<(), ServiceError> {
        product::validate_price(self.price)?;
        product::validate_quantity(self.quantity)?;
        Ok(())
    }

    fn merge_from(&mut self, incoming: Self) {
        self.name = incoming.name;
        self.price = incoming.price;
        self.quantity = incoming.quantity;
    }

    fn clear_id(&mut self) { self.id = 0; }
}

/// Product-only queries on top of the generic repository contract.
#[async_trait]
pub trait ProductQueries: Send + Sync {
    /// Case-insensitive substring match on name.
    async fn search_by_name(
        &self,
        fragment: &str,
        request: PageRequest,
    ) -> Result<Slice<product::Model>, ServiceError>;
    /// Inclusive on both bounds.
    async fn find_by_price_between(
        &self,
        min: f64,
        max: f64,
        request: PageRequest,
    ) -> Result<Slice<product::Model>, ServiceError>;
    /// Strictly `quantity < threshold`.
    async fn find_low_stock(
        &self,
        threshold: i32,
        request: PageRequest,
    ) -> Result<Slice<product::Model>, ServiceError>;
    /// Every record, unpaged.
    async fn find_every(&self) -> Result<Vec<product::Model>, ServiceError>;
    /// `SUM(quantity)` computed by storage; 0 on an empty table.
    async fn total_quantity(&self) -> Result<i64, ServiceError>;
}

/// SeaORM-backed product storage.
pub struct SeaOrmProductRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    fn ordered() -> sea_orm::Select<product::Entity> {
        product::Entity::find().order_by_asc(product::Column::Id)
    }
}

#[async_trait]
impl ResourceRepository<product::Model> for SeaOrmProductRepository {
    async fn find_by_id(&self, id: &i64) -> Result<Option<product::Model>, ServiceError> {
        Ok(product::Entity::find_by_id(*id).one(&self.db).await?)
    }

    async fn find_all(&self, request: PageRequest) -> Result<Slice<product::Model>, ServiceError> {
        fetch_slice(&self.db, Self::ordered(), request).await
    }

    async fn find_by_unique(&self, name: &str) -> Result<Option<product::Model>, ServiceError> {
        Ok(product::Entity::find().filter(product::Column::Name.eq(name)).one(&self.db).await?)
    }

    async fn exists_by_id(&self, id: &i64) -> Result<bool, ServiceError> {
        Ok(product::Entity::find_by_id(*id).count(&self.db).await? > 0)
    }

    async fn exists_by_unique(&self, name: &str) -> Result<bool, ServiceError> {
        let matches = product::Entity::find()
            .filter(product::Column::Name.eq(name))
            .count(&self.db)
            .await?;
        Ok(matches > 0)
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(product::Entity::find().count(&self.db).await?)
    }

    async fn save(&self, entity: product::Model) -> Result<product::Model, ServiceError> {
        let transient = entity.is_transient();
        let am = product::ActiveModel {
            id: if transient { NotSet } else { Set(entity.id) },
            name: Set(non_blank(entity.name)),
            price: Set(entity.price),
            quantity: Set(entity.quantity),
        };
        if transient {
            Ok(am.insert(&self.db).await?)
        } else {
            Ok(am.update(&self.db).await?)
        }
    }

    async fn delete_by_id(&self, id: &i64) -> Result<(), ServiceError> {
        product::Entity::delete_by_id(*id).exec(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductQueries for SeaOrmProductRepository {
    async fn search_by_name(
        &self,
        fragment: &str,
        request: PageRequest,
    ) -> Result<Slice<product::Model>, ServiceError> {
        let escaped = escape_like(&fragment.to_lowercase());
        let pattern = LikeExpr::new(format!("%{escaped}%")).escape('\\');
        let name = Expr::expr(Func::lower(Expr::col(product::Column::Name)));
        fetch_slice(&self.db, Self::ordered().filter(name.like(pattern)), request).await
    }

    async fn find_by_price_between(
        &self,
        min: f64,
        max: f64,
        request: PageRequest,
    ) -> Result<Slice<product::Model>, ServiceError> {
        let select = Self::ordered().filter(product::Column::Price.between(min, max));
        fetch_slice(&self.db, select, request).await
    }

    async fn find_low_stock(
        &self,
        threshold: i32,
        request: PageRequest,
    ) -> Result<Slice<product::Model>, ServiceError> {
        let select = Self::ordered().filter(product::Column::Quantity.lt(threshold));
        fetch_slice(&self.db, select, request).await
    }

    async fn find_every(&self) -> Result<Vec<product::Model>, ServiceError> {
        Ok(Self::ordered().all(&self.db).await?)
    }

    async fn total_quantity(&self) -> Result<i64, ServiceError> {
        let total: Option<Option<i64>> = product::Entity::find()
            .select_only()
            .column_as(Expr::col(product::Column::Quantity).sum(), "total_quantity")
            .into_tuple()
            .one(&self.db)
            .await?;
        Ok(total.flatten().unwrap_or(0))
    }
}

/// Make `%`, `_` and `\` match themselves under `LIKE ... ESCAPE '\'`.
fn escape_like(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Product rules: the generic resource rules plus quantity patching,
/// catalog queries and inventory aggregates.
pub struct ProductService<R = SeaOrmProductRepository> {
    core: Arc<ResourceService<product::Model, R>>,
    repo: Arc<R>,
}

impl<R> ProductService<R>
where
    R: ResourceRepository<product::Model> + ProductQueries,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { core: Arc::new(ResourceService::new(Arc::clone(&repo))), repo }
    }

    /// The generic CRUD half, shared with the generic HTTP handlers.
    pub fn core(&self) -> Arc<ResourceService<product::Model, R>> { Arc::clone(&self.core) }

    pub async fn get_by_name(&self, name: &str) -> Result<product::Model, ServiceError> {
        self.core.get_by_unique(name).await
    }

    pub async fn exists_by_name(&self, name: &str) -> Result<bool, ServiceError> {
        self.core.exists_by_unique(name).await
    }

    #[instrument(skip(self))]
    pub async fn search_by_name(
        &self,
        name: &str,
        request: PageRequest,
    ) -> Result<Slice<product::Model>, ServiceError> {
        info!("searching products by name");
        self.repo.search_by_name(name, request).await
    }

    #[instrument(skip(self))]
    pub async fn by_price_range(
        &self,
        min: f64,
        max: f64,
        request: PageRequest,
    ) -> Result<Slice<product::Model>, ServiceError> {
        info!("fetching products by price range");
        self.repo.find_by_price_between(min, max, request).await
    }

    #[instrument(skip(self))]
    pub async fn low_stock(
        &self,
        threshold: i32,
        request: PageRequest,
    ) -> Result<Slice<product::Model>, ServiceError> {
        info!("fetching low stock products");
        self.repo.find_low_stock(threshold, request).await
    }

    /// Validate first, then load, then set only `quantity`.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        id: i64,
        quantity: i32,
    ) -> Result<product::Model, ServiceError> {
        info!("updating product quantity");
        product::validate_quantity(quantity)?;
        let mut existing = self.core.get(&id).await?;
        existing.quantity = quantity;
        self.repo.save(existing).await
    }

    /// Full scan: sum of `trunc(price * quantity)` per record.
    pub async fn total_inventory_value(&self) -> Result<i64, ServiceError> {
        info!("calculating total inventory value");
        let products = self.repo.find_every().await?;
        Ok(products.iter().map(product::Model::stock_value).sum())
    }

    /// Storage-side aggregate; must agree with a manual scan of `quantity`.
    pub async fn total_inventory_quantity(&self) -> Result<i64, ServiceError> {
        info!("calculating total inventory quantity");
        self.repo.total_quantity().await
    }

    /// Insert the demo catalog when the table is empty. Returns how many were inserted.
    pub async fn seed(&self, products: Vec<product::Model>) -> Result<usize, ServiceError> {
        if self.core.count().await? > 0 {
            return Ok(0);
        }
        let mut inserted = 0;
        for p in products {
            let saved = self.core.create(p).await?;
            info!(
                id = saved.id,
                name = ?saved.name,
                price = saved.price,
                quantity = saved.quantity,
                "seeded product"
            );
            inserted += 1;
        }
        Ok(inserted)
    }
}

impl<R> Deref for ProductService<R> {
    type Target = ResourceService<product::Model, R>;

    fn deref(&self) -> &Self::Target { &self.core }
}
