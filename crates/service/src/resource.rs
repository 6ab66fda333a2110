//! Generic resource pattern shared by every entity.
//!
//! - `Resource` describes an entity: its id type, its unique field and its
//!   field constraints.
//! - `ResourceRepository` is the storage capability each entity adapter provides.
//! - `ResourceService` layers the business rules (uniqueness, not-found,
//!   partial merge) over any repository.
//!
//! Uniqueness is checked with a separate `exists_by_unique` call before
//! `save`; two concurrent writers can both pass the check. Storage carries a
//! unique index, so the loser surfaces as `ServiceError::Conflict` from `save`.

use std::{fmt::{Debug, Display}, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use common::{PageRequest, Slice};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QuerySelect, Select};
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;

pub trait Resource: Clone + Debug + Send + Sync + 'static {
    type Id: Clone + Debug + Display + Send + Sync + 'static;

    /// Entity name used in logs and error messages.
    const KIND: &'static str;
    /// Name of the field that must not collide across records.
    const UNIQUE_FIELD: &'static str;

    fn id(&self) -> Self::Id;

    /// Unique field value, `None` when absent or blank.
    fn unique_value(&self) -> Option<&str>;

    /// Field constraints other than uniqueness.
    fn validate(&self) -> Result<(), ServiceError> { Ok(()) }

    /// Copy the mutable fields of `incoming` onto `self`. Never touches the id.
    fn merge_from(&mut self, incoming: Self);

    /// Forget any client-supplied id so storage assigns one.
    fn clear_id(&mut self);
}

#[async_trait]
pub trait ResourceRepository<R: Resource>: Send + Sync {
    async fn find_by_id(&self, id: &R::Id) -> Result<Option<R>, ServiceError>;
    /// Page through every record in primary-key order.
    async fn find_all(&self, request: PageRequest) -> Result<Slice<R>, ServiceError>;
    async fn find_by_unique(&self, value: &str) -> Result<Option<R>, ServiceError>;
    async fn exists_by_id(&self, id: &R::Id) -> Result<bool, ServiceError>;
    async fn exists_by_unique(&self, value: &str) -> Result<bool, ServiceError>;
    async fn count(&self) -> Result<u64, ServiceError>;
    /// Insert when the id is unassigned, otherwise overwrite every field.
    async fn save(&self, entity: R) -> Result<R, ServiceError>;
    async fn delete_by_id(&self, id: &R::Id) -> Result<(), ServiceError>;
}

/// Fetch one page of `select` plus the total count.
///
/// Pages past the end, including ones whose offset does not fit in a `u64`,
/// come back empty without touching storage a second time.
pub(crate) async fn fetch_slice<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    request: PageRequest,
) -> Result<Slice<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let request = request.validate()?;
    let num_items = select.clone().count(db).await?;
    let offset = match request.page.checked_mul(request.size) {
        Some(offset) if offset < num_items => offset,
        _ => return Ok(Slice::new(Vec::new(), request, num_items)),
    };
    // offset < num_items, so both bounds fit the backend's signed integers
    let limit = request.size.min(num_items - offset);
    let items = select.offset(offset).limit(limit).all(db).await?;
    Ok(Slice::new(items, request, num_items))
}

/// Business rules over a repository, instantiated once per entity type.
pub struct ResourceService<R, Repo> {
    repo: Arc<Repo>,
    _resource: PhantomData<fn() -> R>,
}

impl<R, Repo> ResourceService<R, Repo>
where
    R: Resource,
    Repo: ResourceRepository<R>,
{
    pub fn new(repo: Arc<Repo>) -> Self { Self { repo, _resource: PhantomData } }

    pub fn repository(&self) -> &Arc<Repo> { &self.repo }

    /// Out-of-range pages come back empty with the real totals.
    #[instrument(skip(self), fields(kind = R::KIND))]
    pub async fn list(&self, request: PageRequest) -> Result<Slice<R>, ServiceError> {
        info!(page = request.page, size = request.size, "fetching page");
        self.repo.find_all(request).await
    }

    pub async fn list_default(&self) -> Result<Slice<R>, ServiceError> {
        self.list(PageRequest::default()).await
    }

    #[instrument(skip(self), fields(kind = R::KIND))]
    pub async fn get(&self, id: &R::Id) -> Result<R, ServiceError> {
        info!(%id, "fetching by id");
        self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found(R::KIND, id))
    }

    #[instrument(skip(self), fields(kind = R::KIND, field = R::UNIQUE_FIELD))]
    pub async fn get_by_unique(&self, value: &str) -> Result<R, ServiceError> {
        info!(%value, "fetching by unique field");
        self.repo
            .find_by_unique(value)
            .await?
            .ok_or_else(|| {
                let (kind, field) = (R::KIND, R::UNIQUE_FIELD);
                ServiceError::NotFound(format!("{kind} not found with {field}: {value}"))
            })
    }

    /// Uniqueness first, then field constraints, then save.
    #[instrument(skip(self, entity), fields(kind = R::KIND))]
    pub async fn create(&self, mut entity: R) -> Result<R, ServiceError> {
        entity.clear_id();
        if let Some(value) = entity.unique_value() {
            if self.repo.exists_by_unique(value).await? {
                warn!(field = R::UNIQUE_FIELD, %value, "unique value already taken");
                return Err(ServiceError::taken(R::UNIQUE_FIELD, value));
            }
        }
        entity.validate()?;
        let saved = self.repo.save(entity).await?;
        info!(id = %saved.id(), "created");
        Ok(saved)
    }

    /// Merge the mutable fields of `incoming` onto the stored record.
    #[instrument(skip(self, incoming), fields(kind = R::KIND))]
    pub async fn update(&self, id: &R::Id, incoming: R) -> Result<R, ServiceError> {
        info!(%id, "updating");
        let mut existing = self.get(id).await?;
        if let Some(value) = incoming.unique_value() {
            if existing.unique_value() != Some(value) && self.repo.exists_by_unique(value).await? {
                warn!(%id, field = R::UNIQUE_FIELD, %value, "unique value already taken");
                return Err(ServiceError::taken(R::UNIQUE_FIELD, value));
            }
        }
        incoming.validate()?;
        existing.merge_from(incoming);
        self.repo.save(existing).await
    }

    #[instrument(skip(self), fields(kind = R::KIND))]
    pub async fn delete(&self, id: &R::Id) -> Result<(), ServiceError> {
        info!(%id, "deleting");
        if !self.repo.exists_by_id(id).await? {
            return Err(ServiceError::not_found(R::KIND, id));
        }
        self.repo.delete_by_id(id).await
    }

    /// Query, not lookup: an absent id is `Ok(false)`.
    pub async fn exists(&self, id: &R::Id) -> Result<bool, ServiceError> {
        info!(kind = R::KIND, %id, "checking existence");
        self.repo.exists_by_id(id).await
    }

    pub async fn exists_by_unique(&self, value: &str) -> Result<bool, ServiceError> {
        info!(
            kind = R::KIND,
            field = R::UNIQUE_FIELD,
            %value,
            "checking existence by unique field"
        );
        self.repo.exists_by_unique(value).await
    }

    pub async fn count(&self) -> Result<u64, ServiceError> {
        info!(kind = R::KIND, "counting");
        self.repo.count().await
    }
}
