use async_trait::async_trait;
use common::{PageRequest, Slice};
use models::{customer, non_blank};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::resource::{fetch_slice, Resource, ResourceRepository, ResourceService};

impl Resource for customer::Model {
    type Id = String;

    const KIND: &'static str = "customer";
    const UNIQUE_FIELD: &'static str = "email";

    fn id(&self) -> String { self.id.clone() }

    fn unique_value(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.trim().is_empty())
    }

    fn merge_from(&mut self, incoming: Self) {
        self.name = incoming.name;
        self.email = incoming.email;
    }

    fn clear_id(&mut self) { self.id.clear(); }
}

pub type CustomerService<R = SeaOrmCustomerRepository> = ResourceService<customer::Model, R>;

/// SeaORM-backed customer storage.
pub struct SeaOrmCustomerRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCustomerRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl ResourceRepository<customer::Model> for SeaOrmCustomerRepository {
    async fn find_by_id(&self, id: &String) -> Result<Option<customer::Model>, ServiceError> {
        Ok(customer::Entity::find_by_id(id.clone()).one(&self.db).await?)
    }

    async fn find_all(&self, request: PageRequest) -> Result<Slice<customer::Model>, ServiceError> {
        let select = customer::Entity::find().order_by_asc(customer::Column::Id);
        fetch_slice(&self.db, select, request).await
    }

    async fn find_by_unique(&self, email: &str) -> Result<Option<customer::Model>, ServiceError> {
        Ok(customer::Entity::find().filter(customer::Column::Email.eq(email)).one(&self.db).await?)
    }

    async fn exists_by_id(&self, id: &String) -> Result<bool, ServiceError> {
        Ok(customer::Entity::find_by_id(id.clone()).count(&self.db).await? > 0)
    }

    async fn exists_by_unique(&self, email: &str) -> Result<bool, ServiceError> {
        let matches = customer::Entity::find()
            .filter(customer::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(matches > 0)
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(customer::Entity::find().count(&self.db).await?)
    }

    async fn save(&self, entity: customer::Model) -> Result<customer::Model, ServiceError> {
        let transient = entity.is_transient();
        let am = customer::ActiveModel {
            id: Set(if transient { Uuid::new_v4().to_string() } else { entity.id }),
            name: Set(entity.name),
            email: Set(non_blank(entity.email)),
        };
        if transient {
            Ok(am.insert(&self.db).await?)
        } else {
            Ok(am.update(&self.db).await?)
        }
    }

    async fn delete_by_id(&self, id: &String) -> Result<(), ServiceError> {
        customer::Entity::delete_by_id(id.clone()).exec(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::test_support::get_db;

    fn customer(name: &str, email: Option<&str>) -> customer::Model {
        customer::Model { id: String::new(), name: Some(name.into()), email: email.map(Into::into) }
    }

    async fn service() -> Result<CustomerService, anyhow::Error> {
        let db = get_db().await?;
        Ok(CustomerService::new(Arc::new(SeaOrmCustomerRepository::new(db))))
    }

    #[tokio::test]
    async fn create_assigns_id_and_ignores_supplied_one() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        let mut input = customer("Ada", Some("ada@example.com"));
        input.id = "client-chosen".into();
        let created = svc.create(input).await?;
        assert_ne!(created.id, "client-chosen");
        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(svc.get(&created.id).await?, created);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        svc.create(customer("Ada", Some("ada@example.com"))).await?;
        let err = svc.create(customer("Other Ada", Some("ada@example.com"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(svc.count().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn absent_or_empty_email_never_conflicts() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        svc.create(customer("A", None)).await?;
        svc.create(customer("B", None)).await?;
        svc.create(customer("C", Some(""))).await?;
        svc.create(customer("D", Some(""))).await?;
        assert_eq!(svc.count().await?, 4);
        Ok(())
    }

    #[tokio::test]
    async fn storage_index_catches_duplicates_that_skip_the_check() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        svc.create(customer("Ada", Some("ada@example.com"))).await?;
        let err = svc.repository().save(customer("Racer", Some("ada@example.com"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        Ok(())
    }

    #[tokio::test]
    async fn update_merges_fields_and_keeps_id() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        let created = svc.create(customer("Ada", Some("ada@example.com"))).await?;
        let mut incoming = customer("Ada Lovelace", Some("ada@lovelace.org"));
        incoming.id = "another-id".into();
        let updated = svc.update(&created.id, incoming).await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(updated.email.as_deref(), Some("ada@lovelace.org"));
        assert!(!svc.exists(&"another-id".to_string()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn update_keeping_own_email_is_not_a_conflict() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        let created = svc.create(customer("Ada", Some("ada@example.com"))).await?;
        let updated = svc.update(&created.id, customer("Renamed", Some("ada@example.com"))).await?;
        assert_eq!(updated.name.as_deref(), Some("Renamed"));
        Ok(())
    }

    #[tokio::test]
    async fn update_to_taken_email_conflicts() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        svc.create(customer("Ada", Some("ada@example.com"))).await?;
        let bob = svc.create(customer("Bob", Some("bob@example.com"))).await?;
        let err = svc.update(&bob.id, customer("Bob", Some("ada@example.com"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_is_not_found() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        let err = svc.update(&"nope".to_string(), customer("X", None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn delete_twice_second_is_not_found() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        let created = svc.create(customer("Ada", None)).await?;
        svc.delete(&created.id).await?;
        assert!(matches!(svc.delete(&created.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.get(&created.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn exists_reports_false_for_absent_id() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        let created = svc.create(customer("Ada", None)).await?;
        assert!(svc.exists(&created.id).await?);
        assert!(!svc.exists(&"missing".to_string()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn lookup_by_email() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        let created = svc.create(customer("Ada", Some("ada@example.com"))).await?;
        assert_eq!(svc.get_by_unique("ada@example.com").await?.id, created.id);
        assert!(svc.exists_by_unique("ada@example.com").await?);
        assert!(matches!(svc.get_by_unique("bob@example.com").await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn pages_follow_ceiling_math() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        for i in 0..7 {
            svc.create(customer(&format!("c{i}"), Some(&format!("c{i}@example.com")))).await?;
        }
        let first = svc.list(PageRequest::new(0, 3)).await?;
        assert_eq!(first.items.len(), 3);
        assert_eq!(first.num_items, 7);
        assert_eq!(first.num_pages, 3);
        let last = svc.list(PageRequest::new(2, 3)).await?;
        assert_eq!(last.items.len(), 1);
        let beyond = svc.list(PageRequest::new(9, 3)).await?;
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.num_items, 7);

        let again = svc.list(PageRequest::new(0, 3)).await?;
        assert_eq!(again.items, first.items);
        Ok(())
    }

    #[tokio::test]
    async fn zero_size_page_is_invalid() -> Result<(), anyhow::Error> {
        let svc = service().await?;
        assert!(matches!(svc.list(PageRequest::new(0, 0)).await, Err(ServiceError::InvalidArgument(_))));
        Ok(())
    }
}
