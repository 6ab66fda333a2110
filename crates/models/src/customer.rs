use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer record. `id` is assigned on first save; `email` is unique when present.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[sea_orm(unique)]
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// An id that storage has not assigned yet.
    pub fn is_transient(&self) -> bool { self.id.trim().is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_without_id() {
        let m: Model = serde_json::from_str(r#"{"name":"Ada","email":"ada@example.com"}"#).unwrap();
        assert!(m.is_transient());
        assert_eq!(m.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn missing_email_is_none() {
        let m: Model = serde_json::from_str(r#"{"name":"Bob"}"#).unwrap();
        assert!(m.email.is_none());
    }
}
