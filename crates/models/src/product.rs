use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Inventory product. `name` is unique when present; `price` and `quantity` are non-negative.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub id: i64,
    #[sea_orm(unique)]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_transient(&self) -> bool { self.id == 0 }

    /// Stock value of this line, truncated to a whole amount.
    pub fn stock_value(&self) -> i64 {
        (self.price * f64::from(self.quantity)) as i64
    }
}

pub fn validate_price(price: f64) -> Result<(), ModelError> {
    if price < 0.0 {
        return Err(ModelError::Validation("price cannot be negative".into()));
    }
    Ok(())
}

pub fn validate_quantity(quantity: i32) -> Result<(), ModelError> {
    if quantity < 0 {
        return Err(ModelError::Validation("quantity cannot be negative".into()));
    }
    Ok(())
}

/// Demo catalog inserted by the inventory service when seeding is enabled.
pub fn demo_catalog() -> Vec<Model> {
    [("Laptop", 1200.0, 10), ("Phone", 800.0, 15), ("Tablet", 500.0, 20)]
        .into_iter()
        .map(|(name, price, quantity)| Model {
            id: 0,
            name: Some(name.to_string()),
            price,
            quantity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_and_quantity_bounds() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(-0.01).is_err());
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn validation_messages_name_the_field() {
        assert!(validate_price(-1.0).unwrap_err().to_string().contains("price"));
        assert!(validate_quantity(-1).unwrap_err().to_string().contains("quantity"));
    }

    #[test]
    fn stock_value_truncates() {
        let p = Model { id: 1, name: None, price: 2.75, quantity: 3 };
        assert_eq!(p.stock_value(), 8);
    }

    #[test]
    fn demo_catalog_totals() {
        let total: i64 = demo_catalog().iter().map(Model::stock_value).sum();
        assert_eq!(total, 34_000);
    }
}
