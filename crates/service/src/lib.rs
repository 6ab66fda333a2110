//! Service layer for the record services.
//! - Generic resource rules shared by customers and products.
//! - SeaORM repositories in `customer` and `product`.
//! - Remote read client used by billing to reach inventory.

pub mod errors;
pub mod resource;
pub mod customer;
pub mod product;
pub mod remote;
pub mod billing;
#[cfg(test)]
pub mod test_support;
