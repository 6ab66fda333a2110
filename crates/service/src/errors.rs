use std::fmt::Display;

use common::PageRequestError;
use models::errors::ModelError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Failure kinds surfaced by services and remote clients.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, key: impl Display) -> Self {
        Self::NotFound(format!("{entity} not found with id: {key}"))
    }

    pub fn taken(field: &str, value: &str) -> Self {
        Self::Conflict(format!("{field} already exists: {value}"))
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::InvalidArgument(msg),
            ModelError::Db(msg) => Self::Internal(msg),
        }
    }
}

impl From<PageRequestError> for ServiceError {
    fn from(e: PageRequestError) -> Self { Self::InvalidArgument(e.to_string()) }
}

/// A unique index rejecting a write means a concurrent writer won the race
/// between the existence check and the save.
impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(msg)) = e.sql_err() {
            return Self::Conflict(msg);
        }
        match e {
            DbErr::RecordNotUpdated => Self::NotFound("record no longer exists".into()),
            DbErr::RecordNotFound(msg) => Self::NotFound(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}
