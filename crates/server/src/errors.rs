use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// A failed service call plus what the handler was doing (operation and key).
/// Responds with the mapped status code and an empty body.
#[derive(Debug)]
pub struct ApiError {
    pub context: String,
    pub error: ServiceError,
}

impl ApiError {
    pub fn new(context: impl Into<String>, error: ServiceError) -> Self {
        Self { context: context.into(), error }
    }

    /// For `map_err`: `.map_err(ApiError::during(format!("get product {id}")))`.
    pub fn during(context: impl Into<String>) -> impl FnOnce(ServiceError) -> Self {
        let context = context.into();
        move |error| Self { context, error }
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) | ServiceError::InvalidArgument(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Unavailable(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                context = %self.context,
                error = %self.error,
                status = status.as_u16(),
                "request failed"
            );
        } else {
            warn!(
                context = %self.context,
                error = %self.error,
                status = status.as_u16(),
                "request rejected"
            );
        }
        status.into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
