use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use giftly_catalog::{InventoryError, TaxonomyError, TierIssue, ValidationError};
use giftly_core::CoreError;
use giftly_order::{CartError, FavoriteError, ProposalError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    InvalidPricing(ValidationError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, issues) = match self {
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::InvalidPricing(err) => {
                let msg = err.to_string();
                (StatusCode::BAD_REQUEST, msg, Some(err.issues))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, None),
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            }
        };

        let body = match issues {
            Some(issues) => Json(json!({ "error": error_message, "issues": issues })),
            None => Json(json!({ "error": error_message })),
        };

        (status, body).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidPricing(err)
    }
}

impl From<Vec<TierIssue>> for AppError {
    fn from(issues: Vec<TierIssue>) -> Self {
        AppError::InvalidPricing(ValidationError { issues })
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Conflict(msg) => AppError::Conflict(msg),
            CoreError::NotFound(msg) => AppError::NotFound(msg),
            CoreError::StorageError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        AppError::Unprocessable(err.to_string())
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound(_) | CartError::ItemNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            CartError::ProductUnavailable(_) => AppError::Unprocessable(err.to_string()),
            CartError::Inventory(inner) => inner.into(),
            CartError::Storage(inner) => inner.into(),
        }
    }
}

impl From<ProposalError> for AppError {
    fn from(err: ProposalError) -> Self {
        match err {
            ProposalError::NotFound(_) | ProposalError::ProductNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            ProposalError::Empty | ProposalError::Invalid(_) | ProposalError::InvalidCustomPrice(_) => {
                AppError::BadRequest(err.to_string())
            }
            ProposalError::InvalidTransition { .. } | ProposalError::Expired(_) => {
                AppError::Conflict(err.to_string())
            }
            ProposalError::ProductUnavailable(_) => AppError::Unprocessable(err.to_string()),
            ProposalError::Inventory(inner) => inner.into(),
            ProposalError::Storage(inner) => inner.into(),
        }
    }
}

impl From<TaxonomyError> for AppError {
    fn from(err: TaxonomyError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<FavoriteError> for AppError {
    fn from(err: FavoriteError) -> Self {
        match err {
            FavoriteError::ProductNotFound(_) => AppError::NotFound(err.to_string()),
            FavoriteError::ProductUnavailable(_) => AppError::Unprocessable(err.to_string()),
            FavoriteError::Storage(inner) => inner.into(),
        }
    }
}
