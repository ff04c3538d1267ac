//! API error handling
//!
//! Maps the billing error taxonomy onto HTTP statuses: validation failures
//! are 400, business-rule conflicts are 409 (carrying the conflicting
//! values in the message), void of a missing invoice is 404, and storage
//! failures stay 5xx.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_billing::BillingError;
use infra_db::DatabaseError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
            ApiError::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match &err {
            BillingError::InvoiceNotFound(_) => ApiError::NotFound(err.to_string()),
            e if e.is_conflict() => ApiError::Conflict(err.to_string()),
            e if e.is_validation() => ApiError::BadRequest(err.to_string()),
            BillingError::Store(_) => ApiError::Database(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else if err.is_constraint_violation() {
            ApiError::Conflict(err.to_string())
        } else {
            ApiError::Database(err.to_string())
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::ProductId;

    #[test]
    fn test_billing_error_statuses() {
        assert!(matches!(
            ApiError::from(BillingError::EmptyInvoice),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(BillingError::InsufficientStock {
                product_id: ProductId::new(),
                available: 4,
                requested: 6,
            }),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(BillingError::InvoiceNotFound("BIL-1".to_string())),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_conflict_message_carries_values() {
        let api_err = ApiError::from(BillingError::InsufficientStock {
            product_id: ProductId::new(),
            available: 4,
            requested: 6,
        });
        let message = api_err.to_string();
        assert!(message.contains("available 4"));
        assert!(message.contains("requested 6"));
    }
}
