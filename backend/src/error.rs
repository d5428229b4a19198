//! Error handling for the Bakery Admin backend
//!
//! Every failure reaching a handler is rendered as
//! `{ "error": { "code", "message", "field"? } }` with a matching status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::validation::StockRuleError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Insufficient permissions: requires {0}")]
    InsufficientPermissions(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Confirmation required: {message}")]
    ConfirmationRequired { field: String, message: String },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    // External service errors
    #[error("Image hosting error: {0}")]
    ImageHosting(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Machine-readable code used in the response body
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::AccountInactive => "ACCOUNT_INACTIVE",
            AppError::InsufficientPermissions(_) => "INSUFFICIENT_PERMISSIONS",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Validation { .. } | AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::ConfirmationRequired { .. } => "CONFIRMATION_REQUIRED",
            AppError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            AppError::ImageHosting(_) => "IMAGE_HOSTING_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::TokenExpired
            | AppError::InvalidToken
            | AppError::AccountInactive
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            AppError::Validation { .. } | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ConfirmationRequired { .. } => StatusCode::PRECONDITION_REQUIRED,
            AppError::DuplicateEntry(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ImageHosting(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_)
            | AppError::DatabaseError(_)
            | AppError::Internal(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (message, field) = match self {
            AppError::InvalidCredentials => ("Invalid email or password".to_string(), None),
            AppError::TokenExpired => ("Session has expired, please sign in again".to_string(), None),
            AppError::InvalidToken => ("Invalid token".to_string(), None),
            AppError::AccountInactive => ("This account has been deactivated".to_string(), None),
            AppError::InsufficientPermissions(permission) => (
                format!("You do not have permission to perform this action ({})", permission),
                None,
            ),
            AppError::Unauthorized(msg) => (msg.clone(), None),
            AppError::Validation { field, message } => (message.clone(), Some(field.clone())),
            AppError::ValidationError(msg) => (msg.clone(), None),
            AppError::ConfirmationRequired { field, message } => (message.clone(), Some(field.clone())),
            AppError::DuplicateEntry(field) => (
                format!("A record with this {} already exists", field),
                Some(field.clone()),
            ),
            AppError::Conflict(msg) => (msg.clone(), None),
            AppError::NotFound(resource) => (format!("{} not found", resource), None),
            AppError::InsufficientStock(msg) => (msg.clone(), Some("delta".to_string())),
            AppError::ImageHosting(msg) => (format!("Image hosting error: {}", msg), None),
            AppError::Configuration(msg) => (format!("Configuration error: {}", msg), None),
            AppError::DatabaseError(_) => ("A database error occurred".to_string(), None),
            AppError::Internal(msg) => (msg.clone(), None),
            AppError::InternalError(_) => ("An internal server error occurred".to_string(), None),
        };

        ErrorDetail {
            code: self.code().to_string(),
            message,
            field,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: invalid value", field),
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        AppError::ValidationError(message)
    }
}

impl From<StockRuleError> for AppError {
    fn from(err: StockRuleError) -> Self {
        let field = err.field().to_string();
        match err {
            StockRuleError::ExpiryConfirmationRequired { .. } => AppError::ConfirmationRequired {
                field,
                message: err.to_string(),
            },
            StockRuleError::NegativeStock { .. } => AppError::InsufficientStock(err.to_string()),
            _ => AppError::Validation {
                field,
                message: err.to_string(),
            },
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: self.detail() })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_rule_mapping() {
        let err: AppError = StockRuleError::NegativeStock { current: 15, delta: -20 }.into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "INSUFFICIENT_STOCK");

        let err: AppError = StockRuleError::ExpiryConfirmationRequired {
            expiry: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::PRECONDITION_REQUIRED);

        let err: AppError = StockRuleError::NoVariety.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail().field.as_deref(), Some("varieties"));
    }

    #[test]
    fn test_statuses() {
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound("Order".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InsufficientPermissions("stock:edit".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::ImageHosting("down".into()).status(), StatusCode::BAD_GATEWAY);
    }
}
