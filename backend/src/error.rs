//! Error handling for the Warehouse Inventory Management Platform
//!
//! Every core failure carries enough structure (a field identifier and a
//! message) for the HTTP layer to return a per-field validation error rather
//! than an opaque failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Referenced entity does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Item's type does not match the expected type for the unit
    #[error("Item type mismatch: {message}")]
    TypeMismatch { field: String, message: String },

    // Section reservation or partition quantity would exceed its bound
    #[error("Capacity exceeded: {message}")]
    CapacityExceeded { field: String, message: String },

    // RFID tag already bound to another unit
    #[error("RFID tag unavailable: {0}")]
    TagUnavailable(String),

    // Threshold pair missing, inverted, or out of range
    #[error("Invalid thresholds: {message}")]
    ThresholdInvalid { field: String, message: String },

    // Delete or type change blocked by dependent rows
    #[error("Operation blocked: {0}")]
    ReferentialBlock(String),

    // Bad date range or granularity on a history query
    #[error("Invalid range: {message}")]
    ValidationRange { field: String, message: String },

    // General field validation failure
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // External service errors
    #[error("Image storage error: {0}")]
    StorageError(String),

    #[error("Vision inference error: {0}")]
    VisionError(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::TypeMismatch { .. } => "TYPE_MISMATCH",
            AppError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            AppError::TagUnavailable(_) => "TAG_UNAVAILABLE",
            AppError::ThresholdInvalid { .. } => "THRESHOLD_INVALID",
            AppError::ReferentialBlock(_) => "REFERENTIAL_BLOCK",
            AppError::ValidationRange { .. } => "VALIDATION_RANGE",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::StorageError(_) => "STORAGE_ERROR",
            AppError::VisionError(_) => "VISION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TypeMismatch { .. }
            | AppError::ThresholdInvalid { .. }
            | AppError::ValidationRange { .. }
            | AppError::Validation { .. }
            | AppError::StorageError(_) => StatusCode::BAD_REQUEST,
            AppError::CapacityExceeded { .. }
            | AppError::TagUnavailable(_)
            | AppError::ReferentialBlock(_) => StatusCode::CONFLICT,
            AppError::VisionError(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            AppError::TypeMismatch { field, .. }
            | AppError::CapacityExceeded { field, .. }
            | AppError::ThresholdInvalid { field, .. }
            | AppError::ValidationRange { field, .. }
            | AppError::Validation { field, .. } => Some(field.clone()),
            AppError::TagUnavailable(_) => Some("rfid_tag_id".to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal server error: {}", self);
        }

        let message = match &self {
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                field: self.field(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience result type for handlers and services
pub type AppResult<T> = Result<T, AppError>;
