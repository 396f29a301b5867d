//! Error handling module
//!
//! Provides unified error types and handling for the entire application.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-wide error type
///
/// One variant per failure kind the service can report; the store is the
/// only source of unclassified failures.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Team already exists: {0}")]
    TeamExists(String),

    #[error("PR already exists: {0}")]
    PrExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("PR is merged: {0}")]
    PrMerged(String),

    #[error("Reviewer is not assigned: {0}")]
    NotAssigned(String),

    #[error("No active replacement candidate")]
    NoCandidate,

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            AppError::Store(e) => {
                error!("Store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A storage error occurred".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::TeamExists(name) => (
                StatusCode::BAD_REQUEST,
                "TEAM_EXISTS",
                format!("team_name '{}' already exists", name),
                None,
            ),
            AppError::PrExists(id) => (
                StatusCode::CONFLICT,
                "PR_EXISTS",
                format!("PR id '{}' already exists", id),
                None,
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
                None,
            ),
            AppError::PrMerged(id) => (
                StatusCode::CONFLICT,
                "PR_MERGED",
                format!("cannot reassign on merged PR '{}'", id),
                None,
            ),
            AppError::NotAssigned(msg) => (
                StatusCode::CONFLICT,
                "NOT_ASSIGNED",
                msg.clone(),
                None,
            ),
            AppError::NoCandidate => (
                StatusCode::CONFLICT,
                "NO_CANDIDATE",
                "no active replacement candidate in team".to_string(),
                None,
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: details,
            code: Some(error_code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}
