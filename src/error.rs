//! Error types for the store and the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::availability::{Denial, LeaveRangeError};
use crate::calendar::CalendarError;
use crate::models::LeaveStatus;

/// Errors raised by a [`crate::store::CalendarStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    #[error("Event {0} is at capacity")]
    CapacityReached(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_transition(from: LeaveStatus, to: LeaveStatus) -> Self {
        Self::InvalidStateTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }

    pub fn already_exists(entity: &'static str, id: impl ToString) -> Self {
        Self::AlreadyExists {
            entity,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned from route handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Denied(#[from] Denial),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<LeaveRangeError> for AppError {
    fn from(err: LeaveRangeError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Denied(denial) => (
                StatusCode::CONFLICT,
                json!({ "error": denial.to_string(), "reason": denial.code() }),
            ),
            AppError::Store(StoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{entity} not found: {id}") }),
            ),
            AppError::Store(
                err @ (StoreError::AlreadyExists { .. } | StoreError::InvalidStateTransition { .. }),
            ) => {
                (StatusCode::CONFLICT, json!({ "error": err.to_string() }))
            }
            AppError::Store(StoreError::CapacityReached(_)) => (
                StatusCode::CONFLICT,
                json!({ "error": Denial::AtCapacity.to_string(), "reason": Denial::AtCapacity.code() }),
            ),
            AppError::Store(StoreError::Database(e)) => {
                tracing::error!("❌ DB error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "DB error" }))
            }
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
