use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::entities::booking::BookingStatus;

pub type AppResult<T> = Result<T, AppError>;

/// One resource that could not cover a requested reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub resource: &'static str,
    pub requested: i32,
    pub available: i32,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Insufficient capacity")]
    InsufficientCapacity { shortfalls: Vec<Shortfall> },
    #[error("Illegal booking transition from {from} to {to}")]
    IllegalTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("Concurrent update conflict, please try again")]
    ConcurrencyConflict,
    #[error("{0}")]
    Internal(String),
    #[error("Database error: {0}")]
    Db(DbErr),
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        // Postgres aborts one side of a deadlock and serialization failures
        // under contention; both are transient, not business facts.
        let msg = err.to_string();
        if msg.contains("deadlock detected") || msg.contains("could not serialize access") {
            AppError::ConcurrencyConflict
        } else {
            AppError::Db(err)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": msg }),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": msg }),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                serde_json::json!({ "error": msg }),
            ),
            AppError::InsufficientCapacity { ref shortfalls } => (
                StatusCode::CONFLICT,
                serde_json::json!({
                    "error": "Insufficient capacity",
                    "shortfalls": shortfalls,
                }),
            ),
            AppError::IllegalTransition { from, to } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({
                    "error": format!("Illegal booking transition from {} to {}", from, to),
                    "from": from,
                    "to": to,
                }),
            ),
            AppError::ConcurrencyConflict => (
                StatusCode::CONFLICT,
                serde_json::json!({ "error": "Concurrent update conflict, please try again" }),
            ),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal server error" }),
                )
            }
            AppError::Db(ref err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
