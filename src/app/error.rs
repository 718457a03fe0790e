use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::Error as SqlxError;

use crate::app::memberships::MembershipError;

/// Application error type for unified error handling across the HTTP surface.
#[derive(Debug)]
pub enum AppError {
    /// Validation errors (400 Bad Request) - invalid input data
    Validation(String),

    /// Missing resource (404 Not Found)
    NotFound(String),

    /// Conflicting state (409 Conflict) - e.g. membership already exists
    Conflict(String),

    /// Well-formed request the current state refuses (422 Unprocessable Entity)
    Unprocessable(String),

    /// Database errors (500 Internal Server Error)
    Database(SqlxError),

    /// Generic internal errors (500 Internal Server Error)
    Internal,
}

impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<MembershipError> for AppError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::DuplicateMembership => AppError::Conflict(err.to_string()),
            MembershipError::MembershipNotFound
            | MembershipError::OrganizationNotFound
            | MembershipError::ProjectNotFound
            | MembershipError::UserNotFound => AppError::NotFound(err.to_string()),
            MembershipError::NotAnOrganizationMember => AppError::Unprocessable(err.to_string()),
            MembershipError::InconsistentState { .. } => {
                tracing::error!(%err, "membership invariant violated");
                AppError::Internal
            }
            MembershipError::Database(db_err) => AppError::Database(db_err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Database(err) => {
                tracing::error!(%err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
