use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// One row of the 409 response body: an existing booking the candidate
/// interval collides with.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictEntry {
    pub booking_id: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Booking conflict: {0}")]
    Conflict(String, Vec<ConflictEntry>),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Rule violated: {0}")]
    Unprocessable(String),
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, tag, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 23505 = PostgreSQL Unique Violation
                    if code == "2067" || code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({
                                "error": "conflict",
                                "message": "Resource already exists (duplicate entry)"
                            })),
                        )
                            .into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthenticated", "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Conflict(msg, conflicts) => {
                return (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "success": false,
                        "error": "conflict",
                        "message": msg,
                        "conflicts": conflicts,
                    })),
                )
                    .into_response();
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation", msg.clone()),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg.clone()),
            AppError::DependencyUnavailable(msg) => {
                error!("Dependency unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "dependency_unavailable", msg.clone())
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": tag,
            "message": message,
        }));

        (status, body).into_response()
    }
}
