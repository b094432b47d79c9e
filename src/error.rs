use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Why a redemption transaction was rolled back. The caller always gets the
/// specific reason, never a generic failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RedeemAbort {
    #[error("User not found")]
    UserNotFound,

    #[error("Badge already owned")]
    AlreadyOwned,

    #[error("Insufficient points")]
    InsufficientPoints,
}

#[derive(Debug, thiserror::Error)]
#[allow(dead_code)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store not provisioned: {0}")]
    StoreNotProvisioned(String),

    #[error("Transaction aborted: {0}")]
    TransactionAborted(#[from] RedeemAbort),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Envelope code reported in the response body. Matches the HTTP status.
    pub fn code(&self) -> u16 {
        match self {
            AppError::NotFound => 404,
            AppError::Forbidden => 403,
            AppError::Unauthorized => 401,
            AppError::InvalidArgument(_) => 400,
            AppError::Conflict(_) | AppError::TransactionAborted(_) => 409,
            AppError::StoreNotProvisioned(_)
            | AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Json(_)
            | AppError::Internal(_) => 500,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::NotFound => "Not found".to_string(),
            AppError::Forbidden => "Forbidden".to_string(),
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::InvalidArgument(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::StoreNotProvisioned(hint) => {
                tracing::error!("Store not provisioned: {}", hint);
                format!("Store not provisioned: {}", hint)
            }
            AppError::TransactionAborted(reason) => reason.to_string(),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let status =
            StatusCode::from_u16(self.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({ "code": self.code(), "msg": message }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
