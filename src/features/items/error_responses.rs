use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::data::models::ItemError;

impl ItemError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ItemError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ItemError::NotFound => StatusCode::NOT_FOUND,
            ItemError::Conflict => StatusCode::CONFLICT,
            ItemError::DatabaseError(_) | ItemError::PoolError(_) | ItemError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ItemError::DatabaseError(e) => {
                log::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            ItemError::PoolError(e) => {
                log::error!("Connection pool error: {}", e);
                "Internal server error".to_string()
            }
            ItemError::Internal(e) => {
                log::error!("Internal error: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}
