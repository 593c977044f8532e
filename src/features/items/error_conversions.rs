use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use diesel::result::Error as DieselError;
use validator::ValidationErrors;

use crate::data::models::ItemError;
use crate::spaced_repetition_system::InvalidQuality;

impl From<DieselError> for ItemError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => ItemError::NotFound,
            other => ItemError::DatabaseError(other),
        }
    }
}

impl From<r2d2::Error> for ItemError {
    fn from(err: r2d2::Error) -> Self {
        ItemError::PoolError(err)
    }
}

impl From<ValidationErrors> for ItemError {
    fn from(err: ValidationErrors) -> Self {
        ItemError::InvalidArgument(err.to_string())
    }
}

impl From<InvalidQuality> for ItemError {
    fn from(err: InvalidQuality) -> Self {
        ItemError::InvalidArgument(err.to_string())
    }
}

// Malformed ids, query strings and bodies answer with the same JSON error body
impl From<JsonRejection> for ItemError {
    fn from(rejection: JsonRejection) -> Self {
        ItemError::InvalidArgument(rejection.body_text())
    }
}

impl From<PathRejection> for ItemError {
    fn from(rejection: PathRejection) -> Self {
        ItemError::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for ItemError {
    fn from(rejection: QueryRejection) -> Self {
        ItemError::InvalidArgument(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ItemError {
    fn from(err: tokio::task::JoinError) -> Self {
        ItemError::Internal(format!("blocking task failed: {}", err))
    }
}
