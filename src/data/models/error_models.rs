use diesel::result::Error as DieselError;
use thiserror::Error;

// Errors surfaced by item operations
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Item not found")]
    NotFound,
    #[error("Item was modified concurrently, retry the review")]
    Conflict,
    #[error("Database error")]
    DatabaseError(DieselError),
    #[error("Connection pool error")]
    PoolError(r2d2::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}
