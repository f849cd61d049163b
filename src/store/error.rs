// RKSOK — Store error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record name cannot be stored by this backend: {0:?}")]
    InvalidName(String),

    #[error("{0}")]
    Other(String),
}
