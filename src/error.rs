// RKSOK — Top-level error types
//
// Aggregates errors from the gateway, store, and config modules into a single
// error enum for the application boundary.

use thiserror::Error;

/// Top-level error type for all RKSOK operations.
#[derive(Debug, Error)]
pub enum RksokError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] crate::gateway::GatewayError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RksokError>;
