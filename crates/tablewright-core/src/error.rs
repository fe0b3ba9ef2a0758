//! Core error types.

use crate::catalog::NotFoundError;
use crate::migration::DiscoveryError;
use crate::replay::{ApplyError, PrimaryKeyError};
use thiserror::Error;

/// Errors from building a table schema.
#[derive(Debug, Error)]
pub enum Error {
    /// Migration files could not be located or read.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// A statement affecting the requested table could not be replayed.
    #[error("replay error: {0}")]
    Apply(#[from] ApplyError),

    /// The requested table was never created.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The table's primary key breaks the identity convention.
    #[error("primary key error: {0}")]
    PrimaryKey(#[from] PrimaryKeyError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
