//! Migration discovery errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating and reading migration files.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No migration directories were configured.
    #[error("no migration directories configured")]
    NoDirectories,

    /// A configured directory does not exist or is not a directory.
    #[error("migration directory not found: {}", path.display())]
    DirectoryNotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// Listing a directory failed.
    #[error("failed to read migration directory {}: {source}", path.display())]
    ReadDir {
        /// The directory being listed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reading a migration file failed.
    #[error("failed to read migration file {}: {source}", path.display())]
    ReadFile {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A migration file is not valid UTF-8.
    #[error("migration file {} is not valid UTF-8", path.display())]
    InvalidUtf8 {
        /// The offending file.
        path: PathBuf,
    },
}
