//! Persistence layer for Bug Smasher
//!
//! Provides:
//! - The whole-document blob (single key-value row)
//! - Audit log (append-only)
//! - In-place migration of legacy documents on load

mod audit;
mod migrate;
mod sqlite;
mod traits;

pub use audit::*;
pub use migrate::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
