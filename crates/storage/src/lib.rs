//! Storage Layer
//!
//! Keeps processed session reports behind a repository handle.

mod repository;

pub use repository::{Repository, SessionRecord, DEFAULT_MAX_SESSIONS};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Session {0} not found")]
    NotFound(i64),
}
