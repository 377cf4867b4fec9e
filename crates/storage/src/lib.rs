//! Storage Layer
//!
//! Keeps a bounded history of risk assessments behind a repository.

mod repository;

pub use repository::{PredictionFilter, PredictionRecord, Repository, DEFAULT_CAPACITY};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage lock poisoned: {0}")]
    Lock(String),
}
