use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No storage directory configured")]
    NotConfigured,

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid record id: {0:?}")]
    InvalidId(String),

    #[error("Not a record directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
