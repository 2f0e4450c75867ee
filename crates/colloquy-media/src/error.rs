use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("file {} format {format} is not supported", path.display())]
    Unsupported { path: PathBuf, format: String },

    #[error(
        "failed to convert {} from {source_format} to {target_format}: {reason}",
        path.display()
    )]
    Transcode {
        path: PathBuf,
        source_format: String,
        target_format: String,
        reason: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("destination {} is not an existing directory", .0.display())]
    InvalidDestination(PathBuf),
}

pub type Result<T> = std::result::Result<T, MediaError>;
