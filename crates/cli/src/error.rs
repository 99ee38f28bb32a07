use std::path::PathBuf;

use docs2client_core::{ConfigError, SpecError};
use thiserror::Error;

/// Failure to resolve or fetch the command-line input.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error(transparent)]
    Spec(#[from] SpecError),
}

/// Failure writing the spec cache or generated files.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialize(#[from] SpecError),
}

/// Any fatal error of a run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}
