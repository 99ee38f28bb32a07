//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to parse or validate an OpenAPI document.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Failed to parse OpenAPI spec: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Spec declares neither `openapi` nor `swagger`")]
    MissingVersion,

    #[error("Path `{0}` must start with '/'")]
    InvalidPath(String),

    #[error("Unresolved reference `{reference}` in {location}")]
    UnresolvedRef { reference: String, location: String },
}

/// A single live probe that did not produce a usable response.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status { url: String, status: u16 },
}

/// Failure while loading configuration or building the shared HTTP client.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Dotenv {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid proxy configuration: {0}")]
    Proxy(#[source] reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
