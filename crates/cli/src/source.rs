//! Input resolution: URL or file, documentation or specification.

use std::path::{Path, PathBuf};
use std::time::Duration;

use docs2client_core::OpenApiSpec;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, info};
use url::Url;

use crate::error::SourceError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// What a remote input turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Json,
}

/// A command-line input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    RemoteDocs(String),
    RemoteSpec(String),
    LocalDocs(PathBuf),
    LocalSpec(PathBuf),
}

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Point a spec URL at its `.json` document.
///
/// Non-URLs and URLs already ending in `.json` are returned trimmed but
/// otherwise unchanged.
pub fn normalize_spec_url(url: &str) -> String {
    let trimmed = url.trim();
    if !is_url(trimmed) || trimmed.ends_with(".json") {
        return trimmed.to_string();
    }
    let cleaned = trimmed.strip_suffix('/').unwrap_or(trimmed);
    format!("{cleaned}.json")
}

/// Identifier naming the spec cache file and the output directory.
pub fn site_id(input: &str) -> String {
    if is_url(input) {
        return match Url::parse(input).ok().and_then(|u| u.host_str().map(str::to_string)) {
            Some(host) => host.replace('.', "_"),
            None => input
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect(),
        };
    }

    let file_name = input.rsplit(['/', '\\']).next().unwrap_or_default();
    let file_name = if file_name.is_empty() { "spec" } else { file_name };
    file_name
        .strip_suffix(".json")
        .unwrap_or(file_name)
        .replace('.', "_")
}

/// Sniff a URL: `HEAD` content type first, then the body's first byte.
///
/// Anything that cannot be determined, including transport failures, counts
/// as HTML.
pub async fn detect_content_type(client: &Client, url: &str) -> ContentKind {
    let head = client.head(url).timeout(FETCH_TIMEOUT).send().await;
    if let Ok(response) = head {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if content_type.contains("html") {
            return ContentKind::Html;
        }
        if content_type.contains("json") {
            return ContentKind::Json;
        }
    }

    let body = match client.get(url).timeout(FETCH_TIMEOUT).send().await {
        Ok(response) => response.text().await.unwrap_or_default(),
        Err(err) => {
            debug!(url = %url, error = %err, "Content sniffing failed, assuming HTML");
            return ContentKind::Html;
        }
    };
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        ContentKind::Json
    } else {
        ContentKind::Html
    }
}

/// Classify `input`, probing remote inputs for their content type.
pub async fn resolve(client: &Client, input: &str) -> Source {
    if is_url(input) {
        return match detect_content_type(client, input).await {
            ContentKind::Html => Source::RemoteDocs(input.to_string()),
            ContentKind::Json => Source::RemoteSpec(normalize_spec_url(input)),
        };
    }

    let path = PathBuf::from(input);
    if path.extension().is_some_and(|ext| ext == "json") {
        Source::LocalSpec(path)
    } else {
        Source::LocalDocs(path)
    }
}

/// Fetch a page body, failing on a non-2xx status.
pub async fn fetch_text(client: &Client, url: &str, accept: &str) -> Result<String, SourceError> {
    info!(url = %url, "Fetching");
    let transport = |source: reqwest::Error| SourceError::Transport {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .header(ACCEPT, accept)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await
        .map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }
    response.text().await.map_err(transport)
}

/// Fetch and validate a remote specification document.
pub async fn fetch_spec(client: &Client, url: &str) -> Result<OpenApiSpec, SourceError> {
    let body = fetch_text(client, url, "application/json").await?;
    let spec = OpenApiSpec::from_json(&body)?;
    spec.validate()?;
    Ok(spec)
}

pub fn read_local(path: &Path) -> Result<String, SourceError> {
    if !path.exists() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and validate a local specification document.
pub fn read_spec(path: &Path) -> Result<OpenApiSpec, SourceError> {
    let spec = OpenApiSpec::from_json(&read_local(path)?)?;
    spec.validate()?;
    Ok(spec)
}
