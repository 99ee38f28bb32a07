//! Turn API documentation into an OpenAPI document and a typed TypeScript client.
//!
//! The pipeline runs in three stages:
//!
//! 1. [`extract`] finds endpoint candidates in markdown (pattern matching or a
//!    local LLM, with the former as fallback).
//! 2. [`synth`] probes each candidate against the live API and infers
//!    response schemas, producing an [`OpenApiSpec`].
//! 3. [`openapi::generate`] turns a specification into `client.ts`,
//!    `types.ts`, `index.ts` and an optional `client.test.ts`.

pub mod classify;
pub mod config;
pub mod dotenv;
pub mod endpoint;
pub mod error;
pub mod extract;
pub mod http;
pub mod markdown;
pub mod openapi;
pub mod synth;

use reqwest::Client;
use tracing::info;

pub use config::{Config, ProxyStatus};
pub use endpoint::Endpoint;
pub use error::{ConfigError, ProbeError, SpecError};
pub use extract::{AssistedExtractor, Strategy, infer_base_url};
pub use http::build_http_client;
pub use markdown::html_to_markdown;
pub use openapi::{GenerateOptions, GeneratedClient, OpenApiSpec, generate};
pub use synth::{Prober, synthesize};

/// Build a validated specification from documentation markdown.
///
/// `origin` is the URL the documentation came from (or any string for local
/// files); it only feeds base-URL inference. Probing failures never abort the
/// run, but a structurally invalid result does.
pub async fn spec_from_markdown(
    client: &Client,
    markdown: &str,
    origin: &str,
    strategy: Strategy<'_>,
) -> Result<OpenApiSpec, SpecError> {
    let endpoints = extract::extract(markdown, origin, strategy).await;
    let base_url = infer_base_url(markdown, origin);
    info!(base_url = %base_url, "Using base URL");

    let prober = Prober::new(client.clone(), &base_url);
    let spec = synthesize(&prober, &endpoints).await;
    spec.validate()?;
    Ok(spec)
}
