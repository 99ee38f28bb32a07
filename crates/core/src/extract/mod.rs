//! Endpoint discovery in markdown documentation.
//!
//! Two interchangeable strategies share this module:
//! - [`extract_with_patterns`]: absolute URLs and back-tick path tokens, filtered
//!   through the [`classify`](crate::classify) cascade.
//! - [`assisted`]: an LLM pass that falls back to the pattern strategy.
//!
//! [`infer_base_url`] is shared by both strategies and by the synthesizer.

pub mod assisted;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};
use url::Url;

use crate::classify::is_endpoint;
use crate::endpoint::Endpoint;

pub use assisted::{AssistFailure, AssistedExtractor};

/// Origin used when nothing better can be inferred.
pub const PLACEHOLDER_ORIGIN: &str = "https://api.example.com";

/// Absolute URLs, stopping at whitespace and common markdown delimiters.
static URL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"https?://[^\s`)\]}]+").ok());

/// Back-tick-quoted paths with an optional HTTP verb prefix.
static CODE_PATH_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"`(?:(?i:(GET|POST|PUT|PATCH|DELETE))\s+)?(/[\w/{}:?=&.\-]+)`").ok()
});

static API_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^/(api|v\d+)/").ok());

static RESOURCE_LOOKUP: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^/[\w-]+/(random|categories|search)").ok());

/// Which extraction strategy to run.
#[derive(Debug)]
pub enum Strategy<'a> {
    Patterns,
    Assisted(&'a AssistedExtractor),
}

/// Extract endpoints from markdown with the chosen strategy.
///
/// The assisted strategy never fails: any [`AssistFailure`] is logged and the
/// pattern strategy runs instead.
pub async fn extract(markdown: &str, origin: &str, strategy: Strategy<'_>) -> Vec<Endpoint> {
    let endpoints = match strategy {
        Strategy::Patterns => extract_with_patterns(markdown, origin),
        Strategy::Assisted(extractor) => {
            match extractor.extract(markdown, origin).await {
                Ok(endpoints) => endpoints,
                Err(failure) => {
                    warn!(reason = %failure, "LLM extraction failed.");
                    warn!("Falling back to pattern-based extraction.");
                    extract_with_patterns(markdown, origin)
                }
            }
        }
    };
    info!(count = endpoints.len(), "Found endpoints.");
    endpoints
}

/// Find every absolute URL in `text`, with trailing delimiters trimmed.
pub fn find_urls(text: &str) -> Vec<&str> {
    let Some(pattern) = URL_PATTERN.as_ref() else {
        return Vec::new();
    };
    pattern
        .find_iter(text)
        .map(|m| clean_url_match(m.as_str()))
        .filter(|s| !s.is_empty())
        .collect()
}

fn clean_url_match(raw: &str) -> &str {
    raw.trim_end_matches([')', ']', '}'])
        .trim_end_matches(['.', ',', ';', ':', '!', '\'', '"'])
}

/// `scheme://host[:port]` of a URL.
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Pick the API base URL for a documentation page.
///
/// Ordered fallback: the first absolute URL whose path looks like an API
/// endpoint, then the first parseable URL, then the documentation URL's own
/// origin, then [`PLACEHOLDER_ORIGIN`].
pub fn infer_base_url(markdown: &str, origin: &str) -> String {
    let urls = find_urls(markdown);

    for candidate in &urls {
        let Ok(parsed) = Url::parse(candidate) else {
            continue;
        };
        if looks_like_api_path(parsed.path()) {
            return origin_of(&parsed);
        }
    }

    if let Some(parsed) = urls
        .iter()
        .find_map(|candidate| Url::parse(candidate).ok().filter(Url::has_host))
    {
        return origin_of(&parsed);
    }

    match Url::parse(origin) {
        Ok(parsed) if parsed.has_host() => origin_of(&parsed),
        _ => PLACEHOLDER_ORIGIN.to_string(),
    }
}

fn looks_like_api_path(path: &str) -> bool {
    is_endpoint(path)
        || API_PREFIX.as_ref().is_some_and(|re| re.is_match(path))
        || RESOURCE_LOOKUP.as_ref().is_some_and(|re| re.is_match(path))
}

/// Pattern-based extraction.
///
/// Collects same-origin absolute URLs first, then back-tick path tokens, each
/// passed through the classifier and deduplicated by `path:METHOD`.
pub fn extract_with_patterns(markdown: &str, origin: &str) -> Vec<Endpoint> {
    let base_url = infer_base_url(markdown, origin);
    let base_origin = Url::parse(&base_url).map(|u| origin_of(&u)).ok();

    let mut endpoints = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |endpoint: Endpoint| {
        if seen.insert(endpoint.key()) {
            debug!(path = %endpoint.path, method = %endpoint.method, "Discovered endpoint.");
            endpoints.push(endpoint);
        }
    };

    for candidate in find_urls(markdown) {
        let Ok(url) = Url::parse(candidate) else {
            continue;
        };
        if base_origin.as_deref() != Some(origin_of(&url).as_str()) {
            continue;
        }
        let path = url.path();
        if !is_endpoint(path) {
            continue;
        }

        let mut query_params: Vec<String> = Vec::new();
        for (key, _) in url.query_pairs() {
            if !query_params.iter().any(|k| *k == key) {
                query_params.push(key.into_owned());
            }
        }
        push(Endpoint::get(path).with_query_params(query_params));
    }

    if let Some(pattern) = CODE_PATH_PATTERN.as_ref() {
        for captures in pattern.captures_iter(markdown) {
            let Some(raw_path) = captures.get(2).map(|m| m.as_str()) else {
                continue;
            };
            let path = raw_path.split('?').next().unwrap_or(raw_path);
            if !is_endpoint(path) {
                continue;
            }
            let method = captures.get(1).map_or("GET", |m| m.as_str());
            push(Endpoint::new(path, method));
        }
    }

    endpoints
}
