//! Endpoint candidates discovered in documentation.

use serde::{Deserialize, Serialize};

use crate::classify::normalize_path;

/// A (path, method) pair that may end up as an operation in the generated client.
///
/// `path` is always stored normalized, so two endpoints compare equal exactly
/// when their [`Endpoint::key`] matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub path: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_params: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Endpoint {
    /// Create a `GET` endpoint, normalizing the path.
    pub fn get(path: &str) -> Self {
        Self::new(path, "GET")
    }

    /// Create an endpoint, normalizing the path and upper-casing the method.
    pub fn new(path: &str, method: &str) -> Self {
        Self {
            path: normalize_path(path),
            method: method.to_ascii_uppercase(),
            query_params: None,
            path_params: None,
            description: None,
        }
    }

    pub fn with_query_params(mut self, params: Vec<String>) -> Self {
        self.query_params = non_blank(params);
        self
    }

    pub fn with_path_params(mut self, params: Vec<String>) -> Self {
        self.path_params = non_blank(params);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        if !description.trim().is_empty() {
            self.description = Some(description);
        }
        self
    }

    /// Identity key used for deduplication: `path:METHOD`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.path, self.method)
    }

    pub fn has_placeholder(&self, name: &str) -> bool {
        self.path.contains(&format!("{{{name}}}"))
    }
}

/// Drop blank entries and duplicates; an empty result becomes `None`.
fn non_blank(params: Vec<String>) -> Option<Vec<String>> {
    let mut kept: Vec<String> = Vec::with_capacity(params.len());
    for param in params {
        let trimmed = param.trim();
        if trimmed.is_empty() || kept.iter().any(|p| p == trimmed) {
            continue;
        }
        kept.push(trimmed.to_string());
    }
    if kept.is_empty() { None } else { Some(kept) }
}

/// Keep the first occurrence of every identity key, preserving discovery order.
pub fn dedupe(endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    let mut seen = std::collections::HashSet::new();
    endpoints
        .into_iter()
        .filter(|e| seen.insert(e.key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_path_and_method() {
        let endpoint = Endpoint::new("/people/1/", "get");
        assert_eq!(endpoint.path, "/people/{id}");
        assert_eq!(endpoint.method, "GET");
        assert_eq!(endpoint.key(), "/people/{id}:GET");
    }

    #[test]
    fn test_blank_params_are_dropped() {
        let endpoint = Endpoint::get("/jokes/search")
            .with_query_params(vec![String::new(), "query".into(), " ".into(), "query".into()])
            .with_path_params(vec![String::new()]);
        assert_eq!(endpoint.query_params, Some(vec!["query".to_string()]));
        assert_eq!(endpoint.path_params, None);
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let endpoints = vec![
            Endpoint::get("/jokes/random").with_description("first"),
            Endpoint::get("/jokes/random/").with_description("second"),
            Endpoint::new("/jokes/random", "POST"),
        ];
        let deduped = dedupe(endpoints);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].description.as_deref(), Some("first"));
        assert_eq!(deduped[1].method, "POST");
    }

    #[test]
    fn test_serializes_camel_case_without_empty_fields() {
        let endpoint = Endpoint::get("/people").with_query_params(vec!["search".into()]);
        let json = serde_json::to_value(&endpoint).unwrap_or_default();
        assert_eq!(
            json,
            serde_json::json!({ "path": "/people", "method": "GET", "queryParams": ["search"] })
        );
    }
}
