//! Specification synthesis from live probes.
//!
//! Endpoints are partitioned into list, detail (`{id}`) and query
//! (`{query}`/`{category}`) endpoints and probed strictly one at a time, in
//! this order:
//!
//! 1. every list endpoint, harvesting identifiers from its body
//! 2. the detail endpoints under that list, using the first two identifiers
//! 3. every query endpoint, with a resolved category or a fixed search term
//! 4. any detail endpoint still unrecorded, with id `1`
//!
//! A query endpoint whose base path is already recorded is merged into the
//! existing operation rather than dropped. A failed probe is logged and skipped. Schemas are stored under a name
//! derived from the path; two endpoints deriving the same name overwrite each
//! other and the last one probed wins.

pub mod infer;
pub mod probe;

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::endpoint::Endpoint;
use crate::openapi::spec::{
    Components, Info, OpenApiSpec, Operation, Parameter, PathItem, Response, Schema, Server,
};

pub use infer::{extract_ids, infer_schema, schema_name};
pub use probe::{DEFAULT_PROBE_TIMEOUT, ProbeResult, Prober};

pub const OPENAPI_VERSION: &str = "3.0.0";

/// Search term substituted for `{query}`.
const SEARCH_TERM: &str = "test";
/// Category used when no categories endpoint yields one.
const DEFAULT_CATEGORY: &str = "dev";
/// Identifier used for detail endpoints no list endpoint covers.
const FALLBACK_ID: &str = "1";
/// Identifiers tried per detail endpoint.
const IDS_PER_DETAIL: usize = 2;

const ID_PLACEHOLDER: &str = "{id}";
const QUERY_PLACEHOLDER: &str = "{query}";
const CATEGORY_PLACEHOLDER: &str = "{category}";

fn is_query(endpoint: &Endpoint) -> bool {
    endpoint.path.contains(QUERY_PLACEHOLDER) || endpoint.path.contains(CATEGORY_PLACEHOLDER)
}

fn is_detail(endpoint: &Endpoint) -> bool {
    endpoint.path.contains(ID_PLACEHOLDER)
}

/// `/people/{id}/films` -> `/people/films`
fn strip_id_segments(path: &str) -> String {
    let kept: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ID_PLACEHOLDER)
        .collect();
    format!("/{}", kept.join("/"))
}

/// Whether a detail endpoint sits under a list endpoint.
fn covers(list_path: &str, detail_path: &str) -> bool {
    strip_id_segments(detail_path) == list_path
        || detail_path.starts_with(&format!("{list_path}/"))
}

/// Paths and schemas accumulated over a run.
#[derive(Debug, Default)]
struct SpecBuilder {
    paths: BTreeMap<String, PathItem>,
    schemas: BTreeMap<String, Schema>,
}

impl SpecBuilder {
    fn is_recorded(&self, path: &str) -> bool {
        self.paths.contains_key(path)
    }

    /// Store the inferred schema and a GET path-item referencing it.
    fn record(&mut self, path: &str, name: &str, summary: String, body: &Value, parameters: Vec<Parameter>) {
        if self.schemas.insert(name.to_string(), infer_schema(body)).is_some() {
            debug!(schema = %name, path = %path, "Schema name reused, replacing earlier inference");
        }

        let operation = Operation {
            summary: Some(summary),
            parameters,
            responses: BTreeMap::from([("200".to_string(), Response::json(Schema::reference(name)))]),
            ..Operation::default()
        };
        self.paths.insert(
            path.to_string(),
            PathItem {
                get: Some(operation),
                ..PathItem::default()
            },
        );
        info!(path = %path, schema = %name, "Recorded endpoint");
    }

    /// Record a query endpoint, folding it into an existing GET operation.
    ///
    /// The schema is replaced like any other recording. Parameters missing
    /// from the existing operation are appended as optional, since the path
    /// already answered without them.
    fn merge(&mut self, path: &str, name: &str, summary: String, body: &Value, parameters: Vec<Parameter>) {
        let Some(operation) = self.paths.get_mut(path).and_then(|item| item.get.as_mut()) else {
            self.record(path, name, summary, body, parameters);
            return;
        };

        for mut param in parameters {
            let known = operation
                .parameters
                .iter()
                .any(|p| p.name == param.name && p.location == param.location);
            if !known {
                param.required = false;
                operation.parameters.push(param);
            }
        }
        operation.responses.insert(
            "200".to_string(),
            Response::json(Schema::reference(name)),
        );

        if self.schemas.insert(name.to_string(), infer_schema(body)).is_some() {
            debug!(schema = %name, path = %path, "Schema name reused, replacing earlier inference");
        }
        info!(path = %path, schema = %name, "Merged query endpoint");
    }

    fn build(self, base_url: &str) -> OpenApiSpec {
        OpenApiSpec {
            openapi: Some(OPENAPI_VERSION.to_string()),
            info: Some(Info {
                title: "API Client".to_string(),
                version: "1.0.0".to_string(),
                description: Some("Generated from HTML documentation".to_string()),
            }),
            servers: vec![Server {
                url: base_url.to_string(),
                description: None,
            }],
            paths: self.paths,
            components: Some(Components {
                schemas: self.schemas,
            }),
            ..OpenApiSpec::default()
        }
    }
}

/// Probe `path`, logging and swallowing any failure.
async fn try_probe(prober: &Prober, path: &str) -> Option<ProbeResult> {
    match prober.probe(path).await {
        Ok(result) => Some(result),
        Err(err) => {
            warn!(path = %path, error = %err, "Skipping endpoint");
            None
        }
    }
}

fn detail_params(endpoint: &Endpoint) -> Vec<Parameter> {
    match &endpoint.path_params {
        Some(names) => names
            .iter()
            .map(|name| Parameter::string(name, "path", true))
            .collect(),
        None => vec![Parameter::string("id", "path", true)],
    }
}

/// Build a specification by probing every endpoint against `prober`'s base URL.
pub async fn synthesize(prober: &Prober, endpoints: &[Endpoint]) -> OpenApiSpec {
    let lists: Vec<&Endpoint> = endpoints
        .iter()
        .filter(|e| !is_detail(e) && !is_query(e))
        .collect();
    let details: Vec<&Endpoint> = endpoints.iter().filter(|e| is_detail(e)).collect();
    let queries: Vec<&Endpoint> = endpoints.iter().filter(|e| is_query(e)).collect();

    info!(
        lists = lists.len(),
        details = details.len(),
        queries = queries.len(),
        base_url = %prober.base_url(),
        "Probing endpoints"
    );

    let mut builder = SpecBuilder::default();

    for list in &lists {
        if builder.is_recorded(&list.path) {
            debug!(path = %list.path, method = %list.method, "Path already recorded");
            continue;
        }
        let Some(result) = try_probe(prober, &list.path).await else {
            continue;
        };

        let name = schema_name(&list.path);
        let params = list
            .query_params
            .iter()
            .flatten()
            .map(|p| Parameter::string(p, "query", false))
            .collect();
        builder.record(&list.path, &name, format!("Get {name}"), &result.body, params);

        let ids = extract_ids(&result.body);
        for detail in details.iter().filter(|d| covers(&list.path, &d.path)) {
            if builder.is_recorded(&detail.path) {
                continue;
            }
            for id in ids.iter().take(IDS_PER_DETAIL) {
                let probe_path = detail.path.replace(ID_PLACEHOLDER, id);
                if let Some(result) = try_probe(prober, &probe_path).await {
                    let name = schema_name(&detail.path);
                    let summary = format!("Get {name} by ID");
                    builder.record(&detail.path, &name, summary, &result.body, detail_params(detail));
                    break;
                }
            }
        }
    }

    let mut category: Option<String> = None;
    for query in &queries {
        let mut probe_path = query.path.clone();
        if probe_path.contains(CATEGORY_PLACEHOLDER) {
            if category.is_none() {
                category = Some(resolve_category(prober, &lists).await);
            }
            let value = category.as_deref().unwrap_or(DEFAULT_CATEGORY);
            probe_path = probe_path.replace(CATEGORY_PLACEHOLDER, value);
        }
        probe_path = probe_path.replace(QUERY_PLACEHOLDER, SEARCH_TERM);

        let Some(result) = try_probe(prober, &probe_path).await else {
            continue;
        };

        let (path, params) = query_path_and_params(&query.path);
        let name = schema_name(&path);
        builder.merge(&path, &name, format!("Search {name}"), &result.body, params);
    }

    for detail in &details {
        if builder.is_recorded(&detail.path) {
            continue;
        }
        let probe_path = detail.path.replace(ID_PLACEHOLDER, FALLBACK_ID);
        if let Some(result) = try_probe(prober, &probe_path).await {
            let name = schema_name(&detail.path);
            let summary = format!("Get {name} by ID");
            builder.record(&detail.path, &name, summary, &result.body, detail_params(detail));
        }
    }

    let spec = builder.build(prober.base_url());
    info!(
        paths = spec.paths.len(),
        schemas = spec.schemas().map_or(0, BTreeMap::len),
        "Synthesized specification"
    );
    spec
}

/// First string of the first categories-like list endpoint, else the default.
async fn resolve_category(prober: &Prober, lists: &[&Endpoint]) -> String {
    let Some(categories) = lists.iter().find(|e| e.path.contains("categor")) else {
        return DEFAULT_CATEGORY.to_string();
    };
    let Some(result) = try_probe(prober, &categories.path).await else {
        return DEFAULT_CATEGORY.to_string();
    };
    match result.body.get(0) {
        Some(Value::String(first)) if !first.is_empty() => {
            debug!(category = %first, "Resolved category");
            first.clone()
        }
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// Split a query endpoint into the recorded path and its required parameters.
///
/// `/jokes/search?query={query}` records `/jokes/search` with a required
/// `query` query parameter; `/jokes/categories/{category}` keeps its path and
/// declares `category` as a path parameter.
fn query_path_and_params(raw: &str) -> (String, Vec<Parameter>) {
    let (path, query_string) = match raw.split_once('?') {
        Some((path, query_string)) => (path, Some(query_string)),
        None => (raw, None),
    };

    let mut params = Vec::new();
    for (placeholder, name) in [(QUERY_PLACEHOLDER, "query"), (CATEGORY_PLACEHOLDER, "category")] {
        if path.contains(placeholder) {
            params.push(Parameter::string(name, "path", true));
        } else if query_string.is_some_and(|q| q.contains(placeholder)) {
            params.push(Parameter::string(name, "query", true));
        }
    }

    let path = if path.is_empty() { "/" } else { path };
    (path.to_string(), params)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_covers() {
        assert!(covers("/people", "/people/{id}"));
        assert!(covers("/people", "/people/{id}/films"));
        assert!(covers("/api/people", "/api/people/{id}/"));
        assert!(!covers("/people", "/planets/{id}"));
        assert!(!covers("/people", "/peoples/{id}"));
    }

    #[test]
    fn test_partition() {
        let list = Endpoint::get("/people");
        let detail = Endpoint::get("/people/{id}");
        let search = Endpoint::get("/jokes/search?query={query}");
        let by_category = Endpoint::get("/jokes/random?category={category}");
        assert!(!is_detail(&list) && !is_query(&list));
        assert!(is_detail(&detail) && !is_query(&detail));
        assert!(is_query(&search));
        assert!(is_query(&by_category));
    }

    #[test]
    fn test_query_path_and_params() {
        let (path, params) = query_path_and_params("/jokes/search?query={query}");
        assert_eq!(path, "/jokes/search");
        assert_eq!(params, vec![Parameter::string("query", "query", true)]);

        let (path, params) = query_path_and_params("/jokes/categories/{category}");
        assert_eq!(path, "/jokes/categories/{category}");
        assert_eq!(params, vec![Parameter::string("category", "path", true)]);
    }

    #[test]
    fn test_detail_params_default_to_id() {
        assert_eq!(
            detail_params(&Endpoint::get("/people/{id}")),
            vec![Parameter::string("id", "path", true)]
        );
        let declared = Endpoint::get("/people/{id}").with_path_params(vec!["id".into(), "".into()]);
        assert_eq!(detail_params(&declared).len(), 1);
    }

    #[test]
    fn test_builder_merges_query_parameters() {
        let mut builder = SpecBuilder::default();
        builder.record("/jokes/random", "Random", "Get Random".into(), &serde_json::json!({"a": 1}), vec![]);
        builder.merge(
            "/jokes/random",
            "Random",
            "Search Random".into(),
            &serde_json::json!({"b": "x"}),
            vec![Parameter::string("category", "query", true)],
        );
        builder.merge(
            "/jokes/search",
            "Search",
            "Search Search".into(),
            &serde_json::json!({}),
            vec![Parameter::string("query", "query", true)],
        );
        let spec = builder.build("https://x.test");

        let random = spec.paths["/jokes/random"].get.as_ref().unwrap();
        assert_eq!(random.summary.as_deref(), Some("Get Random"));
        assert_eq!(random.parameters, vec![Parameter::string("category", "query", false)]);
        let props = spec.schema("Random").unwrap().properties.as_ref().unwrap();
        assert!(props.contains_key("b"));
        assert!(!props.contains_key("a"));

        let search = spec.paths["/jokes/search"].get.as_ref().unwrap();
        assert_eq!(search.parameters, vec![Parameter::string("query", "query", true)]);
    }

    #[test]
    fn test_builder_last_write_wins() {
        let mut builder = SpecBuilder::default();
        builder.record("/a/items", "Item", "Get Item".into(), &serde_json::json!({"a": 1}), vec![]);
        builder.record("/b/items", "Item", "Get Item".into(), &serde_json::json!({"b": "x"}), vec![]);
        let spec = builder.build("https://x.test");

        assert_eq!(spec.paths.len(), 2);
        let item = spec.schema("Item").unwrap();
        let props = item.properties.as_ref().unwrap();
        assert!(props.contains_key("b"));
        assert!(!props.contains_key("a"));
        assert_eq!(spec.servers[0].url, "https://x.test");
        spec.validate().unwrap();
    }
}
