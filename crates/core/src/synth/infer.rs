//! Schema inference from a single sampled response.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::openapi::spec::Schema;

/// Items inspected when harvesting identifiers from a list response.
const MAX_ID_SAMPLES: usize = 5;

/// Trailing numeric segment of a resource URL: `.../people/12/`.
static URL_ID: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"/(\d+)/?$").ok());

/// Infer a schema from one JSON value.
///
/// Arrays are typed from their first element only and samples are never
/// merged, so `[{"a":1},{"a":"x"}]` infers `a` as an integer.
pub fn infer_schema(value: &Value) -> Schema {
    match value {
        Value::Null => Schema::typed("string").nullable(),
        Value::Bool(_) => Schema::typed("boolean"),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0) {
                Schema::typed("integer")
            } else {
                Schema::typed("number")
            }
        }
        Value::String(_) => Schema::typed("string"),
        Value::Array(items) => match items.first() {
            Some(first) => Schema::array(infer_schema(first)),
            None => Schema::array(Schema::typed("object")),
        },
        Value::Object(fields) => Schema::object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), infer_schema(value)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}

/// Component name for a path: last literal segment, one trailing `s` dropped, capitalized.
///
/// `/api/people` gives `People`, `/jokes/categories` gives `Categorie`.
pub fn schema_name(path: &str) -> String {
    let Some(resource) = path
        .split('/')
        .rfind(|segment| !segment.is_empty() && !segment.starts_with('{'))
    else {
        return "Resource".to_string();
    };

    let mut chars = resource.chars();
    let Some(first) = chars.next() else {
        return "Resource".to_string();
    };
    let rest = chars.as_str();
    let rest = rest.strip_suffix('s').unwrap_or(rest);
    first.to_uppercase().chain(rest.chars()).collect()
}

/// Identifiers usable for probing detail endpoints.
///
/// Looks at the first few items of a list (or of its `results` array) and
/// takes each item's `id` and the numeric tail of its `url`.
pub fn extract_ids(body: &Value) -> Vec<String> {
    match body {
        Value::Array(items) => items
            .iter()
            .take(MAX_ID_SAMPLES)
            .flat_map(|item| {
                let id = item.get("id").and_then(scalar_id);
                let from_url = item
                    .get("url")
                    .and_then(Value::as_str)
                    .and_then(id_from_url);
                id.into_iter().chain(from_url)
            })
            .collect(),
        Value::Object(fields) => match fields.get("results") {
            Some(results @ Value::Array(_)) => extract_ids(results),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn id_from_url(url: &str) -> Option<String> {
    let captures = URL_ID.as_ref()?.captures(url)?;
    Some(captures.get(1)?.as_str().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(infer_schema(&json!("x")), Schema::typed("string"));
        assert_eq!(infer_schema(&json!(3)), Schema::typed("integer"));
        assert_eq!(infer_schema(&json!(3.5)), Schema::typed("number"));
        assert_eq!(infer_schema(&json!(true)), Schema::typed("boolean"));
        assert_eq!(infer_schema(&json!(null)), Schema::typed("string").nullable());
    }

    #[test]
    fn test_array_uses_first_element_only() {
        let schema = infer_schema(&json!([{"a": 1}, {"a": "x"}]));
        let expected = Schema::array(Schema::object(BTreeMap::from([(
            "a".to_string(),
            Schema::typed("integer"),
        )])));
        assert_eq!(schema, expected);
    }

    #[test]
    fn test_empty_arrays_get_object_items() {
        let schema = infer_schema(&json!({"tags": []}));
        let tags = schema.properties.as_ref().unwrap().get("tags").unwrap();
        assert_eq!(tags, &Schema::array(Schema::typed("object")));
        assert_eq!(infer_schema(&json!([])), Schema::array(Schema::typed("object")));
    }

    #[test]
    fn test_nested_object() {
        let schema = infer_schema(&json!({"value": "joke text", "meta": {"views": 10, "rating": null}}));
        let props = schema.properties.as_ref().unwrap();
        assert_eq!(props["value"], Schema::typed("string"));
        let meta = props["meta"].properties.as_ref().unwrap();
        assert_eq!(meta["views"], Schema::typed("integer"));
        assert!(meta["rating"].is_nullable());
    }

    #[test]
    fn test_schema_name() {
        assert_eq!(schema_name("/api/people"), "People");
        assert_eq!(schema_name("/jokes/categories"), "Categorie");
        assert_eq!(schema_name("/jokes/random"), "Random");
        assert_eq!(schema_name("/users/{id}"), "User");
        assert_eq!(schema_name("/{id}"), "Resource");
        assert_eq!(schema_name("/"), "Resource");
        assert_eq!(schema_name("/status"), "Statu");
    }

    #[test]
    fn test_extract_ids() {
        let body = json!([
            {"id": 7},
            {"id": "abc"},
            {"url": "https://swapi.test/api/people/3/"},
            {"id": 0},
            {"name": "no id"},
            {"id": 99}
        ]);
        assert_eq!(extract_ids(&body), vec!["7", "abc", "3"]);
    }

    #[test]
    fn test_extract_ids_from_results() {
        let body = json!({"count": 2, "results": [{"url": "https://swapi.test/api/planets/1/"}, {"id": 2}]});
        assert_eq!(extract_ids(&body), vec!["1", "2"]);
        assert!(extract_ids(&json!({"value": "x"})).is_empty());
        assert!(extract_ids(&json!("x")).is_empty());
    }
}
