//! Normalization from OpenAPI spec to API IR.
//!
//! This module handles all the OpenAPI-specific logic:
//! - Base URL resolution
//! - Schema to TypeScript type conversion
//! - Parameter merging and placeholder ordering
//! - Method naming and collision handling

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::extract::PLACEHOLDER_ORIGIN;
use crate::openapi::spec::{
    AdditionalProperties, OpenApiSpec, Operation, Parameter, Schema, SchemaType,
};

use super::api::{ApiIR, BodyIR, HttpMethod, OperationIR, ParamIR, ParamLocation, ResponseIR};
use super::types::{TsLiteral, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind};
use super::utils::{
    alphanumeric_only, capitalize_first, sanitize_ts_identifier, to_identifier_safe,
    to_pascal_case,
};

/// Argument names the generated method reserves for itself.
const RESERVED_ARG_NAMES: &[&str] = &["body", "query"];

/// Normalize an OpenAPI spec into API IR.
///
/// `origin` is where the document came from; it only feeds base URL resolution.
pub fn normalize_spec(spec: &OpenApiSpec, origin: Option<&str>) -> ApiIR {
    let mut warnings = Vec::new();

    let (base_url, base_url_warning) = resolve_base_url(spec, origin);
    if let Some(message) = base_url_warning {
        warn!("{message}");
        warn!("Override by passing baseUrl to the ApiClient constructor");
        warnings.push(message);
    }

    let mut operations = Vec::new();
    let mut operation_names = HashSet::new();

    // BTreeMap keeps paths sorted for deterministic output
    for (path, item) in &spec.paths {
        for (method, op) in item.operations() {
            let Some(method) = HttpMethod::from_lowercase(method) else {
                continue;
            };
            let mut op_ir = normalize_operation(spec, path, method, op, &item.parameters);
            if op_ir.summary.is_none() {
                op_ir.summary.clone_from(&item.summary);
            }

            if !operation_names.insert(op_ir.name.clone()) {
                let renamed = (2..)
                    .map(|n| format!("{}{n}", op_ir.name))
                    .find(|candidate| !operation_names.contains(candidate))
                    .unwrap_or_default();
                let message = format!(
                    "Method name `{}` is already used; {} {path} generated as `{renamed}`",
                    op_ir.name,
                    method.as_str()
                );
                warn!("{message}");
                warnings.push(message);
                operation_names.insert(renamed.clone());
                op_ir.name = renamed;
            }

            operations.push(op_ir);
        }
    }

    let types = spec.schemas().map(normalize_schemas).unwrap_or_default();

    ApiIR {
        base_url,
        operations,
        types,
        warnings,
    }
}

// =============================================================================
// Base URL
// =============================================================================

fn absolute_url(s: &str) -> Option<Url> {
    Url::parse(s).ok().filter(Url::has_host)
}

/// Pick the client's default base URL, with a warning for every fallback step.
pub fn resolve_base_url(spec: &OpenApiSpec, origin: Option<&str>) -> (String, Option<String>) {
    let server = spec
        .servers
        .first()
        .map(|s| s.url.trim())
        .filter(|url| !url.is_empty());
    let origin = origin.and_then(absolute_url);

    if let Some(server) = server {
        if absolute_url(server).is_some() {
            return (server.to_string(), None);
        }
        if let Some(origin) = &origin {
            let root = origin.origin().ascii_serialization();
            if let Ok(joined) = Url::parse(&root).and_then(|root| root.join(server)) {
                let resolved = joined.as_str().trim_end_matches('/').to_string();
                let message = format!("Relative server URL resolved to: {resolved}");
                return (resolved, Some(message));
            }
        }
    } else if let Some(origin) = &origin {
        let inferred = origin.origin().ascii_serialization();
        let message = format!("No servers field, inferred: {inferred}");
        return (inferred, Some(message));
    }

    let message = format!("Could not determine a base URL, using placeholder: {PLACEHOLDER_ORIGIN}");
    (PLACEHOLDER_ORIGIN.to_string(), Some(message))
}

// =============================================================================
// Schemas
// =============================================================================

/// Normalize component schemas into type definitions
fn normalize_schemas(schemas: &BTreeMap<String, Schema>) -> Vec<TsTypeDef> {
    schemas
        .iter()
        .map(|(name, schema)| normalize_schema_to_typedef(name, schema))
        .collect()
}

fn normalize_schema_to_typedef(name: &str, schema: &Schema) -> TsTypeDef {
    let name = to_identifier_safe(name);

    let is_object = schema.type_name() == Some("object")
        || (schema.schema_type.is_none() && schema.properties.is_some());
    if is_object
        && !schema.is_nullable()
        && schema.additional_properties.is_none()
        && let Some(properties) = schema.properties.as_ref()
    {
        return TsTypeDef {
            name,
            kind: TypeDefKind::Interface {
                properties: normalize_properties(properties, schema.required.as_deref()),
            },
        };
    }

    TsTypeDef {
        name,
        kind: TypeDefKind::TypeAlias {
            ty: schema_to_ts_type(schema),
        },
    }
}

/// Properties are optional unless listed in `required`.
fn normalize_properties(
    properties: &BTreeMap<String, Schema>,
    required: Option<&[String]>,
) -> Vec<TsProp> {
    properties
        .iter()
        .map(|(name, schema)| TsProp {
            name: name.clone(),
            ty: schema_to_ts_type(schema),
            optional: !required.is_some_and(|r| r.contains(name)),
        })
        .collect()
}

/// Convert a Schema to TsType
pub fn schema_to_ts_type(schema: &Schema) -> TsType {
    let base = schema_to_ts_type_inner(schema);
    if schema.nullable == Some(true) {
        with_null(base)
    } else {
        base
    }
}

fn schema_to_ts_type_inner(schema: &Schema) -> TsType {
    if let Some(ref_path) = &schema.ref_path {
        return TsType::Ref(ref_to_type_name(ref_path));
    }

    if let Some(all_of) = &schema.all_of {
        return match all_of.as_slice() {
            [] => TsType::any(),
            [single] => schema_to_ts_type(single),
            many => TsType::Intersection(many.iter().map(schema_to_ts_type).collect()),
        };
    }

    if let Some(variants) = schema.any_of.as_ref().or(schema.one_of.as_ref()) {
        return match variants.as_slice() {
            [] => TsType::any(),
            [single] => schema_to_ts_type(single),
            many => TsType::Union(many.iter().map(schema_to_ts_type).collect()),
        };
    }

    if let Some(values) = &schema.enum_values
        && let Some(literals) = enum_to_literals(values)
    {
        return TsType::Union(literals);
    }

    match &schema.schema_type {
        Some(SchemaType::Single(t)) => schema_type_to_ts(t, schema),
        Some(SchemaType::Multiple(types)) => {
            let has_null = types.iter().any(|t| t == "null");
            let mut ts_types: Vec<_> = types
                .iter()
                .filter(|t| *t != "null")
                .map(|t| schema_type_to_ts(t, schema))
                .collect();
            if has_null {
                ts_types.push(TsType::Primitive(TsPrimitive::Null));
            }
            match ts_types.len() {
                0 => TsType::any(),
                1 => ts_types.remove(0),
                _ => TsType::Union(ts_types),
            }
        }
        None if schema.properties.is_some() || schema.additional_properties.is_some() => {
            normalize_object_type(schema)
        }
        None if schema.items.is_some() => schema_type_to_ts("array", schema),
        None => TsType::any(),
    }
}

/// Convert single schema type to TsType
fn schema_type_to_ts(schema_type: &str, schema: &Schema) -> TsType {
    match schema_type {
        "string" => TsType::Primitive(TsPrimitive::String),
        "number" | "integer" => TsType::Primitive(TsPrimitive::Number),
        "boolean" => TsType::Primitive(TsPrimitive::Boolean),
        "null" => TsType::Primitive(TsPrimitive::Null),
        "array" => {
            let item_type = schema
                .items
                .as_deref()
                .map_or_else(TsType::any, schema_to_ts_type);
            TsType::Array(Box::new(item_type))
        }
        "object" => normalize_object_type(schema),
        _ => TsType::any(),
    }
}

/// Normalize object type
fn normalize_object_type(schema: &Schema) -> TsType {
    let props = schema
        .properties
        .as_ref()
        .filter(|p| !p.is_empty())
        .map(|p| TsType::Object(normalize_properties(p, schema.required.as_deref())));
    let additional = match &schema.additional_properties {
        Some(AdditionalProperties::Schema(s)) => Some(TsType::Record {
            key: Box::new(TsType::Primitive(TsPrimitive::String)),
            value: Box::new(schema_to_ts_type(s)),
        }),
        Some(AdditionalProperties::Bool(true)) => Some(TsType::any_record()),
        Some(AdditionalProperties::Bool(false)) | None => None,
    };

    match (props, additional) {
        (Some(props), Some(additional)) => TsType::Intersection(vec![props, additional]),
        (Some(props), None) => props,
        (None, Some(additional)) => additional,
        (None, None) => TsType::any_record(),
    }
}

/// Literal union for scalar enums; `None` when any value is not a scalar.
fn enum_to_literals(values: &[Value]) -> Option<Vec<TsType>> {
    values
        .iter()
        .map(|v| {
            let literal = match v {
                Value::String(s) => TsLiteral::String(s.clone()),
                Value::Bool(b) => TsLiteral::Bool(*b),
                Value::Null => TsLiteral::Null,
                Value::Number(n) => match n.as_i64() {
                    Some(i) => TsLiteral::Int(i),
                    None => TsLiteral::Number(n.as_f64()?),
                },
                Value::Array(_) | Value::Object(_) => return None,
            };
            Some(TsType::Literal(literal))
        })
        .collect::<Option<Vec<_>>>()
        .filter(|literals| !literals.is_empty())
}

fn with_null(ty: TsType) -> TsType {
    let null = TsType::Primitive(TsPrimitive::Null);
    match ty {
        TsType::Union(mut types) => {
            if !types.contains(&null) {
                types.push(null);
            }
            TsType::Union(types)
        }
        any_or_null @ TsType::Primitive(TsPrimitive::Any | TsPrimitive::Null) => any_or_null,
        other => TsType::Union(vec![other, null]),
    }
}

/// Extract type name from $ref path
fn ref_to_type_name(ref_path: &str) -> String {
    let name = ref_path.rsplit('/').next().unwrap_or(ref_path);
    to_identifier_safe(name)
}

// =============================================================================
// Operations
// =============================================================================

fn normalize_operation(
    spec: &OpenApiSpec,
    path: &str,
    method: HttpMethod,
    op: &Operation,
    shared_params: &[Parameter],
) -> OperationIR {
    let name = op
        .operation_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map_or_else(|| derive_method_name(path, method), to_identifier_safe);

    let params = merge_params(shared_params, &op.parameters);
    let path_params = normalize_path_params(path, &params);
    let query_params = params
        .iter()
        .filter(|p| p.location == "query")
        .map(|p| ParamIR {
            name: p.name.clone(),
            original_name: p.name.clone(),
            ty: param_type(p),
            required: false,
            location: ParamLocation::Query,
        })
        .collect();

    let body = method.has_body().then(|| BodyIR {
        ty: op
            .request_body
            .as_ref()
            .and_then(|b| b.json_schema())
            .map_or_else(TsType::any_record, schema_to_ts_type),
    });

    OperationIR {
        name,
        path: path.to_string(),
        method,
        summary: op.summary.clone().filter(|s| !s.trim().is_empty()),
        path_params,
        query_params,
        body,
        response: normalize_response(spec, op),
    }
}

/// Derive `<verb><Resource><Suffix>` from the path when no operationId is declared.
///
/// `/people/{id}` gives `getPeopleById`, `/people/schema` gives `getPeopleSchema`.
pub fn derive_method_name(path: &str, method: HttpMethod) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let (resource, suffix) = match segments.as_slice() {
        [.., prev, last] if placeholder_name(last).is_some() => {
            let param = placeholder_name(last).unwrap_or_default();
            let resource = if placeholder_name(prev).is_some() {
                last_literal_segment(&segments)
            } else {
                Some(*prev)
            };
            (resource, format!("By{}", to_pascal_case(param)))
        }
        [.., prev, last] if last.eq_ignore_ascii_case("schema") => {
            (Some(*prev), "Schema".to_string())
        }
        [last] if placeholder_name(last).is_some() => (
            None,
            format!("By{}", to_pascal_case(placeholder_name(last).unwrap_or_default())),
        ),
        _ => (last_literal_segment(&segments), String::new()),
    };

    let resource = resource
        .map(alphanumeric_only)
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "resource".to_string());

    format!("{}{}{suffix}", method.verb(), capitalize_first(&resource))
}

fn placeholder_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

fn last_literal_segment<'a>(segments: &[&'a str]) -> Option<&'a str> {
    segments
        .iter()
        .rev()
        .find(|s| placeholder_name(s).is_none())
        .copied()
}

/// Placeholder names in order of first occurrence.
pub fn path_placeholders(path: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
        rest = &after[end + 1..];
    }
    names
}

/// Path-level parameters first, operation-level ones override by name.
/// Only path and query parameters survive.
fn merge_params<'a>(shared: &'a [Parameter], own: &'a [Parameter]) -> Vec<&'a Parameter> {
    let mut merged: Vec<&Parameter> = Vec::new();
    for p in shared.iter().chain(own) {
        if p.location != "path" && p.location != "query" {
            debug!(name = %p.name, location = %p.location, "Skipping unsupported parameter location");
            continue;
        }
        merged.retain(|existing| existing.name != p.name || existing.location != p.location);
        merged.push(p);
    }
    merged
}

fn normalize_path_params(path: &str, params: &[&Parameter]) -> Vec<ParamIR> {
    let mut used_names: HashSet<String> = HashSet::new();

    path_placeholders(path)
        .into_iter()
        .map(|placeholder| {
            let declared = params
                .iter()
                .find(|p| p.location == "path" && p.name == placeholder);

            let mut name = sanitize_ts_identifier(placeholder);
            if RESERVED_ARG_NAMES.contains(&name.as_str()) {
                name.push_str("Param");
            }
            if used_names.contains(&name) {
                name = (2..)
                    .map(|n| format!("{name}{n}"))
                    .find(|candidate| !used_names.contains(candidate))
                    .unwrap_or_default();
            }
            used_names.insert(name.clone());

            ParamIR {
                name,
                original_name: placeholder.to_string(),
                ty: declared.map_or(TsType::Primitive(TsPrimitive::String), |p| param_type(p)),
                required: true,
                location: ParamLocation::Path,
            }
        })
        .collect()
}

fn param_type(p: &Parameter) -> TsType {
    p.schema
        .as_ref()
        .map_or(TsType::Primitive(TsPrimitive::String), schema_to_ts_type)
}

/// Pick the success response: 200, 201, 202, 203, 206, 207, default, 2XX, then any other 2xx.
fn normalize_response(spec: &OpenApiSpec, op: &Operation) -> ResponseIR {
    let priority = ["200", "201", "202", "203", "206", "207", "default", "2XX"];

    let schema = priority
        .iter()
        .filter_map(|status| op.responses.get(*status))
        .chain(
            op.responses
                .iter()
                .filter(|(status, _)| status.starts_with('2') && !priority.contains(&status.as_str()))
                .map(|(_, response)| response),
        )
        .find_map(|response| response.json_schema());

    match schema {
        Some(schema) => {
            let ty = schema_to_ts_type(schema);
            let is_array = ty.is_array() || spec.resolve(schema).type_name() == Some("array");
            ResponseIR { ty, is_array }
        }
        None => ResponseIR {
            ty: TsType::any(),
            is_array: false,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::openapi::spec::Server;

    fn spec(json: &str) -> OpenApiSpec {
        OpenApiSpec::from_json(json).unwrap()
    }

    #[test]
    fn test_derive_method_name() {
        assert_eq!(derive_method_name("/people/{id}", HttpMethod::Get), "getPeopleById");
        assert_eq!(derive_method_name("/people/schema", HttpMethod::Get), "getPeopleSchema");
        assert_eq!(derive_method_name("/people", HttpMethod::Post), "createPeople");
        assert_eq!(derive_method_name("/jokes/random", HttpMethod::Get), "getRandom");
        assert_eq!(
            derive_method_name("/users/{user_id}", HttpMethod::Put),
            "updateUsersByUserId"
        );
        assert_eq!(derive_method_name("/api-keys/{id}", HttpMethod::Delete), "deleteApikeysById");
        assert_eq!(derive_method_name("/", HttpMethod::Get), "getResource");
        assert_eq!(derive_method_name("/{id}", HttpMethod::Patch), "patchResourceById");
    }

    #[test]
    fn test_path_placeholders_in_order() {
        assert_eq!(
            path_placeholders("/orgs/{org}/repos/{repo}/issues/{org}"),
            vec!["org", "repo"]
        );
        assert!(path_placeholders("/plain").is_empty());
    }

    #[test]
    fn test_operation_id_preferred() {
        let s = spec(
            r#"{"openapi":"3.0.0","paths":{"/pets":{"get":{"operationId":"list-pets","responses":{}}}}}"#,
        );
        let ir = normalize_spec(&s, None);
        assert_eq!(ir.operations[0].name, "list_pets");
    }

    #[test]
    fn test_name_collisions_get_numeric_suffix() {
        let s = spec(
            r#"{"openapi":"3.0.0","servers":[{"url":"https://x.test"}],"paths":{
                "/a/items":{"get":{"responses":{}}},
                "/b/items":{"get":{"responses":{}}},
                "/c/items":{"get":{"responses":{}}}
            }}"#,
        );
        let ir = normalize_spec(&s, None);
        let names: Vec<_> = ir.operations.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["getItems", "getItems2", "getItems3"]);
        assert_eq!(ir.warnings.len(), 2);
        assert!(ir.warnings[0].contains("GET /b/items"));
    }

    #[test]
    fn test_path_params_follow_placeholder_order() {
        let s = spec(
            r#"{"openapi":"3.0.0","paths":{"/orgs/{org}/members/{body}":{
                "parameters":[{"name":"body","in":"path","required":true,"schema":{"type":"integer"}}],
                "get":{
                    "parameters":[
                        {"name":"limit","in":"query","schema":{"type":"integer"}},
                        {"name":"X-Trace","in":"header","schema":{"type":"string"}}
                    ],
                    "responses":{}
                }
            }}}"#,
        );
        let ir = normalize_spec(&s, None);
        let op = &ir.operations[0];
        let names: Vec<_> = op.path_params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["org", "bodyParam"]);
        assert_eq!(op.path_params[0].ty, TsType::Primitive(TsPrimitive::String));
        assert_eq!(op.path_params[1].ty, TsType::Primitive(TsPrimitive::Number));
        assert_eq!(op.path_params[1].original_name, "body");
        assert_eq!(op.query_params.len(), 1);
        assert!(op.numeric_query_param(&["limit"]).is_some());
    }

    #[test]
    fn test_write_methods_get_body() {
        let s = spec(
            r##"{"openapi":"3.0.0","paths":{"/pets":{
                "post":{"requestBody":{"content":{"application/json":{"schema":{"$ref":"#/components/schemas/NewPet"}}}},"responses":{}},
                "put":{"responses":{}},
                "delete":{"responses":{}}
            }},"components":{"schemas":{"NewPet":{"type":"object","properties":{"name":{"type":"string"}}}}}}"##,
        );
        let ir = normalize_spec(&s, None);
        let by_method = |m: HttpMethod| ir.operations.iter().find(|o| o.method == m).unwrap();
        assert_eq!(
            by_method(HttpMethod::Post).body.as_ref().unwrap().ty,
            TsType::Ref("NewPet".into())
        );
        assert_eq!(
            by_method(HttpMethod::Put).body.as_ref().unwrap().ty,
            TsType::any_record()
        );
        assert!(by_method(HttpMethod::Delete).body.is_none());
    }

    #[test]
    fn test_response_array_through_reference() {
        let s = spec(
            r##"{"openapi":"3.0.0","paths":{
                "/jokes/categories":{"get":{"responses":{"200":{"content":{"application/json":{"schema":{"$ref":"#/components/schemas/Categorie"}}}}}}},
                "/jokes/random":{"get":{"responses":{"201":{"content":{"application/json":{"schema":{"$ref":"#/components/schemas/Random"}}}}}}}
            },"components":{"schemas":{
                "Categorie":{"type":"array","items":{"type":"string"}},
                "Random":{"type":"object","properties":{"value":{"type":"string"}}}
            }}}"##,
        );
        let ir = normalize_spec(&s, None);
        assert!(ir.operations[0].response.is_array);
        assert!(!ir.operations[1].response.is_array);
        assert_eq!(ir.operations[1].response.ty, TsType::Ref("Random".into()));
    }

    #[test]
    fn test_schema_types() {
        let nullable: Schema = serde_json::from_str(r#"{"type":"string","nullable":true}"#).unwrap();
        assert_eq!(
            schema_to_ts_type(&nullable),
            TsType::Union(vec![
                TsType::Primitive(TsPrimitive::String),
                TsType::Primitive(TsPrimitive::Null)
            ])
        );

        let integer = Schema::typed("integer");
        assert_eq!(schema_to_ts_type(&integer), TsType::Primitive(TsPrimitive::Number));

        let weird = Schema::typed("file");
        assert_eq!(schema_to_ts_type(&weird), TsType::any());

        let empty_object = Schema::typed("object");
        assert_eq!(schema_to_ts_type(&empty_object), TsType::any_record());

        let array = Schema::array(Schema::reference("Pet"));
        assert_eq!(
            schema_to_ts_type(&array),
            TsType::Array(Box::new(TsType::Ref("Pet".into())))
        );
    }

    #[test]
    fn test_component_interfaces() {
        let s = spec(
            r#"{"openapi":"3.0.0","paths":{},"components":{"schemas":{
                "Pet":{"type":"object","required":["id"],"properties":{"id":{"type":"integer"},"tag":{"type":"string"}}},
                "Tags":{"type":"array","items":{"type":"string"}}
            }}}"#,
        );
        let ir = normalize_spec(&s, None);
        assert_eq!(ir.types.len(), 2);
        let TypeDefKind::Interface { properties } = &ir.types[0].kind else {
            panic!("expected interface");
        };
        assert_eq!(properties[0].name, "id");
        assert!(!properties[0].optional);
        assert!(properties[1].optional);
        assert!(matches!(ir.types[1].kind, TypeDefKind::TypeAlias { .. }));
    }

    #[test]
    fn test_base_url_resolution() {
        let mut s = spec(r#"{"openapi":"3.0.0","paths":{}}"#);

        let (url, warning) = resolve_base_url(&s, Some("https://x.test/openapi.json"));
        assert_eq!(url, "https://x.test");
        assert_eq!(warning.unwrap(), "No servers field, inferred: https://x.test");

        let (url, warning) = resolve_base_url(&s, Some("./local/spec.json"));
        assert_eq!(url, PLACEHOLDER_ORIGIN);
        assert!(warning.is_some());

        s.servers = vec![Server {
            url: "/api/v1/".into(),
            description: None,
        }];
        let (url, warning) = resolve_base_url(&s, Some("https://x.test/docs/openapi.json"));
        assert_eq!(url, "https://x.test/api/v1");
        assert_eq!(warning.unwrap(), "Relative server URL resolved to: https://x.test/api/v1");

        let (url, _) = resolve_base_url(&s, None);
        assert_eq!(url, PLACEHOLDER_ORIGIN);

        s.servers[0].url = "https://api.x.test/v2".into();
        let (url, warning) = resolve_base_url(&s, Some("https://x.test"));
        assert_eq!(url, "https://api.x.test/v2");
        assert!(warning.is_none());
    }
}
