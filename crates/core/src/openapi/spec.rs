//! OpenAPI document model.
//!
//! A minimal subset of OpenAPI 3.x: enough to round-trip synthesized specs,
//! load third-party documents and drive the TypeScript generator. Root
//! properties outside the modelled set are dropped on parse. Maps are
//! `BTreeMap`s so serialization and generation order is stable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SpecError;

/// Prefix of every component schema reference.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Root OpenAPI document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swagger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Components section containing reusable schemas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// Operations present on this item, in `get, post, put, patch, delete` order.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("get", self.get.as_ref()),
            ("post", self.post.as_ref()),
            ("put", self.put.as_ref()),
            ("patch", self.patch.as_ref()),
            ("delete", self.delete.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
}

/// A parameter (query, path, header or cookie).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Parameter {
    /// A string-typed parameter.
    pub fn string(name: impl Into<String>, location: &str, required: bool) -> Self {
        Self {
            name: name.into(),
            location: location.to_string(),
            required,
            schema: Some(Schema::typed("string")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

impl Response {
    /// A `Success` response carrying one `application/json` schema.
    pub fn json(schema: Schema) -> Self {
        Self {
            description: Some("Success".to_string()),
            content: Some(BTreeMap::from([(
                "application/json".to_string(),
                MediaType {
                    schema: Some(schema),
                },
            )])),
        }
    }

    pub fn json_schema(&self) -> Option<&Schema> {
        json_schema(self.content.as_ref())
    }
}

impl RequestBody {
    pub fn json_schema(&self) -> Option<&Schema> {
        json_schema(self.content.as_ref())
    }
}

fn json_schema(content: Option<&BTreeMap<String, MediaType>>) -> Option<&Schema> {
    let content = content?;
    content
        .get("application/json")
        .or_else(|| {
            content
                .iter()
                .find(|(media, _)| media.ends_with("+json"))
                .map(|(_, m)| m)
        })?
        .schema
        .as_ref()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

impl Schema {
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(schema_type.to_string())),
            ..Self::default()
        }
    }

    /// A `$ref` to a component schema.
    pub fn reference(name: &str) -> Self {
        Self {
            ref_path: Some(format!("{SCHEMA_REF_PREFIX}{name}")),
            ..Self::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array")
        }
    }

    pub fn object(properties: BTreeMap<String, Schema>) -> Self {
        Self {
            properties: Some(properties),
            ..Self::typed("object")
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = Some(true);
        self
    }

    /// The primary non-null type name, if any.
    pub fn type_name(&self) -> Option<&str> {
        match &self.schema_type {
            Some(SchemaType::Single(t)) => Some(t.as_str()),
            Some(SchemaType::Multiple(types)) => {
                types.iter().map(String::as_str).find(|t| *t != "null")
            }
            None => None,
        }
    }

    /// Component name of a local `#/components/schemas/...` reference.
    pub fn ref_name(&self) -> Option<&str> {
        self.ref_path.as_deref()?.strip_prefix(SCHEMA_REF_PREFIX)
    }

    /// Check if this schema is nullable (nullable flag, type array, or anyOf null).
    pub fn is_nullable(&self) -> bool {
        if self.nullable == Some(true) {
            return true;
        }

        if let Some(SchemaType::Multiple(types)) = &self.schema_type
            && types.iter().any(|t| t == "null")
        {
            return true;
        }

        self.any_of
            .iter()
            .flatten()
            .any(|s| matches!(&s.schema_type, Some(SchemaType::Single(t)) if t == "null"))
    }

    /// Visit every `$ref` in this schema and its subschemas.
    pub fn visit_refs<'a>(&'a self, visit: &mut impl FnMut(&'a str)) {
        if let Some(reference) = &self.ref_path {
            visit(reference);
        }
        for schema in self.properties.iter().flat_map(BTreeMap::values) {
            schema.visit_refs(visit);
        }
        if let Some(items) = &self.items {
            items.visit_refs(visit);
        }
        for list in [&self.any_of, &self.one_of, &self.all_of] {
            for schema in list.iter().flatten() {
                schema.visit_refs(visit);
            }
        }
        if let Some(AdditionalProperties::Schema(schema)) = &self.additional_properties {
            schema.visit_refs(visit);
        }
    }
}

impl OpenApiSpec {
    /// Parse an OpenAPI document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON, as written to the spec cache.
    pub fn to_json_pretty(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn schemas(&self) -> Option<&BTreeMap<String, Schema>> {
        self.components.as_ref().map(|c| &c.schemas)
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas()?.get(name)
    }

    /// Follow a local reference one level; non-references are returned as is.
    pub fn resolve<'a>(&'a self, schema: &'a Schema) -> &'a Schema {
        schema
            .ref_name()
            .and_then(|name| self.schema(name))
            .unwrap_or(schema)
    }

    fn first_missing_ref<'a>(&self, schemas: impl IntoIterator<Item = &'a Schema>) -> Option<String> {
        let mut refs = Vec::new();
        for schema in schemas {
            schema.visit_refs(&mut |reference| refs.push(reference));
        }
        refs.into_iter()
            .find(|reference| {
                reference
                    .strip_prefix(SCHEMA_REF_PREFIX)
                    .is_some_and(|name| self.schema(name).is_none())
            })
            .map(str::to_string)
    }

    /// Structural checks that make a document safe to generate from.
    ///
    /// Fails when neither version field is present, when a path does not start
    /// with `/`, or when a path-item references a component schema that does
    /// not exist. Anything beyond that is left to the consumer.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.openapi.is_none() && self.swagger.is_none() {
            return Err(SpecError::MissingVersion);
        }

        for (path, item) in &self.paths {
            if !path.starts_with('/') {
                return Err(SpecError::InvalidPath(path.clone()));
            }

            let shared = item.parameters.iter().filter_map(|p| p.schema.as_ref());
            if let Some(reference) = self.first_missing_ref(shared) {
                return Err(SpecError::UnresolvedRef {
                    reference,
                    location: path.clone(),
                });
            }

            for (method, op) in item.operations() {
                let schemas = op
                    .parameters
                    .iter()
                    .filter_map(|p| p.schema.as_ref())
                    .chain(op.request_body.as_ref().and_then(RequestBody::json_schema))
                    .chain(op.responses.values().filter_map(Response::json_schema));
                if let Some(reference) = self.first_missing_ref(schemas) {
                    return Err(SpecError::UnresolvedRef {
                        reference,
                        location: format!("{} {path}", method.to_ascii_uppercase()),
                    });
                }
            }
        }

        Ok(())
    }
}
