//! API-level IR for normalized operations.
//!
//! This module defines the intermediate representation for API operations:
//! - OperationIR: Normalized HTTP operations
//! - ParamIR: Path and query parameters
//! - ResponseIR: What the generated method returns

use super::types::{TsType, TsTypeDef};

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn from_lowercase(method: &str) -> Option<Self> {
        match method {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Verb used when deriving a method name from the path.
    pub fn verb(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "create",
            HttpMethod::Put => "update",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// POST, PUT and PATCH carry a JSON body.
    pub fn has_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
}

/// Normalized parameter
#[derive(Debug, Clone)]
pub struct ParamIR {
    /// TypeScript identifier (path params) or property key (query params)
    pub name: String,
    /// Name as declared in the document; matches the `{placeholder}` for path params
    pub original_name: String,
    pub ty: TsType,
    pub required: bool,
    pub location: ParamLocation,
}

/// Request body
#[derive(Debug, Clone)]
pub struct BodyIR {
    pub ty: TsType,
}

/// Response information
#[derive(Debug, Clone)]
pub struct ResponseIR {
    pub ty: TsType,
    /// Whether the response schema (after following one reference) is an array
    pub is_array: bool,
}

/// Normalized API operation
#[derive(Debug, Clone)]
pub struct OperationIR {
    /// Method name on the generated client (e.g., "getPeopleById")
    pub name: String,
    /// URL path (e.g., "/people/{id}")
    pub path: String,
    pub method: HttpMethod,
    pub summary: Option<String>,
    /// Path parameters in placeholder order
    pub path_params: Vec<ParamIR>,
    pub query_params: Vec<ParamIR>,
    pub body: Option<BodyIR>,
    pub response: ResponseIR,
}

impl OperationIR {
    /// First optional numeric query parameter whose name is one of `names`.
    pub fn numeric_query_param(&self, names: &[&str]) -> Option<&ParamIR> {
        self.query_params
            .iter()
            .find(|p| !p.required && p.ty.is_number() && names.contains(&p.original_name.as_str()))
    }
}

/// Complete API IR
#[derive(Debug, Clone)]
pub struct ApiIR {
    /// Default base URL baked into the client constructor
    pub base_url: String,
    pub operations: Vec<OperationIR>,
    /// Component schema type definitions
    pub types: Vec<TsTypeDef>,
    /// Warnings recorded while normalizing
    pub warnings: Vec<String>,
}
