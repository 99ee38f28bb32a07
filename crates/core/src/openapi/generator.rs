//! TypeScript client generator for OpenAPI specifications.
//!
//! The pipeline is:
//! 1. Parse: OpenAPI JSON -> OpenApiSpec
//! 2. Normalize: OpenApiSpec -> ApiIR (base URL, names, parameters resolved)
//! 3. Codegen: ApiIR -> TsModules (TypeScript AST)
//! 4. Emit: TsModule -> String (via Emit trait)

use crate::error::SpecError;
use crate::openapi::ir::{Emit, codegen_modules, normalize_spec};
use crate::openapi::spec::OpenApiSpec;

/// Knobs for a generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Where the document came from (URL or path); used only for base URL resolution.
    pub origin: Option<String>,
    pub generate_tests: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            origin: None,
            generate_tests: true,
        }
    }
}

/// Every emitted source of a generated client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedClient {
    /// `client.ts`
    pub client_source: String,
    /// `types.ts`
    pub type_definitions: String,
    /// `index.ts`
    pub index_module: String,
    /// `client.test.ts`, absent when tests are disabled
    pub test_source: Option<String>,
    /// Default base URL baked into the client
    pub base_url: String,
    /// Fallbacks taken while generating (base URL inference, renamed methods)
    pub warnings: Vec<String>,
}

/// Generate a TypeScript client from a parsed specification.
///
/// Pure apart from logging: the same spec and options always give
/// byte-identical output.
pub fn generate(spec: &OpenApiSpec, options: &GenerateOptions) -> GeneratedClient {
    let api = normalize_spec(spec, options.origin.as_deref());
    let modules = codegen_modules(&api, options.generate_tests);

    GeneratedClient {
        client_source: modules.client.emit(),
        type_definitions: modules.types.emit(),
        index_module: modules.index.emit(),
        test_source: modules.tests.as_ref().map(Emit::emit),
        base_url: api.base_url,
        warnings: api.warnings,
    }
}

/// Generate a TypeScript client from an OpenAPI JSON string.
pub fn generate_from_json(
    openapi_json: &str,
    options: &GenerateOptions,
) -> Result<GeneratedClient, SpecError> {
    let spec = OpenApiSpec::from_json(openapi_json)?;
    Ok(generate(&spec, options))
}
