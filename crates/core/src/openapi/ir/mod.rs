//! Intermediate Representation for OpenAPI to TypeScript client generation.
//!
//! This module defines a three-layer architecture:
//! 1. API-level IR: Normalized operations, parameters, responses (OpenAPI-agnostic)
//! 2. TypeScript AST IR: Types, expressions, statements, classes, tests
//! 3. Emission: AST to TypeScript code strings via the `Emit` trait
//!
//! ## Module Structure
//!
//! - `types`: TypeScript AST IR (TsType, TsExpr, TsStmt, TsClass, TsModule)
//! - `api`: API-level IR (ApiIR, OperationIR, ParamIR, ResponseIR)
//! - `normalize`: OpenAPI spec -> API IR conversion
//! - `codegen`: API IR -> TypeScript AST
//! - `emit`: TypeScript AST -> code strings (via Emit trait)
//! - `utils`: Common utilities shared across modules

mod api;
mod codegen;
mod emit;
mod normalize;
mod types;
pub mod utils;

pub use codegen::{ClientModules, codegen_modules};
pub use emit::Emit;
pub use normalize::{derive_method_name, normalize_spec, resolve_base_url};
pub use api::HttpMethod;
