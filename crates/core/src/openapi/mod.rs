//! OpenAPI document model and TypeScript client generator.
//!
//! The generator turns a specification into:
//! - Type definitions from component schemas
//! - A fetch-based `ApiClient` class with one method per operation
//! - An index module and an optional `bun:test` smoke-test module

mod generator;
pub mod ir;
pub mod spec;

pub use generator::{GenerateOptions, GeneratedClient, generate, generate_from_json};
pub use spec::OpenApiSpec;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const PEOPLE_JSON: &str = r##"{
  "openapi": "3.0.0",
  "info": { "title": "API Client", "version": "1.0.0" },
  "paths": {
    "/people": {
      "get": {
        "summary": "Get people",
        "parameters": [
          { "name": "limit", "in": "query", "schema": { "type": "integer" } },
          { "name": "skip", "in": "query", "schema": { "type": "integer" } }
        ],
        "responses": { "200": { "description": "Success", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/People" } } } } }
      },
      "post": {
        "requestBody": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Person" } } } },
        "responses": { "201": { "description": "Created", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Person" } } } } }
      }
    },
    "/people/{id}": {
      "get": {
        "summary": "Get people by ID",
        "parameters": [{ "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }],
        "responses": { "200": { "description": "Success", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Person" } } } } }
      }
    },
    "/people/schema": {
      "get": {
        "responses": { "200": { "description": "Success", "content": { "application/json": { "schema": { "type": "object" } } } } }
      }
    },
    "/planets": {
      "get": {
        "parameters": [
          { "name": "limit", "in": "query", "schema": { "type": "integer" } },
          { "name": "offset", "in": "query", "schema": { "type": "integer" } }
        ],
        "responses": { "200": { "description": "Success", "content": { "application/json": { "schema": { "type": "array", "items": { "type": "object" } } } } } }
      }
    }
  },
  "components": {
    "schemas": {
      "People": { "type": "array", "items": { "$ref": "#/components/schemas/Person" } },
      "Person": {
        "type": "object",
        "required": ["name"],
        "properties": {
          "name": { "type": "string" },
          "height": { "type": "integer" },
          "homeworld": { "type": "string", "nullable": true }
        }
      }
    }
  }
}"##;

    fn options(origin: Option<&str>) -> GenerateOptions {
        GenerateOptions {
            origin: origin.map(str::to_string),
            generate_tests: true,
        }
    }

    #[test]
    fn test_generate_from_openapi_json() {
        let client = generate_from_json(PEOPLE_JSON, &options(Some("https://swapi.test/api/openapi.json"))).unwrap();

        // Method naming
        assert!(client.client_source.contains("async getPeople(query?: { limit?: number; skip?: number }): Promise<People> {"));
        assert!(client.client_source.contains("async createPeople(body: Person): Promise<Person> {"));
        assert!(client.client_source.contains("async getPeopleById(id: string): Promise<Person> {"));
        assert!(client.client_source.contains("async getPeopleSchema(): Promise<Record<string, any>> {"));

        // Types are imported, sorted
        assert!(client.client_source.starts_with("import type { People, Person } from \"./types.js\";\n"));

        // Type definitions
        assert!(client.type_definitions.contains("export type People = Person[];\n"));
        assert!(client.type_definitions.contains(
            "export interface Person {\n  height?: number;\n  homeworld?: string | null;\n  name: string;\n}\n"
        ));

        assert_eq!(
            client.index_module,
            "export { ApiClient } from \"./client.js\";\nexport * from \"./types.js\";\n"
        );
    }

    #[test]
    fn test_base_url_inferred_from_origin() {
        let spec = OpenApiSpec::from_json(r#"{"openapi":"3.0.0","paths":{"/ping":{"get":{"responses":{}}}}}"#).unwrap();
        let client = generate(&spec, &options(Some("https://x.test/openapi.json")));

        assert_eq!(client.base_url, "https://x.test");
        assert_eq!(client.warnings, vec!["No servers field, inferred: https://x.test".to_string()]);
        assert!(client.client_source.contains("constructor(baseUrl: string = \"https://x.test\") {"));
        assert_eq!(client.type_definitions, "// No schemas defined in OpenAPI spec\n");
    }

    #[test]
    fn test_generation_is_deterministic() {
        let origin = Some("https://swapi.test/api/openapi.json");
        let first = generate_from_json(PEOPLE_JSON, &options(origin)).unwrap();
        let second = generate_from_json(PEOPLE_JSON, &options(origin)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generated_tests() {
        let client = generate_from_json(PEOPLE_JSON, &options(None)).unwrap();
        let tests = client.test_source.unwrap();

        assert!(tests.contains("test(\"getPeople returns array\", async () => {\n"));
        assert!(tests.contains("  const result = await client.getPeople({ limit: 5 });\n"));
        assert!(tests.contains("test(\"getPeopleSchema returns object\", async () => {\n"));
        assert!(tests.contains("test(\"getPlanets returns array\", async () => {\n"));
        // Operations with path parameters get no smoke test
        assert!(!tests.contains("getPeopleById"));
        // Two paginated list operations, the first one is exercised
        assert!(tests.contains("test(\"getPeople paginates with limit/skip\", async () => {\n"));
        assert!(!tests.contains("getPlanets paginates"));
    }

    #[test]
    fn test_no_tests_when_disabled() {
        let client = generate_from_json(
            PEOPLE_JSON,
            &GenerateOptions {
                origin: None,
                generate_tests: false,
            },
        )
        .unwrap();
        assert!(client.test_source.is_none());
        // No server and no origin: placeholder with a warning
        assert_eq!(client.base_url, "https://api.example.com");
        assert_eq!(client.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = generate_from_json("{ not json", &GenerateOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse OpenAPI spec:"));
    }
}
