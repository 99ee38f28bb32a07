#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use docs2client_cli::emit::{cache_spec, emit_client};
use docs2client_cli::run_async;
use docs2client_cli::source::{ContentKind, Source, detect_content_type, fetch_spec, resolve};
use docs2client_cli::SourceError;
use docs2client_core::openapi::generate_from_json;
use docs2client_core::{GenerateOptions, OpenApiSpec};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PETS_SPEC: &str = r##"{
  "openapi": "3.0.0",
  "info": {"title": "Pets", "version": "1.0.0"},
  "x-vendor-extension": {"ignored": true},
  "servers": [{"url": "https://pets.test/v1"}],
  "paths": {
    "/pets": {
      "get": {
        "operationId": "listPets",
        "parameters": [{"name": "limit", "in": "query", "schema": {"type": "integer"}}],
        "responses": {"200": {"description": "ok", "content": {"application/json": {"schema": {"type": "array", "items": {"$ref": "#/components/schemas/Pet"}}}}}}
      }
    }
  },
  "components": {
    "schemas": {
      "Pet": {"type": "object", "required": ["id"], "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}}
    }
  }
}"##;

fn read(dir: &Path, relative: &str) -> String {
    fs::read_to_string(dir.join(relative)).unwrap()
}

#[tokio::test]
async fn test_detect_content_type_from_head() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html; charset=utf-8"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/json"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let docs = format!("{}/docs", server.uri());
    let spec = format!("{}/openapi.json", server.uri());
    assert_eq!(detect_content_type(&client, &docs).await, ContentKind::Html);
    assert_eq!(detect_content_type(&client, &spec).await, ContentKind::Json);
}

#[tokio::test]
async fn test_detect_content_type_sniffs_body() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/openapi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  {\"openapi\": \"3.0.0\"}"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/readme"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Plain words"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let openapi = format!("{}/openapi", server.uri());
    let readme = format!("{}/readme", server.uri());
    assert_eq!(detect_content_type(&client, &openapi).await, ContentKind::Json);
    assert_eq!(detect_content_type(&client, &readme).await, ContentKind::Html);
    assert_eq!(
        detect_content_type(&client, "http://127.0.0.1:1/").await,
        ContentKind::Html
    );
}

#[tokio::test]
async fn test_resolve_classifies_inputs() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/json"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = format!("{}/api/openapi/", server.uri());
    assert_eq!(
        resolve(&client, &url).await,
        Source::RemoteSpec(format!("{}/api/openapi.json", server.uri()))
    );
    assert_eq!(
        resolve(&client, "specs/pets.json").await,
        Source::LocalSpec("specs/pets.json".into())
    );
    assert_eq!(
        resolve(&client, "docs/index.html").await,
        Source::LocalDocs("docs/index.html".into())
    );
}

#[tokio::test]
async fn test_fetch_spec_requires_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PETS_SPEC))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let spec = fetch_spec(&client, &format!("{}/openapi.json", server.uri()))
        .await
        .unwrap();
    assert!(spec.paths.contains_key("/pets"));

    let err = fetch_spec(&client, &format!("{}/missing.json", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Status { status: 404, .. }));
    assert_eq!(err.to_string(), "Failed to fetch: 404 Not Found");
}

#[tokio::test]
async fn test_emit_writes_cache_and_client_files() {
    let dir = tempfile::tempdir().unwrap();
    let spec = OpenApiSpec::from_json(PETS_SPEC).unwrap();

    let cached = cache_spec(dir.path(), "pets", &spec).await.unwrap();
    assert_eq!(cached, dir.path().join("specs/pets.json"));
    let reparsed = OpenApiSpec::from_json(&fs::read_to_string(&cached).unwrap()).unwrap();
    assert_eq!(reparsed, spec);

    let without_tests = GenerateOptions {
        origin: None,
        generate_tests: false,
    };
    let generated = generate_from_json(PETS_SPEC, &without_tests).unwrap();
    let out = emit_client(dir.path(), "pets", &generated).await.unwrap();
    assert_eq!(out, dir.path().join("generated/pets"));
    assert!(out.join("client.ts").exists());
    assert!(out.join("types.ts").exists());
    assert!(out.join("index.ts").exists());
    assert!(!out.join("client.test.ts").exists());
}

#[tokio::test]
async fn test_run_with_local_spec() {
    let dir = tempfile::tempdir().unwrap();
    let spec_path = dir.path().join("pets.json");
    fs::write(&spec_path, PETS_SPEC).unwrap();

    let code = run_async([
        "docs2client",
        spec_path.to_str().unwrap(),
        "--out-dir",
        dir.path().to_str().unwrap(),
        "--env-file",
        dir.path().join(".env").to_str().unwrap(),
    ])
    .await;
    assert_eq!(code, 0);

    let client = read(dir.path(), "generated/pets/client.ts");
    assert!(client.contains("constructor(baseUrl: string = \"https://pets.test/v1\")"));
    assert!(client.contains("async listPets(query?: { limit?: number }): Promise<Pet[]>"));
    assert!(read(dir.path(), "generated/pets/types.ts").contains("export interface Pet {"));
    assert!(dir.path().join("generated/pets/client.test.ts").exists());
    assert!(!dir.path().join("specs").exists());
}

#[tokio::test]
async fn test_run_with_remote_docs() {
    let server = MockServer::start().await;
    let html = format!(
        "<html><body><h1>Jokes</h1><p>Random joke: <code>GET /jokes/random</code></p>\
         <pre>curl {}/jokes/categories</pre></body></html>",
        server.uri()
    );
    Mock::given(method("HEAD"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jokes/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["animal", "dev"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jokes/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x", "value": "joke"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let docs_url = format!("{}/docs", server.uri());
    let code = run_async([
        "docs2client",
        docs_url.as_str(),
        "--patterns",
        "--no-tests",
        "--out-dir",
        dir.path().to_str().unwrap(),
        "--env-file",
        dir.path().join(".env").to_str().unwrap(),
    ])
    .await;
    assert_eq!(code, 0);

    let cached = OpenApiSpec::from_json(&read(dir.path(), "specs/127_0_0_1.json")).unwrap();
    assert_eq!(cached.paths.len(), 2);
    let client = read(dir.path(), "generated/127_0_0_1/client.ts");
    assert!(client.contains("async getRandom("));
    assert!(client.contains("async getCategories("));
    assert!(!dir.path().join("generated/127_0_0_1/client.test.ts").exists());
}

#[tokio::test]
async fn test_run_fails_for_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let code = run_async([
        "docs2client",
        dir.path().join("absent.json").to_str().unwrap(),
        "--out-dir",
        dir.path().to_str().unwrap(),
        "--env-file",
        dir.path().join(".env").to_str().unwrap(),
    ])
    .await;
    assert_eq!(code, 1);
    assert!(!dir.path().join("generated").exists());
}
