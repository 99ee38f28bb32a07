//! LLM-assisted endpoint extraction against an Ollama-compatible chat API.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::infer_base_url;
use crate::endpoint::{Endpoint, dedupe};

/// The model call runs to completion in a single round trip, so give it room.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(300);

/// Why an assisted extraction produced nothing usable.
#[derive(Debug, thiserror::Error)]
pub enum AssistFailure {
    #[error("LLM service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("Ollama API error: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("Unreadable response envelope: {0}")]
    Envelope(#[source] reqwest::Error),

    #[error("Model output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Model output is not a JSON array")]
    NotAnArray,

    #[error("Model returned no usable endpoints")]
    Empty,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
    format: &'static str,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
    #[serde(default)]
    response: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> String {
        self.message
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .or(self.response)
            .unwrap_or_default()
    }
}

/// Sends documentation to a chat model and parses the endpoint list it returns.
#[derive(Debug, Clone)]
pub struct AssistedExtractor {
    client: reqwest::Client,
    ollama_url: String,
    model: String,
    timeout: Duration,
    debug_dir: Option<PathBuf>,
}

impl AssistedExtractor {
    pub fn new(
        client: reqwest::Client,
        ollama_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            ollama_url: ollama_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: DEFAULT_LLM_TIMEOUT,
            debug_dir: None,
        }
    }

    /// Persist every raw model response under `dir`.
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one chat round trip and parse the result.
    pub async fn extract(&self, markdown: &str, origin: &str) -> Result<Vec<Endpoint>, AssistFailure> {
        let base_url = infer_base_url(markdown, origin);
        let prompt = build_prompt(&base_url, markdown);

        let url = format!("{}/api/chat", self.ollama_url);
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
            stream: false,
            format: "json",
            options: ChatOptions { temperature: 0.1 },
        };

        info!(model = %self.model, %url, "Extracting endpoints with LLM.");
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(AssistFailure::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistFailure::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let envelope: ChatResponse = response.json().await.map_err(AssistFailure::Envelope)?;
        let content = envelope.into_content();

        if let Some(dir) = &self.debug_dir {
            save_debug_artifact(dir, origin, &content).await;
        }

        parse_model_output(&content)
    }
}

fn build_prompt(base_url: &str, markdown: &str) -> String {
    format!(
        r#"You are an API documentation parser. Extract all API endpoints from the following markdown documentation.

Base URL: {base_url}

Documentation:
{markdown}

Extract all API endpoints mentioned in the documentation. For each endpoint, identify:
1. The path (normalize path parameters like /people/1/ to /people/{{id}}/)
2. HTTP method (GET, POST, PUT, DELETE, etc.)
3. Query parameters (if any)
4. Path parameters (if any, like {{id}}, {{category}}, etc.)
5. Brief description if available

Return ONLY a JSON array of endpoints in this exact format:
[
  {{
    "path": "/jokes/random",
    "method": "GET",
    "queryParams": ["category"],
    "pathParams": [],
    "description": "Get a random joke"
  }},
  {{
    "path": "/people/{{id}}",
    "method": "GET",
    "queryParams": [],
    "pathParams": ["id"],
    "description": "Get a specific person"
  }}
]

Only include actual API endpoints. Exclude:
- Image URLs (/img/, .png, .jpg, etc.)
- Static assets (/css/, /js/, etc.)
- OAuth endpoints (/oauth/, /connect/)
- External links (different domains)
- Social media links (/twitter/, /github/, etc.)
- Very long paths that look like base64 data

Return ONLY the JSON array, no other text."#
    )
}

/// Best-effort write of the raw model output; failures are only logged.
async fn save_debug_artifact(dir: &std::path::Path, origin: &str, content: &str) {
    let host = Url::parse(origin)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.replace('.', "_")))
        .unwrap_or_else(|| "local".to_string());
    let file_name = format!("{host}_{}.md", chrono::Utc::now().timestamp_millis());
    let path = dir.join(&file_name);

    let result = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, content).await
    }
    .await;

    match result {
        Ok(()) => info!(path = %path.display(), "Saved LLM response."),
        Err(err) => warn!(error = %err, path = %path.display(), "Failed to save debug file."),
    }
}

/// Turn untrusted model text into endpoints.
///
/// Strips a surrounding code fence, takes the outermost `[...]` span, and keeps
/// only entries carrying both `path` and `method`.
pub fn parse_model_output(content: &str) -> Result<Vec<Endpoint>, AssistFailure> {
    let unfenced = strip_code_fence(content);
    let candidate = match (unfenced.find('['), unfenced.rfind(']')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    };

    let value: Value = serde_json::from_str(candidate)?;
    let Value::Array(entries) = value else {
        return Err(AssistFailure::NotAnArray);
    };

    let endpoints: Vec<Endpoint> = entries.iter().filter_map(endpoint_from_entry).collect();
    debug!(
        entries = entries.len(),
        kept = endpoints.len(),
        "Parsed model output."
    );

    let endpoints = dedupe(endpoints);
    if endpoints.is_empty() {
        return Err(AssistFailure::Empty);
    }
    Ok(endpoints)
}

fn strip_code_fence(content: &str) -> &str {
    let mut text = content.trim();
    if let Some(rest) = text
        .get(..7)
        .filter(|prefix| prefix.eq_ignore_ascii_case("```json"))
        .and_then(|_| text.get(7..))
    {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn endpoint_from_entry(entry: &Value) -> Option<Endpoint> {
    let path = entry.get("path")?.as_str().filter(|s| !s.trim().is_empty())?;
    let method = entry.get("method")?.as_str().filter(|s| !s.trim().is_empty())?;

    let mut endpoint = Endpoint::new(path.trim(), method.trim())
        .with_query_params(string_list(entry.get("queryParams")))
        .with_path_params(string_list(entry.get("pathParams")));
    if let Some(description) = entry.get("description").and_then(Value::as_str) {
        endpoint = endpoint.with_description(description);
    }
    Some(endpoint)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
