//! Live HTTP probes against the documented API.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ProbeError;

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// One successful probe; consumed immediately by the synthesizer.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub status: u16,
    /// Parsed JSON body, `{}` when the body is not JSON
    pub body: Value,
    pub headers: HeaderMap,
}

/// Issues `GET` probes relative to a base URL, one at a time.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Prober {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe `path` (which may carry a query string).
    ///
    /// Only a 2xx response is `Ok`; transport failures and other statuses are
    /// returned as [`ProbeError`] for the caller to log and skip.
    pub async fn probe(&self, path: &str) -> Result<ProbeResult, ProbeError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "Probing endpoint");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| ProbeError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let headers = response.headers().clone();
        let body = match response.json::<Value>().await {
            Ok(body) => body,
            Err(err) => {
                debug!(
                    url = %url,
                    content_type = ?headers.get(CONTENT_TYPE),
                    error = %err,
                    "Response is not JSON, treating as empty object"
                );
                Value::Object(Map::new())
            }
        };

        Ok(ProbeResult {
            status: status.as_u16(),
            body,
            headers,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_probe_parses_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jokes/random"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": "joke text"})))
            .mount(&server)
            .await;

        let prober = Prober::new(Client::new(), &format!("{}/", server.uri()));
        let result = prober.probe("/jokes/random").await.unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(result.body, json!({"value": "joke text"}));
    }

    #[tokio::test]
    async fn test_probe_non_json_body_is_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let prober = Prober::new(Client::new(), &server.uri());
        let result = prober.probe("/health").await.unwrap();
        assert_eq!(result.status, 204);
        assert_eq!(result.body, json!({}));
    }

    #[tokio::test]
    async fn test_probe_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let prober = Prober::new(Client::new(), &server.uri());
        let err = prober.probe("/missing").await.unwrap_err();
        assert!(matches!(err, ProbeError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_probe_unreachable() {
        let prober = Prober::new(Client::new(), "http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(2));
        let err = prober.probe("/x").await.unwrap_err();
        assert!(matches!(err, ProbeError::Transport { .. }));
    }
}
