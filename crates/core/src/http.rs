//! The shared outbound HTTP client.

use reqwest::{Client, Proxy};
use tracing::warn;

use crate::config::Config;
use crate::error::ConfigError;

const USER_AGENT: &str = concat!("docs2client/", env!("CARGO_PKG_VERSION"));

/// Build the one client used for fetching, probing and the LLM call.
///
/// With a proxy configured, certificate validation is disabled because the
/// proxy re-signs TLS.
pub fn build_http_client(config: &Config) -> Result<Client, ConfigError> {
    let mut builder = Client::builder().user_agent(USER_AGENT);

    if let Some(proxy) = &config.proxy {
        let proxy = Proxy::all(proxy.url()).map_err(|err| {
            warn!(error = %err, "Invalid proxy URL");
            ConfigError::Proxy(err)
        })?;
        builder = builder.proxy(proxy).danger_accept_invalid_certs(true);
    }

    builder.build().map_err(|err| {
        warn!(error = %err, "Failed to build HTTP client");
        ConfigError::HttpClient(err)
    })
}
