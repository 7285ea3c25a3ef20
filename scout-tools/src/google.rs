//! Google Programmable Search (Custom Search JSON API) backend.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scout_core::config::SearchConfig;
use scout_core::error::ProviderError;
use scout_core::evidence::SearchBackend;
use serde_json::Value;
use tracing::debug;

const BACKEND_NAME: &str = "google";
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// The API serves at most this many items per request.
pub const MAX_PAGE_SIZE: usize = 10;

pub struct GoogleSearchBackend {
    client: Client,
    base_url: String,
    api_key: String,
    engine_id: String,
    timeout_secs: u64,
}

impl GoogleSearchBackend {
    /// Build a backend with explicit credentials.
    pub fn new(config: &SearchConfig, api_key: String, engine_id: String) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() || engine_id.trim().is_empty() {
            return Err(ProviderError::MissingCredentials {
                backend: BACKEND_NAME.to_string(),
                what: "API key and search engine id are both required".to_string(),
            });
        }
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ProviderError::Connection {
                backend: BACKEND_NAME.to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: config
                .google
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            engine_id,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Build a backend resolving credentials from config or environment.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ProviderError> {
        let (api_key, engine_id) =
            config
                .google
                .resolve_credentials()
                .map_err(|e| ProviderError::MissingCredentials {
                    backend: BACKEND_NAME.to_string(),
                    what: e.to_string(),
                })?;
        Self::new(config, api_key, engine_id)
    }

    fn search_url(&self, query: &str, max_results: usize) -> String {
        format!(
            "{}?key={}&cx={}&q={}&num={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.engine_id),
            urlencoding::encode(query),
            max_results.clamp(1, MAX_PAGE_SIZE)
        )
    }
}

#[async_trait]
impl SearchBackend for GoogleSearchBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Value>, ProviderError> {
        let url = self.search_url(query, max_results);
        debug!(backend = BACKEND_NAME, num = max_results.clamp(1, MAX_PAGE_SIZE), "Querying custom search");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    backend: BACKEND_NAME.to_string(),
                    timeout_secs: self.timeout_secs,
                }
            } else {
                // The URL carries the API key.
                ProviderError::Connection {
                    backend: BACKEND_NAME.to_string(),
                    message: e.without_url().to_string(),
                }
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::MalformedPayload {
                backend: BACKEND_NAME.to_string(),
                message: e.without_url().to_string(),
            })?;
        let body = classify(status, &text)?;

        let items = parse_items(&body, max_results);
        debug!(backend = BACKEND_NAME, items = items.len(), "Custom search complete");
        Ok(items)
    }
}

/// Turn a raw response into the JSON payload, or the error it reports.
///
/// An API error object wins over the transport status; a body that is not
/// JSON at all is malformed whatever the status.
fn classify(status: StatusCode, text: &str) -> Result<Value, ProviderError> {
    let body: Value = serde_json::from_str(text).map_err(|e| ProviderError::MalformedPayload {
        backend: BACKEND_NAME.to_string(),
        message: format!("HTTP {}: {}", status.as_u16(), e),
    })?;

    if let Some((code, message)) = api_error(&body) {
        return Err(ProviderError::HttpStatus {
            backend: BACKEND_NAME.to_string(),
            status: code.unwrap_or(status.as_u16()),
            body: message,
        });
    }
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            backend: BACKEND_NAME.to_string(),
            status: status.as_u16(),
            body: text.chars().take(200).collect(),
        });
    }
    Ok(body)
}

/// The `(code, message)` of an API error object, if the payload is one.
fn api_error(body: &Value) -> Option<(Option<u16>, String)> {
    let err = body.get("error")?;
    let code = err
        .get("code")
        .and_then(|c| c.as_u64())
        .and_then(|c| u16::try_from(c).ok());
    let message = err
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("unknown error")
        .to_string();
    Some((code, message))
}

/// The `items` array of a search response, truncated to `max_results`.
///
/// A response without `items` is a search with zero hits.
pub fn parse_items(body: &Value, max_results: usize) -> Vec<Value> {
    body.get("items")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().take(max_results).cloned().collect())
        .unwrap_or_default()
}
