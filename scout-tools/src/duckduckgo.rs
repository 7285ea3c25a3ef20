//! DuckDuckGo HTML search backend.
//!
//! Scrapes the JavaScript-free results page. No API key is required.
//! Result anchors carry a `uddg=` redirect link that is decoded to the
//! target URL; sponsored results are skipped.

use crate::html::{decode_entities, fragment_to_text};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use scout_core::config::SearchConfig;
use scout_core::error::ProviderError;
use scout_core::evidence::SearchBackend;
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing::debug;

const BACKEND_NAME: &str = "duckduckgo";
const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com/html/";

static RESULT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a\s([^>]*class="[^"]*\bresult__a\b[^"]*"[^>]*)>(.*?)</a>"#)
        .expect("result link pattern is valid")
});

static RESULT_SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<(a|div|td)\s[^>]*class="[^"]*\bresult__snippet\b[^"]*"[^>]*>(.*?)</(?:a|div|td)>"#)
        .expect("result snippet pattern is valid")
});

static HREF_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).expect("href pattern is valid"));

/// Search backend backed by `html.duckduckgo.com`.
pub struct DuckDuckGoBackend {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl DuckDuckGoBackend {
    pub fn new(config: &SearchConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ProviderError::Connection {
                backend: BACKEND_NAME.to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;
        let base_url = config
            .duckduckgo
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            client,
            base_url,
            timeout_secs: config.timeout_secs,
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}?q={}", self.base_url, urlencoding::encode(query))
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Value>, ProviderError> {
        let url = self.search_url(query);
        debug!(backend = BACKEND_NAME, "Requesting results page");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    backend: BACKEND_NAME.to_string(),
                    timeout_secs: self.timeout_secs,
                }
            } else {
                ProviderError::Connection {
                    backend: BACKEND_NAME.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::MalformedPayload {
                backend: BACKEND_NAME.to_string(),
                message: format!("Failed to read results page: {}", e),
            })?;

        let items = classify(status, &body, max_results)?;
        debug!(backend = BACKEND_NAME, items = items.len(), "Parsed results page");
        Ok(items)
    }
}

/// Parse a results page, rejecting anything but a plain 200.
///
/// The endpoint answers rate-limited clients with 202 and a challenge page.
fn classify(status: StatusCode, body: &str, max_results: usize) -> Result<Vec<Value>, ProviderError> {
    if status != StatusCode::OK {
        return Err(ProviderError::HttpStatus {
            backend: BACKEND_NAME.to_string(),
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }
    Ok(parse_results_page(body, max_results))
}

/// Extract up to `max_results` organic results from a results page as
/// `{title, body, href}` objects. Fields that cannot be found are omitted.
pub fn parse_results_page(html: &str, max_results: usize) -> Vec<Value> {
    let links: Vec<_> = RESULT_LINK.captures_iter(html).collect();
    let mut items = Vec::new();
    let mut block_start = 0;

    for (i, link) in links.iter().enumerate() {
        let whole = link.get(0).map_or(0..0, |m| m.range());
        let next_start = links
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(html.len(), |m| m.start());
        let preamble = &html[block_start..whole.start];
        let tail = &html[whole.end..next_start];
        block_start = whole.end;

        let attrs = link.get(1).map_or("", |m| m.as_str());
        let raw_href = HREF_ATTR
            .captures(attrs)
            .and_then(|c| c.get(1))
            .map_or("", |m| m.as_str());
        if is_ad(preamble, raw_href) {
            continue;
        }

        let mut item = serde_json::Map::new();
        let title = link.get(2).map_or(String::new(), |m| fragment_to_text(m.as_str()));
        if !title.is_empty() {
            item.insert("title".into(), json!(title));
        }
        if let Some(snippet) = RESULT_SNIPPET
            .captures(tail)
            .and_then(|c| c.get(2))
            .map(|m| fragment_to_text(m.as_str()))
            && !snippet.is_empty()
        {
            item.insert("body".into(), json!(snippet));
        }
        if let Some(href) = resolve_link(raw_href) {
            item.insert("href".into(), json!(href));
        }

        items.push(Value::Object(item));
        if items.len() >= max_results {
            break;
        }
    }
    items
}

fn is_ad(preamble: &str, raw_href: &str) -> bool {
    preamble.contains("result--ad") || raw_href.contains("duckduckgo.com/y.js")
}

/// Turn a result anchor's `href` into the destination URL.
///
/// Redirect links (`//duckduckgo.com/l/?uddg=<encoded>&rut=...`) are
/// decoded; protocol-relative links get an `https:` scheme.
pub fn resolve_link(raw_href: &str) -> Option<String> {
    let href = decode_entities(raw_href.trim());
    if href.is_empty() {
        return None;
    }

    if let Some(pos) = href.find("uddg=") {
        let encoded = href[pos + 5..].split('&').next().unwrap_or_default();
        if let Ok(decoded) = urlencoding::decode(encoded)
            && !decoded.is_empty()
        {
            return Some(decoded.into_owned());
        }
    }

    if href.starts_with("//") {
        Some(format!("https:{}", href))
    } else {
        Some(href)
    }
}
