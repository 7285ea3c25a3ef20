//! Google Gemini API provider implementation.
//!
//! Implements the `LlmProvider` trait for the native `generateContent`
//! endpoint. Key points of the Gemini contract:
//! - Auth via `?key=API_KEY` query parameter
//! - Per-request `safetySettings` override the default harm filters
//! - A blocked prompt returns `promptFeedback.blockReason` and no candidates
//! - A blocked candidate returns `finishReason: "SAFETY"` and no parts

use super::{GenerationRequest, GenerationResponse, LlmProvider, ProviderFactory};
use crate::config::LlmConfig;
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The default Google Gemini API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini API provider bound to a single model.
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiProvider {
    /// Create a provider for `model` with an explicitly provided API key.
    ///
    /// Fails with `LlmError::Construction` for a malformed model identifier
    /// and `LlmError::AuthFailed` for a blank key.
    pub fn new_with_key(config: &LlmConfig, model: &str, api_key: String) -> Result<Self, LlmError> {
        let model = model.trim();
        if model.is_empty() || model.contains(|c: char| c.is_whitespace() || c == '/' || c == '?')
        {
            return Err(LlmError::Construction {
                model: model.to_string(),
                message: "malformed model identifier".to_string(),
            });
        }
        if api_key.trim().is_empty() {
            return Err(LlmError::AuthFailed {
                provider: "Gemini (empty API key)".to_string(),
            });
        }

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| LlmError::Construction {
                model: model.to_string(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model: model.to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Build the JSON request body for the Gemini API.
    fn build_request_body(request: &GenerationRequest) -> Value {
        let mut body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": request.prompt}]
            }],
        });

        if !request.safety_settings.is_empty() {
            let settings: Vec<Value> = request
                .safety_settings
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "category": s.category.api_name(),
                        "threshold": s.threshold.api_name(),
                    })
                })
                .collect();
            body["safetySettings"] = Value::Array(settings);
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = request.temperature {
            generation_config.insert("temperature".into(), serde_json::json!(temperature));
        }
        if let Some(max) = request.max_output_tokens {
            generation_config.insert("maxOutputTokens".into(), serde_json::json!(max));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }

        body
    }

    /// Parse a Gemini API response JSON into a `GenerationResponse`.
    ///
    /// Blocked prompts and blocked candidates parse successfully with
    /// `text: None`; only a payload with neither candidates nor block
    /// feedback is an error.
    fn parse_response(body: &Value, model: &str) -> Result<GenerationResponse, LlmError> {
        let block_reason = body["promptFeedback"]["blockReason"]
            .as_str()
            .map(|s| s.to_string());
        let model = body["modelVersion"].as_str().unwrap_or(model).to_string();

        let candidate = match body["candidates"].as_array() {
            Some(candidates) if !candidates.is_empty() => &candidates[0],
            _ if block_reason.is_some() => {
                return Ok(GenerationResponse {
                    text: None,
                    model,
                    finish_reason: None,
                    block_reason,
                });
            }
            Some(_) => {
                return Err(LlmError::ResponseParse {
                    message: "Empty 'candidates' array in response".to_string(),
                });
            }
            None => {
                return Err(LlmError::ResponseParse {
                    message: "Missing 'candidates' array in response".to_string(),
                });
            }
        };

        let finish_reason = candidate["finishReason"].as_str().map(|s| s.to_string());

        let text: String = candidate["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter(|p| !p["thought"].as_bool().unwrap_or(false))
                    .filter_map(|p| p["text"].as_str())
                    .collect()
            })
            .unwrap_or_default();

        Ok(GenerationResponse {
            text: (!text.is_empty()).then_some(text),
            model,
            finish_reason,
            block_reason,
        })
    }

    /// Map an HTTP status code to the appropriate `LlmError`.
    fn map_http_error(status: reqwest::StatusCode, body_text: &str, model: &str) -> LlmError {
        match status.as_u16() {
            // Preview models the key is not enabled for come back as a 403
            // naming the model; the next candidate may still be usable.
            403 if body_text.contains(model) => LlmError::UnsupportedModel {
                model: model.to_string(),
            },
            401 | 403 => LlmError::AuthFailed {
                provider: "Gemini".to_string(),
            },
            404 => LlmError::UnsupportedModel {
                model: model.to_string(),
            },
            429 => LlmError::RateLimited {
                retry_after_secs: 30,
            },
            _ => LlmError::ApiRequest {
                message: format!("HTTP {} from Gemini API: {}", status, body_text),
            },
        }
    }

    /// Build the endpoint URL for a Gemini API call.
    fn endpoint_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.base_url, self.model, method, self.api_key
        )
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let body = Self::build_request_body(&request);
        let url = self.endpoint_url("generateContent");

        debug!(
            model = self.model.as_str(),
            prompt_chars = request.prompt.len(),
            "Sending Gemini generation request"
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else if e.is_connect() {
                    LlmError::Connection {
                        message: format!("Could not reach Gemini API: {}", e.without_url()),
                    }
                } else {
                    LlmError::ApiRequest {
                        message: format!("Request to Gemini API failed: {}", e.without_url()),
                    }
                }
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| LlmError::ResponseParse {
            message: format!("Failed to read response body: {}", e.without_url()),
        })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body_text, &self.model));
        }

        let response_json: Value =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ResponseParse {
                message: format!("Invalid JSON in response: {}", e),
            })?;

        Self::parse_response(&response_json, &self.model)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Builds a [`GeminiProvider`] per candidate model.
pub struct GeminiFactory {
    config: LlmConfig,
    api_key: String,
}

impl GeminiFactory {
    pub fn new(config: LlmConfig, api_key: String) -> Self {
        Self { config, api_key }
    }
}

impl ProviderFactory for GeminiFactory {
    fn build(&self, model: &str) -> Result<Arc<dyn LlmProvider>, LlmError> {
        let provider = GeminiProvider::new_with_key(&self.config, model, self.api_key.clone())?;
        Ok(Arc::new(provider))
    }
}
