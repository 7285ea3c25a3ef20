//! Generative-text provider implementations.
//!
//! Defines the `LlmProvider` seam, the request/response contract shared by
//! all providers, and the `ProviderFactory` used to build one provider per
//! candidate model identifier:
//! - `gemini`: native Google Gemini API
//! - `fallback`: ordered model candidate chain
//! - `mock`: scripted provider and factory for tests and offline runs

pub mod fallback;
pub mod gemini;
pub mod mock;

use crate::config::LlmConfig;
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use fallback::ModelChain;
pub use gemini::{GeminiFactory, GeminiProvider};
pub use mock::{MockLlmProvider, MockProviderFactory};

/// Harm categories the backend filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    Harassment,
    HateSpeech,
    SexuallyExplicit,
    DangerousContent,
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ];

    pub fn api_name(self) -> &'static str {
        match self {
            HarmCategory::Harassment => "HARM_CATEGORY_HARASSMENT",
            HarmCategory::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            HarmCategory::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            HarmCategory::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
        }
    }
}

/// Blocking threshold for one harm category. Audits only ever relax the
/// filters, so the least restrictive level is the one modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockThreshold {
    BlockNone,
}

impl BlockThreshold {
    pub fn api_name(self) -> &'static str {
        match self {
            BlockThreshold::BlockNone => "BLOCK_NONE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: BlockThreshold,
}

impl SafetySetting {
    /// Every harm category relaxed to `BLOCK_NONE`.
    pub fn permissive() -> Vec<SafetySetting> {
        HarmCategory::ALL
            .iter()
            .map(|&category| SafetySetting {
                category,
                threshold: BlockThreshold::BlockNone,
            })
            .collect()
    }
}

/// A single-prompt generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub safety_settings: Vec<SafetySetting>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<usize>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            safety_settings: Vec::new(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn with_safety_settings(mut self, settings: Vec<SafetySetting>) -> Self {
        self.safety_settings = settings;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max: usize) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
}

/// What came back from the backend. `text` is absent when the backend
/// blocked the prompt or the candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: Option<String>,
    pub model: String,
    pub finish_reason: Option<String>,
    pub block_reason: Option<String>,
}

impl GenerationResponse {
    pub fn text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            model: model.into(),
            finish_reason: Some("STOP".to_string()),
            block_reason: None,
        }
    }

    /// The reply text if it is non-blank.
    pub fn usable_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Trait for generative-text providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Perform one generation request.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError>;

    /// Return the model name.
    fn model_name(&self) -> &str;
}

/// Builds a provider bound to one model identifier.
///
/// Construction may fail (unknown model, missing key, client setup); the
/// [`ModelChain`] treats that as "try the next candidate".
pub trait ProviderFactory: Send + Sync {
    fn build(&self, model: &str) -> Result<Arc<dyn LlmProvider>, LlmError>;
}

/// Create the factory for the configured provider with an explicit key.
pub fn create_factory(
    config: &LlmConfig,
    api_key: String,
) -> Result<Arc<dyn ProviderFactory>, LlmError> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiFactory::new(config.clone(), api_key))),
        other => Err(LlmError::Construction {
            model: String::new(),
            message: format!("unknown provider '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_covers_all_categories() {
        let settings = SafetySetting::permissive();
        assert_eq!(settings.len(), 4);
        assert!(
            settings
                .iter()
                .all(|s| s.threshold == BlockThreshold::BlockNone)
        );
        let names: Vec<&str> = settings.iter().map(|s| s.category.api_name()).collect();
        assert_eq!(
            names,
            vec![
                "HARM_CATEGORY_HARASSMENT",
                "HARM_CATEGORY_HATE_SPEECH",
                "HARM_CATEGORY_SEXUALLY_EXPLICIT",
                "HARM_CATEGORY_DANGEROUS_CONTENT",
            ]
        );
    }

    #[test]
    fn test_usable_text() {
        let mut response = GenerationResponse::text("m", "hello");
        assert_eq!(response.usable_text(), Some("hello"));
        response.text = Some("  \n".into());
        assert_eq!(response.usable_text(), None);
        response.text = None;
        assert_eq!(response.usable_text(), None);
    }

    #[test]
    fn test_create_factory_unknown_provider() {
        let config = LlmConfig {
            provider: "openai".into(),
            ..Default::default()
        };
        assert!(matches!(
            create_factory(&config, "k".into()),
            Err(LlmError::Construction { .. })
        ));
        let config = LlmConfig::default();
        assert!(create_factory(&config, "k".into()).is_ok());
    }
}
