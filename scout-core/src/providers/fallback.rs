//! Ordered model fallback.
//!
//! A static list of candidate model identifiers tried in sequence: the first
//! candidate whose provider can be constructed and which knows the model
//! wins. Each tier is attempted at most once per call; there is no retry
//! loop and no circuit state carried between calls.

use super::{GenerationRequest, GenerationResponse, ProviderFactory};
use crate::error::LlmError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An LLM front that walks an ordered list of model identifiers.
pub struct ModelChain {
    factory: Arc<dyn ProviderFactory>,
    candidates: Vec<String>,
}

impl ModelChain {
    /// Create a chain. Blank identifiers are dropped; order is preserved.
    pub fn new(factory: Arc<dyn ProviderFactory>, candidates: Vec<String>) -> Self {
        let candidates = candidates
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        Self {
            factory,
            candidates,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Run `request` against the first usable candidate.
    ///
    /// Falls through to the next candidate when construction fails or the
    /// backend reports the model as unknown or not enabled for the key.
    /// Any other request error, including a plain authentication failure,
    /// is returned immediately.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let mut last_error = None;

        for (tier, model) in self.candidates.iter().enumerate() {
            let provider = match self.factory.build(model) {
                Ok(provider) => provider,
                Err(e) => {
                    warn!(tier, model = model.as_str(), error = %e, "Model unavailable, trying next candidate");
                    last_error = Some(e);
                    continue;
                }
            };

            debug!(tier, model = model.as_str(), "Using model candidate");
            match provider.generate(request.clone()).await {
                Ok(response) => {
                    if tier > 0 {
                        info!(tier, model = model.as_str(), "Served by fallback model");
                    }
                    return Ok(response);
                }
                Err(e @ LlmError::UnsupportedModel { .. }) => {
                    warn!(tier, model = model.as_str(), error = %e, "Model rejected by backend, trying next candidate");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Construction {
            model: String::new(),
            message: "no model candidates configured".to_string(),
        }))
    }
}
