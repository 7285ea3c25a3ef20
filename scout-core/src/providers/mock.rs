//! Scripted provider and factory for tests and offline runs.

use super::{GenerationRequest, GenerationResponse, LlmProvider, ProviderFactory};
use crate::error::LlmError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// A mock LLM provider that replays queued responses.
///
/// When the queue is empty it answers with its default text.
pub struct MockLlmProvider {
    model: String,
    default_text: String,
    queue: Mutex<VecDeque<Result<GenerationResponse, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockLlmProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            default_text: "I'm a mock LLM. No queued responses available.".to_string(),
            queue: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that always answers with `text`.
    pub fn with_text(model: &str, text: &str) -> Self {
        let mut provider = Self::new(model);
        provider.default_text = text.to_string();
        provider
    }

    /// Queue a text reply for the next call.
    pub fn queue_text(&self, text: &str) {
        self.queue_response(GenerationResponse::text(&self.model, text));
    }

    /// Queue a full response for the next call.
    pub fn queue_response(&self, response: GenerationResponse) {
        self.queue.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error for the next call.
    pub fn queue_error(&self, error: LlmError) {
        self.queue.lock().unwrap().push_back(Err(error));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        let next = self.queue.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => Ok(GenerationResponse::text(&self.model, &self.default_text)),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// A factory handing out registered mock providers by model name.
///
/// Unregistered models and models marked with [`fail_construction`]
/// fail to build. Every build attempt is recorded.
///
/// [`fail_construction`]: MockProviderFactory::fail_construction
#[derive(Default)]
pub struct MockProviderFactory {
    providers: Mutex<HashMap<String, Arc<MockLlmProvider>>>,
    failing: Mutex<HashSet<String>>,
    attempts: Mutex<Vec<String>>,
}

impl MockProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under `model` and return a handle to it.
    pub fn register(&self, model: &str, provider: MockLlmProvider) -> Arc<MockLlmProvider> {
        let provider = Arc::new(provider);
        self.providers
            .lock()
            .unwrap()
            .insert(model.to_string(), provider.clone());
        provider
    }

    pub fn fail_construction(&self, model: &str) {
        self.failing.lock().unwrap().insert(model.to_string());
    }

    pub fn build_attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

impl ProviderFactory for MockProviderFactory {
    fn build(&self, model: &str) -> Result<Arc<dyn LlmProvider>, LlmError> {
        self.attempts.lock().unwrap().push(model.to_string());
        if self.failing.lock().unwrap().contains(model) {
            return Err(LlmError::Construction {
                model: model.to_string(),
                message: "construction failure requested by test".to_string(),
            });
        }
        let registered = self.providers.lock().unwrap().get(model).cloned();
        match registered {
            Some(provider) => Ok(provider as Arc<dyn LlmProvider>),
            None => Err(LlmError::Construction {
                model: model.to_string(),
                message: "no mock registered".to_string(),
            }),
        }
    }
}
