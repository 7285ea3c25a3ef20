//! Error types for the Shadow Scout core.
//!
//! Uses `thiserror` for public API error types. Search and generation
//! failures are typed here but recovered inside the pipeline; only the
//! configuration layer and query validation surface errors to callers.

/// Top-level error type for the Shadow Scout core library.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("Search provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from a web-search backend.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{backend} is unreachable: {message}")]
    Connection { backend: String, message: String },

    #[error("{backend} returned HTTP {status}: {body}")]
    HttpStatus {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("{backend} returned a malformed payload: {message}")]
    MalformedPayload { backend: String, message: String },

    #[error("{backend} timed out after {timeout_secs}s")]
    Timeout { backend: String, timeout_secs: u64 },

    #[error("{backend} is missing credentials: {what}")]
    MissingCredentials { backend: String, what: String },
}

/// Errors from generative-text provider interactions.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Model not supported: {model}")]
    UnsupportedModel { model: String },

    #[error("Could not construct provider for model '{model}': {message}")]
    Construction { model: String, message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },
}

/// Failure of the risk synthesis request. Always converted into a
/// diagnostic string before it reaches the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Backend(#[from] LlmError),
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Environment variable not set: {var}")]
    EnvVarMissing { var: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// A type alias for results using the top-level `ScoutError`.
pub type Result<T> = std::result::Result<T, ScoutError>;
