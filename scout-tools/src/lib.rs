//! # Shadow Scout Tools
//!
//! Live web-search backends for the Shadow Scout evidence adapter.
//! Provides a keyless DuckDuckGo HTML scraper and a Google Programmable
//! Search client.

pub mod duckduckgo;
pub mod google;
pub mod html;

use scout_core::config::{SearchBackendKind, SearchConfig};
use scout_core::error::ProviderError;
use scout_core::evidence::SearchBackend;
use std::sync::Arc;
use tracing::debug;

pub use duckduckgo::DuckDuckGoBackend;
pub use google::GoogleSearchBackend;

/// Build the backend selected in `config`.
pub fn create_backend(config: &SearchConfig) -> Result<Arc<dyn SearchBackend>, ProviderError> {
    debug!(backend = %config.backend, "Creating search backend");
    let backend: Arc<dyn SearchBackend> = match config.backend {
        SearchBackendKind::DuckDuckGo => Arc::new(DuckDuckGoBackend::new(config)?),
        SearchBackendKind::Google => Arc::new(GoogleSearchBackend::from_config(config)?),
    };
    Ok(backend)
}
