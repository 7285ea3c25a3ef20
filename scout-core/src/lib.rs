//! # Shadow Scout Core
//!
//! Core library for the Shadow Scout exposure audit.
//! Provides evidence collection, corpus aggregation, LLM-backed risk
//! synthesis with model fallback, the audit orchestrator, configuration,
//! and fundamental types.

pub mod aggregate;
pub mod audit;
pub mod config;
pub mod error;
pub mod evidence;
pub mod fixtures;
pub mod providers;
pub mod synthesis;
pub mod types;

// Re-export commonly used types at the crate root.
pub use aggregate::aggregate;
pub use audit::{AuditObserver, AuditPhase, Auditor, NoOpObserver, RecordingObserver};
pub use config::{ScoutConfig, SearchBackendKind, load_config};
pub use error::{ConfigError, LlmError, ProviderError, Result, ScoutError, SynthesisError};
pub use evidence::{EvidenceProvider, SearchBackend};
pub use fixtures::FixtureTable;
pub use providers::{LlmProvider, MockLlmProvider, ModelChain, ProviderFactory, create_factory};
pub use synthesis::{NO_MATCH_SENTINEL, RiskSynthesizer};
pub use types::{AuditOutcome, EvidenceRecord, EvidenceSet, Query};
