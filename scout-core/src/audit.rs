//! Audit orchestration.
//!
//! Sequences one audit run: collect evidence, stop with `NoResults` on an
//! empty set, aggregate, synthesize, and classify the reply. The run is a
//! straight line with no retries and no state carried between runs.

use crate::aggregate::aggregate;
use crate::config::ScoutConfig;
use crate::evidence::{EvidenceProvider, SearchBackend};
use crate::providers::{ModelChain, ProviderFactory};
use crate::synthesis::{RiskSynthesizer, contains_sentinel};
use crate::types::{AuditOutcome, EvidenceRecord, EvidenceSet};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

/// Steps of an audit run, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditPhase {
    Collecting,
    Aggregating,
    Synthesizing,
}

impl std::fmt::Display for AuditPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditPhase::Collecting => write!(f, "collecting"),
            AuditPhase::Aggregating => write!(f, "aggregating"),
            AuditPhase::Synthesizing => write!(f, "synthesizing"),
        }
    }
}

/// Receives progress from [`Auditor::run_audit_with`].
///
/// All methods default to no-ops.
#[async_trait]
pub trait AuditObserver: Send + Sync {
    /// A run has started.
    async fn on_start(&self, _run_id: Uuid, _target_name: &str) {}

    /// A new phase is being entered.
    async fn on_phase(&self, _phase: AuditPhase) {}

    /// The raw evidence, delivered before any synthesis happens. Called
    /// for empty sets too.
    async fn on_evidence(&self, _records: &[EvidenceRecord]) {}

    /// The final outcome. Called exactly once per run.
    async fn on_outcome(&self, _outcome: &AuditOutcome) {}
}

/// An observer that ignores everything.
pub struct NoOpObserver;

#[async_trait]
impl AuditObserver for NoOpObserver {}

/// An observer that records all events for test assertions.
pub struct RecordingObserver {
    run_ids: tokio::sync::Mutex<Vec<Uuid>>,
    phases: tokio::sync::Mutex<Vec<AuditPhase>>,
    evidence: tokio::sync::Mutex<Vec<EvidenceSet>>,
    outcomes: tokio::sync::Mutex<Vec<AuditOutcome>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self {
            run_ids: tokio::sync::Mutex::new(Vec::new()),
            phases: tokio::sync::Mutex::new(Vec::new()),
            evidence: tokio::sync::Mutex::new(Vec::new()),
            outcomes: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    pub async fn run_ids(&self) -> Vec<Uuid> {
        self.run_ids.lock().await.clone()
    }

    pub async fn phases(&self) -> Vec<AuditPhase> {
        self.phases.lock().await.clone()
    }

    pub async fn evidence(&self) -> Vec<EvidenceSet> {
        self.evidence.lock().await.clone()
    }

    pub async fn outcomes(&self) -> Vec<AuditOutcome> {
        self.outcomes.lock().await.clone()
    }
}

impl Default for RecordingObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditObserver for RecordingObserver {
    async fn on_start(&self, run_id: Uuid, _target_name: &str) {
        self.run_ids.lock().await.push(run_id);
    }
    async fn on_phase(&self, phase: AuditPhase) {
        self.phases.lock().await.push(phase);
    }
    async fn on_evidence(&self, records: &[EvidenceRecord]) {
        self.evidence.lock().await.push(records.to_vec());
    }
    async fn on_outcome(&self, outcome: &AuditOutcome) {
        self.outcomes.lock().await.push(outcome.clone());
    }
}

/// The audit orchestrator.
pub struct Auditor {
    evidence: EvidenceProvider,
    synthesizer: RiskSynthesizer,
    max_results: usize,
}

impl Auditor {
    pub fn new(evidence: EvidenceProvider, synthesizer: RiskSynthesizer) -> Self {
        Self {
            evidence,
            synthesizer,
            max_results: 10,
        }
    }

    /// Wire an auditor from configuration, a search backend, and a provider
    /// factory for the configured model chain.
    pub fn from_config(
        config: &ScoutConfig,
        backend: Arc<dyn SearchBackend>,
        factory: Arc<dyn ProviderFactory>,
    ) -> Self {
        let evidence = EvidenceProvider::from_config(backend, &config.search);
        let chain = ModelChain::new(factory, config.llm.models.clone());
        let synthesizer = RiskSynthesizer::from_config(chain, &config.llm);
        Self::new(evidence, synthesizer).with_max_results(config.search.max_results)
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Run one audit for `target_name`.
    pub async fn run_audit(&self, target_name: &str) -> AuditOutcome {
        self.run_audit_with(target_name, &NoOpObserver).await
    }

    /// Run one audit, reporting progress to `observer`.
    pub async fn run_audit_with(
        &self,
        target_name: &str,
        observer: &dyn AuditObserver,
    ) -> AuditOutcome {
        let target_name = target_name.trim();
        let run_id = Uuid::new_v4();
        let span = info_span!("audit", %run_id, target = target_name);

        async {
            observer.on_start(run_id, target_name).await;
            let outcome = self.execute(target_name, observer).await;
            info!(outcome = %outcome, "Audit finished");
            observer.on_outcome(&outcome).await;
            outcome
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, target_name: &str, observer: &dyn AuditObserver) -> AuditOutcome {
        if target_name.is_empty() {
            info!("Blank target, nothing to search");
            return AuditOutcome::NoResults;
        }

        observer.on_phase(AuditPhase::Collecting).await;
        let records = self.collect_evidence(target_name).await;
        observer.on_evidence(&records).await;
        if records.is_empty() {
            return AuditOutcome::NoResults;
        }

        observer.on_phase(AuditPhase::Aggregating).await;
        let corpus = aggregate(&records);
        info!(records = records.len(), corpus_len = corpus.len(), "Evidence aggregated");

        observer.on_phase(AuditPhase::Synthesizing).await;
        let text = self.synthesizer.synthesize(&corpus, target_name).await;
        if contains_sentinel(&text) {
            AuditOutcome::AmbiguousIdentity
        } else {
            AuditOutcome::Report(text)
        }
    }

    /// The evidence an audit of `target_name` would see. Blank targets
    /// yield an empty set without any I/O.
    pub async fn collect_evidence(&self, target_name: &str) -> EvidenceSet {
        let target_name = target_name.trim();
        if target_name.is_empty() {
            return Vec::new();
        }
        self.evidence.search(target_name, self.max_results).await
    }
}
