//! Single audit run: credential check, pipeline wiring, and output.

use crate::render::{AuditDocument, render_evidence, render_outcome};
use async_trait::async_trait;
use scout_core::audit::{AuditObserver, AuditPhase, Auditor};
use scout_core::config::ScoutConfig;
use scout_core::providers::create_factory;
use scout_core::types::{EvidenceRecord, Query};
use uuid::Uuid;

/// Output switches for a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub show_evidence: bool,
    pub json: bool,
    pub quiet: bool,
}

/// Observer printing progress to stderr and keeping what the JSON
/// document needs.
pub struct CliObserver {
    options: RunOptions,
    run_id: tokio::sync::Mutex<Option<Uuid>>,
    evidence: tokio::sync::Mutex<Vec<EvidenceRecord>>,
}

impl CliObserver {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            run_id: tokio::sync::Mutex::new(None),
            evidence: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    fn chatty(&self) -> bool {
        !self.options.quiet && !self.options.json
    }

    pub async fn run_id(&self) -> Option<Uuid> {
        *self.run_id.lock().await
    }

    pub async fn evidence(&self) -> Vec<EvidenceRecord> {
        self.evidence.lock().await.clone()
    }
}

#[async_trait]
impl AuditObserver for CliObserver {
    async fn on_start(&self, run_id: Uuid, _target_name: &str) {
        *self.run_id.lock().await = Some(run_id);
    }

    async fn on_phase(&self, phase: AuditPhase) {
        if !self.chatty() {
            return;
        }
        match phase {
            AuditPhase::Collecting => eprintln!("Scanning public sources..."),
            AuditPhase::Aggregating => {}
            AuditPhase::Synthesizing => eprintln!("Correlating identity and assessing risk..."),
        }
    }

    async fn on_evidence(&self, records: &[EvidenceRecord]) {
        if self.options.show_evidence && !self.options.json && !records.is_empty() {
            println!("{}", render_evidence(records));
        }
        *self.evidence.lock().await = records.to_vec();
    }
}

/// Fail with the names of any missing credentials, before any I/O.
fn check_credentials(config: &ScoutConfig) -> anyhow::Result<()> {
    let missing = config.missing_credentials();
    if missing.is_empty() {
        return Ok(());
    }
    anyhow::bail!(
        "Missing credentials: {}. Set them in the environment, a .env file, or the config file.",
        missing.join(", ")
    )
}

/// Run one audit for `target` and print the result.
pub async fn run_audit(target: &str, config: ScoutConfig, options: RunOptions) -> anyhow::Result<()> {
    let query = Query::new(target).map_err(|_| anyhow::anyhow!("Please enter a target name."))?;
    let target = query.target_name();
    check_credentials(&config)?;

    let api_key = config
        .llm
        .resolve_api_key()
        .map_err(|e| anyhow::anyhow!("LLM credentials: {}", e))?;
    let factory = create_factory(&config.llm, api_key)
        .map_err(|e| anyhow::anyhow!("LLM provider init failed: {}", e))?;
    let backend = scout_tools::create_backend(&config.search)
        .map_err(|e| anyhow::anyhow!("Search backend init failed: {}", e))?;

    tracing::info!(
        backend = %config.search.backend,
        models = ?config.llm.models,
        max_results = config.search.max_results,
        "Starting audit"
    );
    let auditor = Auditor::from_config(&config, backend, factory);
    let observer = CliObserver::new(options);
    let outcome = auditor.run_audit_with(target, &observer).await;

    if options.json {
        let document = AuditDocument::new(
            observer.run_id().await,
            target,
            observer.evidence().await,
            outcome,
        );
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print!("{}", render_outcome(target, &outcome));
    }
    Ok(())
}
