//! Text and JSON rendering of audit runs.

use chrono::{DateTime, Utc};
use scout_core::types::{AuditOutcome, EvidenceRecord};
use serde::Serialize;
use std::fmt::Write;
use uuid::Uuid;

/// Heading printed above a synthesized report.
pub const REPORT_HEADING: &str = "Vulnerability Report";

/// Machine-readable record of one audit run.
#[derive(Debug, Serialize)]
pub struct AuditDocument {
    pub run_id: Option<Uuid>,
    pub target: String,
    pub generated_at: DateTime<Utc>,
    pub evidence: Vec<EvidenceRecord>,
    pub outcome: AuditOutcome,
    pub message: String,
}

impl AuditDocument {
    pub fn new(
        run_id: Option<Uuid>,
        target: &str,
        evidence: Vec<EvidenceRecord>,
        outcome: AuditOutcome,
    ) -> Self {
        let message = outcome.user_message().to_string();
        Self {
            run_id,
            target: target.to_string(),
            generated_at: Utc::now(),
            evidence,
            outcome,
            message,
        }
    }
}

/// The raw evidence as a numbered list.
pub fn render_evidence(records: &[EvidenceRecord]) -> String {
    let mut out = format!("Raw evidence ({} records)\n", records.len());
    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, record.title());
        let _ = writeln!(out, "     {}", record.snippet());
        let _ = writeln!(out, "     {}", record.source_link());
    }
    out
}

/// The outcome as terminal text.
pub fn render_outcome(target: &str, outcome: &AuditOutcome) -> String {
    match outcome {
        AuditOutcome::NoResults | AuditOutcome::AmbiguousIdentity => {
            format!("{}\n", outcome.user_message())
        }
        AuditOutcome::Report(text) => {
            let heading = format!("{}: {}", REPORT_HEADING, target);
            format!("{}\n{}\n\n{}\n", heading, "=".repeat(heading.chars().count()), text.trim_end())
        }
    }
}
