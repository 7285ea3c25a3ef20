//! Fundamental types shared across the audit pipeline.

use crate::error::ScoutError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One normalized public mention of the audit target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    title: String,
    snippet: String,
    source_link: String,
}

impl EvidenceRecord {
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        source_link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            source_link: source_link.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    pub fn source_link(&self) -> &str {
        &self.source_link
    }
}

/// All evidence collected for a single query, in backend relevance order.
/// An empty set means no public mentions were found.
pub type EvidenceSet = Vec<EvidenceRecord>;

/// The single external input of an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    target_name: String,
}

impl Query {
    /// Create a query. The name is trimmed and must not be empty.
    pub fn new(target_name: impl Into<String>) -> Result<Self, ScoutError> {
        let target_name = target_name.into().trim().to_string();
        if target_name.is_empty() {
            return Err(ScoutError::InvalidQuery {
                reason: "target name must not be empty".to_string(),
            });
        }
        Ok(Self { target_name })
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }
}

/// Result of one audit run. Exactly one variant is produced per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The search returned no public mentions.
    NoResults,
    /// The evidence describes several unrelated people with no clear majority.
    AmbiguousIdentity,
    /// The synthesized narrative, exactly as returned by the synthesizer.
    Report(String),
}

impl AuditOutcome {
    /// Message shown to the person running the audit.
    pub fn user_message(&self) -> &str {
        match self {
            AuditOutcome::NoResults => "No results found. Try a different query.",
            AuditOutcome::AmbiguousIdentity => {
                "Ambiguous Identity: The search results seem to belong to different people. \
                 Please add a location or job title to your search."
            }
            AuditOutcome::Report(text) => text,
        }
    }

    pub fn report_text(&self) -> Option<&str> {
        match self {
            AuditOutcome::Report(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_report(&self) -> bool {
        matches!(self, AuditOutcome::Report(_))
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::NoResults => write!(f, "no_results"),
            AuditOutcome::AmbiguousIdentity => write!(f, "ambiguous_identity"),
            AuditOutcome::Report(_) => write!(f, "report"),
        }
    }
}
