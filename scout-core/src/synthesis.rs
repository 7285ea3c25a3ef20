//! Risk synthesis: the identity-correlation and vulnerability-narrative
//! request sent to the generative-text backend.
//!
//! The backend is asked to filter out mentions of unrelated same-named
//! people, describe social-engineering exposure, and structure the reply in
//! four sections. Its only machine-checkable signal is the literal
//! [`NO_MATCH_SENTINEL`], which it must send alone when the corpus describes
//! several unrelated people.
//!
//! `synthesize` never fails: backend errors become a diagnostic string and
//! an empty or blocked reply becomes a fixed advisory.

use crate::config::LlmConfig;
use crate::error::SynthesisError;
use crate::providers::{GenerationRequest, ModelChain, SafetySetting};
use std::time::Duration;
use tracing::{info, warn};

/// Reserved reply meaning "ambiguous identity, abort".
pub const NO_MATCH_SENTINEL: &str = "NO_MATCH_FOUND";

/// Returned when the backend produced no usable text.
pub const BLOCKED_ADVISORY: &str =
    "⚠️ Report blocked by AI. (Try searching for a simpler term like 'Name + City' only).";

/// Section headings the report is asked to contain, in order.
pub const REPORT_SECTIONS: [&str; 4] = [
    "Digital Identity",
    "Theoretical Risk Scenarios",
    "Data Exposure",
    "Remediation",
];

/// Whether a synthesizer reply carries the ambiguity sentinel.
///
/// Plain substring match: a report that quotes the token verbatim is also
/// classified as ambiguous.
pub fn contains_sentinel(text: &str) -> bool {
    text.contains(NO_MATCH_SENTINEL)
}

/// Build the instruction prompt for `target_name` over `corpus`.
pub fn build_prompt(target_name: &str, corpus: &str) -> String {
    format!(
        r#"You are a professional Security Analyst conducting a consensual privacy audit.

TARGET: "{target}"

DATA FOUND:
{corpus}
TASK:
1. FILTER: Identify which data points belong to the target (ignore mismatches).
2. ANALYZE: If the target is found, describe potential security vulnerabilities based on this public data.
3. REPORT:
   - **{identity}:** (Who are they?)
   - **{risks}:** (How could this data be misused for social engineering?)
   - **{exposure}:** (What specific info is public?)
   - **{remediation}:** (How to secure it?)

If the data refers to multiple unrelated people, reply ONLY with: "{sentinel}"
"#,
        target = target_name,
        corpus = corpus,
        identity = REPORT_SECTIONS[0],
        risks = REPORT_SECTIONS[1],
        exposure = REPORT_SECTIONS[2],
        remediation = REPORT_SECTIONS[3],
        sentinel = NO_MATCH_SENTINEL,
    )
}

/// User-facing text for a failed synthesis request.
pub fn diagnostic_message(error: &SynthesisError) -> String {
    format!(
        "AI Generation Error: {} \n\n(Tip: Check your API Key permissions)",
        error
    )
}

/// The risk synthesizer.
pub struct RiskSynthesizer {
    chain: ModelChain,
    timeout: Duration,
    temperature: Option<f32>,
    max_output_tokens: Option<usize>,
}

impl RiskSynthesizer {
    pub fn new(chain: ModelChain) -> Self {
        Self {
            chain,
            timeout: Duration::from_secs(120),
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn from_config(chain: ModelChain, config: &LlmConfig) -> Self {
        Self {
            chain,
            timeout: config.timeout(),
            temperature: Some(config.temperature),
            max_output_tokens: Some(config.max_tokens),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The exact request sent for `(corpus, target_name)`.
    pub fn build_request(&self, corpus: &str, target_name: &str) -> GenerationRequest {
        let mut request = GenerationRequest::new(build_prompt(target_name, corpus))
            .with_safety_settings(SafetySetting::permissive());
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max) = self.max_output_tokens {
            request = request.with_max_output_tokens(max);
        }
        request
    }

    /// Produce the narrative for `target_name`. Always returns some string.
    pub async fn synthesize(&self, corpus: &str, target_name: &str) -> String {
        match self.try_synthesize(corpus, target_name).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                warn!("Synthesis returned no usable text");
                BLOCKED_ADVISORY.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Synthesis request failed");
                diagnostic_message(&e)
            }
        }
    }

    /// The request with its failure modes intact: `Ok(None)` means the
    /// backend answered without usable text.
    pub async fn try_synthesize(
        &self,
        corpus: &str,
        target_name: &str,
    ) -> Result<Option<String>, SynthesisError> {
        let request = self.build_request(corpus, target_name);
        let response = tokio::time::timeout(self.timeout, self.chain.generate(request))
            .await
            .map_err(|_| crate::error::LlmError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })??;

        if let Some(reason) = &response.block_reason {
            warn!(model = response.model.as_str(), reason = reason.as_str(), "Prompt blocked by backend");
        }
        info!(
            model = response.model.as_str(),
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "Synthesis complete"
        );
        Ok(response.usable_text().map(str::to_string))
    }
}
