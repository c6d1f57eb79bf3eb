//! Per-tool results and the batch summary.

use std::fmt;

use serde::Serialize;
use tabgen_core::SourceTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeStatus {
    Skipped,
    /// First generation, or forced.
    Generated,
    RegeneratedVersionChanged,
    RegeneratedHashChanged,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeStatus::Skipped => "skipped",
            OutcomeStatus::Generated => "generated",
            OutcomeStatus::RegeneratedVersionChanged => "regenerated-version-changed",
            OutcomeStatus::RegeneratedHashChanged => "regenerated-hash-changed",
            OutcomeStatus::Failed => "failed",
        }
    }

    /// True for every status that wrote new scripts.
    pub fn is_generated(self) -> bool {
        matches!(
            self,
            OutcomeStatus::Generated
                | OutcomeStatus::RegeneratedVersionChanged
                | OutcomeStatus::RegeneratedHashChanged
        )
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutcome {
    pub name: String,
    pub path: String,
    pub status: OutcomeStatus,
    /// Freshly detected version, empty when none was found.
    pub version: String,
    /// Fingerprint of the fresh tree, empty for failures before extraction
    /// finished.
    pub fingerprint: String,
    /// Human-readable cause for every status except `skipped`.
    pub reason: String,
    pub source: SourceTag,
    pub warnings: Vec<String>,
}

impl ToolOutcome {
    pub(crate) fn failed(name: &str, path: &str, reason: String) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            status: OutcomeStatus::Failed,
            version: String::new(),
            fingerprint: String::new(),
            reason,
            source: SourceTag::None,
            warnings: Vec::new(),
        }
    }
}

/// Counts and outcomes of one batch, sorted by tool name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    /// Tools whose scripts were written, including regenerations.
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<ToolOutcome>,
}

impl PipelineSummary {
    pub(crate) fn record(&mut self, outcome: ToolOutcome) {
        match outcome.status {
            OutcomeStatus::Skipped => self.skipped += 1,
            OutcomeStatus::Failed => self.failed += 1,
            _ => self.generated += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn get(&self, name: &str) -> Option<&ToolOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}
