//! Per-thread tool processing.

use tabgen_core::{Tool, fingerprint};
use tabgen_db::{CatalogEntry, CatalogStore};
use tabgen_discovery::{ExtractConfig, Extractor, ProbeRunner};
use tabgen_generator::{Limits, Shell, generate_with_limits};
use tracing::{debug, info, warn};

use crate::decision::{Decision, decide};
use crate::outcome::{OutcomeStatus, ToolOutcome};

/// One queued tool.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub name: String,
    pub path: String,
    pub cached: Option<CatalogEntry>,
}

impl WorkItem {
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            path: entry.path.clone(),
            cached: Some(entry.clone()),
        }
    }
}

/// State owned by one pool thread: its own extractor, plus shared handles
/// to the stateless runner and the store.
pub(crate) struct Worker<'a> {
    extractor: Extractor<'a>,
    store: &'a dyn CatalogStore,
    limits: Limits,
    force: bool,
}

impl<'a> Worker<'a> {
    pub fn new(
        runner: &'a dyn ProbeRunner,
        store: &'a dyn CatalogStore,
        config: &ExtractConfig,
        limits: Limits,
        force: bool,
    ) -> Self {
        Self {
            extractor: Extractor::new(runner, config.clone()),
            store,
            limits,
            force,
        }
    }

    /// Extracts, decides and saves one tool. Returns `None` for tools that
    /// produced no help or man output.
    pub fn process(&self, item: &WorkItem) -> Option<ToolOutcome> {
        let tool = match self.extractor.extract(&item.name, &item.path) {
            Ok(tool) => tool,
            Err(e) => {
                let outcome = ToolOutcome::failed(&item.name, &item.path, e.to_string());
                warn!(tool = %item.name, error = %e, "Extraction failed");
                return Some(outcome);
            }
        };

        if !tool.has_content() {
            debug!(tool = %item.name, "Dropping tool without help or man output");
            return None;
        }

        let digest = fingerprint(&tool);
        let decision = decide(item.cached.as_ref(), tool.version_str(), digest.as_str(), self.force);

        let (status, reason) = match decision {
            Decision::Skip => (OutcomeStatus::Skipped, String::new()),
            Decision::Generate => (OutcomeStatus::Generated, "first generation".to_string()),
            Decision::VersionChanged { from, to } => (
                OutcomeStatus::RegeneratedVersionChanged,
                format!("version changed ({from} → {to})"),
            ),
            Decision::HashChanged => (
                OutcomeStatus::RegeneratedHashChanged,
                "help output changed".to_string(),
            ),
        };

        let mut outcome = ToolOutcome {
            name: tool.name.clone(),
            path: tool.path.clone(),
            status,
            version: tool.version_str().to_string(),
            fingerprint: digest.as_str().to_string(),
            reason,
            source: tool.source,
            warnings: Vec::new(),
        };

        if status != OutcomeStatus::Skipped {
            match self.save(&tool) {
                Ok(warnings) => outcome.warnings = warnings,
                Err(reason) => {
                    outcome.status = OutcomeStatus::Failed;
                    outcome.reason = reason;
                }
            }
        }

        info!(
            tool = %outcome.name,
            status = %outcome.status,
            version = %outcome.version,
            fingerprint = digest.short(),
            reason = %outcome.reason,
            "Processed tool"
        );
        Some(outcome)
    }

    /// Saves the tree, then the bash script, then the zsh script; stops at the
    /// first failure.
    fn save(&self, tool: &Tool) -> Result<Vec<String>, String> {
        self.store
            .save_tool(tool)
            .map_err(|e| format!("failed to save tool: {e}"))?;

        let mut warnings = Vec::new();
        for shell in Shell::ALL {
            let result = generate_with_limits(tool, shell, &self.limits);
            for warning in &result.warnings {
                warn!(tool = %tool.name, shell = %shell, "{warning}");
            }
            self.store
                .save_script(&tool.name, shell, &result.script)
                .map_err(|e| format!("failed to save {shell} completion: {e}"))?;
            warnings.extend(result.warnings.into_iter().map(|w| format!("{shell}: {w}")));
        }
        Ok(warnings)
    }
}
