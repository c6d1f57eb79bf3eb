//! Concurrent extraction and completion generation.
//!
//! A [`Pipeline`] takes tools from the catalog, extracts each one on a
//! worker pool, and compares the fresh version and fingerprint against what
//! the catalog recorded at the last generation (see [`decide`]). Unchanged
//! tools are skipped; the rest get a saved tree plus bash and zsh scripts.
//! Outcomes are collected on the calling thread, applied to the catalog, and
//! the catalog is saved once at the end of the batch.
//!
//! # Example
//!
//! ```
//! use tabgen_db::{Catalog, CatalogEntry, MemoryStore};
//! use tabgen_discovery::ScriptedRunner;
//! use tabgen_pipeline::{OutcomeStatus, Pipeline, PipelineOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let dir = tempfile::tempdir()?;
//! # let path = dir.path().join("mycli");
//! # std::fs::write(&path, "")?;
//! # #[cfg(unix)]
//! # {
//! # use std::os::unix::fs::PermissionsExt;
//! # std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
//! # }
//! # let path = path.to_str().unwrap();
//! let runner = ScriptedRunner::new()
//!     .with_text(&format!("{path} --version"), "mycli 1.2.0")
//!     .with_text(&format!("{path} --help"), "Options:\n  -v, --verbose  Be loud\n");
//!
//! let mut catalog = Catalog::default();
//! catalog.insert(CatalogEntry::new("mycli", path));
//! let store = MemoryStore::new().with_catalog(catalog);
//!
//! let pipeline = Pipeline::new(&runner, &store, PipelineOptions::default());
//! let summary = pipeline.run(&[])?;
//! assert_eq!(summary.get("mycli").unwrap().status, OutcomeStatus::Generated);
//!
//! // Nothing changed, so the second run skips.
//! let summary = pipeline.run(&[])?;
//! assert_eq!(summary.skipped, 1);
//! # Ok(())
//! # }
//! ```

mod batch;
mod decision;
mod error;
mod outcome;
mod worker;

pub use batch::{Pipeline, PipelineOptions, worker_count};
pub use decision::{Decision, decide};
pub use error::PipelineError;
pub use outcome::{OutcomeStatus, PipelineSummary, ToolOutcome};
pub use worker::WorkItem;
