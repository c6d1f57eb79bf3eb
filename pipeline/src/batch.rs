//! The worker pool and the collecting side.

use std::sync::mpsc;

use rayon::prelude::*;
use tabgen_db::{Catalog, CatalogEntry, CatalogStore};
use tabgen_discovery::{ExtractConfig, ProbeRunner};
use tabgen_generator::Limits;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::outcome::{PipelineSummary, ToolOutcome};
use crate::worker::{WorkItem, Worker};

/// Settings for one batch.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Worker threads; 0 means one per available CPU.
    pub workers: usize,
    pub force: bool,
    pub extract: ExtractConfig,
    pub limits: Limits,
}

/// Pool width for `requested` workers over `items` tools: the requested
/// count (or the available parallelism when 0), never more than the number
/// of tools and never less than one.
///
/// # Examples
///
/// ```
/// use tabgen_pipeline::worker_count;
///
/// assert_eq!(worker_count(8, 3), 3);
/// assert_eq!(worker_count(2, 10), 2);
/// assert_eq!(worker_count(4, 0), 1);
/// ```
pub fn worker_count(requested: usize, items: usize) -> usize {
    let requested = if requested == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    } else {
        requested
    };
    requested.min(items).max(1)
}

/// Runs extraction and generation over catalog tools.
pub struct Pipeline<'a> {
    runner: &'a dyn ProbeRunner,
    store: &'a dyn CatalogStore,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(runner: &'a dyn ProbeRunner, store: &'a dyn CatalogStore, options: PipelineOptions) -> Self {
        Self {
            runner,
            store,
            options,
        }
    }

    /// Processes the named catalog tools, or every catalog tool when `names`
    /// is empty, then saves the updated catalog once.
    ///
    /// # Errors
    ///
    /// Fails as a whole only when the catalog cannot be loaded or saved, a
    /// name is not in the catalog, or the pool cannot be built. Per-tool
    /// failures are reported in the summary.
    pub fn run(&self, names: &[String]) -> Result<PipelineSummary, PipelineError> {
        let mut catalog = self.store.load_catalog()?;

        let items: Vec<WorkItem> = if names.is_empty() {
            catalog.entries().map(WorkItem::from_entry).collect()
        } else {
            names
                .iter()
                .map(|name| {
                    catalog
                        .get(name)
                        .map(WorkItem::from_entry)
                        .ok_or_else(|| PipelineError::UnknownTool(name.clone()))
                })
                .collect::<Result<_, _>>()?
        };

        if items.is_empty() {
            debug!("No tools to process");
            return Ok(PipelineSummary::default());
        }

        let summary = self.process(items, &mut catalog)?;
        catalog.touch();
        self.store.save_catalog(&catalog)?;
        Ok(summary)
    }

    /// Processes `items` on the pool and applies generated outcomes to
    /// `catalog` as they arrive. The catalog is not saved.
    pub fn process(&self, items: Vec<WorkItem>, catalog: &mut Catalog) -> Result<PipelineSummary, PipelineError> {
        let width = worker_count(self.options.workers, items.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(width)
            .thread_name(|i| format!("tabgen-worker-{i}"))
            .build()?;
        info!(tools = items.len(), workers = width, force = self.options.force, "Processing tools");

        let (tx, rx) = mpsc::channel::<ToolOutcome>();
        let mut summary = PipelineSummary::default();

        std::thread::scope(|scope| {
            let pool = &pool;
            let items = &items;
            scope.spawn(move || {
                pool.install(|| {
                    items
                        .par_iter()
                        .map_init(
                            || {
                                Worker::new(
                                    self.runner,
                                    self.store,
                                    &self.options.extract,
                                    self.options.limits,
                                    self.options.force,
                                )
                            },
                            |worker, item| worker.process(item),
                        )
                        .flatten()
                        .for_each_with(tx, |tx, outcome| {
                            let _ = tx.send(outcome);
                        });
                });
            });

            for outcome in rx {
                apply_outcome(catalog, &outcome);
                summary.record(outcome);
            }
        });

        summary.outcomes.sort_by(|a, b| a.name.cmp(&b.name));
        info!(
            generated = summary.generated,
            skipped = summary.skipped,
            failed = summary.failed,
            "Finished processing"
        );
        Ok(summary)
    }
}

/// Records a generation in the catalog; other outcomes leave it untouched.
fn apply_outcome(catalog: &mut Catalog, outcome: &ToolOutcome) {
    if !outcome.status.is_generated() {
        return;
    }
    let entry = catalog
        .tools
        .entry(outcome.name.clone())
        .or_insert_with(|| CatalogEntry::new(&outcome.name, &outcome.path));
    entry.mark_generated(&outcome.version, &outcome.fingerprint);
    entry.has_help = outcome.source.includes_help();
    entry.has_man_page = outcome.source.includes_man();
}
