//! Row pipeline: read identifier rows, resolve and locate concurrently,
//! write results back in bounded batches.

mod rows;
mod run;

pub use rows::{read_rows, SheetRow};
pub use run::{PipelineParams, RowPipeline};

/// Per-row lifecycle. Success path is Pending → Resolving → Located →
/// Queued → Written; Skipped, Failed and Written are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Pending,
    Resolving,
    Located,
    Queued,
    Written,
    Skipped,
    Failed,
}

/// Final accounting for one pipeline pass.
#[derive(Debug, Default, Clone)]
pub struct PipelineReport {
    /// Rows in the snapshot.
    pub total_rows: usize,
    /// Rows that resolved to a folder and an image.
    pub resolved: usize,
    /// Rows whose updates landed in a successful batch.
    pub written: usize,
    /// Rows with no SKU or a pre-existing link (no remote call made).
    pub skipped: usize,
    /// Rows that failed to resolve or locate.
    pub failed: usize,
    /// Batches applied.
    pub batches_written: u32,
    /// Indices (0-based) of batches that exhausted their write retries.
    pub failed_batches: Vec<u32>,
    /// True when a stop was requested before the run finished.
    pub aborted: bool,
}

impl PipelineReport {
    pub fn new(total_rows: usize) -> Self {
        Self {
            total_rows,
            ..Self::default()
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows: {} resolved, {} written, {} skipped, {} failed; {} batch(es) written, {} failed{}",
            self.total_rows,
            self.resolved,
            self.written,
            self.skipped,
            self.failed,
            self.batches_written,
            self.failed_batches.len(),
            if self.aborted { " (stopped early)" } else { "" },
        )
    }
}
