//! Drive the worker pool and batch write-back for one pipeline pass.
//!
//! Rows complete in arbitrary order; correctness comes from each update
//! carrying its own row's cell address, not from ordering. A failed batch
//! is scoped: earlier batches stay committed, later batches still run.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::a1;
use crate::config::{ColumnLayout, SyncConfig};
use crate::control::StopSignal;
use crate::locator::ImageLocator;
use crate::resolver::FolderResolver;
use crate::retry::{classify_store_error, run_with_retry, RetryPolicy};
use crate::store::{RangeUpdate, SheetStore};

use super::rows::{read_rows, SheetRow};
use super::{PipelineReport, RowState};

/// Tuning knobs for one pipeline pass.
#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// Worker pool width.
    pub concurrency: usize,
    /// Rows accumulated before a batch flush.
    pub batch_size: usize,
    /// Backoff policy for batch writes.
    pub retry: RetryPolicy,
    pub layout: ColumnLayout,
}

impl From<&SyncConfig> for PipelineParams {
    fn from(cfg: &SyncConfig) -> Self {
        Self {
            concurrency: cfg.concurrency.max(1),
            batch_size: cfg.batch_size.max(1),
            retry: RetryPolicy::from(&cfg.retry_config()),
            layout: cfg.columns.clone(),
        }
    }
}

/// Worker output for one eligible row.
enum RowWork {
    Located { row: u32, updates: Vec<RangeUpdate> },
    Failed { row: u32 },
}

/// Accumulates per-row updates until a batch is due.
struct UpdateBatcher {
    batch_size: usize,
    pending: Vec<RangeUpdate>,
    pending_rows: usize,
    next_index: u32,
}

struct Batch {
    index: u32,
    rows: usize,
    updates: Vec<RangeUpdate>,
}

impl UpdateBatcher {
    fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pending: Vec::new(),
            pending_rows: 0,
            next_index: 0,
        }
    }

    fn push_row(&mut self, updates: Vec<RangeUpdate>) {
        self.pending.extend(updates);
        self.pending_rows += 1;
    }

    fn is_full(&self) -> bool {
        self.pending_rows >= self.batch_size
    }

    fn take(&mut self) -> Option<Batch> {
        if self.pending.is_empty() {
            return None;
        }
        let batch = Batch {
            index: self.next_index,
            rows: self.pending_rows,
            updates: std::mem::take(&mut self.pending),
        };
        self.next_index += 1;
        self.pending_rows = 0;
        Some(batch)
    }
}

pub struct RowPipeline {
    sheets: Arc<dyn SheetStore>,
    resolver: Arc<FolderResolver>,
    locator: Arc<ImageLocator>,
    params: PipelineParams,
    stop: StopSignal,
}

impl RowPipeline {
    pub fn new(
        sheets: Arc<dyn SheetStore>,
        resolver: Arc<FolderResolver>,
        locator: Arc<ImageLocator>,
        params: PipelineParams,
        stop: StopSignal,
    ) -> Self {
        Self {
            sheets,
            resolver,
            locator,
            params,
            stop,
        }
    }

    /// One full pass: snapshot rows, resolve eligible ones concurrently,
    /// flush updates in bounded batches, report the outcome.
    pub async fn run(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        start_row: u32,
    ) -> Result<PipelineReport> {
        crate::config::validate_request(spreadsheet_id, start_row)?;

        let rows = read_rows(
            self.sheets.as_ref(),
            spreadsheet_id,
            sheet,
            start_row,
            &self.params.layout,
        )
        .await
        .context("failed to read row snapshot")?;

        let mut report = PipelineReport::new(rows.len());
        let mut eligible = Vec::new();
        for row in rows {
            if row.needs_link() {
                tracing::trace!(row = row.row, state = ?RowState::Pending, "row awaiting dispatch");
                eligible.push(row);
            } else {
                tracing::debug!(row = row.row, state = ?RowState::Skipped, "row skipped (no SKU or already linked)");
                report.skipped += 1;
            }
        }
        tracing::info!(
            total = report.total_rows,
            eligible = eligible.len(),
            skipped = report.skipped,
            "pipeline pass starting"
        );

        let mut queue = eligible.into_iter();
        let mut pool: JoinSet<RowWork> = JoinSet::new();
        let mut batcher = UpdateBatcher::new(self.params.batch_size);

        loop {
            while pool.len() < self.params.concurrency {
                if self.stop.is_stopped() {
                    break;
                }
                let Some(row) = queue.next() else { break };
                let resolver = Arc::clone(&self.resolver);
                let locator = Arc::clone(&self.locator);
                let layout = self.params.layout.clone();
                let sheet = sheet.to_string();
                pool.spawn(async move { process_row(&resolver, &locator, &row, &sheet, &layout).await });
            }

            let Some(joined) = pool.join_next().await else {
                break;
            };
            match joined {
                Ok(RowWork::Located { row, updates }) => {
                    report.resolved += 1;
                    tracing::debug!(row, state = ?RowState::Queued, "row queued for write-back");
                    batcher.push_row(updates);
                    if batcher.is_full() {
                        self.flush(spreadsheet_id, &mut batcher, &mut report).await;
                    }
                }
                Ok(RowWork::Failed { row }) => {
                    tracing::debug!(row, state = ?RowState::Failed, "row failed");
                    report.failed += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "row worker panicked");
                    report.failed += 1;
                }
            }
        }

        self.flush(spreadsheet_id, &mut batcher, &mut report).await;

        if self.stop.is_stopped() {
            let remaining = queue.count();
            if remaining > 0 {
                tracing::warn!(remaining, "stop requested, rows left unprocessed");
            }
            report.aborted = true;
        }

        tracing::info!(summary = %report.summary(), "pipeline pass finished");
        Ok(report)
    }

    /// Flush whatever is pending as one batch write, with retry. Exhausted
    /// retries mark only this batch failed; the pass continues.
    async fn flush(
        &self,
        spreadsheet_id: &str,
        batcher: &mut UpdateBatcher,
        report: &mut PipelineReport,
    ) {
        let Some(batch) = batcher.take() else { return };
        if self.stop.is_stopped() {
            tracing::warn!(
                batch = batch.index,
                rows = batch.rows,
                "stop requested, dropping unwritten batch"
            );
            report.aborted = true;
            return;
        }

        let result = run_with_retry(&self.params.retry, classify_store_error, || {
            self.sheets.batch_update(spreadsheet_id, &batch.updates)
        })
        .await;

        match result {
            Ok(()) => {
                tracing::info!(
                    batch = batch.index,
                    rows = batch.rows,
                    state = ?RowState::Written,
                    "batch written"
                );
                report.batches_written += 1;
                report.written += batch.rows;
            }
            Err(e) => {
                tracing::error!(
                    batch = batch.index,
                    rows = batch.rows,
                    error = %e,
                    "batch write failed after retries; earlier batches remain committed"
                );
                report.failed_batches.push(batch.index);
            }
        }
    }
}

async fn process_row(
    resolver: &FolderResolver,
    locator: &ImageLocator,
    row: &SheetRow,
    sheet: &str,
    layout: &ColumnLayout,
) -> RowWork {
    tracing::debug!(row = row.row, sku = %row.sku, state = ?RowState::Resolving, "resolving SKU folder");
    let Some(folder) = resolver.resolve(&row.sku).await else {
        return RowWork::Failed { row: row.row };
    };

    tracing::debug!(row = row.row, folder = %folder.id, state = ?RowState::Located, "locating first image");
    let Some(image_url) = locator.first_image(&folder.id).await else {
        return RowWork::Failed { row: row.row };
    };

    let updates = vec![
        RangeUpdate {
            range: a1::cell(sheet, &layout.image, row.row),
            values: vec![vec![format!("=IMAGE(\"{image_url}\")")]],
        },
        RangeUpdate {
            range: a1::cell(sheet, &layout.link, row.row),
            values: vec![vec![folder.link]],
        },
    ];
    RowWork::Located {
        row: row.row,
        updates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(range: &str) -> Vec<RangeUpdate> {
        vec![RangeUpdate {
            range: range.to_string(),
            values: vec![vec!["v".to_string()]],
        }]
    }

    #[test]
    fn batcher_fills_at_row_granularity() {
        let mut b = UpdateBatcher::new(2);
        b.push_row(update("A1"));
        assert!(!b.is_full());
        b.push_row(update("A2"));
        assert!(b.is_full());
        let batch = b.take().unwrap();
        assert_eq!(batch.index, 0);
        assert_eq!(batch.rows, 2);
        assert_eq!(batch.updates.len(), 2);
    }

    #[test]
    fn batcher_indexes_consecutive_batches() {
        let mut b = UpdateBatcher::new(1);
        b.push_row(update("A1"));
        assert_eq!(b.take().unwrap().index, 0);
        b.push_row(update("A2"));
        assert_eq!(b.take().unwrap().index, 1);
        assert!(b.take().is_none());
    }

    #[test]
    fn empty_batcher_yields_nothing() {
        let mut b = UpdateBatcher::new(5);
        assert!(b.take().is_none());
    }
}
