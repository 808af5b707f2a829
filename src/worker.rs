use crate::fields::TargetIndexes;
use crate::identifier::{augment_row, IdSource};
use crate::models::Row;
use crate::normalize::normalize_row;
use crate::stats::PipelineStats;
use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use indicatif::ProgressBar;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{debug, trace, warn};

/// A data row tagged with its position in the input.
pub type IndexedRow = (usize, Row);

/// Returned by a worker once the input queue is closed and drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub rows_processed: u64,
}

/// Raises the abort flag if the owning worker unwinds.
struct AbortOnPanic<'a> {
    worker: usize,
    abort: &'a AtomicBool,
}

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.abort.store(true, Ordering::Release);
            warn!(worker = self.worker, "Worker panicked, abort raised");
        }
    }
}

/// Pulls rows from the input queue, normalizes and tags them, and pushes
/// the results to the output queue.
pub struct RowWorker<'a, I: IdSource + ?Sized> {
    id: usize,
    targets: &'a TargetIndexes,
    ids: &'a I,
    stats: &'a PipelineStats,
    progress: &'a ProgressBar,
    abort: &'a AtomicBool,
}

impl<'a, I: IdSource + ?Sized> RowWorker<'a, I> {
    pub fn new(
        id: usize,
        targets: &'a TargetIndexes,
        ids: &'a I,
        stats: &'a PipelineStats,
        progress: &'a ProgressBar,
        abort: &'a AtomicBool,
    ) -> Self {
        Self {
            id,
            targets,
            ids,
            stats,
            progress,
            abort,
        }
    }

    /// Normalization followed by identifier augmentation.
    pub fn transform(&self, row: &[String]) -> Result<Row> {
        let normalized = normalize_row(row, self.targets);
        let touched = (0..row.len()).filter(|&i| self.targets.contains(i)).count();
        self.stats.add_fields_normalized(touched as u64);
        augment_row(normalized, self.ids)
    }

    /// Runs until the input queue is closed and empty, or until another
    /// worker raises the abort flag.
    ///
    /// A failed transformation raises the abort flag and is returned; the
    /// row is never forwarded. A panic raises the flag while unwinding.
    pub fn run(
        self,
        input: Receiver<IndexedRow>,
        output: Sender<IndexedRow>,
    ) -> Result<WorkerReport> {
        let _guard = AbortOnPanic {
            worker: self.id,
            abort: self.abort,
        };
        let mut rows_processed = 0u64;

        loop {
            if self.abort.load(Ordering::Acquire) {
                debug!(worker = self.id, "Abort raised, worker stopping");
                break;
            }

            let Ok((origin, row)) = input.recv() else {
                break;
            };

            let transformed = match self.transform(&row) {
                Ok(r) => r,
                Err(e) => {
                    self.abort.store(true, Ordering::Release);
                    return Err(e).with_context(|| {
                        format!("Worker {} failed to transform row {}", self.id, origin + 1)
                    });
                }
            };

            output
                .send((origin, transformed))
                .context("Output queue closed while workers were running")?;

            rows_processed += 1;
            self.stats.inc_transformed();
            self.progress.inc(1);
            trace!(worker = self.id, row = origin, "Row transformed");
        }

        debug!(worker = self.id, rows = rows_processed, "Worker finished");

        Ok(WorkerReport {
            worker_id: self.id,
            rows_processed,
        })
    }
}
