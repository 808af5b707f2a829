use crate::config::{default_workers, ID_COLUMN_LABEL};
use crate::fields::TargetIndexes;
use crate::identifier::{IdSource, RandomUuid};
use crate::models::{OutputOrder, ResultMatrix, Row, Table};
use crate::stats::PipelineStats;
use crate::worker::{IndexedRow, RowWorker, WorkerReport};
use anyhow::{anyhow, bail, Context, Result};
use crossbeam_channel::{bounded, Receiver};
use indicatif::{ProgressBar, ProgressStyle};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ScopedJoinHandle};
use tracing::{debug, info, warn};

/// Settings for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on the worker pool; the pool never exceeds the row count.
    pub workers: usize,
    pub order: OutputOrder,
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            order: OutputOrder::default(),
            show_progress: false,
        }
    }
}

/// Coordinator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Seeding,
    Running,
    Draining,
    Done,
}

/// Result matrix plus one report per joined worker.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub matrix: ResultMatrix,
    pub workers: Vec<WorkerReport>,
}

/// Number of workers to spawn for `rows` data rows.
pub fn pool_size(rows: usize, configured: usize) -> usize {
    configured.max(1).min(rows)
}

/// Header row with the identifier label appended, built without the augmenter.
pub fn output_header(header: &[String]) -> Row {
    let mut out = Vec::with_capacity(header.len() + 1);
    out.extend_from_slice(header);
    out.push(ID_COLUMN_LABEL.to_string());
    out
}

/// Runs the pipeline with random v4 UUIDs and fresh counters.
pub fn run_pipeline(
    table: Table,
    targets: &TargetIndexes,
    config: &PipelineConfig,
) -> Result<PipelineOutcome> {
    run_pipeline_with(table, targets, &RandomUuid, config, &PipelineStats::new())
}

/// Fans the data rows out to a worker pool and collects the transformed rows.
///
/// Both queues are sized to the row count so no send ever blocks. Workers are
/// joined before the output queue is drained; if any worker fails or panics
/// the whole run fails and no matrix is returned.
///
/// With [`OutputOrder::Completion`] data rows come back in whatever order the
/// workers finished them. [`OutputOrder::Input`] slots each row back at its
/// origin index.
pub fn run_pipeline_with<I: IdSource + ?Sized>(
    table: Table,
    targets: &TargetIndexes,
    ids: &I,
    config: &PipelineConfig,
    stats: &PipelineStats,
) -> Result<PipelineOutcome> {
    let Table { header, rows } = table;
    let header = output_header(&header);
    let row_count = rows.len();

    if row_count == 0 {
        info!("No data rows, emitting header only");
        return Ok(PipelineOutcome {
            matrix: ResultMatrix {
                header,
                rows: Vec::new(),
            },
            workers: Vec::new(),
        });
    }

    let pool = pool_size(row_count, config.workers);
    info!(
        rows = row_count,
        workers = pool,
        targets = targets.len(),
        "Starting pipeline"
    );

    debug!(state = ?PipelineState::Seeding);
    let (input_tx, input_rx) = bounded::<IndexedRow>(row_count);
    let (output_tx, output_rx) = bounded::<IndexedRow>(row_count);
    for item in rows.into_iter().enumerate() {
        input_tx
            .send(item)
            .context("Input queue closed during seeding")?;
    }
    drop(input_tx);
    stats.add_seeded(row_count as u64);

    let progress = progress_bar(row_count, config.show_progress)?;
    let abort = AtomicBool::new(false);

    debug!(state = ?PipelineState::Running);
    let joined = thread::scope(|s| -> Result<Vec<WorkerReport>> {
        let mut handles = Vec::with_capacity(pool);
        for id in 0..pool {
            let worker = RowWorker::new(id, targets, ids, stats, &progress, &abort);
            let rx = input_rx.clone();
            let tx = output_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("phonecsv-worker-{id}"))
                .spawn_scoped(s, move || worker.run(rx, tx));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    let cause = anyhow!(e).context(format!("Failed to spawn worker {id}"));
                    return Err(abandon_workers(handles, &abort, cause));
                }
            }
        }

        debug!(state = ?PipelineState::Draining);
        join_workers(handles, &abort)
    });
    drop(output_tx);

    let reports = match joined {
        Ok(r) => r,
        Err(e) => {
            progress.abandon();
            warn!(error = %e, "Pipeline aborted");
            return Err(e.context("Row pipeline aborted"));
        }
    };

    let data_rows = collect(output_rx, row_count, config.order, stats)?;
    progress.finish_and_clear();
    debug!(state = ?PipelineState::Done);

    info!(
        rows = data_rows.len(),
        normalized_fields = stats.normalized(),
        "Pipeline complete"
    );

    Ok(PipelineOutcome {
        matrix: ResultMatrix {
            header,
            rows: data_rows,
        },
        workers: reports,
    })
}

/// Joins every handle in spawn order. The first error wins; a panic
/// becomes an error and raises the abort flag.
fn join_workers<T>(
    handles: Vec<ScopedJoinHandle<'_, Result<T>>>,
    abort: &AtomicBool,
) -> Result<Vec<T>> {
    let mut reports = Vec::with_capacity(handles.len());
    let mut first_error = None;
    for handle in handles {
        match handle.join() {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(e)) => {
                first_error.get_or_insert(e);
            }
            Err(payload) => {
                abort.store(true, Ordering::Release);
                first_error.get_or_insert(anyhow!(
                    "Worker panicked: {}",
                    panic_message(payload.as_ref())
                ));
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}

/// Joins workers that were already running when the pool could not be
/// completed, then hands back `cause`. Joining here keeps a panicked
/// worker from escaping the scope.
fn abandon_workers<T>(
    handles: Vec<ScopedJoinHandle<'_, Result<T>>>,
    abort: &AtomicBool,
    cause: anyhow::Error,
) -> anyhow::Error {
    abort.store(true, Ordering::Release);
    if let Err(e) = join_workers(handles, abort) {
        warn!(error = %e, "Worker failed while the pool was being torn down");
    }
    cause
}

/// Drains the closed output queue into data rows.
fn collect(
    output: Receiver<IndexedRow>,
    expected: usize,
    order: OutputOrder,
    stats: &PipelineStats,
) -> Result<Vec<Row>> {
    let rows = match order {
        OutputOrder::Completion => {
            let mut rows = Vec::with_capacity(expected);
            for (_, row) in output.iter() {
                stats.inc_collected();
                rows.push(row);
            }
            rows
        }
        OutputOrder::Input => {
            let mut slots: Vec<Option<Row>> = vec![None; expected];
            for (origin, row) in output.iter() {
                let slot = slots
                    .get_mut(origin)
                    .with_context(|| format!("Row index {origin} outside the seeded range"))?;
                if slot.replace(row).is_some() {
                    bail!("Row {} was produced twice", origin + 1);
                }
                stats.inc_collected();
            }
            slots.into_iter().flatten().collect()
        }
    };

    if rows.len() != expected {
        bail!(
            "Pipeline produced {} rows but {} were seeded",
            rows.len(),
            expected
        );
    }
    Ok(rows)
}

fn progress_bar(len: usize, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows")
            .context("Invalid progress bar template")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
