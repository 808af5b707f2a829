use anyhow::Result;
use clap::Parser;
use phonecsv::fields::{resolve_indexes, unmatched_columns};
use phonecsv::identifier::RandomUuid;
use phonecsv::models::OutputOrder;
use phonecsv::pipeline::{run_pipeline_with, PipelineConfig};
use phonecsv::prompt::Prompter;
use phonecsv::stats::PipelineStats;
use phonecsv::{sink, source};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "phonecsv")]
#[command(about = "Normalize phone columns in a CSV file and tag every row with a UUID")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to the CSV file to process (prompted if omitted)
    #[arg(short, long)]
    input: Option<String>,

    /// Path to write the processed CSV file (prompted if omitted)
    #[arg(short, long)]
    output: Option<String>,

    /// Phone column names, whitespace-separated (prompted if omitted)
    #[arg(short, long, num_args = 1..)]
    columns: Option<Vec<String>>,

    /// Maximum number of worker threads (defaults to available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Keep data rows in input order instead of completion order
    #[arg(long)]
    preserve_order: bool,

    /// Show a progress bar while rows are transformed
    #[arg(long)]
    progress: bool,
}

fn run(cli: Cli) -> Result<()> {
    let mut prompter = Prompter::stdio();

    let (input, output) = prompter.resolve_paths(cli.input, cli.output)?;
    let columns = prompter.resolve_columns(cli.columns)?;

    let start = Instant::now();

    let table = source::read_table(&input)?;
    let total_rows = table.total_rows();

    let targets = resolve_indexes(&table.header, &columns);
    for name in unmatched_columns(&table.header, &columns) {
        warn!(column = name, "Requested column not found in header, skipping");
    }
    let positions: &[usize] = &targets;
    info!(columns = ?positions, "Resolved target columns");

    let mut config = PipelineConfig::default();
    if let Some(w) = cli.workers {
        config.workers = w;
    }
    if cli.preserve_order {
        config.order = OutputOrder::Input;
    }
    config.show_progress = cli.progress;

    let stats = PipelineStats::new();
    let outcome = run_pipeline_with(table, &targets, &RandomUuid, &config, &stats)?;

    sink::write_matrix(&output, &outcome.matrix)?;

    let elapsed = start.elapsed();
    info!(
        workers = outcome.workers.len(),
        normalized_fields = stats.normalized(),
        duration_secs = elapsed.as_secs_f64(),
        "Run complete"
    );

    println!(
        "{} records written in {} seconds. Have a nice day!",
        total_rows,
        elapsed.as_secs_f64()
    );

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    match run(cli) {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
