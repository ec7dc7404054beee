//! Extract command - pull shipments out of one label or a folder of labels.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use shipx_core::{BatchReport, CancelToken, Input, Mode, export, pdf_aggregator};

use crate::output::{format_json, format_table, print_summary};

/// Exit status after an interrupt, as a shell reports SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Label PDF, or a folder whose PDFs are all processed
    #[arg(required = true)]
    input: PathBuf,

    /// Display format on stdout
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Export file (default: export.output from config, "output.csv")
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not write the export file
    #[arg(long, conflicts_with = "output")]
    no_export: bool,

    /// Number of documents decoded in parallel
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Mark due dates that have already passed
    #[arg(long)]
    show_overdue: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width table
    Text,
    /// JSON with orders and skipped documents
    Json,
    /// Export format
    Csv,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let mut config = super::load_config(config_path)?;
    if let Some(jobs) = args.jobs {
        config.batch.jobs = jobs;
    }
    let delimiter = config.export.delimiter_byte()?;

    let input = Input::from_path(&args.input)?;
    info!("Extracting from {} ({:?} mode)", input.path().display(), input.mode());

    let cancel = CancelToken::new();
    let aggregator = pdf_aggregator(&config)?.with_cancel_token(cancel.clone());

    // First Ctrl-C stops between documents; a second one, or one after the
    // run, exits since the handler stays installed for the process lifetime.
    let finished = Arc::new(AtomicBool::new(false));
    let interrupts = {
        let finished = finished.clone();
        tokio::spawn(async move {
            let mut interrupted = false;
            while tokio::signal::ctrl_c().await.is_ok() {
                if interrupted || finished.load(Ordering::SeqCst) {
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
                interrupted = true;
                cancel.cancel();
            }
        })
    };

    let spinner = spinner(&input);
    let report = tokio::task::spawn_blocking(move || aggregator.run(&input)).await?;
    spinner.finish_and_clear();
    finished.store(true, Ordering::SeqCst);

    // Single-document failures end the run here
    let report: BatchReport = report?;

    let rows = export::project(&report.aggregate);
    let display = match args.format {
        OutputFormat::Text => {
            let today = args.show_overdue.then(|| chrono::Local::now().date_naive());
            format_table(&rows, today)
        }
        OutputFormat::Json => format_json(&report)?,
        OutputFormat::Csv => export::to_csv_string(&rows, delimiter)?,
    };
    print!("{}", display);

    print_summary(&report);

    if !args.no_export {
        let output_path = args.output.unwrap_or_else(|| config.export.output.clone());
        export::export_csv(&output_path, &rows, delimiter)?;
        eprintln!(
            "{} Data has been written to {}",
            style("✓").green(),
            output_path.display()
        );
    }

    interrupts.abort();
    debug!("Finished in {:?}", start.elapsed());
    Ok(())
}

fn spinner(input: &Input) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    let what = match input.mode() {
        Mode::Single => "label",
        Mode::Batch => "labels",
    };
    pb.set_message(format!("Reading {} from {}", what, input.path().display()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
