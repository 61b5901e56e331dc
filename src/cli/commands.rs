//! Command implementations for the GHCN-M QC CLI
//!
//! This module contains the command execution logic: logging setup,
//! input discovery, stream wiring, and end-of-run reporting.

use crate::cli::args::{Args, Commands, ProcessArgs, ValidateArgs};
use crate::constants::{DEFAULT_DATA_SUBDIR, DEFAULT_INPUT_GLOB, qc_output_filename};
use crate::grouper::StationGrouper;
use crate::pipeline::{self, RunStats};
use crate::{Error, Result};
use colored::Colorize;
use indicatif::{HumanDuration, ProgressBar};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Main command runner for the QC tool
pub fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Commands::Process(args)) => run_process(args),
        Some(Commands::Validate(args)) => run_validate(args),
        None => Ok(()),
    }
}

/// Run the QC pass: resolve streams, execute the pipeline, report
fn run_process(args: ProcessArgs) -> Result<()> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet);
    info!("Starting GHCN-M QC pass");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = args.to_config();
    let input = resolve_input(args.input.as_deref())?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(qc_output_filename(&input)));

    let reader = BufReader::new(
        File::open(&input)
            .map_err(|e| Error::io(format!("failed to open input {}", input.display()), e))?,
    );
    let mut cleaned = BufWriter::new(
        File::create(&output)
            .map_err(|e| Error::io(format!("failed to create output {}", output.display()), e))?,
    );

    // Diagnostics default to stdout; everything human-facing stays on
    // stderr so the stream remains machine-readable.
    let mut diagnostics: Box<dyn Write> = match &args.diagnostics {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
            Error::io(format!("failed to create diagnostics {}", path.display()), e)
        })?)),
        None => Box::new(io::stdout().lock()),
    };

    let mut progress_sink;
    let progress: Option<&mut dyn Write> = if args.progress {
        progress_sink = io::stderr();
        Some(&mut progress_sink)
    } else {
        None
    };

    // The per-record progress report and the spinner share stderr;
    // only one of them runs.
    let spinner = if args.show_spinner() && !args.progress {
        let pb = ProgressBar::new_spinner();
        pb.set_message(format!("Running QC pass over {}", input.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = pipeline::run_qc(reader, &mut cleaned, &mut diagnostics, progress, &config);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let stats = result?;
    cleaned
        .flush()
        .map_err(|e| Error::io("failed to flush cleaned output", e))?;
    diagnostics
        .flush()
        .map_err(|e| Error::io("failed to flush diagnostics", e))?;

    if !args.quiet {
        print_process_summary(&input, &output, &stats, start_time.elapsed());
    }
    Ok(())
}

/// Decode and group the input, reporting counts without writing output
fn run_validate(args: ValidateArgs) -> Result<()> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), false);
    args.validate()?;
    let input = resolve_input(args.input.as_deref())?;

    let reader = BufReader::new(
        File::open(&input)
            .map_err(|e| Error::io(format!("failed to open input {}", input.display()), e))?,
    );

    let mut records = 0usize;
    let mut observations = 0usize;
    let mut elements = BTreeSet::new();
    for record in StationGrouper::new(reader.lines(), args.scaling()) {
        let record = record?;
        records += 1;
        observations += record.len();
        elements.insert(record.element.clone());
    }

    eprintln!("{}", "Input is well-formed".green().bold());
    eprintln!("  Input:               {}", input.display());
    eprintln!("  Records grouped:     {records}");
    eprintln!("  Observations:        {observations}");
    eprintln!(
        "  Elements:            {}",
        elements.into_iter().collect::<Vec<_>>().join(", ")
    );
    eprintln!(
        "  Elapsed:             {}",
        HumanDuration(start_time.elapsed())
    );
    Ok(())
}

/// Set up structured logging on stderr
fn setup_logging(log_level: &str, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ghcnm_qc={log_level}")));

    if quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(io::stderr)
                    .compact(),
            )
            .init();
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Resolve the input dataset: an explicit path, or the newest
/// `merged*.dat` under the platform data directory
fn resolve_input(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let data_dir = dirs::data_dir().ok_or_else(|| {
        Error::configuration("no platform data directory available; pass an input file")
    })?;
    let pattern = data_dir
        .join(DEFAULT_DATA_SUBDIR)
        .join(DEFAULT_INPUT_GLOB)
        .to_string_lossy()
        .into_owned();

    let mut matches: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| Error::configuration(format!("invalid input pattern '{pattern}': {e}")))?
        .filter_map(|entry| entry.ok())
        .collect();
    matches.sort();

    let newest = matches.pop().ok_or_else(|| {
        Error::configuration(format!(
            "no input datasets match '{pattern}'; pass an input file"
        ))
    })?;
    info!("using {}", newest.display());
    Ok(newest)
}

/// Print the end-of-run summary to stderr
fn print_process_summary(input: &Path, output: &Path, stats: &RunStats, elapsed: Duration) {
    eprintln!("{}", "QC pass complete".green().bold());
    eprintln!("  Input:               {}", input.display());
    eprintln!("  Cleaned output:      {}", output.display());
    eprintln!("  Records processed:   {}", stats.records_processed);
    eprintln!("  Records written:     {}", stats.records_written);
    eprintln!("  Station-years:       {}", stats.lines_written);
    eprintln!(
        "  Observations:        {} read, {} kept, {}",
        stats.observations_read,
        stats.observations_kept,
        format!("{} dropped", stats.observations_dropped).yellow()
    );
    eprintln!("  Elapsed:             {}", HumanDuration(elapsed));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_input_explicit_path_passes_through() {
        let path = Path::new("/tmp/some-input.dat");
        let resolved = resolve_input(Some(path)).unwrap();
        assert_eq!(resolved, path);
    }
}
