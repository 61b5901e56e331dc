use clap::Parser;
use ghcnm_qc::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => {
            // Success - the summary has already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {error}");
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("GHCN-M QC - Robust Quality Control for Monthly Station Records");
    println!("==============================================================");
    println!();
    println!("Remove outliers from fixed-width GHCN-M monthly climate records by");
    println!("standardizing every observation against its calendar-month median and");
    println!("MAD, and re-emit the surviving series in the original layout.");
    println!();
    println!("USAGE:");
    println!("    ghcnm-qc <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Run the QC pass and write the cleaned dataset");
    println!("    validate    Decode and group the input without writing output");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # QC the newest merged dataset from the platform data directory:");
    println!("    ghcnm-qc process");
    println!();
    println!("    # QC a specific file with custom thresholds:");
    println!("    ghcnm-qc process merged-2024.dat --r-threshold 4.0 --months-required 15");
    println!();
    println!("    # Capture diagnostics and per-record statistics:");
    println!("    ghcnm-qc process merged-2024.dat --diagnostics scores.jsonl --progress");
    println!();
    println!("For detailed help on any command, use:");
    println!("    ghcnm-qc <COMMAND> --help");
}
