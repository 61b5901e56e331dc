//! Command-line argument definitions for the GHCN-M QC tool
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::{QcConfig, ValueScaling};
use crate::constants::{DEFAULT_MONTHS_REQUIRED, DEFAULT_R_THRESHOLD};
use crate::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the GHCN-M quality control tool
///
/// Runs a robust statistical QC pass over fixed-width monthly climate
/// station records, removing observations whose r-score (deviation from
/// the calendar-month median in MAD units) exceeds a threshold.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ghcnm-qc",
    version,
    about = "Robust statistical quality control for GHCN-M monthly station records",
    long_about = "Runs a robust statistical quality control pass over fixed-width GHCN-M \
                  monthly climate station records. Observations are standardized against \
                  their calendar-month median and MAD across all years; values whose \
                  r-score exceeds the threshold are dropped and the surviving series is \
                  re-emitted in the original layout, alongside a JSON-lines diagnostic \
                  stream for auditing."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the QC tool
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the QC pass and write the cleaned dataset (default command)
    Process(ProcessArgs),
    /// Decode and group the input without writing output
    Validate(ValidateArgs),
}

/// Arguments for the process command (main QC pass)
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Input dataset in fixed-width GHCN-M layout
    ///
    /// If not specified, the newest merged*.dat under the platform data
    /// directory (e.g. ~/.local/share/isti) is used.
    #[arg(value_name = "FILE", help = "Input .dat file in GHCN-M layout")]
    pub input: Option<PathBuf>,

    /// Output path for the cleaned dataset
    ///
    /// If not specified, writes <input stem>.qc.dat in the current
    /// directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Output path for the cleaned dataset"
    )]
    pub output: Option<PathBuf>,

    /// Output path for the JSON-lines diagnostic stream
    ///
    /// One record per station/element group with its full r-score map.
    /// If not specified, diagnostics go to stdout.
    #[arg(
        long = "diagnostics",
        value_name = "FILE",
        help = "Output path for JSON-lines diagnostics (default: stdout)"
    )]
    pub diagnostics: Option<PathBuf>,

    /// Report each record's pooled median and MAD to stderr
    #[arg(long = "progress", help = "Report per-record median and MAD to stderr")]
    pub progress: bool,

    /// Minimum samples a calendar month needs before it is scored
    ///
    /// Months with fewer samples are invalidated entirely: all their
    /// observations are dropped.
    #[arg(
        long = "months-required",
        value_name = "COUNT",
        default_value_t = DEFAULT_MONTHS_REQUIRED,
        help = "Minimum monthly sample size"
    )]
    pub months_required: usize,

    /// Outlier cutoff in MAD units
    ///
    /// An observation survives only if its |r-score| is strictly below
    /// this value.
    #[arg(
        long = "r-threshold",
        value_name = "R",
        default_value_t = DEFAULT_R_THRESHOLD,
        help = "Outlier cutoff in MAD units"
    )]
    pub r_threshold: f64,

    /// Treat stored integers as hundredths (divide by 100 at parse time)
    #[arg(
        long = "scale-hundredths",
        help = "Treat stored integers as hundredths of a unit"
    )]
    pub scale_hundredths: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the validate command (decode and group only)
#[derive(Debug, Clone, Parser)]
pub struct ValidateArgs {
    /// Input dataset in fixed-width GHCN-M layout
    #[arg(value_name = "FILE", help = "Input .dat file in GHCN-M layout")]
    pub input: Option<PathBuf>,

    /// Treat stored integers as hundredths (divide by 100 at parse time)
    #[arg(
        long = "scale-hundredths",
        help = "Treat stored integers as hundredths of a unit"
    )]
    pub scale_hundredths: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

impl ProcessArgs {
    /// Validate the process command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(input) = &self.input {
            if !input.exists() {
                return Err(Error::configuration(format!(
                    "Input file does not exist: {}",
                    input.display()
                )));
            }
            if !input.is_file() {
                return Err(Error::configuration(format!(
                    "Input path is not a file: {}",
                    input.display()
                )));
            }
        }

        if self.months_required == 0 {
            return Err(Error::configuration(
                "Minimum monthly sample size must be greater than 0".to_string(),
            ));
        }

        if !self.r_threshold.is_finite() || self.r_threshold <= 0.0 {
            return Err(Error::configuration(
                "R-score threshold must be a positive finite number".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the pipeline configuration from the arguments
    pub fn to_config(&self) -> QcConfig {
        QcConfig::default()
            .with_months_required(self.months_required)
            .with_r_threshold(self.r_threshold)
            .with_scaling(self.scaling())
    }

    /// Value scaling selected by the flags
    pub fn scaling(&self) -> ValueScaling {
        if self.scale_hundredths {
            ValueScaling::Hundredths
        } else {
            ValueScaling::Raw
        }
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show the progress spinner (not in quiet mode)
    pub fn show_spinner(&self) -> bool {
        !self.quiet
    }
}

impl ValidateArgs {
    /// Validate the validate command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(input) = &self.input {
            if !input.exists() {
                return Err(Error::configuration(format!(
                    "Input file does not exist: {}",
                    input.display()
                )));
            }
        }
        Ok(())
    }

    /// Value scaling selected by the flags
    pub fn scaling(&self) -> ValueScaling {
        if self.scale_hundredths {
            ValueScaling::Hundredths
        } else {
            ValueScaling::Raw
        }
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
