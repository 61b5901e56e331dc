//! Application constants for GHCN-M quality control
//!
//! This module contains the fixed-width record layout, the missing-value
//! sentinel, and default processing parameters used throughout the tool.

// =============================================================================
// Fixed-Width Record Layout
// =============================================================================

/// Width of the station identifier field (bytes 0..11)
pub const STATION_ID_WIDTH: usize = 11;

/// Byte offset of the 4-character year field
pub const YEAR_OFFSET: usize = 11;

/// Width of the year field
pub const YEAR_WIDTH: usize = 4;

/// Byte offset of the 4-character element code field
pub const ELEMENT_OFFSET: usize = 15;

/// Width of the element code field
pub const ELEMENT_WIDTH: usize = 4;

/// Byte offset of the first monthly value field
pub const DATA_OFFSET: usize = 19;

/// Width of one monthly field (5-character value plus 3 flag characters)
pub const MONTH_FIELD_WIDTH: usize = 8;

/// Width of the signed integer value within a monthly field
pub const VALUE_WIDTH: usize = 5;

/// Number of monthly values per row
pub const MONTHS_PER_YEAR: usize = 12;

/// Minimum acceptable line width in bytes.
///
/// The 12th value field ends at byte 112; the trailing flag characters of
/// the final month may be absent.
pub const MIN_LINE_WIDTH: usize =
    DATA_OFFSET + (MONTHS_PER_YEAR - 1) * MONTH_FIELD_WIDTH + VALUE_WIDTH;

/// Missing-value sentinel in the source format
pub const SENTINEL: i32 = -9999;

// =============================================================================
// Quality Control Defaults
// =============================================================================

/// Minimum number of samples a calendar month needs before r-scores are
/// computed for it
pub const DEFAULT_MONTHS_REQUIRED: usize = 20;

/// Observations with |r-score| at or above this threshold are dropped
pub const DEFAULT_R_THRESHOLD: f64 = 5.0;

// =============================================================================
// File and Directory Constants
// =============================================================================

/// Glob pattern for discovering merged input datasets
pub const DEFAULT_INPUT_GLOB: &str = "merged*.dat";

/// Subdirectory of the platform data dir holding merged datasets
pub const DEFAULT_DATA_SUBDIR: &str = "isti";

/// Extension of raw input datasets
pub const INPUT_EXTENSION: &str = "dat";

/// Suffix appended to the input stem for cleaned output
pub const QC_OUTPUT_SUFFIX: &str = ".qc.dat";

/// Derive the cleaned-output filename for an input dataset.
///
/// Strips a trailing `.dat` extension if present and appends `.qc.dat`,
/// so `merged-2024.dat` becomes `merged-2024.qc.dat`.
pub fn qc_output_filename(input: &std::path::Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = match name.strip_suffix(&format!(".{INPUT_EXTENSION}")) {
        Some(stem) => stem,
        None => name.as_str(),
    };
    format!("{stem}{QC_OUTPUT_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_min_line_width() {
        assert_eq!(MIN_LINE_WIDTH, 112);
    }

    #[test]
    fn test_qc_output_filename() {
        assert_eq!(
            qc_output_filename(Path::new("/data/merged-2024.dat")),
            "merged-2024.qc.dat"
        );
        assert_eq!(qc_output_filename(Path::new("stations")), "stations.qc.dat");
        assert_eq!(
            qc_output_filename(Path::new("archive.dat.dat")),
            "archive.dat.qc.dat"
        );
    }
}
