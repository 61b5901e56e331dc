//! Single-pass QC pipeline.
//!
//! Wires the grouper, statistics, transform, filter, and writer into
//! one forward pass over the input stream. The cleaned-data stream and
//! the diagnostic stream are co-produced and stay in the same relative
//! order; nothing outlives the record currently being processed.

use crate::config::QcConfig;
use crate::grouper::StationGrouper;
use crate::qc::{filter_record, write_diagnostic, write_station};
use crate::rscore::r_scores;
use crate::stats::{mad, median};
use crate::{Error, Result};
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Counters accumulated over one QC pass, for reporting
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Station/element records processed
    pub records_processed: usize,
    /// Records with at least one surviving observation
    pub records_written: usize,
    /// Output lines (station-years) written
    pub lines_written: usize,
    /// Observations read from the input
    pub observations_read: usize,
    /// Observations that survived the filter
    pub observations_kept: usize,
    /// Observations dropped by the filter
    pub observations_dropped: usize,
}

/// Run the QC pass over `input`, writing cleaned records to `cleaned`
/// and one JSON diagnostic per record to `diagnostics`.
///
/// When `progress` is given, each non-empty record additionally reports
/// its record-level median and MAD (all months pooled) to that stream,
/// mirroring the diagnostic order.
pub fn run_qc<R, W, D>(
    input: R,
    cleaned: &mut W,
    diagnostics: &mut D,
    mut progress: Option<&mut dyn Write>,
    config: &QcConfig,
) -> Result<RunStats>
where
    R: BufRead,
    W: Write,
    D: Write,
{
    let mut stats = RunStats::default();

    for grouped in StationGrouper::new(input.lines(), config.scaling) {
        let mut record = grouped?;
        stats.records_processed += 1;
        stats.observations_read += record.len();

        if let Some(out) = progress.as_deref_mut() {
            report_record_stats(&record, out)?;
        }

        let scores = r_scores(&record, config)?;
        write_diagnostic(&record, &scores, diagnostics)?;

        let (kept, dropped) = filter_record(&mut record, &scores, config.r_threshold);
        stats.observations_kept += kept;
        stats.observations_dropped += dropped;

        let lines = write_station(&record, config.scaling, cleaned)?;
        stats.lines_written += lines;
        if lines > 0 {
            stats.records_written += 1;
        }
    }

    info!(
        records = stats.records_processed,
        kept = stats.observations_kept,
        dropped = stats.observations_dropped,
        "QC pass complete"
    );
    Ok(stats)
}

/// Report the pooled (all months) median and MAD of a record.
///
/// Records with no observations are skipped; there is no sample to
/// summarize.
fn report_record_stats(record: &crate::StationRecord, out: &mut dyn Write) -> Result<()> {
    if record.is_empty() {
        debug!(
            station = %record.station_id,
            element = %record.element,
            "empty record, skipping progress report"
        );
        return Ok(());
    }
    let values = record.values();
    let median_v = median(&values)?;
    let mad_v = mad(&values)?;
    writeln!(
        out,
        "{} {} {} {}",
        record.station_id, record.element, median_v, mad_v
    )
    .map_err(|e| Error::io("failed to write progress report", e))
}
