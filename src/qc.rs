//! QC filter, writer, and diagnostic records.
//!
//! The filter drops observations whose |r-score| reaches the threshold;
//! keys with no score (invalidated months) are dropped too, since no
//! score means no evidence of validity. The writer re-serializes the
//! surviving series over its year span, skipping fully-missing years.

use crate::codec::encode_line;
use crate::config::ValueScaling;
use crate::constants::MONTHS_PER_YEAR;
use crate::record::{StationRecord, year_month_key};
use crate::{Error, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

/// Per-record diagnostic emitted on the audit stream, one JSON object
/// per line
#[derive(Debug, Serialize)]
pub struct DiagnosticRecord<'a> {
    /// Station identifier
    pub id: &'a str,

    /// Element code
    pub element: &'a str,

    /// Full r-score mapping, keyed by 6-digit `YYYYMM`
    #[serde(serialize_with = "serialize_scores")]
    pub r: &'a BTreeMap<u32, f64>,
}

/// Serialize scores with `YYYYMM` string keys. JSON has no infinity
/// literal, so non-finite scores become the strings `"Infinity"` /
/// `"-Infinity"`, keeping the sign.
fn serialize_scores<S: Serializer>(
    scores: &BTreeMap<u32, f64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(scores.len()))?;
    for (key, score) in scores {
        let key = format!("{key:06}");
        if score.is_finite() {
            map.serialize_entry(&key, score)?;
        } else if score.is_sign_positive() {
            map.serialize_entry(&key, "Infinity")?;
        } else {
            map.serialize_entry(&key, "-Infinity")?;
        }
    }
    map.end()
}

/// Write one diagnostic line for a record and its score map
pub fn write_diagnostic<W: Write>(
    record: &StationRecord,
    scores: &BTreeMap<u32, f64>,
    out: &mut W,
) -> Result<()> {
    let diagnostic = DiagnosticRecord {
        id: &record.station_id,
        element: &record.element,
        r: scores,
    };
    serde_json::to_writer(&mut *out, &diagnostic)?;
    writeln!(out).map_err(|e| Error::io("failed to write diagnostic record", e))?;
    Ok(())
}

/// Drop observations that did not earn a passing r-score.
///
/// A key survives iff it is present in `scores` with `|score|` strictly
/// below `r_threshold`. Returns `(kept, dropped)` observation counts.
pub fn filter_record(
    record: &mut StationRecord,
    scores: &BTreeMap<u32, f64>,
    r_threshold: f64,
) -> (usize, usize) {
    let before = record.len();
    record
        .data
        .retain(|key, _| scores.get(key).is_some_and(|r| r.abs() < r_threshold));
    let kept = record.len();
    if kept < before {
        debug!(
            station = %record.station_id,
            element = %record.element,
            dropped = before - kept,
            "observations removed by QC filter"
        );
    }
    (kept, before - kept)
}

/// Serialize a record's surviving data to the output stream.
///
/// Emits one line per year in the inclusive span of the surviving keys,
/// skipping years in which all twelve months are missing. Returns the
/// number of lines written; an empty record writes nothing.
pub fn write_station<W: Write>(
    record: &StationRecord,
    scaling: ValueScaling,
    out: &mut W,
) -> Result<usize> {
    let Some((min_year, max_year)) = record.year_span() else {
        return Ok(0);
    };

    let mut lines_written = 0;
    for year in min_year..=max_year {
        let mut values = [None; MONTHS_PER_YEAR];
        for (m, value) in values.iter_mut().enumerate() {
            *value = record
                .data
                .get(&year_month_key(year, m as u32 + 1))
                .copied();
        }
        if values.iter().all(Option::is_none) {
            continue;
        }

        let line = encode_line(&record.station_id, year, &record.element, &values, scaling);
        writeln!(out, "{line}").map_err(|e| Error::io("failed to write station record", e))?;
        lines_written += 1;
    }
    Ok(lines_written)
}
