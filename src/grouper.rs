//! Streaming station grouper.
//!
//! Reconstructs one logical record per (station id, element code) pair
//! from an ordered line stream in a single forward pass. Grouping is by
//! *adjacency*: the input is assumed to be clustered by station id, and
//! only the current station run is ever buffered. A station id that
//! reappears after an intervening different id starts a fresh record;
//! that is the documented contract of the format, not something this
//! stage tries to repair (repairing it would require buffering the
//! whole file).

use crate::codec::{RawLine, decode_line};
use crate::config::ValueScaling;
use crate::record::{StationRecord, year_month_key};
use crate::{Error, Result};
use std::collections::VecDeque;
use tracing::debug;

/// Lazy iterator yielding fully-populated [`StationRecord`]s from a
/// stream of fixed-width lines.
///
/// Wraps any `Iterator<Item = io::Result<String>>` (such as
/// `BufRead::lines`). Each record is complete when yielded; the
/// iterator is finite, forward-only, and not restartable. I/O and
/// decode errors end the iteration.
pub struct StationGrouper<I> {
    lines: I,
    scaling: ValueScaling,
    line_number: u64,
    run: Vec<RawLine>,
    pending: VecDeque<StationRecord>,
    done: bool,
}

impl<I> StationGrouper<I>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    /// Create a grouper over an ordered line stream
    pub fn new(lines: I, scaling: ValueScaling) -> Self {
        Self {
            lines,
            scaling,
            line_number: 0,
            run: Vec::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Close out the buffered station run: stable-sort by element code,
    /// partition into maximal runs of equal element, and merge each
    /// sub-run's years into one record.
    fn flush_run(&mut self) {
        if self.run.is_empty() {
            return;
        }
        let mut run = std::mem::take(&mut self.run);

        // Rows with identical element code must keep their original
        // relative order; Vec::sort_by is stable.
        run.sort_by(|a, b| a.element.cmp(&b.element));

        let mut record: Option<StationRecord> = None;
        for line in run {
            let start_new = match &record {
                Some(r) => r.element != line.element,
                None => true,
            };
            if start_new {
                if let Some(r) = record.take() {
                    debug!(
                        station = %r.station_id,
                        element = %r.element,
                        observations = r.len(),
                        "grouped record"
                    );
                    self.pending.push_back(r);
                }
                record = Some(StationRecord::new(
                    line.station_id.clone(),
                    line.element.clone(),
                ));
            }
            let r = record.as_mut().expect("record initialized above");
            for (m, value) in line.values.iter().enumerate() {
                if let Some(v) = value {
                    r.data.insert(year_month_key(line.year, m as u32 + 1), *v);
                }
            }
        }
        if let Some(r) = record {
            debug!(
                station = %r.station_id,
                element = %r.element,
                observations = r.len(),
                "grouped record"
            );
            self.pending.push_back(r);
        }
    }
}

impl<I> Iterator for StationGrouper<I>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    type Item = Result<StationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            if self.done {
                return None;
            }

            match self.lines.next() {
                None => {
                    self.done = true;
                    self.flush_run();
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(Error::io("failed to read input line", e)));
                }
                Some(Ok(line)) => {
                    self.line_number += 1;
                    let decoded = match decode_line(&line, self.line_number, self.scaling) {
                        Ok(decoded) => decoded,
                        Err(e) => {
                            self.done = true;
                            return Some(Err(e));
                        }
                    };

                    let boundary = self
                        .run
                        .last()
                        .is_some_and(|prev| prev.station_id != decoded.station_id);
                    if boundary {
                        self.flush_run();
                    }
                    self.run.push(decoded);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_line;

    fn line(station: &str, year: i32, element: &str, values: [Option<f64>; 12]) -> String {
        encode_line(station, year, element, &values, ValueScaling::Raw)
    }

    fn months(values: &[(usize, f64)]) -> [Option<f64>; 12] {
        let mut out = [None; 12];
        for (m, v) in values {
            out[m - 1] = Some(*v);
        }
        out
    }

    fn group(lines: Vec<String>) -> Vec<StationRecord> {
        StationGrouper::new(lines.into_iter().map(Ok), ValueScaling::Raw)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_merges_years_into_one_record() {
        let records = group(vec![
            line("USW00012345", 2020, "TAVG", months(&[(1, 10.0), (2, 12.0)])),
            line("USW00012345", 2021, "TAVG", months(&[(1, 11.0)])),
        ]);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.station_id, "USW00012345");
        assert_eq!(r.element, "TAVG");
        assert_eq!(r.data.get(&202001), Some(&10.0));
        assert_eq!(r.data.get(&202002), Some(&12.0));
        assert_eq!(r.data.get(&202101), Some(&11.0));
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_splits_by_element_within_station() {
        let records = group(vec![
            line("USW00012345", 2020, "TMAX", months(&[(1, 20.0)])),
            line("USW00012345", 2020, "TAVG", months(&[(1, 10.0)])),
            line("USW00012345", 2021, "TMAX", months(&[(1, 21.0)])),
        ]);
        // Element runs come out in sorted element order.
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].element, "TAVG");
        assert_eq!(records[1].element, "TMAX");
        assert_eq!(records[1].len(), 2);
    }

    #[test]
    fn test_non_adjacent_station_starts_new_record() {
        let records = group(vec![
            line("STATION0001", 2020, "TAVG", months(&[(1, 1.0)])),
            line("STATION0002", 2020, "TAVG", months(&[(1, 2.0)])),
            line("STATION0001", 2021, "TAVG", months(&[(1, 3.0)])),
        ]);
        // Adjacency grouping: the reappearing station is a new record.
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].station_id, "STATION0001");
        assert_eq!(records[1].station_id, "STATION0002");
        assert_eq!(records[2].station_id, "STATION0001");
        assert_eq!(records[2].data.get(&202101), Some(&3.0));
    }

    #[test]
    fn test_sentinel_months_never_enter_record() {
        let records = group(vec![line(
            "USW00012345",
            2020,
            "TAVG",
            months(&[(3, 7.0)]),
        )]);
        assert_eq!(records[0].len(), 1);
        assert_eq!(records[0].data.get(&202003), Some(&7.0));
    }

    #[test]
    fn test_later_year_overwrites_duplicate_key() {
        let records = group(vec![
            line("USW00012345", 2020, "TAVG", months(&[(1, 10.0)])),
            line("USW00012345", 2020, "TAVG", months(&[(1, 99.0)])),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data.get(&202001), Some(&99.0));
    }

    #[test]
    fn test_decode_error_carries_line_number() {
        let lines = vec![
            line("USW00012345", 2020, "TAVG", months(&[(1, 10.0)])),
            "too short".to_string(),
        ];
        let results: Vec<_> =
            StationGrouper::new(lines.into_iter().map(Ok), ValueScaling::Raw).collect();
        let err = results
            .into_iter()
            .find_map(|r| r.err())
            .expect("malformed line must surface an error");
        match err {
            Error::MalformedLine { line_number, .. } => assert_eq!(line_number, 2),
            other => panic!("expected MalformedLine, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(group(Vec::new()).is_empty());
    }
}
