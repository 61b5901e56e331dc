//! Per-calendar-month r-score transform.
//!
//! Each of the 12 calendar months is treated separately: the median and
//! MAD are taken across all years of that month, and every observation
//! becomes its signed deviation from the month median divided by the
//! month MAD. A month with fewer than `months_required` samples is
//! invalidated entirely: none of its keys appear in the output map.

use crate::config::QcConfig;
use crate::record::{StationRecord, key_month};
use crate::stats::{mad, median};
use crate::Result;
use std::collections::BTreeMap;
use tracing::debug;

/// Compute the r-score map for a record.
///
/// The returned map contains only keys whose calendar month met the
/// minimum sample size. A zero MAD is not an error: values equal to the
/// month median score exactly `0.0`, everything else scores signed
/// infinity.
pub fn r_scores(record: &StationRecord, config: &QcConfig) -> Result<BTreeMap<u32, f64>> {
    let mut scores = BTreeMap::new();

    for month in 1..=12u32 {
        let values = record.month_values(month);
        if values.is_empty() || values.len() < config.months_required {
            debug!(
                station = %record.station_id,
                element = %record.element,
                month,
                samples = values.len(),
                required = config.months_required,
                "month invalidated, below minimum sample size"
            );
            continue;
        }

        // The sample-size guard above keeps these off the empty-input path.
        let median_v = median(&values)?;
        let mad_v = mad(&values)?;

        for (&key, &value) in record.data.iter().filter(|(k, _)| key_month(**k) == month) {
            let score = if mad_v != 0.0 {
                (value - median_v) / mad_v
            } else if value == median_v {
                0.0
            } else {
                f64::INFINITY.copysign(value - median_v)
            };
            scores.insert(key, score);
        }
    }

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::year_month_key;

    /// A record with `n` Januaries holding the given values, years
    /// starting at 2000.
    fn january_record(values: &[f64]) -> StationRecord {
        let mut record = StationRecord::new("USW00012345", "TAVG");
        for (i, v) in values.iter().enumerate() {
            record.data.insert(year_month_key(2000 + i as i32, 1), *v);
        }
        record
    }

    #[test]
    fn test_small_sample_month_is_invalidated() {
        let record = january_record(&[10.0; 19]);
        let config = QcConfig::default(); // months_required = 20
        let scores = r_scores(&record, &config).unwrap();
        assert!(
            scores.is_empty(),
            "a month below the sample minimum contributes zero keys"
        );
    }

    #[test]
    fn test_scores_for_sufficient_sample() {
        // 21 Januaries 1..=21: median 11, MAD 5.
        let values: Vec<f64> = (1..=21).map(|i| i as f64).collect();
        let record = january_record(&values);
        let config = QcConfig::default();
        let scores = r_scores(&record, &config).unwrap();

        assert_eq!(scores.len(), 21);
        assert_eq!(scores[&year_month_key(2010, 1)], 0.0); // value 11
        assert_eq!(scores[&year_month_key(2020, 1)], 2.0); // value 21
        assert_eq!(scores[&year_month_key(2000, 1)], -2.0); // value 1
    }

    #[test]
    fn test_zero_mad_all_equal() {
        let record = january_record(&[42.0; 20]);
        let scores = r_scores(&record, &QcConfig::default()).unwrap();
        assert_eq!(scores.len(), 20);
        assert!(scores.values().all(|&s| s == 0.0));
    }

    #[test]
    fn test_zero_mad_single_outlier() {
        // Twenty 10s and one 9999: median 10, MAD 0.
        let mut values = vec![10.0; 20];
        values.push(9999.0);
        let record = january_record(&values);
        let scores = r_scores(&record, &QcConfig::default()).unwrap();

        let outlier_key = year_month_key(2020, 1);
        assert_eq!(scores[&outlier_key], f64::INFINITY);
        for (key, score) in &scores {
            if *key != outlier_key {
                assert_eq!(*score, 0.0);
            }
        }
    }

    #[test]
    fn test_zero_mad_low_outlier_is_negative_infinity() {
        let mut values = vec![10.0; 20];
        values.push(-9000.0);
        let record = january_record(&values);
        let scores = r_scores(&record, &QcConfig::default()).unwrap();
        assert_eq!(scores[&year_month_key(2020, 1)], f64::NEG_INFINITY);
    }

    #[test]
    fn test_months_are_independent() {
        // January has 20 samples, February only 3: only January scores.
        let mut record = january_record(&[10.0; 20]);
        for year in 2000..2003 {
            record.data.insert(year_month_key(year, 2), 5.0);
        }
        let scores = r_scores(&record, &QcConfig::default()).unwrap();
        assert_eq!(scores.len(), 20);
        assert!(scores.keys().all(|k| key_month(*k) == 1));
    }

    #[test]
    fn test_varied_threshold() {
        let record = january_record(&[10.0; 5]);
        let config = QcConfig::default().with_months_required(5);
        let scores = r_scores(&record, &config).unwrap();
        assert_eq!(scores.len(), 5);
    }
}
