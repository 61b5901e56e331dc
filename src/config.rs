//! Configuration for the QC pipeline.
//!
//! Provides the processing parameters (minimum monthly sample size,
//! outlier threshold, value scaling) passed into the transform and filter
//! stages, so thresholds are explicit rather than embedded constants.

use crate::constants::{DEFAULT_MONTHS_REQUIRED, DEFAULT_R_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Scaling applied to monthly values at the format boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueScaling {
    /// Keep values as the raw stored integers
    #[default]
    Raw,

    /// Divide by 100 on decode (hundredths of a degree), multiply back
    /// on encode
    Hundredths,
}

impl ValueScaling {
    /// Convert a raw stored integer to the internal value
    pub fn decode(self, raw: i32) -> f64 {
        match self {
            ValueScaling::Raw => raw as f64,
            ValueScaling::Hundredths => raw as f64 / 100.0,
        }
    }

    /// Convert an internal value back to the stored integer
    pub fn encode(self, value: f64) -> i32 {
        match self {
            ValueScaling::Raw => value.round() as i32,
            ValueScaling::Hundredths => (value * 100.0).round() as i32,
        }
    }
}

/// Processing configuration for the QC pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QcConfig {
    /// Minimum number of samples a calendar month needs before r-scores
    /// are computed for it; months below this are invalidated entirely
    pub months_required: usize,

    /// Observations with |r-score| at or above this value are dropped
    pub r_threshold: f64,

    /// Value scaling applied at decode/encode time
    pub scaling: ValueScaling,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            months_required: DEFAULT_MONTHS_REQUIRED,
            r_threshold: DEFAULT_R_THRESHOLD,
            scaling: ValueScaling::Raw,
        }
    }
}

impl QcConfig {
    /// Create configuration with a custom minimum monthly sample size
    pub fn with_months_required(mut self, months_required: usize) -> Self {
        self.months_required = months_required;
        self
    }

    /// Create configuration with a custom outlier threshold
    pub fn with_r_threshold(mut self, r_threshold: f64) -> Self {
        self.r_threshold = r_threshold;
        self
    }

    /// Create configuration with the given value scaling
    pub fn with_scaling(mut self, scaling: ValueScaling) -> Self {
        self.scaling = scaling;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QcConfig::default();
        assert_eq!(config.months_required, 20);
        assert_eq!(config.r_threshold, 5.0);
        assert_eq!(config.scaling, ValueScaling::Raw);
    }

    #[test]
    fn test_builders() {
        let config = QcConfig::default()
            .with_months_required(5)
            .with_r_threshold(3.5)
            .with_scaling(ValueScaling::Hundredths);
        assert_eq!(config.months_required, 5);
        assert_eq!(config.r_threshold, 3.5);
        assert_eq!(config.scaling, ValueScaling::Hundredths);
    }

    #[test]
    fn test_scaling_round_trip() {
        assert_eq!(ValueScaling::Raw.decode(-123), -123.0);
        assert_eq!(ValueScaling::Raw.encode(-123.0), -123);

        assert_eq!(ValueScaling::Hundredths.decode(1550), 15.5);
        assert_eq!(ValueScaling::Hundredths.encode(15.5), 1550);
        assert_eq!(
            ValueScaling::Hundredths.encode(ValueScaling::Hundredths.decode(-42)),
            -42
        );
    }
}
