//! Fixed-width line codec for GHCN-M station records.
//!
//! One row holds a station id, year, element code, and twelve monthly
//! values (5-character signed integer plus 3 flag characters each).
//! Decoding converts the missing-value sentinel into absent values;
//! encoding reintroduces it. The sentinel exists only at this boundary.

use crate::config::ValueScaling;
use crate::constants::{
    DATA_OFFSET, ELEMENT_OFFSET, ELEMENT_WIDTH, MIN_LINE_WIDTH, MONTH_FIELD_WIDTH,
    MONTHS_PER_YEAR, SENTINEL, STATION_ID_WIDTH, VALUE_WIDTH, YEAR_OFFSET, YEAR_WIDTH,
};
use crate::{Error, Result};
use std::fmt::Write as _;

/// One decoded input row: a station/element/year and its twelve monthly
/// values, sentinel months already converted to `None`
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine {
    pub station_id: String,
    pub year: i32,
    pub element: String,
    pub values: [Option<f64>; 12],
}

/// Decode one fixed-width line.
///
/// `line_number` is 1-based and only used for error context. Fails with
/// [`Error::MalformedLine`] if the line is shorter than the minimum
/// width or a numeric field does not parse as an integer.
pub fn decode_line(line: &str, line_number: u64, scaling: ValueScaling) -> Result<RawLine> {
    if line.len() < MIN_LINE_WIDTH {
        return Err(Error::malformed_line(
            line_number,
            format!(
                "line is {} bytes, expected at least {}",
                line.len(),
                MIN_LINE_WIDTH
            ),
        ));
    }

    let station_id = slice_field(line, 0, STATION_ID_WIDTH, line_number, "station id")?;
    let year = parse_int_field(line, YEAR_OFFSET, YEAR_WIDTH, line_number, "year")?;
    let element = slice_field(line, ELEMENT_OFFSET, ELEMENT_WIDTH, line_number, "element")?;

    let mut values = [None; MONTHS_PER_YEAR];
    for (m, value) in values.iter_mut().enumerate() {
        let offset = DATA_OFFSET + m * MONTH_FIELD_WIDTH;
        let raw = parse_int_field(
            line,
            offset,
            VALUE_WIDTH,
            line_number,
            &format!("month {} value", m + 1),
        )?;
        if raw != SENTINEL {
            *value = Some(scaling.decode(raw));
        }
    }

    Ok(RawLine {
        station_id: station_id.to_string(),
        year,
        element: element.to_string(),
        values,
    })
}

/// Encode a station-year back to the fixed-width layout.
///
/// Missing months are written as the sentinel; each value is
/// right-justified in a 5-character field followed by 3 spaces.
pub fn encode_line(
    station_id: &str,
    year: i32,
    element: &str,
    values: &[Option<f64>; 12],
    scaling: ValueScaling,
) -> String {
    let mut line = String::with_capacity(MIN_LINE_WIDTH + 3);
    let _ = write!(line, "{station_id}{year}{element}");
    for value in values {
        let stored = match value {
            Some(v) => scaling.encode(*v),
            None => SENTINEL,
        };
        let _ = write!(line, "{stored:>VALUE_WIDTH$}   ");
    }
    line
}

/// Extract a raw text field at a fixed byte range
fn slice_field<'a>(
    line: &'a str,
    offset: usize,
    width: usize,
    line_number: u64,
    field: &str,
) -> Result<&'a str> {
    line.get(offset..offset + width)
        .ok_or_else(|| Error::malformed_line(line_number, format!("{field} field is not valid text")))
}

/// Parse a right-justified integer field at a fixed byte range
fn parse_int_field(
    line: &str,
    offset: usize,
    width: usize,
    line_number: u64,
    field: &str,
) -> Result<i32> {
    let text = slice_field(line, offset, width, line_number, field)?;
    text.trim().parse::<i32>().map_err(|_| {
        Error::malformed_line(line_number, format!("invalid {field}: {text:?}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line() -> String {
        let values = [
            Some(10.0),
            Some(-25.0),
            None,
            Some(0.0),
            Some(310.0),
            Some(42.0),
            Some(7.0),
            Some(-1.0),
            Some(99.0),
            Some(100.0),
            Some(11.0),
            Some(12.0),
        ];
        encode_line("USW00012345", 2020, "TAVG", &values, ValueScaling::Raw)
    }

    #[test]
    fn test_decode_fields() {
        let raw = decode_line(&sample_line(), 1, ValueScaling::Raw).unwrap();
        assert_eq!(raw.station_id, "USW00012345");
        assert_eq!(raw.year, 2020);
        assert_eq!(raw.element, "TAVG");
        assert_eq!(raw.values[0], Some(10.0));
        assert_eq!(raw.values[1], Some(-25.0));
        assert_eq!(raw.values[2], None, "sentinel month must decode to None");
        assert_eq!(raw.values[3], Some(0.0));
        assert_eq!(raw.values[11], Some(12.0));
    }

    #[test]
    fn test_encode_layout_is_byte_exact() {
        let values = [
            Some(10.0),
            None,
            Some(-9998.0),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        ];
        let line = encode_line("USW00012345", 2020, "TAVG", &values, ValueScaling::Raw);
        assert!(line.starts_with("USW000123452020TAVG"));
        assert_eq!(&line[19..27], "   10   ");
        assert_eq!(&line[27..35], "-9999   ");
        assert_eq!(&line[35..43], "-9998   ");
        assert_eq!(line.len(), 19 + 12 * 8);
    }

    #[test]
    fn test_round_trip() {
        let line = sample_line();
        let raw = decode_line(&line, 1, ValueScaling::Raw).unwrap();
        let encoded = encode_line(
            &raw.station_id,
            raw.year,
            &raw.element,
            &raw.values,
            ValueScaling::Raw,
        );
        assert_eq!(encoded, line);
    }

    #[test]
    fn test_hundredths_scaling() {
        let values = [
            Some(15.5),
            Some(-0.42),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        ];
        let line = encode_line("USW00012345", 1999, "TAVG", &values, ValueScaling::Hundredths);
        assert_eq!(&line[19..24], " 1550");
        assert_eq!(&line[27..32], "  -42");

        let raw = decode_line(&line, 1, ValueScaling::Hundredths).unwrap();
        assert_eq!(raw.values[0], Some(15.5));
        assert_eq!(raw.values[1], Some(-0.42));
        assert_eq!(raw.values[2], None);
    }

    #[test]
    fn test_short_line_is_malformed() {
        let err = decode_line("USW000123452020TAVG   10", 7, ValueScaling::Raw).unwrap_err();
        match err {
            Error::MalformedLine { line_number, .. } => assert_eq!(line_number, 7),
            other => panic!("expected MalformedLine, got {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_field_is_malformed() {
        let mut line = sample_line();
        line.replace_range(11..15, "20XX");
        let err = decode_line(&line, 3, ValueScaling::Raw).unwrap_err();
        match err {
            Error::MalformedLine { line_number, reason } => {
                assert_eq!(line_number, 3);
                assert!(reason.contains("year"));
            }
            other => panic!("expected MalformedLine, got {other:?}"),
        }
    }

    #[test]
    fn test_line_without_final_flags_decodes() {
        // The trailing flag characters of the 12th month may be absent.
        let line = sample_line();
        let trimmed = &line[..112];
        let raw = decode_line(trimmed, 1, ValueScaling::Raw).unwrap();
        assert_eq!(raw.values[11], Some(12.0));
    }
}
