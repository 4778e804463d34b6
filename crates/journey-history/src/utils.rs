//! Column names and shared table helpers.

use crate::error::{JourneyError, Result};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// =============================================================================
// Column Names
// =============================================================================

/// Travel date, `DD-Mon-YYYY`.
pub const DATE: &str = "Date";
/// Touch-in clock time.
pub const START_TIME: &str = "Start.Time";
/// Touch-out clock time, or the no-touch-out sentinel.
pub const END_TIME: &str = "End.Time";
/// Free-text description, `"<start> to <end>"` for rail journeys.
pub const JOURNEY_ACTION: &str = "Journey.Action";

pub const START_STATION: &str = "start_station";
pub const END_STATION: &str = "end_station";
pub const START_TIMESTAMP: &str = "start_timestamp";
pub const END_TIMESTAMP: &str = "end_timestamp";
/// Elapsed minutes between the two timestamps.
pub const DURATION: &str = "duration";

// =============================================================================
// Header Normalization
// =============================================================================

static HEADER_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._]").expect("valid header regex"));

/// Normalize a CSV header so that exports written with spaces or slashes
/// (`Start Time`, `Journey/Action`) line up with dotted ones (`Start.Time`).
pub fn normalize_header(header: &str) -> String {
    HEADER_PUNCTUATION
        .replace_all(header.trim(), ".")
        .into_owned()
}

// =============================================================================
// Column Access
// =============================================================================

/// Whether `df` has a column called `name`.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Read a column as owned strings, casting non-text columns first.
///
/// Fails with [`JourneyError::ColumnNotFound`] if the column is absent.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    if !has_column(df, name) {
        return Err(JourneyError::ColumnNotFound(name.to_string()));
    }

    let column = df.column(name)?.cast(&DataType::String)?;
    let series = column.as_materialized_series();
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Like [`string_values`], but an absent column reads as all nulls.
pub fn optional_string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    if has_column(df, name) {
        string_values(df, name)
    } else {
        Ok(vec![None; df.height()])
    }
}

/// Read a numeric column as `f64`, nulls preserved.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    if !has_column(df, name) {
        return Err(JourneyError::ColumnNotFound(name.to_string()));
    }

    let column = df.column(name)?.cast(&DataType::Float64)?;
    let series = column.as_materialized_series();
    Ok(series.f64()?.into_iter().collect())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Start Time"), "Start.Time");
        assert_eq!(normalize_header("Journey/Action"), "Journey.Action");
        assert_eq!(normalize_header("Start.Time"), "Start.Time");
        assert_eq!(normalize_header("  Date "), "Date");
        assert_eq!(normalize_header("Charge (GBP)"), "Charge..GBP.");
    }

    #[test]
    fn test_string_values_casts_numbers() {
        let df = df!("Zone" => &[1i64, 2]).unwrap();
        let values = string_values(&df, "Zone").unwrap();
        assert_eq!(values, vec![Some("1".to_string()), Some("2".to_string())]);
    }

    #[test]
    fn test_string_values_missing_column() {
        let df = df!("Date" => &["01-Jan-2020"]).unwrap();
        let err = string_values(&df, JOURNEY_ACTION).unwrap_err();
        assert!(matches!(err, JourneyError::ColumnNotFound(ref c) if c == JOURNEY_ACTION));
    }

    #[test]
    fn test_optional_string_values_absent_column_is_null() {
        let df = df!("Date" => &["01-Jan-2020", "02-Jan-2020"]).unwrap();
        assert_eq!(optional_string_values(&df, END_TIME).unwrap(), vec![None, None]);
    }
}
