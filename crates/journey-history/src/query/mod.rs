//! Filtering enriched journeys by station.
//!
//! Station patterns are regular expressions matched anywhere in the station
//! name, so a plain name such as `"Bank"` behaves as a case-sensitive
//! substring match.

use crate::config::QueryOptions;
use crate::error::{JourneyError, Result};
use crate::utils::{END_STATION, START_STATION, string_values};
use crate::visualizer::{DurationVisualizer, TextHistogram};
use polars::prelude::*;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Journeys from stations matching `start_pattern` to stations matching
/// `end_pattern`.
///
/// With `options.plot` set, a duration histogram is printed to stdout.
/// See [`query_journeys_with`].
pub fn query_journeys(
    df: &DataFrame,
    start_pattern: &str,
    end_pattern: &str,
    options: QueryOptions,
) -> Result<DataFrame> {
    query_journeys_with(df, start_pattern, end_pattern, options, &TextHistogram::stdout())
}

/// Like [`query_journeys`], rendering plots through `visualizer`.
///
/// Rows are kept when both station names match. Unless `options.quiet` is
/// set, the distinct start and end stations of the result are logged so the
/// caller can check how broad the patterns were. No match is not an error:
/// the result is an empty table with the input's columns.
pub fn query_journeys_with(
    df: &DataFrame,
    start_pattern: &str,
    end_pattern: &str,
    options: QueryOptions,
    visualizer: &dyn DurationVisualizer,
) -> Result<DataFrame> {
    let start_regex = compile(start_pattern)?;
    let end_regex = compile(end_pattern)?;

    let starts = string_values(df, START_STATION)?;
    let ends = string_values(df, END_STATION)?;

    let mask: BooleanChunked = starts
        .iter()
        .zip(&ends)
        .map(|(start, end)| {
            start.as_deref().is_some_and(|s| start_regex.is_match(s))
                && end.as_deref().is_some_and(|e| end_regex.is_match(e))
        })
        .collect();
    let matched = df.filter(&mask)?;

    if matched.height() == 0 {
        warn!(
            "No journeys from '{}' to '{}'",
            start_pattern, end_pattern
        );
    }

    if !options.quiet {
        let (start_stations, end_stations) = distinct_stations(&matched)?;
        info!(
            "{} journeys matched; start stations: {:?}; end stations: {:?}",
            matched.height(),
            start_stations,
            end_stations
        );
    }

    if options.plot {
        visualizer.render(&matched, &plot_title(start_pattern, end_pattern))?;
    }

    Ok(matched)
}

/// Sorted distinct `start_station` and `end_station` values of `df`.
pub fn distinct_stations(df: &DataFrame) -> Result<(Vec<String>, Vec<String>)> {
    let collect = |name: &str| -> Result<Vec<String>> {
        let set: BTreeSet<String> = string_values(df, name)?.into_iter().flatten().collect();
        Ok(set.into_iter().collect())
    };
    Ok((collect(START_STATION)?, collect(END_STATION)?))
}

/// Histogram title for a station-pair query.
pub fn plot_title(start_pattern: &str, end_pattern: &str) -> String {
    format!("{start_pattern} to {end_pattern}")
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| JourneyError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::f64_values;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingVisualizer {
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl DurationVisualizer for RecordingVisualizer {
        fn render(&self, df: &DataFrame, title: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((title.to_string(), df.height()));
            Ok(())
        }
    }

    fn journeys() -> DataFrame {
        df!(
            "start_station" => &["Bank", "Waterloo", "Bank", "Canary Wharf"],
            "end_station" => &["Waterloo", "Bank", "Waterloo East", "Waterloo"],
            "duration" => &[Some(20.0), None, Some(31.0), Some(18.0)]
        )
        .unwrap()
    }

    #[test]
    fn test_filters_on_both_stations() {
        let matched =
            query_journeys(&journeys(), "Bank", "Waterloo", QueryOptions::default()).unwrap();

        assert_eq!(matched.height(), 2);
        let (starts, ends) = distinct_stations(&matched).unwrap();
        assert_eq!(starts, vec!["Bank".to_string()]);
        assert_eq!(ends, vec!["Waterloo".to_string(), "Waterloo East".to_string()]);
    }

    #[test]
    fn test_patterns_are_regular_expressions() {
        let matched =
            query_journeys(&journeys(), "^Bank$|^Canary", "^Waterloo$", QueryOptions::default())
                .unwrap();
        assert_eq!(
            f64_values(&matched, "duration").unwrap(),
            vec![Some(20.0), Some(18.0)]
        );
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let matched =
            query_journeys(&journeys(), "bank", "Waterloo", QueryOptions::default()).unwrap();
        assert_eq!(matched.height(), 0);
        assert_eq!(matched.width(), 3);
    }

    #[test]
    fn test_query_is_idempotent() {
        let df = journeys();
        let options = QueryOptions::default().quiet(true);
        let first = query_journeys(&df, "Bank", "Water", options).unwrap();
        let second = query_journeys(&df, "Bank", "Water", options).unwrap();
        assert!(first.equals_missing(&second));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = query_journeys(&journeys(), "(", "Bank", QueryOptions::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PATTERN");
    }

    #[test]
    fn test_plot_invokes_visualizer_with_title() {
        let visualizer = RecordingVisualizer::default();
        let options = QueryOptions::default().quiet(true).plot(true);

        query_journeys_with(&journeys(), "Bank", "Waterloo", options, &visualizer).unwrap();

        let calls = visualizer.calls.lock().unwrap();
        assert_eq!(*calls, vec![("Bank to Waterloo".to_string(), 2)]);
    }

    #[test]
    fn test_no_plot_by_default() {
        let visualizer = RecordingVisualizer::default();
        query_journeys_with(
            &journeys(),
            "Bank",
            "Waterloo",
            QueryOptions::default(),
            &visualizer,
        )
        .unwrap();
        assert!(visualizer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_requires_enriched_table() {
        let raw = df!("Journey.Action" => &["Bank to Waterloo"]).unwrap();
        assert!(matches!(
            query_journeys(&raw, "Bank", "Waterloo", QueryOptions::default()),
            Err(JourneyError::ColumnNotFound(_))
        ));
    }
}
