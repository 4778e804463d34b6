//! Summaries of enriched journey tables.
//!
//! [`JourneySummary`] is what the CLI prints after a query, either as text or
//! as JSON (`--json`).

use crate::error::Result;
use crate::query::distinct_stations;
use crate::utils::{DURATION, END_TIMESTAMP, START_TIMESTAMP, f64_values};
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format of the first/last journey timestamps in a summary.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Statistics over the non-null durations of a table, in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl DurationStats {
    /// `None` when there are no durations.
    pub fn from_values(values: &[Option<f64>]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        Some(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean,
            median,
        })
    }
}

/// Overview of a table produced by [`crate::extract_rail_journeys`] or
/// [`crate::query_journeys`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneySummary {
    pub journeys: usize,
    /// Journeys without an end timestamp (no touch-out, or unreadable times).
    pub incomplete_journeys: usize,
    pub start_stations: Vec<String>,
    pub end_stations: Vec<String>,
    pub duration: Option<DurationStats>,
    pub first_journey: Option<String>,
    pub last_journey: Option<String>,
}

impl JourneySummary {
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let (start_stations, end_stations) = distinct_stations(df)?;
        let starts = timestamp_values(df, START_TIMESTAMP)?;
        let incomplete_journeys = timestamp_values(df, END_TIMESTAMP)?
            .iter()
            .filter(|ts| ts.is_none())
            .count();

        let format = |ts: NaiveDateTime| ts.format(TIMESTAMP_FORMAT).to_string();

        Ok(Self {
            journeys: df.height(),
            incomplete_journeys,
            start_stations,
            end_stations,
            duration: DurationStats::from_values(&f64_values(df, DURATION)?),
            first_journey: starts.iter().flatten().min().copied().map(format),
            last_journey: starts.iter().flatten().max().copied().map(format),
        })
    }
}

impl JourneySummary {
    /// Pretty-printed JSON, as written by the CLI's `--json`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for JourneySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Journeys: {} ({} incomplete)",
            self.journeys, self.incomplete_journeys
        )?;
        if let (Some(first), Some(last)) = (&self.first_journey, &self.last_journey) {
            writeln!(f, "Period: {first} -> {last}")?;
        }
        writeln!(f, "Start stations: {}", self.start_stations.join(", "))?;
        writeln!(f, "End stations: {}", self.end_stations.join(", "))?;
        match &self.duration {
            Some(stats) => write!(
                f,
                "Duration (min): mean {:.1}, median {:.1}, min {:.1}, max {:.1} over {} journeys",
                stats.mean, stats.median, stats.min, stats.max, stats.count
            ),
            None => write!(f, "Duration: no complete journeys"),
        }
    }
}

/// Read a `Datetime` column back into chrono values.
fn timestamp_values(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    let column = df.column(name)?;
    let per_milli = match column.dtype() {
        DataType::Datetime(TimeUnit::Nanoseconds, _) => 1_000_000,
        DataType::Datetime(TimeUnit::Microseconds, _) => 1_000,
        _ => 1,
    };

    let raw = column.cast(&DataType::Int64)?;
    let series = raw.as_materialized_series();
    Ok(series
        .i64()?
        .into_iter()
        .map(|value| {
            value
                .and_then(|v| DateTime::from_timestamp_millis(v / per_milli))
                .map(|dt| dt.naive_utc())
        })
        .collect())
}
