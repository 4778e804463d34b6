//! Rail journey classification and enrichment.
//!
//! Turns the raw corpus into one row per rail journey:
//!
//! 1. keep rows whose `Journey.Action` names two stations (`"A to B"`),
//! 2. split the description into `start_station` / `end_station`,
//! 3. combine `Date` with `Start.Time` / `End.Time` into timestamps,
//! 4. derive `duration` in minutes.
//!
//! Incomplete journeys (no touch-out) are kept with null end timestamp and
//! duration. Source columns are carried through unchanged.

mod stations;
mod timestamps;

pub use stations::{RAIL_DELIMITER, is_rail_journey, split_stations};
pub use timestamps::{
    DATE_FORMAT, NO_TOUCH_OUT, TIME_FORMAT, TouchTime, duration_minutes, journey_timestamp,
    parse_travel_date,
};

use crate::config::ClassifierConfig;
use crate::error::{JourneyError, Result};
use crate::utils::{
    DATE, DURATION, END_STATION, END_TIME, END_TIMESTAMP, JOURNEY_ACTION, START_STATION,
    START_TIME, START_TIMESTAMP, optional_string_values, string_values,
};
use chrono::NaiveDateTime;
use polars::prelude::*;
use tracing::{debug, info};

/// Extract rail journeys with the default [`ClassifierConfig`].
pub fn extract_rail_journeys(df: &DataFrame) -> Result<DataFrame> {
    extract_rail_journeys_with(df, &ClassifierConfig::default())
}

/// Extract and enrich the rail journeys of `df`.
///
/// Fails with [`JourneyError::ColumnNotFound`] if `Journey.Action` is absent
/// and, under [`ClassifierConfig::strict_split`], with
/// [`JourneyError::Classification`] for a description that does not split
/// into exactly two station names. Missing `Date` or time columns only
/// produce null timestamps.
pub fn extract_rail_journeys_with(df: &DataFrame, config: &ClassifierConfig) -> Result<DataFrame> {
    let actions = string_values(df, JOURNEY_ACTION)?;

    let mut starts = Vec::new();
    let mut ends = Vec::new();
    let mut keep = Vec::with_capacity(actions.len());

    for (row, action) in actions.iter().enumerate() {
        let Some(action) = action.as_deref().filter(|a| is_rail_journey(a)) else {
            keep.push(false);
            continue;
        };

        let (start, end) = split_stations(action, config.strict_split).ok_or_else(|| {
            JourneyError::Classification {
                row,
                action: action.to_string(),
            }
        })?;
        starts.push(start.to_string());
        ends.push(end.to_string());
        keep.push(true);
    }

    let mask: BooleanChunked = keep.into_iter().collect();
    let mut journeys = df.filter(&mask)?;
    debug!(
        "Kept {} of {} rows as rail journeys",
        journeys.height(),
        df.height()
    );

    let (start_timestamps, end_timestamps) = derive_timestamps(&journeys)?;
    let durations: Vec<Option<f64>> = start_timestamps
        .iter()
        .zip(&end_timestamps)
        .map(|(start, end)| duration_minutes(*start, *end))
        .collect();

    let incomplete = end_timestamps.iter().filter(|ts| ts.is_none()).count();

    journeys.with_column(Series::new(START_STATION.into(), starts))?;
    journeys.with_column(Series::new(END_STATION.into(), ends))?;
    journeys.with_column(Series::new(START_TIMESTAMP.into(), start_timestamps))?;
    journeys.with_column(Series::new(END_TIMESTAMP.into(), end_timestamps))?;
    journeys.with_column(Series::new(DURATION.into(), durations))?;

    info!(
        "Extracted {} rail journeys ({} without an end time)",
        journeys.height(),
        incomplete
    );

    Ok(journeys)
}

type Timestamps = Vec<Option<NaiveDateTime>>;

fn derive_timestamps(journeys: &DataFrame) -> Result<(Timestamps, Timestamps)> {
    let dates = optional_string_values(journeys, DATE)?;
    let start_times = optional_string_values(journeys, START_TIME)?;
    let end_times = optional_string_values(journeys, END_TIME)?;

    let mut starts = Vec::with_capacity(dates.len());
    let mut ends = Vec::with_capacity(dates.len());

    for ((date, start), end) in dates.iter().zip(&start_times).zip(&end_times) {
        let date = parse_travel_date(date.as_deref());
        starts.push(journey_timestamp(date, TouchTime::parse(start.as_deref())));
        ends.push(journey_timestamp(date, TouchTime::parse(end.as_deref())));
    }

    Ok((starts, ends))
}
