//! Journey History Library
//!
//! Loads transit smart-card journey-history exports (CSV) into one table,
//! extracts the rail journeys with their stations, timestamps and durations,
//! and answers station-pair queries with an optional duration histogram.
//!
//! # Overview
//!
//! - **Import**: [`import_file`] reads one CSV export, normalizing headers
//!   (`Journey/Action` becomes `Journey.Action`)
//! - **Corpus**: [`load_corpus`] finds every `*<pattern>*.csv` in a folder and
//!   merges them by column name, filling absent columns with nulls
//! - **Classification**: [`extract_rail_journeys`] keeps `"A to B"` journeys and
//!   derives `start_station`, `end_station`, `start_timestamp`,
//!   `end_timestamp` and `duration` (minutes)
//! - **Query**: [`query_journeys`] filters by start/end station patterns and can
//!   plot a duration histogram through a [`DurationVisualizer`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use journey_history::{CorpusConfig, QueryOptions, analyze, query_journeys};
//!
//! // data/*journeys*.csv, deduplicated
//! let journeys = analyze()?;
//!
//! let commute = query_journeys(
//!     &journeys,
//!     "Bank",
//!     "Waterloo",
//!     QueryOptions::default().plot(true),
//! )?;
//! println!("{commute}");
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use journey_history::{ClassifierConfig, CorpusConfig, analyze_with};
//!
//! let corpus = CorpusConfig::builder()
//!     .folder("exports/2020")
//!     .pattern("history")
//!     .deduplicate(false)
//!     .build()?;
//!
//! let journeys = analyze_with(&corpus, &ClassifierConfig { strict_split: false })?;
//! ```

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod importer;
pub mod query;
pub mod reporting;
pub mod utils;
pub mod visualizer;

// Re-exports for convenient access
pub use classifier::{TouchTime, extract_rail_journeys, extract_rail_journeys_with};
pub use config::{
    ClassifierConfig, ConfigValidationError, CorpusConfig, CorpusConfigBuilder, QueryOptions,
};
pub use corpus::{discover_files, load_corpus};
pub use error::{JourneyError, Result as JourneyResult, ResultExt};
pub use importer::import_file;
pub use query::{distinct_stations, query_journeys, query_journeys_with};
pub use reporting::{DurationStats, JourneySummary};
pub use visualizer::{DEFAULT_BIN_WIDTH, DurationVisualizer, Histogram, TextHistogram};

use polars::prelude::DataFrame;
use tracing::info;

/// Load the default corpus (`data/`, files matching `journeys`) and extract
/// its rail journeys.
pub fn analyze() -> JourneyResult<DataFrame> {
    analyze_with(&CorpusConfig::default(), &ClassifierConfig::default())
}

/// Load the corpus described by `corpus` and extract its rail journeys.
pub fn analyze_with(
    corpus: &CorpusConfig,
    classifier: &ClassifierConfig,
) -> JourneyResult<DataFrame> {
    info!(
        "Analyzing journey history in {} (pattern '{}')",
        corpus.folder.display(),
        corpus.pattern
    );
    let raw = load_corpus(corpus)?;
    extract_rail_journeys_with(&raw, classifier)
}
