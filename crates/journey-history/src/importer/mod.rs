//! Single-file CSV import.
//!
//! Reads one journey history export into a [`DataFrame`], letting Polars infer
//! column types from content. Headers are normalized with
//! [`normalize_header`] so exports from different sources line up by name.

use crate::error::{JourneyError, Result};
use crate::utils::normalize_header;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Rows sampled by the CSV reader for type inference.
const INFER_SCHEMA_ROWS: usize = 1000;

/// Read the CSV file at `path`.
///
/// The first line is the header, row order is preserved and no index column
/// is added. A missing file, an unreadable file or a structural parse
/// failure is reported as [`JourneyError::Import`].
pub fn import_file(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(JourneyError::import(path, "file not found"));
    }

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| JourneyError::import(path, e))?
        .finish()
        .map_err(|e| JourneyError::import(path, e))?;

    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| normalize_header(name.as_str()))
        .collect();
    df.set_column_names(headers)
        .map_err(|e| JourneyError::import(path, e))?;

    debug!(
        "Imported {} ({} rows x {} columns)",
        path.display(),
        df.height(),
        df.width()
    );

    Ok(df)
}
