//! Corpus loading: discover every export in a folder and merge them.
//!
//! The merged corpus has one column per distinct (normalized) header across
//! all files. Rows from a file that lacks a column hold null there.

mod merge;

use crate::config::CorpusConfig;
use crate::error::{JourneyError, Result, ResultExt};
use crate::importer::import_file;
use polars::prelude::*;
use std::path::PathBuf;
use tracing::info;

/// List the exports in `config.folder` whose file name contains
/// `config.pattern` and ends in `.csv`, sorted by file name.
///
/// Only the folder itself is scanned, not its subfolders. An unreadable
/// folder is an [`JourneyError::Import`] failure; an empty result is not an
/// error here.
pub fn discover_files(config: &CorpusConfig) -> Result<Vec<PathBuf>> {
    let folder = &config.folder;
    if !folder.is_dir() {
        return Err(JourneyError::import(folder, "folder not found"));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| JourneyError::import(folder, e))?;
        if !entry.path().is_file() {
            continue;
        }

        let matches = entry
            .file_name()
            .to_str()
            .and_then(|name| name.strip_suffix(".csv"))
            .is_some_and(|stem| stem.contains(config.pattern.as_str()));

        if matches {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Import every export matched by `config` and merge them into one table.
///
/// Fails with [`JourneyError::NoFilesFound`] when nothing matches, and with
/// the first import failure otherwise; no partial corpus is returned.
/// With `config.deduplicate` set, rows that agree on every column their two
/// files share are collapsed to their first occurrence.
pub fn load_corpus(config: &CorpusConfig) -> Result<DataFrame> {
    config.validate()?;

    let files = discover_files(config)?;
    if files.is_empty() {
        return Err(JourneyError::NoFilesFound {
            folder: config.folder.clone(),
            pattern: config.pattern.clone(),
        });
    }

    info!(
        "Loading {} journey file(s): {:?}",
        files.len(),
        files.iter().map(|p| p.display().to_string()).collect::<Vec<_>>()
    );

    let frames = files
        .iter()
        .map(import_file)
        .collect::<Result<Vec<_>>>()?;
    let source_rows: usize = frames.iter().map(DataFrame::height).sum();

    let merged = merge::union_frames(frames).context("While merging journey files")?;
    let corpus = if config.deduplicate {
        merged.deduplicate()?
    } else {
        merged.into_frame()
    };

    info!(
        "Corpus loaded: {} rows x {} columns ({} source rows)",
        corpus.height(),
        corpus.width(),
        source_rows
    );

    Ok(corpus)
}
