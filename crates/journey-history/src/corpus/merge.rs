//! Outer union of imported tables, aligned by column name.

use crate::error::Result;
use crate::utils::string_values;
use polars::prelude::*;
use polars_core::utils::try_get_supertype;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Imported tables stacked into one, remembering which file each row came
/// from and which columns that file actually had.
pub(crate) struct MergedFrames {
    frame: DataFrame,
    /// Source file index of every row.
    origins: Vec<usize>,
    /// Column names present in each source file.
    layouts: Vec<HashSet<String>>,
}

/// Stack `frames` into one table whose columns are the union of theirs.
///
/// Columns keep the order in which they are first seen. A frame lacking a
/// column contributes nulls for it. When frames disagree on a column's type,
/// numeric types widen to their common supertype and any other mix becomes
/// `String`. An entirely-null column takes the type of the frames that
/// actually hold values.
pub(crate) fn union_frames(frames: Vec<DataFrame>) -> Result<MergedFrames> {
    let schema = union_schema(&frames);
    let names: Vec<String> = schema.iter().map(|(name, _)| name.clone()).collect();

    let layouts: Vec<HashSet<String>> = frames
        .iter()
        .map(|frame| {
            frame
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect()
        })
        .collect();
    let origins: Vec<usize> = frames
        .iter()
        .enumerate()
        .flat_map(|(index, frame)| std::iter::repeat_n(index, frame.height()))
        .collect();

    let mut frames = frames.into_iter();
    let Some(first) = frames.next() else {
        return Ok(MergedFrames {
            frame: DataFrame::empty(),
            origins,
            layouts,
        });
    };

    let mut merged = align_frame(first, &schema)?.select(names.clone())?;
    for frame in frames {
        let aligned = align_frame(frame, &schema)?.select(names.clone())?;
        merged.vstack_mut(&aligned)?;
    }

    Ok(MergedFrames {
        frame: merged,
        origins,
        layouts,
    })
}

impl MergedFrames {
    /// The stacked table, duplicates included.
    pub(crate) fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Collapse rows that agree on every column their two source files share,
    /// keeping the first occurrence in place.
    ///
    /// Rows of one file share all their columns, so within a file only exact
    /// duplicates collapse. Across files, a column one of the files lacks does
    /// not keep two rows apart; nulls of the kept row are filled from the
    /// dropped duplicate instead. Files with no column in common never
    /// collapse each other's rows.
    pub(crate) fn deduplicate(self) -> Result<DataFrame> {
        let frame = self.frame;
        if frame.width() == 0 {
            return Ok(frame);
        }

        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let values = names
            .iter()
            .map(|name| string_values(&frame, name))
            .collect::<Result<Vec<_>>>()?;

        // shared[s][t]: positions of the columns both file s and file t have
        let sources = self.layouts.len();
        let shared: Vec<Vec<Vec<usize>>> = (0..sources)
            .map(|s| {
                (0..sources)
                    .map(|t| {
                        names
                            .iter()
                            .enumerate()
                            .filter(|(_, name)| {
                                self.layouts[s].contains(*name) && self.layouts[t].contains(*name)
                            })
                            .map(|(position, _)| position)
                            .collect()
                    })
                    .collect()
            })
            .collect();

        // (kept row's file, other file, kept row's values on their shared
        // columns) -> position of the kept row in the output
        let mut seen: HashMap<(usize, usize, Vec<Option<&str>>), usize> = HashMap::new();
        // picks[c][k]: input row supplying column c of output row k
        let mut picks: Vec<Vec<IdxSize>> = vec![Vec::new(); names.len()];
        let mut kept = 0;

        for (row, &origin) in self.origins.iter().enumerate() {
            let earlier = (0..sources)
                .filter(|&s| !shared[s][origin].is_empty())
                .filter_map(|s| {
                    let key = row_key(&values, row, &shared[s][origin]);
                    seen.get(&(s, origin, key))
                })
                .min()
                .copied();

            match earlier {
                Some(position) => {
                    for (column, pick) in values.iter().zip(picks.iter_mut()) {
                        let current = pick[position] as usize;
                        if column[current].is_none() && column[row].is_some() {
                            pick[position] = row as IdxSize;
                        }
                    }
                }
                None => {
                    for other in 0..sources {
                        if !shared[origin][other].is_empty() {
                            let key = row_key(&values, row, &shared[origin][other]);
                            seen.entry((origin, other, key)).or_insert(kept);
                        }
                    }
                    for pick in picks.iter_mut() {
                        pick.push(row as IdxSize);
                    }
                    kept += 1;
                }
            }
        }

        let removed = frame.height() - kept;
        if removed > 0 {
            debug!("Collapsed {} duplicate rows", removed);
        }

        let columns = frame
            .get_columns()
            .iter()
            .zip(picks)
            .map(|(column, pick)| column.take(&IdxCa::from_vec(column.name().clone(), pick)))
            .collect::<PolarsResult<Vec<_>>>()?;
        Ok(DataFrame::new(columns)?)
    }
}

/// Values of `row` in the given column positions.
fn row_key<'a>(
    values: &'a [Vec<Option<String>>],
    row: usize,
    columns: &[usize],
) -> Vec<Option<&'a str>> {
    columns.iter().map(|&c| values[c][row].as_deref()).collect()
}

fn is_number(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Common type of the dtypes a column takes across files.
fn reconcile(name: &str, dtypes: &[DataType]) -> Option<DataType> {
    let (first, rest) = dtypes.split_first()?;
    if rest.is_empty() {
        return Some(first.clone());
    }

    if dtypes.iter().all(is_number) {
        let widened = rest
            .iter()
            .try_fold(first.clone(), |acc, dtype| try_get_supertype(&acc, dtype));
        if let Ok(dtype) = widened {
            debug!("Column '{}' has types {:?}, widening to {}", name, dtypes, dtype);
            return Some(dtype);
        }
    }

    debug!("Column '{}' has mixed types {:?}, reading as text", name, dtypes);
    Some(DataType::String)
}

fn union_schema(frames: &[DataFrame]) -> Vec<(String, DataType)> {
    // (name, first seen dtype, dtypes of columns holding at least one value)
    let mut seen: Vec<(String, DataType, Vec<DataType>)> = Vec::new();

    for frame in frames {
        for column in frame.get_columns() {
            let name = column.name().to_string();
            let index = match seen.iter().position(|(n, _, _)| *n == name) {
                Some(index) => index,
                None => {
                    seen.push((name, column.dtype().clone(), Vec::new()));
                    seen.len() - 1
                }
            };

            let holds_values = column.null_count() < column.len();
            let informative = &mut seen[index].2;
            if holds_values && !informative.contains(column.dtype()) {
                informative.push(column.dtype().clone());
            }
        }
    }

    seen.into_iter()
        .map(|(name, first, informative)| {
            let dtype = reconcile(&name, &informative).unwrap_or(first);
            (name, dtype)
        })
        .collect()
}

fn align_frame(mut frame: DataFrame, schema: &[(String, DataType)]) -> Result<DataFrame> {
    let height = frame.height();

    for (name, dtype) in schema {
        let existing = frame
            .get_columns()
            .iter()
            .find(|c| c.name().as_str() == name.as_str())
            .map(|c| c.dtype().clone());

        match existing {
            Some(current) if current == *dtype => {}
            Some(_) => {
                let cast = frame.column(name)?.cast(dtype)?;
                frame.with_column(cast)?;
            }
            None => {
                frame.with_column(Series::full_null(name.as_str().into(), height, dtype))?;
            }
        }
    }

    Ok(frame)
}
