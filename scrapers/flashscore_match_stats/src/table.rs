//! Exported CSV tables as polars frames.
//!
//! Every column is read as text and an empty field is null; typed columns
//! only appear once a cleaning stage casts them. Columns are addressed by
//! name and their order is the order they were first seen.

use std::{fs, io, path::Path};

use polars::prelude::*;

use crate::{error::TableError, types::MatchRecord, utils::format_number};

/// Frame of text columns; every row must have one cell per column.
pub fn from_rows<S: AsRef<str>>(columns: &[S], rows: Vec<Vec<Option<String>>>) -> Result<DataFrame, TableError> {
    let mut values: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(rows.len()); columns.len()];
    for (index, row) in rows.into_iter().enumerate() {
        if row.len() != columns.len() {
            return Err(TableError::RowLength {
                row: index,
                expected: columns.len(),
                found: row.len(),
            });
        }
        for (cell, column) in row.into_iter().zip(values.iter_mut()) {
            column.push(cell);
        }
    }

    let series: Vec<Column> = columns
        .iter()
        .zip(values)
        .map(|(name, cells)| Column::from(Series::new(name.as_ref().into(), cells)))
        .collect();
    Ok(DataFrame::new(series)?)
}

/// Materializes records into one frame over the union of their stat columns.
pub fn from_match_records(records: &[MatchRecord]) -> Result<DataFrame, TableError> {
    let mut columns: Vec<String> = ["season", "href", "score_home", "score_away", "halftime_home", "halftime_away"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    for record in records {
        for (column, _) in record.stat_columns() {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            let mut row = vec![
                Some(record.season.clone()),
                Some(record.href.clone()),
                record.score_home.clone(),
                record.score_away.clone(),
                record.halftime_home.clone(),
                record.halftime_away.clone(),
            ];
            row.resize(columns.len(), None);
            for (column, value) in record.stat_columns() {
                if let Some(index) = columns.iter().position(|c| *c == column) {
                    row[index] = Some(value.to_string());
                }
            }
            row
        })
        .collect();
    from_rows(&columns, rows)
}

/// Parses CSV text; a row whose field count differs from the header is an error.
pub fn from_reader<R: io::Read>(reader: R) -> Result<DataFrame, TableError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| if field.is_empty() { None } else { Some(field.to_string()) })
                .collect(),
        );
    }
    from_rows(&columns, rows)
}

pub fn read_csv(path: &Path) -> Result<DataFrame, TableError> {
    from_reader(fs::File::open(path)?)
}

pub fn to_writer<W: io::Write>(frame: &mut DataFrame, mut writer: W) -> Result<(), TableError> {
    CsvWriter::new(&mut writer).include_header(true).finish(frame)?;
    Ok(())
}

pub fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<(), TableError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    to_writer(frame, fs::File::create(path)?)
}

/// Row-wise outer union. Columns missing from a frame are null in its rows.
pub fn concat(frames: Vec<DataFrame>) -> Result<DataFrame, TableError> {
    if frames.is_empty() {
        return Ok(DataFrame::default());
    }
    let lazy: Vec<LazyFrame> = frames.into_iter().map(|frame| frame.lazy()).collect();
    Ok(concat_lf_diagonal(lazy, UnionArgs::default())?.collect()?)
}

pub fn column_names(frame: &DataFrame) -> Vec<String> {
    frame.get_column_names().into_iter().map(|name| name.to_string()).collect()
}

pub fn has_column(frame: &DataFrame, name: &str) -> bool {
    frame.column(name).is_ok()
}

/// New frame with only `names`, in that order.
pub fn select<S: AsRef<str>>(frame: &DataFrame, names: &[S]) -> Result<DataFrame, TableError> {
    if let Some(missing) = names.iter().find(|n| !has_column(frame, n.as_ref())) {
        return Err(TableError::MissingColumn(missing.as_ref().to_string()));
    }
    Ok(frame.select(names.iter().map(|n| n.as_ref().to_string()))?)
}

/// Drops the named columns; names that are absent are ignored.
pub fn drop_columns<S: AsRef<str>>(frame: &DataFrame, names: &[S]) -> Result<DataFrame, TableError> {
    let keep: Vec<String> = column_names(frame)
        .into_iter()
        .filter(|c| !names.iter().any(|n| n.as_ref() == c))
        .collect();
    Ok(frame.select(keep)?)
}

/// One cell rendered as it would be exported, `None` when null or absent.
pub fn cell(frame: &DataFrame, row: usize, column: &str) -> Option<String> {
    match frame.column(column).ok()?.get(row).ok()? {
        AnyValue::Null => None,
        AnyValue::String(value) => Some(value.to_string()),
        AnyValue::Float64(value) => Some(format_number(value)),
        AnyValue::Float32(value) => Some(format_number(value as f64)),
        other => Some(other.to_string()),
    }
}
