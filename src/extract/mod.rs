// src/extract/mod.rs

use calamine::{open_workbook, Data, Range, Reader, Xls, Xlsx};
use chrono::NaiveDateTime;
use std::path::Path;
use thiserror::Error;

use crate::discover::SheetFormat;

pub mod dates;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook has no sheets")]
    NoSheets,
}

/// One spreadsheet cell, reduced to what the pipeline cares about. Empty
/// cells and error cells both come through as `Missing` so the null check
/// treats them uniformly.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Date(NaiveDateTime),
    Number(f64),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Plain-text rendering for envelope interpolation. Integer-valued
    /// floats drop the trailing `.0` so facility codes and card numbers
    /// read back the way they were typed.
    pub fn render_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Date(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Number(n) => render_number(*n),
            Value::Missing => String::new(),
        }
    }

    fn from_cell(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => Value::Missing,
            Data::String(s) => Value::Text(s.clone()),
            Data::Float(f) => Value::Number(*f),
            Data::Int(i) => Value::Number(*i as f64),
            Data::Bool(b) => Value::Text(b.to_string()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(naive) => Value::Date(naive),
                None => Value::Missing,
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        }
    }
}

fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Row-oriented view of a sheet: header-derived column names plus every data
/// row, each padded to the header width. Row index `i` corresponds to
/// spreadsheet line `i + 2` (header row plus 1-based display).
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    pub fn from_range(range: &Range<Data>) -> Self {
        let mut rows_iter = range.rows();
        let headers: Vec<String> = rows_iter
            .next()
            .map(|cells| cells.iter().map(|c| c.to_string().trim().to_string()).collect())
            .unwrap_or_default();
        let width = headers.len();

        let rows = rows_iter
            .map(|cells| {
                let mut row: Vec<Value> =
                    cells.iter().take(width).map(Value::from_cell).collect();
                row.resize(width, Value::Missing);
                row
            })
            .collect();

        RawTable { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Required column names absent from the header, sorted for stable
    /// log output.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        let mut missing: Vec<String> = required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| (*name).to_string())
            .collect();
        missing.sort_unstable();
        missing
    }

    /// Required fields that are null in `row`, sorted for stable log output.
    /// A column absent from the header also counts as null here.
    pub fn null_fields(&self, row: &[Value], required: &[&str]) -> Vec<String> {
        let mut nulls: Vec<String> = required
            .iter()
            .filter(|name| match self.column_index(name) {
                Some(idx) => row.get(idx).is_none_or(Value::is_missing),
                None => true,
            })
            .map(|name| (*name).to_string())
            .collect();
        nulls.sort_unstable();
        nulls
    }
}

/// Load the first sheet of the workbook at `path` into a `RawTable`.
pub fn load_table(path: &Path, format: SheetFormat) -> Result<RawTable, ExtractError> {
    let range = first_sheet_range(path, format)?;
    Ok(RawTable::from_range(&range))
}

fn first_sheet_range(path: &Path, format: SheetFormat) -> Result<Range<Data>, ExtractError> {
    match format {
        SheetFormat::Xlsx => {
            let mut workbook: Xlsx<_> = open_workbook(path).map_err(calamine::Error::from)?;
            workbook
                .worksheet_range_at(0)
                .ok_or(ExtractError::NoSheets)?
                .map_err(calamine::Error::from)
                .map_err(ExtractError::from)
        }
        SheetFormat::Xls => {
            let mut workbook: Xls<_> = open_workbook(path).map_err(calamine::Error::from)?;
            workbook
                .worksheet_range_at(0)
                .ok_or(ExtractError::NoSheets)?
                .map_err(calamine::Error::from)
                .map_err(ExtractError::from)
        }
    }
}
