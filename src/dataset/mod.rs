// Dataset module
// Spreadsheet loading, column normalization and row-to-document formatting

pub mod document;


use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use calamine::{Data, Reader, open_workbook_auto};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{RagError, Result};

pub use document::{Document, METADATA_FIELDS, row_to_text_and_metadata};

/// A single scalar cell after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Whether the cell carries a value worth indexing
    #[inline]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Number(n) => !n.is_nan(),
            Self::Text(s) => !s.trim().is_empty(),
        }
    }

    #[inline]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Number(n) if is_integral(*n) => serde_json::Value::from(*n as i64),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for CellValue {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if is_integral(*n) => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15
}

/// One row of the source dataset, identified by its position
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub row_index: usize,
    pub values: HashMap<String, CellValue>,
}

impl Record {
    #[inline]
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }
}

/// Which worksheet to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl FromStr for SheetSelector {
    type Err = std::convert::Infallible;

    #[inline]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(trimmed.parse::<usize>().map_or_else(
            |_| Self::Name(trimmed.to_string()),
            Self::Index,
        ))
    }
}

impl Default for SheetSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

/// Normalized tabular dataset: ordered columns and their records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    /// Load a worksheet from an xlsx/xls/xlsb/ods workbook; the first row is the header
    #[inline]
    pub fn load(path: &Path, sheet: &SheetSelector) -> Result<Self> {
        info!("Loading dataset from {}", path.display());

        let mut workbook = open_workbook_auto(path).map_err(|e| {
            RagError::Dataset(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = match sheet {
            SheetSelector::Index(index) => sheet_names.get(*index).cloned().ok_or_else(|| {
                RagError::Dataset(format!(
                    "Sheet index {} out of range ({} sheets)",
                    index,
                    sheet_names.len()
                ))
            })?,
            SheetSelector::Name(name) => {
                if !sheet_names.contains(name) {
                    return Err(RagError::Dataset(format!(
                        "Sheet '{}' not found. Available sheets: {:?}",
                        name, sheet_names
                    )));
                }
                name.clone()
            }
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| RagError::Dataset(format!("Failed to read sheet '{}': {}", sheet_name, e)))?;

        let mut rows = range.rows();
        let header = rows
            .next()
            .map(|cells| cells.iter().map(ToString::to_string).collect::<Vec<_>>())
            .unwrap_or_default();

        let body: Vec<Vec<CellValue>> = rows
            .map(|cells| cells.iter().map(cell_from_data).collect())
            .collect();

        let dataset = Self::from_rows(&header, body);
        info!(
            "Loaded {} rows with {} columns from sheet '{}'",
            dataset.records.len(),
            dataset.columns.len(),
            sheet_name
        );
        Ok(dataset)
    }

    /// Build a dataset from a raw header row and body rows.
    ///
    /// Column names are normalized, blank cells become empty text, fully blank
    /// rows are dropped and every column whose values all parse as numbers is
    /// coerced to numeric.
    #[inline]
    pub fn from_rows(header: &[String], rows: Vec<Vec<CellValue>>) -> Self {
        let columns = normalize_columns(header);
        let width = columns.len();

        let mut grid: Vec<Vec<CellValue>> = rows
            .into_iter()
            .filter(|row| row.iter().any(CellValue::is_present))
            .map(|mut row| {
                row.resize(width, CellValue::Text(String::new()));
                row
            })
            .collect();

        for column in 0..width {
            coerce_numeric_column(&mut grid, column);
        }

        let records = grid
            .into_iter()
            .enumerate()
            .map(|(row_index, row)| Record {
                row_index,
                values: columns.iter().cloned().zip(row).collect(),
            })
            .collect();

        debug!("Normalized columns: {:?}", columns);
        Self { columns, records }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lower-case, trim and replace spaces with underscores
#[inline]
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

fn normalize_columns(header: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::with_capacity(header.len());

    for (position, raw) in header.iter().enumerate() {
        let mut name = normalize_column_name(raw);
        if name.is_empty() {
            name = format!("column_{}", position);
        }

        let base = name.clone();
        let mut suffix = 1;
        while columns.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        columns.push(name);
    }

    columns
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Text(String::new()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

fn coerce_numeric_column(grid: &mut [Vec<CellValue>], column: usize) {
    let parsed: Option<Vec<f64>> = grid
        .iter()
        .map(|row| match &row[column] {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
        })
        .collect();

    if let Some(numbers) = parsed {
        for (row, number) in grid.iter_mut().zip(numbers) {
            row[column] = CellValue::Number(number);
        }
    }
}
