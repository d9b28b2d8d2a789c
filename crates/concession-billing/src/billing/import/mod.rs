//! Loading billing snapshots from JSON exports and charge rows from CSV exports.

mod parser;

use std::io::Read;
use std::path::Path;

use super::charge::ChargeRecord;
use super::snapshot::BillingSnapshot;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Row(RowError),
}

/// Defect in one CSV row, or in the CSV framing itself.
#[derive(Debug)]
pub enum RowError {
    Csv(csv::Error),
    Value {
        line: u64,
        column: &'static str,
        message: String,
    },
}

impl RowError {
    fn csv(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read billing export: {}", err),
            ImportError::Json(err) => write!(f, "invalid billing snapshot JSON: {}", err),
            ImportError::Row(err) => write!(f, "invalid charge CSV data: {}", err),
        }
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::Csv(err) => write!(f, "{}", err),
            RowError::Value {
                line,
                column,
                message,
            } => write!(f, "line {line}, column {column}: {message}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Json(err) => Some(err),
            ImportError::Row(err) => Some(err),
        }
    }
}

impl std::error::Error for RowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RowError::Csv(err) => Some(err),
            RowError::Value { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<RowError> for ImportError {
    fn from(err: RowError) -> Self {
        Self::Row(err)
    }
}

pub struct SnapshotImporter;

impl SnapshotImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<BillingSnapshot, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<BillingSnapshot, ImportError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn charges_from_csv_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ChargeRecord>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::charges_from_csv_reader(file)
    }

    /// One row per charge with every parameter column present; empty cells are absent values.
    pub fn charges_from_csv_reader<R: Read>(reader: R) -> Result<Vec<ChargeRecord>, ImportError> {
        Ok(parser::parse_charge_rows(reader)?)
    }
}
