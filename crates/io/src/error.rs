use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to open workbook: {0}")]
    Workbook(String),
    #[error("workbook contains no sheets")]
    EmptyWorkbook,
    #[error("sheet '{name}' not found (available: {available})")]
    SheetNotFound { name: String, available: String },
    #[error("missing column '{column}' (available: {available})")]
    MissingColumn { column: String, available: String },
    #[error("row {row}, column '{column}': cannot parse '{value}' as a number")]
    InvalidNumber { row: usize, column: String, value: String },
    #[error("row {row}: id {id} already used on row {first_row}")]
    DuplicateId { id: i64, row: usize, first_row: usize },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
