//! `countmate-io` — reading weighted records from spreadsheets and writing
//! matched groups back out.
//!
//! Input: CSV/TSV (delimiter sniffed) and any workbook calamine opens.
//! Output: CSV/TSV, xlsx, JSON. The format is chosen by file extension.

pub mod csv;
pub mod error;
pub mod export;
pub mod json;
pub mod records;
pub mod table;
pub mod xlsx;

use std::path::Path;

use countmate_matcher::MatchResult;
use tracing::info;

pub use error::IoError;
pub use export::{ExportOptions, ResultRow, DEFAULT_HEADERS, DEFAULT_OUTPUT_FILE, DEFAULT_SHEET_NAME};
pub use records::{records_from_table, ColumnMapping};
pub use table::{CellValue, Table, TableInfo, TableRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Tsv,
    Workbook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Xlsx,
    Json,
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        match extension(path).as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Workbook),
            other => Err(IoError::UnsupportedFormat(unsupported(path, other))),
        }
    }
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        match extension(path).as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "xlsx" => Ok(Self::Xlsx),
            "json" => Ok(Self::Json),
            other => Err(IoError::UnsupportedFormat(unsupported(path, other))),
        }
    }
}

fn unsupported(path: &Path, ext: &str) -> String {
    if ext.is_empty() {
        format!("{} (no file extension)", path.display())
    } else {
        format!("{} (.{})", path.display(), ext)
    }
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Every table in the file: one per workbook sheet, or one for a delimited file.
pub fn import_tables(path: &Path) -> Result<Vec<Table>, IoError> {
    let tables = match InputFormat::from_path(path)? {
        InputFormat::Csv => vec![csv::import(path)?],
        InputFormat::Tsv => vec![csv::import_tsv(path)?],
        InputFormat::Workbook => xlsx::import(path)?,
    };
    info!(
        path = %path.display(),
        tables = tables.len(),
        rows = tables.iter().map(|t| t.rows.len()).sum::<usize>(),
        "imported"
    );
    Ok(tables)
}

/// One table: the named sheet, or the first sheet when `sheet` is `None`.
/// Delimited files ignore `sheet`.
pub fn import_table(path: &Path, sheet: Option<&str>) -> Result<Table, IoError> {
    let table = match (InputFormat::from_path(path)?, sheet) {
        (InputFormat::Csv, _) => csv::import(path)?,
        (InputFormat::Tsv, _) => csv::import_tsv(path)?,
        (InputFormat::Workbook, Some(name)) => xlsx::import_sheet(path, name)?,
        (InputFormat::Workbook, None) => xlsx::import_first(path)?,
    };
    info!(
        path = %path.display(),
        sheet = %table.sheet_name,
        rows = table.rows.len(),
        "imported"
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write groups in the format named by `path`'s extension.
pub fn export_results(results: &[MatchResult], path: &Path, options: &ExportOptions) -> Result<OutputFormat, IoError> {
    let format = OutputFormat::from_path(path)?;
    let rows = export::result_rows(results);

    match format {
        OutputFormat::Csv => csv::export_results(&rows, path, options.header_refs())?,
        OutputFormat::Tsv => csv::export_results_tsv(&rows, path, options.header_refs())?,
        OutputFormat::Xlsx => xlsx::export_results(&rows, path, &options.sheet_name, options.header_refs())?,
        OutputFormat::Json => json::export_results(results, path)?,
    }

    info!(path = %path.display(), groups = results.len(), ?format, "exported");
    Ok(format)
}
