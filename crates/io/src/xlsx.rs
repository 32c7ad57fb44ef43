// Excel import/export (xlsx, xls, xlsb, ods via calamine; xlsx via rust_xlsxwriter)

use std::io::{Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use tracing::debug;

use crate::error::IoError;
use crate::export::ResultRow;
use crate::table::{CellValue, Table};

/// Import every sheet of a workbook, in workbook order.
pub fn import(path: &Path) -> Result<Vec<Table>, IoError> {
    let mut workbook = open(path)?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    if sheet_names.is_empty() {
        return Err(IoError::EmptyWorkbook);
    }

    sheet_names
        .iter()
        .map(|name| read_sheet(&mut workbook, name))
        .collect()
}

/// Import a single sheet by name.
pub fn import_sheet(path: &Path, sheet_name: &str) -> Result<Table, IoError> {
    let mut workbook = open(path)?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    if !sheet_names.iter().any(|name| name == sheet_name) {
        return Err(IoError::SheetNotFound {
            name: sheet_name.to_string(),
            available: sheet_names.join(", "),
        });
    }

    read_sheet(&mut workbook, sheet_name)
}

/// Import the first sheet of a workbook.
pub fn import_first(path: &Path) -> Result<Table, IoError> {
    let mut workbook = open(path)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IoError::EmptyWorkbook)?;
    read_sheet(&mut workbook, &first)
}

fn open(path: &Path) -> Result<Sheets<std::io::BufReader<std::fs::File>>, IoError> {
    open_workbook_auto(path)
        .map_err(|e| IoError::Workbook(format!("{}: {}", path.display(), e)))
}

fn read_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>, sheet_name: &str) -> Result<Table, IoError> {
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| IoError::Workbook(format!("failed to read sheet '{}': {}", sheet_name, e)))?;

    // Range starts at the first used cell; leading blank rows and columns are already gone
    let grid: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    let table = Table::from_grid(sheet_name, grid);
    debug!(
        sheet = %table.sheet_name,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "imported worksheet"
    );
    Ok(table)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Store error as text representation
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        // Serial date number, 1900 date system assumed
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s),
    }
}

/// Write match rows to a single-sheet xlsx workbook with a bold header row.
pub fn export_results(
    rows: &[ResultRow],
    path: &Path,
    sheet_name: &str,
    headers: [&str; 2],
) -> Result<(), IoError> {
    let write_err = |message: String| IoError::Write {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| write_err(format!("failed to create sheet '{}': {}", sheet_name, e)))?;

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| write_err(format!("failed to write header: {}", e)))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        worksheet
            .write_string(r, 0, row.ids.as_str())
            .and_then(|ws| ws.write_string(r, 1, row.weights.as_str()))
            .map_err(|e| write_err(format!("failed to write row {}: {}", r + 1, e)))?;
    }

    worksheet.autofit();

    workbook
        .save(path)
        .map_err(|e| write_err(format!("failed to save XLSX file: {}", e)))?;
    Ok(())
}
