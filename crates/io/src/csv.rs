// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::IoError;
use crate::export::ResultRow;
use crate::table::{CellValue, Table};

pub fn import(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter, &sheet_name_for(path))
}

pub fn import_tsv(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t', &sheet_name_for(path))
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter, &sheet_name_for(path))
}

/// Delimited files have no sheet names; the file stem stands in for one.
fn sheet_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string())
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(content: &str, delimiter: u8, sheet_name: &str) -> Result<Table, IoError> {
    // Excel writes a BOM at the start of UTF-8 CSVs
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid: Vec<Vec<CellValue>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        grid.push(record.iter().map(CellValue::text).collect());
    }

    let table = Table::from_grid(sheet_name, grid);
    debug!(
        sheet = %table.sheet_name,
        delimiter = %(delimiter as char).escape_default(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "imported delimited file"
    );
    Ok(table)
}

pub fn export_results(rows: &[ResultRow], path: &Path, headers: [&str; 2]) -> Result<(), IoError> {
    export_results_with_delimiter(rows, path, headers, b',')
}

pub fn export_results_tsv(rows: &[ResultRow], path: &Path, headers: [&str; 2]) -> Result<(), IoError> {
    export_results_with_delimiter(rows, path, headers, b'\t')
}

fn export_results_with_delimiter(
    rows: &[ResultRow],
    path: &Path,
    headers: [&str; 2],
    delimiter: u8,
) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_path(path)?;

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record([row.ids.as_str(), row.weights.as_str()])?;
    }

    writer.flush().map_err(|e| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}
