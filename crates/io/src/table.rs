// Tabular data as read from a sheet or delimited file.
// First row is the header row; everything below it is data.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    /// Text cells keep their content verbatim; empty strings become `Empty`.
    pub fn text(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell. Text is parsed after trimming whitespace.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Empty | Self::Bool(_) => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Bool(b) => if *b { "TRUE".into() } else { "FALSE".into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// 1-based row number counted from the header row (header = 1), so the
    /// first data row is 2 even when blank rows were dropped above it.
    pub number: usize,
    pub cells: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

/// Sheet overview for `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub data_rows: usize,
}

impl Table {
    /// Build a table from raw rows. The first row with any content is the
    /// header row; blank header cells become `UNKNOWN {col}` and data rows
    /// with no content are dropped.
    pub fn from_grid(sheet_name: impl Into<String>, grid: Vec<Vec<CellValue>>) -> Self {
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let mut grid = grid
            .into_iter()
            .skip_while(|cells| cells.iter().all(CellValue::is_empty));

        let header_cells = grid.next().unwrap_or_default();
        let headers = (0..width)
            .map(|col| match header_cells.get(col) {
                Some(cell) if !cell.is_empty() => cell.display().trim().to_string(),
                _ => format!("UNKNOWN {col}"),
            })
            .collect();

        let rows = grid
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
            .map(|(i, cells)| TableRow { number: i + 2, cells })
            .collect();

        Self {
            sheet_name: sheet_name.into(),
            headers,
            rows,
        }
    }

    /// Find a column by header name, ignoring case and surrounding whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(wanted))
    }

    pub fn info(&self) -> TableInfo {
        TableInfo {
            sheet_name: self.sheet_name.clone(),
            headers: self.headers.clone(),
            data_rows: self.rows.len(),
        }
    }
}

impl TableRow {
    pub fn cell(&self, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.cells.get(col).unwrap_or(EMPTY)
    }
}
