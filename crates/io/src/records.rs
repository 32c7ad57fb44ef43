// Table rows → matcher records

use std::collections::HashMap;

use countmate_matcher::Record;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::IoError;
use crate::table::{CellValue, Table, TableRow};

pub const DEFAULT_WEIGHT_COLUMN: &str = "weight";

/// Which header names carry the weight, id and label of each record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMapping {
    #[serde(default = "default_weight_column")]
    pub weight: String,
    /// Without an id column each record gets its data-row number as id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

fn default_weight_column() -> String {
    DEFAULT_WEIGHT_COLUMN.to_string()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            weight: default_weight_column(),
            id: None,
            label: None,
        }
    }
}

impl ColumnMapping {
    pub fn new(weight: impl Into<String>) -> Self {
        Self {
            weight: weight.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, column: impl Into<String>) -> Self {
        self.id = Some(column.into());
        self
    }

    pub fn with_label(mut self, column: impl Into<String>) -> Self {
        self.label = Some(column.into());
        self
    }
}

/// Build one record per data row of `table`.
///
/// Weights and ids must be numeric; ids must also be whole and unique.
/// Labels are trimmed and blank labels dropped.
pub fn records_from_table(table: &Table, mapping: &ColumnMapping) -> Result<Vec<Record>, IoError> {
    let weight_col = find_column(table, &mapping.weight)?;
    let id_col = mapping.id.as_deref().map(|name| find_column(table, name)).transpose()?;
    let label_col = mapping.label.as_deref().map(|name| find_column(table, name)).transpose()?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut seen: HashMap<i64, usize> = HashMap::new();

    for row in &table.rows {
        let weight = number_at(table, row, weight_col)?;

        let id = match id_col {
            Some(col) => id_at(table, row, col)?,
            None => (row.number - 1) as i64,
        };
        if let Some(&first_row) = seen.get(&id) {
            return Err(IoError::DuplicateId {
                id,
                row: row.number,
                first_row,
            });
        }
        seen.insert(id, row.number);

        let label = label_col
            .map(|col| row.cell(col).display().trim().to_string())
            .filter(|s| !s.is_empty());

        records.push(Record { id, label, weight });
    }

    debug!(sheet = %table.sheet_name, records = records.len(), "records built from table");
    Ok(records)
}

fn find_column(table: &Table, name: &str) -> Result<usize, IoError> {
    table.column_index(name).ok_or_else(|| IoError::MissingColumn {
        column: name.to_string(),
        available: table.headers.join(", "),
    })
}

fn invalid_number(table: &Table, row: &TableRow, col: usize) -> IoError {
    IoError::InvalidNumber {
        row: row.number,
        column: table.headers[col].clone(),
        value: row.cell(col).display(),
    }
}

fn number_at(table: &Table, row: &TableRow, col: usize) -> Result<f64, IoError> {
    row.cell(col)
        .as_number()
        .ok_or_else(|| invalid_number(table, row, col))
}

fn id_at(table: &Table, row: &TableRow, col: usize) -> Result<i64, IoError> {
    let cell = row.cell(col);
    // Integer text parses exactly; anything else goes through f64 and must be whole
    if let CellValue::Text(s) = cell {
        if let Ok(id) = s.trim().parse::<i64>() {
            return Ok(id);
        }
    }
    match cell.as_number() {
        Some(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Ok(n as i64),
        _ => Err(invalid_number(table, row, col)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn goods() -> Table {
        Table::from_grid(
            "goods",
            vec![
                vec![t("Index"), t("Name"), t("Weight")],
                vec![n(10.0), t("crate"), n(5.0)],
                vec![t("11"), t("  "), t(" 7.25 ")],
                vec![],
                vec![n(12.0), t("box"), n(7.75)],
            ],
        )
    }

    #[test]
    fn maps_columns_case_insensitively() {
        let mapping = ColumnMapping::new("weight").with_id("INDEX").with_label("name");
        let records = records_from_table(&goods(), &mapping).unwrap();
        assert_eq!(
            records,
            vec![
                Record::new(10, 5.0).with_label("crate"),
                Record::new(11, 7.25),
                Record::new(12, 7.75).with_label("box"),
            ]
        );
    }

    #[test]
    fn row_numbers_stand_in_for_missing_ids() {
        let records = records_from_table(&goods(), &ColumnMapping::default()).unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        // The blank row keeps its number, so the last record is data row 4
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn missing_column_lists_headers() {
        let err = records_from_table(&goods(), &ColumnMapping::new("mass")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing column 'mass' (available: Index, Name, Weight)"
        );
    }

    #[test]
    fn bad_weight_names_row_and_column() {
        let table = Table::from_grid(
            "s",
            vec![vec![t("weight")], vec![n(1.0)], vec![t("heavy")]],
        );
        let err = records_from_table(&table, &ColumnMapping::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "row 3, column 'weight': cannot parse 'heavy' as a number"
        );
    }

    #[test]
    fn empty_weight_is_invalid() {
        let table = Table::from_grid(
            "s",
            vec![vec![t("weight"), t("name")], vec![CellValue::Empty, t("x")]],
        );
        let err = records_from_table(&table, &ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, IoError::InvalidNumber { row: 2, .. }));
    }

    #[test]
    fn fractional_id_is_invalid() {
        let table = Table::from_grid(
            "s",
            vec![vec![t("id"), t("weight")], vec![n(1.5), n(2.0)]],
        );
        let err = records_from_table(&table, &ColumnMapping::default().with_id("id")).unwrap_err();
        assert!(matches!(err, IoError::InvalidNumber { ref column, .. } if column == "id"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let table = Table::from_grid(
            "s",
            vec![vec![t("id"), t("weight")], vec![n(3.0), n(2.0)], vec![t("3"), n(4.0)]],
        );
        let err = records_from_table(&table, &ColumnMapping::default().with_id("id")).unwrap_err();
        assert_eq!(err.to_string(), "row 3: id 3 already used on row 2");
    }

    #[test]
    fn mapping_from_toml_defaults_weight() {
        let mapping: ColumnMapping = toml::from_str("id = \"index\"").unwrap();
        assert_eq!(mapping.weight, "weight");
        assert_eq!(mapping.id.as_deref(), Some("index"));
        assert!(toml::from_str::<ColumnMapping>("mass = \"kg\"").is_err());
    }
}
