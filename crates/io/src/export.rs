// Flattened match rows and export settings shared by the writers

use countmate_matcher::MatchResult;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HEADERS: [&str; 2] = ["ids", "weights"];
pub const DEFAULT_SHEET_NAME: &str = "matches";
pub const DEFAULT_OUTPUT_FILE: &str = "matches.xlsx";

/// One group as a spreadsheet row: ids and weights joined with `,`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub ids: String,
    pub weights: String,
}

impl From<&MatchResult> for ResultRow {
    fn from(result: &MatchResult) -> Self {
        Self {
            ids: join(&result.member_ids),
            weights: join(&result.member_weights),
        }
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

pub fn result_rows(results: &[MatchResult]) -> Vec<ResultRow> {
    results.iter().map(ResultRow::from).collect()
}

/// Sheet name and header labels for table-shaped output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    pub sheet_name: String,
    pub headers: [String; 2],
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            headers: DEFAULT_HEADERS.map(String::from),
        }
    }
}

impl ExportOptions {
    pub fn header_refs(&self) -> [&str; 2] {
        [self.headers[0].as_str(), self.headers[1].as_str()]
    }
}
