//! `countmate inspect` — what the importer sees in a file.

use std::path::PathBuf;

use countmate_io::{import_tables, TableInfo};

use crate::CliError;

pub fn cmd_inspect(input: PathBuf, json: bool) -> Result<(), CliError> {
    let tables = import_tables(&input)?;
    let infos: Vec<TableInfo> = tables.iter().map(|t| t.info()).collect();

    if json {
        let json_str = serde_json::to_string_pretty(&infos)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for info in &infos {
        println!("{} ({} data rows)", info.sheet_name, info.data_rows);
        if info.headers.is_empty() {
            println!("  (empty)");
        } else {
            println!("  columns: {}", info.headers.join(", "));
        }
    }
    Ok(())
}
