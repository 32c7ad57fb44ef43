// JSON export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use countmate_matcher::MatchResult;
use serde::Serialize;

use crate::error::IoError;

/// Export groups as a pretty-printed JSON array of `{member_ids, member_weights}`.
pub fn export_results(results: &[MatchResult], path: &Path) -> Result<(), IoError> {
    export_value(results, path)
}

/// Write any serializable document as pretty JSON.
pub fn export_value<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), IoError> {
    let write_err = |e: std::io::Error| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n").map_err(write_err)?;
    writer.flush().map_err(write_err)?;
    Ok(())
}
