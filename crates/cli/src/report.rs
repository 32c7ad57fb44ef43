//! JSON document written by `countmate run --json` and for `.json` outputs.

use std::path::Path;

use countmate_matcher::{ExtractionReport, ExtractionSummary, MatchResult, Record, SearchConfig};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RunDocument {
    pub meta: RunMeta,
    pub summary: ExtractionSummary,
    pub groups: Vec<MatchResult>,
    pub unmatched: Vec<Record>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub job: String,
    pub engine_version: String,
    pub run_at: String,
    pub input: String,
    pub sheet: String,
    pub config: SearchConfig,
    pub combinations_examined: u64,
}

impl RunDocument {
    pub fn new(job: &str, input: &Path, sheet: &str, config: &SearchConfig, report: ExtractionReport) -> Self {
        Self {
            meta: RunMeta {
                job: job.to_string(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                input: input.display().to_string(),
                sheet: sheet.to_string(),
                config: config.clone(),
                combinations_examined: report.combinations_examined,
            },
            summary: report.summary(),
            groups: report.groups,
            unmatched: report.unmatched,
        }
    }

    /// One line for stderr: `2 groups, 8 records matched, 1 unmatched`.
    pub fn human_summary(&self) -> String {
        let s = &self.summary;
        let mut line = format!(
            "{} group{}, {} records matched, {} unmatched",
            s.groups,
            if s.groups == 1 { "" } else { "s" },
            s.records_matched,
            s.records_unmatched,
        );
        if s.filtered_out > 0 {
            line.push_str(&format!(", {} outside deviation bound", s.filtered_out));
        }
        line
    }
}
