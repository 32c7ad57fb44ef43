//! Job files: one TOML document naming the input, the search and the output.
//!
//! ```toml
//! name = "pallets"
//!
//! [search]
//! group_size = 4
//! target_sum = 20
//! precision = 2
//!
//! [input]
//! file = "goods.xlsx"
//! sheet = "Sheet1"
//!
//! [input.columns]
//! weight = "weight"
//! id = "index"
//!
//! [output]
//! file = "matches.xlsx"
//! ```

use std::path::{Path, PathBuf};

use countmate_io::{ColumnMapping, ExportOptions, InputFormat, IoError, OutputFormat};
use countmate_matcher::{MatchError, SearchConfig, SearchSettings};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_JOB_NAME: &str = "countmate";

#[derive(Debug, Error)]
pub enum JobError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("job parse error: {0}")]
    Parse(String),
    #[error("job validation error: {0}")]
    Invalid(String),
    #[error(transparent)]
    Search(#[from] MatchError),
    #[error("job validation error: {0}")]
    Format(#[from] IoError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub columns: ColumnMapping,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub sheet: Option<String>,
    /// Header labels for the id and weight columns.
    #[serde(default)]
    pub headers: Option<[String; 2]>,
}

fn default_name() -> String {
    DEFAULT_JOB_NAME.to_string()
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            search: SearchSettings::default(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl JobConfig {
    pub fn from_toml(input: &str) -> Result<Self, JobError> {
        let config: JobConfig = toml::from_str(input).map_err(|e| JobError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a job file. Relative input/output paths are
    /// resolved against the job file's directory.
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let text = std::fs::read_to_string(path).map_err(|source| JobError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base_dir);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), JobError> {
        if self.name.trim().is_empty() {
            return Err(JobError::Invalid("name must not be empty".into()));
        }

        self.search_config()?;

        let columns = &self.input.columns;
        if columns.weight.trim().is_empty() {
            return Err(JobError::Invalid("input.columns.weight must not be empty".into()));
        }
        for (key, column) in [("id", &columns.id), ("label", &columns.label)] {
            if column.as_deref().is_some_and(|c| c.trim().is_empty()) {
                return Err(JobError::Invalid(format!("input.columns.{key} must not be empty")));
            }
        }

        if let Some(file) = &self.input.file {
            InputFormat::from_path(file)?;
        }
        if let Some(file) = &self.output.file {
            OutputFormat::from_path(file)?;
        }
        if let Some(sheet) = &self.output.sheet {
            if sheet.trim().is_empty() {
                return Err(JobError::Invalid("output.sheet must not be empty".into()));
            }
        }

        Ok(())
    }

    pub fn search_config(&self) -> Result<SearchConfig, MatchError> {
        SearchConfig::try_from(&self.search)
    }

    pub fn export_options(&self) -> ExportOptions {
        let defaults = ExportOptions::default();
        ExportOptions {
            sheet_name: self.output.sheet.clone().unwrap_or(defaults.sheet_name),
            headers: self.output.headers.clone().unwrap_or(defaults.headers),
        }
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        for file in [&mut self.input.file, &mut self.output.file].into_iter().flatten() {
            if file.is_relative() {
                *file = base_dir.join(&*file);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const FULL: &str = r#"
name = "pallets"

[search]
group_size = 3
target_sum = 15.5
precision = 1
deviation_bound = 2.5

[input]
file = "goods.xlsx"
sheet = "Stock"

[input.columns]
weight = "kg"
id = "index"
label = "name"

[output]
file = "out/matches.csv"
sheet = "result"
headers = ["group", "kg"]
"#;

    #[test]
    fn parses_full_job() {
        let job = JobConfig::from_toml(FULL).unwrap();
        assert_eq!(job.name, "pallets");
        assert_eq!(job.input.sheet.as_deref(), Some("Stock"));
        assert_eq!(job.input.columns, ColumnMapping::new("kg").with_id("index").with_label("name"));

        let config = job.search_config().unwrap();
        assert_eq!(config, SearchConfig::new(3, 15.5).with_precision(1).with_deviation_bound(2.5));

        let options = job.export_options();
        assert_eq!(options.sheet_name, "result");
        assert_eq!(options.header_refs(), ["group", "kg"]);
    }

    #[test]
    fn empty_job_uses_defaults() {
        let job = JobConfig::from_toml("").unwrap();
        assert_eq!(job.name, "countmate");
        assert_eq!(job.search_config().unwrap(), SearchConfig::default());
        assert_eq!(job.input.columns.weight, "weight");
        assert!(job.input.file.is_none());
        assert_eq!(job.export_options(), ExportOptions::default());
    }

    #[test]
    fn negative_group_size_is_rejected() {
        let err = JobConfig::from_toml("[search]\ngroup_size = -1\n").unwrap_err();
        assert!(matches!(err, JobError::Search(MatchError::InvalidConfiguration(_))));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = JobConfig::from_toml("[search]\ngroupsize = 4\n").unwrap_err();
        assert!(matches!(err, JobError::Parse(_)));
        assert!(err.to_string().contains("groupsize"));
    }

    #[test]
    fn unsupported_output_extension() {
        let err = JobConfig::from_toml("[output]\nfile = \"matches.ods\"\n").unwrap_err();
        assert!(matches!(err, JobError::Format(IoError::UnsupportedFormat(_))));
    }

    #[test]
    fn blank_columns_are_rejected() {
        let err = JobConfig::from_toml("[input.columns]\nid = \" \"\n").unwrap_err();
        assert_eq!(err.to_string(), "job validation error: input.columns.id must not be empty");
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("job.toml");
        std::fs::write(&path, FULL).unwrap();

        let job = JobConfig::load(&path).unwrap();
        assert_eq!(job.input.file.unwrap(), dir.path().join("goods.xlsx"));
        assert_eq!(job.output.file.unwrap(), dir.path().join("out/matches.csv"));
    }

    #[test]
    fn load_keeps_absolute_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("job.toml");
        std::fs::write(&path, "[input]\nfile = \"/data/goods.csv\"\n").unwrap();

        let job = JobConfig::load(&path).unwrap();
        assert_eq!(job.input.file.unwrap(), PathBuf::from("/data/goods.csv"));
    }

    #[test]
    fn load_missing_file() {
        let err = JobConfig::load(Path::new("/nonexistent/job.toml")).unwrap_err();
        assert!(matches!(err, JobError::Read { .. }));
    }
}
