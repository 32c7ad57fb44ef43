//! `countmate run` and `countmate validate`.

use std::path::{Path, PathBuf};

use clap::Args;
use countmate_io::{json, OutputFormat, DEFAULT_OUTPUT_FILE};
use countmate_matcher::extract_report;
use tracing::info;

use crate::exit_codes::{EXIT_NO_GROUPS, EXIT_USAGE};
use crate::job::JobConfig;
use crate::report::RunDocument;
use crate::CliError;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input table (csv, tsv, xlsx, xls, xlsb, ods). Overrides [input] file.
    pub input: Option<PathBuf>,

    /// Job file (TOML). Flags below override its values.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Sheet to read from a workbook (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Header of the weight column
    #[arg(long, value_name = "COLUMN")]
    pub weight_column: Option<String>,

    /// Header of the id column (default: data-row number)
    #[arg(long, value_name = "COLUMN")]
    pub id_column: Option<String>,

    /// Header of a label column carried into the JSON output
    #[arg(long, value_name = "COLUMN")]
    pub label_column: Option<String>,

    /// Number of records per group
    #[arg(long, short = 'k', allow_negative_numbers = true)]
    pub group_size: Option<i64>,

    /// Sum every group must reach after rounding
    #[arg(long, short = 't', allow_negative_numbers = true)]
    pub target: Option<f64>,

    /// Drop records further than this from target/group_size before searching
    #[arg(long, allow_negative_numbers = true)]
    pub deviation: Option<f64>,

    /// Decimal places used when comparing sums
    #[arg(long, allow_negative_numbers = true)]
    pub precision: Option<i64>,

    /// Output file; format by extension (csv, tsv, xlsx, json)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Sheet name for xlsx output
    #[arg(long, value_name = "NAME")]
    pub output_sheet: Option<String>,

    /// Print the JSON document to stdout
    #[arg(long)]
    pub json: bool,

    /// Exit with code 7 when no group is found
    #[arg(long)]
    pub fail_on_empty: bool,
}

impl RunArgs {
    /// Job file (or defaults) with command-line overrides applied, re-validated.
    fn job(&self) -> Result<JobConfig, CliError> {
        let mut job = match &self.config {
            Some(path) => JobConfig::load(path)?,
            None => JobConfig::default(),
        };

        if let Some(input) = &self.input {
            job.input.file = Some(input.clone());
        }
        if let Some(sheet) = &self.sheet {
            job.input.sheet = Some(sheet.clone());
        }
        let columns = &mut job.input.columns;
        if let Some(weight) = &self.weight_column {
            columns.weight = weight.clone();
        }
        if let Some(id) = &self.id_column {
            columns.id = Some(id.clone());
        }
        if let Some(label) = &self.label_column {
            columns.label = Some(label.clone());
        }

        let search = &mut job.search;
        if let Some(k) = self.group_size {
            search.group_size = k;
        }
        if let Some(target) = self.target {
            search.target_sum = target;
        }
        if let Some(bound) = self.deviation {
            search.deviation_bound = Some(bound);
        }
        if let Some(precision) = self.precision {
            search.precision = precision;
        }

        if let Some(output) = &self.output {
            job.output.file = Some(output.clone());
        }
        if let Some(sheet) = &self.output_sheet {
            job.output.sheet = Some(sheet.clone());
        }

        job.validate()?;
        Ok(job)
    }
}

pub fn cmd_run(args: RunArgs, quiet: bool) -> Result<(), CliError> {
    let job = args.job()?;
    let config = job.search_config()?;

    let input = job.input.file.clone().ok_or_else(|| {
        CliError::new(EXIT_USAGE, "no input file")
            .with_hint("pass INPUT or set `file` under [input] in the job file")
    })?;

    // Without --json the result has to land somewhere
    let output = match (&job.output.file, args.json) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => None,
        (None, false) => Some(PathBuf::from(DEFAULT_OUTPUT_FILE)),
    };

    let table = countmate_io::import_table(&input, job.input.sheet.as_deref())?;
    let records = countmate_io::records_from_table(&table, &job.input.columns)?;
    info!(job = %job.name, records = records.len(), "records loaded");

    let report = extract_report(&records, &config)?;
    let document = RunDocument::new(&job.name, &input, &table.sheet_name, &config, report);

    if let Some(path) = &output {
        write_output(&document, path, &job)?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json {
        let json_str = serde_json::to_string_pretty(&document)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    if !quiet {
        eprintln!("{}", document.human_summary());
    }

    if args.fail_on_empty && document.groups.is_empty() {
        return Err(CliError::new(EXIT_NO_GROUPS, "no groups found"));
    }

    Ok(())
}

fn write_output(document: &RunDocument, path: &Path, job: &JobConfig) -> Result<(), CliError> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Json => json::export_value(document, path)?,
        _ => {
            countmate_io::export_results(&document.groups, path, &job.export_options())?;
        }
    }
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let job = JobConfig::load(&config_path)?;
    let config = job.search_config()?;

    let deviation = config
        .active_deviation_bound()
        .map(|d| format!(", deviation ±{d}"))
        .unwrap_or_default();
    eprintln!(
        "valid: job '{}' (group size {}, target {}, precision {}{})",
        job.name, config.group_size, config.target_sum, config.precision, deviation,
    );
    if let Some(input) = &job.input.file {
        eprintln!("  input:  {}", input.display());
    }
    if let Some(output) = &job.output.file {
        eprintln!("  output: {}", output.display());
    }
    Ok(())
}
