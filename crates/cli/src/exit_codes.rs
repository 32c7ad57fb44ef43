//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (including "no groups found")                |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments, conflicting options)     |
//! | 3    | I/O error (cannot read input, cannot write output)   |
//! | 4    | Import error (bad table contents, missing column)    |
//! | 5    | Invalid configuration (job file or search settings)  |
//! | 6    | Computation error (weight cannot be summed/rounded)  |
//! | 7    | No groups found and `--fail-on-empty` was given      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant error mapping below

use countmate_io::IoError;
use countmate_matcher::MatchError;

use crate::job::JobError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Input file unreadable or output file unwritable.
pub const EXIT_IO: u8 = 3;

/// Input was read but its contents cannot become records.
pub const EXIT_IMPORT: u8 = 4;

/// Job file or search parameters rejected.
pub const EXIT_CONFIG: u8 = 5;

/// A weight could not be converted, summed or rounded.
pub const EXIT_COMPUTATION: u8 = 6;

/// Extraction succeeded but produced no groups (`--fail-on-empty`).
pub const EXIT_NO_GROUPS: u8 = 7;

/// Map an import/export error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Read { .. } | IoError::Write { .. } => EXIT_IO,
        IoError::Csv(e) if e.is_io_error() => EXIT_IO,
        IoError::UnsupportedFormat(_) => EXIT_USAGE,
        IoError::Workbook(_) | IoError::EmptyWorkbook | IoError::Csv(_) => EXIT_IMPORT,
        IoError::SheetNotFound { .. }
        | IoError::MissingColumn { .. }
        | IoError::InvalidNumber { .. }
        | IoError::DuplicateId { .. } => EXIT_IMPORT,
        IoError::Json(_) => EXIT_ERROR,
    }
}

/// Map an engine error to its exit code.
pub fn match_exit_code(err: &MatchError) -> u8 {
    match err {
        MatchError::InvalidConfiguration(_) => EXIT_CONFIG,
        MatchError::Computation { .. } => EXIT_COMPUTATION,
    }
}

/// Map a job-file error to its exit code.
pub fn job_exit_code(err: &JobError) -> u8 {
    match err {
        JobError::Read { .. } => EXIT_IO,
        JobError::Parse(_) | JobError::Invalid(_) | JobError::Format(_) => EXIT_CONFIG,
        JobError::Search(e) => match_exit_code(e),
    }
}
