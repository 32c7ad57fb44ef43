//! `countmate-matcher` — fixed-size group extraction by rounded weight sum.
//!
//! Pure engine crate: receives pre-loaded records, returns matched groups.
//! No CLI or IO dependencies.

pub mod config;
pub mod error;
pub mod extract;
pub mod finder;
pub mod model;
pub mod normalize;

pub use config::{SearchConfig, SearchSettings};
pub use error::MatchError;
pub use extract::{extract_groups, extract_report};
pub use finder::{find_group, FoundGroup};
pub use model::{ExtractionReport, ExtractionSummary, MatchResult, Record};
