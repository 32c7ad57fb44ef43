//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Library crates emit events; this module decides where they go. Everything
//! is written to stderr so stdout stays clean for `--json` documents.
//!
//! # Log Levels
//!
//! - `error`: only with `-q`
//! - `warn`: default
//! - `info`: `-v`, import/export counts and the extraction summary
//! - `debug`: `-vv`, one event per extraction round
//! - `trace`: `-vvv`, per-search combination counts
//!
//! `RUST_LOG` overrides the flags entirely.

use std::io;

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact single-line format.
    #[default]
    Compact,
    /// JSON format for machine parsing.
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::default(),
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// `-q` wins over any number of `-v`.
    #[must_use]
    pub fn from_flags(verbosity: u8, quiet: bool) -> Self {
        let level = match (quiet, verbosity) {
            (true, _) => Level::ERROR,
            (false, 0) => Level::WARN,
            (false, 1) => Level::INFO,
            (false, 2) => Level::DEBUG,
            (false, _) => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

pub fn init_logging(config: &LogConfig) {
    init_logging_with_writer(config, io::stderr);
}

pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = build_env_filter(config.level);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(writer).with_target(true);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    // Allow RUST_LOG to override the configured level
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Our crates at `level`, everything else (calamine, zip) at warn.
fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!(
        "warn,countmate={level},countmate_matcher={level},countmate_io={level}",
        level = level
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(LogConfig::from_flags(0, false).level, Level::WARN);
        assert_eq!(LogConfig::from_flags(1, false).level, Level::INFO);
        assert_eq!(LogConfig::from_flags(2, false).level, Level::DEBUG);
        assert_eq!(LogConfig::from_flags(5, false).level, Level::TRACE);
        assert_eq!(LogConfig::from_flags(3, true).level, Level::ERROR);
    }

    #[test]
    fn directives_cover_every_crate() {
        assert_eq!(
            default_directives(Level::DEBUG),
            "warn,countmate=debug,countmate_matcher=debug,countmate_io=debug"
        );
        assert!(EnvFilter::try_new(default_directives(Level::TRACE)).is_ok());
    }
}
