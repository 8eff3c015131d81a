//! `tracing` subscriber setup for the demo binary and tests.
//!
//! Console output goes to stderr; stdout is reserved for the demo
//! transcript. File output rolls daily.

use querygate_core::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Standard error
    Stderr,
    /// A daily-rolled file
    File(PathBuf),
    /// Standard error and a daily-rolled file
    Both(PathBuf),
}

impl LogOutput {
    fn file(&self) -> Option<&Path> {
        match self {
            LogOutput::Stderr => None,
            LogOutput::File(path) | LogOutput::Both(path) => Some(path),
        }
    }

    fn console(&self) -> bool {
        !matches!(self, LogOutput::File(_))
    }
}

/// Line layout of each event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, indented fields
    Pretty,
    /// One line per event
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!(
                "unknown log format '{}', expected 'pretty' or 'compact'",
                other
            )),
        }
    }
}

/// Subscriber settings. Defaults to `warn`, stderr, compact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Any `EnvFilter` directive, e.g. `warn` or `querygate=debug`
    pub level: String,
    /// Destination
    pub output: LogOutput,
    /// Layout
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::at("warn")
    }
}

impl LogConfig {
    fn at(level: &str) -> Self {
        Self {
            level: level.to_string(),
            output: LogOutput::Stderr,
            format: LogFormat::Compact,
        }
    }

    /// `info` and above
    pub fn info() -> Self {
        Self::at("info")
    }

    /// `debug` and above
    pub fn debug() -> Self {
        Self::at("debug")
    }

    /// Same as [`LogConfig::default`]
    pub fn warn() -> Self {
        Self::at("warn")
    }

    /// Log only to a daily-rolled file at `path`
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Log to stderr and to a daily-rolled file at `path`
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Switch the line layout
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the filter directive
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Level filter; a set `RUST_LOG` wins over `level`.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| Error::InvalidInput(format!("bad log filter '{}': {}", self.level, e)))
    }

    /// Install the global subscriber.
    ///
    /// With file output, the returned guard owns the background writer;
    /// dropping it flushes pending lines. Keep it alive until exit.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a bad filter, `InvalidOperation` if a global
    /// subscriber is already set.
    ///
    /// ```rust,no_run
    /// use querygate::logging::LogConfig;
    ///
    /// let _guard = LogConfig::info().init()?;
    /// # Ok::<(), querygate::Error>(())
    /// ```
    pub fn init(self) -> Result<Option<WorkerGuard>> {
        let filter = self.env_filter()?;

        let (writer, guard) = match self.output.file() {
            Some(path) => {
                let (writer, guard) = tracing_appender::non_blocking(file_appender(path));
                (Some(writer), Some(guard))
            }
            None => (None, None),
        };
        let console = self.output.console();
        let registry = tracing_subscriber::registry().with(filter);

        let installed = match self.format {
            LogFormat::Pretty => registry
                .with(console.then(|| fmt::layer().with_writer(io::stderr).pretty()))
                .with(writer.map(|w| fmt::layer().with_writer(w).with_ansi(false).pretty()))
                .try_init(),
            LogFormat::Compact => registry
                .with(console.then(|| fmt::layer().with_writer(io::stderr).compact()))
                .with(writer.map(|w| fmt::layer().with_writer(w).with_ansi(false).compact()))
                .try_init(),
        };

        installed.map_err(|e| Error::InvalidOperation(format!("subscriber already set: {}", e)))?;
        Ok(guard)
    }
}

fn file_appender(path: &Path) -> tracing_appender::rolling::RollingFileAppender {
    tracing_appender::rolling::daily(
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(".")),
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("querygate.log"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_log_warnings_to_stderr() {
        let config = LogConfig::default();
        assert_eq!(config, LogConfig::warn());
        assert_eq!(config.output, LogOutput::Stderr);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.output.console());
        assert_eq!(config.output.file(), None);
    }

    #[test]
    fn test_file_only_output_skips_console() {
        let config = LogConfig::debug()
            .with_file("logs/gate.log")
            .with_format(LogFormat::Pretty);
        assert_eq!(config.level, "debug");
        assert!(!config.output.console());
        assert_eq!(config.output.file(), Some(Path::new("logs/gate.log")));

        let both = LogConfig::info().with_both("gate.log");
        assert!(both.output.console());
        assert!(both.output.file().is_some());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("Pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!("compact".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("json".parse::<LogFormat>().is_err());
    }
}
