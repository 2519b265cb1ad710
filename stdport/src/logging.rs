//! Logging infrastructure for the stdport library.
//!
//! The library reports diagnostics through the `log` facade. This module
//! provides a level-filtered stderr [`Logger`] that front ends can install
//! as the facade's backend.

use std::env;
use std::fmt;

/// Environment variable consulted by [`init_logger`].
pub const LOG_MODE_VAR: &str = "STDPORT_LOG_MODE";

/// Logging level for controlling output verbosity.
///
/// Log levels are ordered from least verbose (Quiet) to most verbose (Verbose).
///
/// # Examples
///
/// ```
/// use stdport::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Suppress all non-essential output.
    Quiet,
    /// Errors and warnings.
    Normal,
    /// Errors, warnings, info and debug messages.
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl LogLevel {
    /// Parses a log level from a string.
    ///
    /// Recognizes "quiet", "normal" and "verbose", case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use stdport::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("VERBOSE").unwrap(), LogLevel::Verbose);
    /// assert!(LogLevel::parse("loud").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }

    /// The most detailed `log` level shown at this verbosity.
    #[must_use]
    pub const fn filter(self) -> log::LevelFilter {
        match self {
            Self::Quiet => log::LevelFilter::Off,
            Self::Normal => log::LevelFilter::Warn,
            Self::Verbose => log::LevelFilter::Debug,
        }
    }
}

/// A stderr logger filtered by [`LogLevel`].
///
/// Usable directly through its methods or as the backend of the `log`
/// facade via [`Logger::install`].
///
/// # Examples
///
/// ```
/// use stdport::{LogLevel, Logger};
///
/// let logger = Logger::new(LogLevel::Normal);
/// logger.warn("trailing separator ignored");
/// logger.debug("not shown at Normal");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// Creates a new logger with the specified log level.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Returns the current log level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Logs an error message unless the level is Quiet.
    pub fn error(&self, message: &str) {
        self.emit(log::Level::Error, format_args!("{message}"));
    }

    /// Logs a warning message unless the level is Quiet.
    pub fn warn(&self, message: &str) {
        self.emit(log::Level::Warn, format_args!("{message}"));
    }

    /// Logs an informational message at Verbose level.
    pub fn info(&self, message: &str) {
        self.emit(log::Level::Info, format_args!("{message}"));
    }

    /// Logs a debug message at Verbose level.
    pub fn debug(&self, message: &str) {
        self.emit(log::Level::Debug, format_args!("{message}"));
    }

    /// Makes this logger the backend of the `log` facade.
    ///
    /// Only the first installation in a process takes effect; later calls
    /// still adjust the facade's maximum level.
    pub fn install(self) {
        if log::set_logger(Box::leak(Box::new(self))).is_err() {
            log::debug!("a logger is already installed");
        }
        log::set_max_level(self.level.filter());
    }

    fn emit(&self, level: log::Level, args: fmt::Arguments<'_>) {
        if level <= self.level.filter() {
            eprintln!("{}: {args}", level.as_str());
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Normal)
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.level.filter()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            self.emit(record.level(), *record.args());
        }
    }

    fn flush(&self) {}
}

/// Builds a logger from CLI flags and the environment, and installs it.
///
/// The priority order is:
/// 1. CLI flags (`verbose` wins over `quiet`)
/// 2. The `STDPORT_LOG_MODE` environment variable
/// 3. Normal
///
/// # Examples
///
/// ```
/// use stdport::{init_logger, LogLevel};
///
/// let logger = init_logger(false, true);
/// assert_eq!(logger.level(), LogLevel::Quiet);
/// ```
#[must_use]
pub fn init_logger(verbose: bool, quiet: bool) -> Logger {
    let logger = Logger::new(resolve_level(verbose, quiet));
    logger.install();
    logger
}

fn resolve_level(verbose: bool, quiet: bool) -> LogLevel {
    if verbose {
        return LogLevel::Verbose;
    }
    if quiet {
        return LogLevel::Quiet;
    }
    env::var(LOG_MODE_VAR)
        .ok()
        .and_then(|value| LogLevel::parse(&value).ok())
        .unwrap_or(LogLevel::Normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use serial_test::serial;

    struct SavedVar(Option<String>);

    impl SavedVar {
        fn set(value: Option<&str>) -> Self {
            let saved = Self(env::var(LOG_MODE_VAR).ok());
            match value {
                Some(v) => env::set_var(LOG_MODE_VAR, v),
                None => env::remove_var(LOG_MODE_VAR),
            }
            saved
        }
    }

    impl Drop for SavedVar {
        fn drop(&mut self) {
            match &self.0 {
                Some(v) => env::set_var(LOG_MODE_VAR, v),
                None => env::remove_var(LOG_MODE_VAR),
            }
        }
    }

    #[test]
    fn test_log_level_display_and_parse() {
        for level in [LogLevel::Quiet, LogLevel::Normal, LogLevel::Verbose] {
            assert_eq!(LogLevel::parse(&level.to_string()).unwrap(), level);
        }
        assert_eq!(LogLevel::parse("Normal").unwrap(), LogLevel::Normal);
        assert!(LogLevel::parse("").is_err());
    }

    #[test]
    fn test_filters() {
        assert_eq!(LogLevel::Quiet.filter(), log::LevelFilter::Off);
        assert_eq!(LogLevel::Normal.filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::Verbose.filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_enabled_follows_level() {
        let meta = |level| log::Metadata::builder().level(level).build();
        let normal = Logger::default();
        assert!(normal.enabled(&meta(log::Level::Warn)));
        assert!(!normal.enabled(&meta(log::Level::Info)));

        let verbose = Logger::new(LogLevel::Verbose);
        assert!(verbose.enabled(&meta(log::Level::Debug)));
        assert!(!verbose.enabled(&meta(log::Level::Trace)));

        let quiet = Logger::new(LogLevel::Quiet);
        assert!(!quiet.enabled(&meta(log::Level::Error)));
    }

    #[test]
    #[serial]
    fn test_resolve_level_defaults_to_normal() {
        let _guard = SavedVar::set(None);
        assert_eq!(resolve_level(false, false), LogLevel::Normal);
    }

    #[test]
    #[serial]
    fn test_resolve_level_flags() {
        let _guard = SavedVar::set(Some("quiet"));
        assert_eq!(resolve_level(true, false), LogLevel::Verbose);
        assert_eq!(resolve_level(false, true), LogLevel::Quiet);
        assert_eq!(resolve_level(true, true), LogLevel::Verbose);
    }

    #[test]
    #[serial]
    fn test_resolve_level_from_env() {
        let _guard = SavedVar::set(Some("verbose"));
        assert_eq!(resolve_level(false, false), LogLevel::Verbose);
        env::set_var(LOG_MODE_VAR, "QUIET");
        assert_eq!(resolve_level(false, false), LogLevel::Quiet);
        env::set_var(LOG_MODE_VAR, "invalid");
        assert_eq!(resolve_level(false, false), LogLevel::Normal);
    }

    #[test]
    #[serial]
    fn test_init_logger_installs_and_returns() {
        let _guard = SavedVar::set(None);
        let logger = init_logger(false, true);
        assert_eq!(logger.level(), LogLevel::Quiet);
        assert_eq!(log::max_level(), log::LevelFilter::Off);
        let _ = init_logger(false, false);
        assert_eq!(log::max_level(), log::LevelFilter::Warn);
    }
}
