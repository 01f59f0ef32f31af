//! # Logging Setup and Formatting
//!
//! File: lib/src/core/logging.rs
//!
//! ## Overview
//!
//! Everything in this crate logs through the `tracing` macros and never installs
//! a subscriber on its own. This module is what a host pipeline calls, once at
//! startup, to turn those events into console and file output.
//!
//! ## Architecture
//!
//! - **`LogFormatter`**: a `tracing_subscriber` event formatter with three line styles:
//!     - `Standard`: `2024-05-01 12:00:00,123 [INFO] message`
//!     - `Simple`: `12:00:00.123 INFO       message` (level colored)
//!     - `Verbose`: `12:00:00.123 pipeline::align      INFO       message` (level colored)
//!   Coloring can be turned off with `with_ansi(false)`, which is how files are written.
//! - **`RotatingFileWriter`**: an append-mode file that is rotated to
//!   `name.1`, `name.2`, ... once it would grow past `max_bytes`.
//! - **`init_logging`**: builds a fresh subscriber from a `LoggingConfig`:
//!     - Level filter from `RUST_LOG` when set, otherwise `info` (or `debug` with
//!       `debug_console`), restricted to `target` when one is configured.
//!     - Console layer on stdout: `Standard` at INFO, or colored `Verbose` at DEBUG with `debug_console`.
//!     - With `log_to_file`: `info.log` (rotating, INFO and above) and
//!       `error.log` (WARN and above), both plain `Verbose`, inside `log_dir`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pipeline_utils::core::config::LoggingConfig;
//! use pipeline_utils::core::logging;
//!
//! # fn run_example() -> pipeline_utils::core::error::Result<()> {
//! let config = LoggingConfig {
//!     debug_console: true,
//!     log_to_file: true,
//!     log_dir: "logs".to_string(),
//!     ..LoggingConfig::for_target("my_pipeline")
//! };
//! logging::init_logging(&config)?;
//! tracing::info!("pipeline started");
//! # Ok(())
//! # }
//! ```
//!
use crate::common::fs::io::ensure_dir_exists;
use crate::core::config::LoggingConfig;
use crate::core::error::Result;
use anyhow::Context;
use chrono::Local;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// File name of the rotating INFO-and-above log.
pub const INFO_LOG_FILE: &str = "info.log";
/// File name of the WARN-and-above log.
pub const ERROR_LOG_FILE: &str = "error.log";

/// Timestamp used by `FormatStyle::Standard`.
const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";
/// Timestamp used by `FormatStyle::Simple` and `FormatStyle::Verbose`.
const SHORT_TIME_FORMAT: &str = "%H:%M:%S%.3f";

// Foreground colors per level, and the matching foreground reset.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const WHITE: &str = "\x1b[37m";
const CYAN: &str = "\x1b[36m";
const BLUE: &str = "\x1b[34m";
const RESET_FOREGROUND: &str = "\x1b[39m";

/// Layout of a formatted log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatStyle {
    /// `date time,ms [LEVEL] message`, never colored.
    Standard,
    /// `time.ms LEVEL message`.
    Simple,
    /// `time.ms target LEVEL message`.
    Verbose,
}

/// Event formatter producing the line layouts of `FormatStyle`.
#[derive(Debug, Clone, Copy)]
pub struct LogFormatter {
    style: FormatStyle,
    ansi: bool,
}

impl LogFormatter {
    pub fn standard() -> Self {
        Self {
            style: FormatStyle::Standard,
            ansi: false,
        }
    }

    pub fn simple() -> Self {
        Self {
            style: FormatStyle::Simple,
            ansi: true,
        }
    }

    pub fn verbose() -> Self {
        Self {
            style: FormatStyle::Verbose,
            ansi: true,
        }
    }

    /// Enables or disables level coloring. `Standard` ignores this.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn style(&self) -> FormatStyle {
        self.style
    }
}

/// ANSI foreground color used for `level`.
pub fn level_color(level: Level) -> &'static str {
    if level == Level::ERROR {
        RED
    } else if level == Level::WARN {
        YELLOW
    } else if level == Level::INFO {
        WHITE
    } else if level == Level::DEBUG {
        CYAN
    } else {
        BLUE
    }
}

impl<S, N> FormatEvent<S, N> for LogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();
        let now = Local::now();
        let colored = self.ansi && self.style != FormatStyle::Standard;
        let (color, reset) = if colored {
            (level_color(level), RESET_FOREGROUND)
        } else {
            ("", "")
        };

        match self.style {
            FormatStyle::Standard => {
                write!(writer, "{} [{}] ", now.format(STANDARD_TIME_FORMAT), level.as_str())?
            }
            FormatStyle::Simple => write!(
                writer,
                "{} {}{:<10} ",
                now.format(SHORT_TIME_FORMAT),
                color,
                level.as_str()
            )?,
            FormatStyle::Verbose => write!(
                writer,
                "{} {:<20} {}{:<10} ",
                now.format(SHORT_TIME_FORMAT),
                metadata.target(),
                color,
                level.as_str()
            )?,
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer, "{}", reset)
    }
}

/// Append-mode log file rotated by size.
///
/// Before a write would push the file past `max_bytes`, the file is renamed to
/// `<path>.1` (older backups shift up to `<path>.<backup_count>`, the oldest is
/// dropped) and a fresh file is started. With `backup_count == 0` the file is
/// simply truncated. A single write larger than `max_bytes` still goes to one file.
#[derive(Debug)]
pub struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    written: u64,
}

impl RotatingFileWriter {
    /// Opens (or creates) `path` for appending.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: usize) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            path,
            max_bytes,
            backup_count,
            file,
            written,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<path>.<index>`
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backup_count > 0 {
            for index in (1..self.backup_count).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }
        self.file = File::create(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let count = self.file.write(buf)?;
        self.written += count as u64;
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Filter directive used when `RUST_LOG` is not set.
fn default_directive(config: &LoggingConfig) -> String {
    let level = if config.debug_console { "debug" } else { "info" };
    if config.target.is_empty() {
        level.to_string()
    } else {
        format!("{}={}", config.target, level)
    }
}

fn console_layer(config: &LoggingConfig) -> BoxedLayer {
    if config.debug_console {
        tracing_subscriber::fmt::layer()
            .event_format(LogFormatter::verbose())
            .with_writer(io::stdout)
            .with_filter(LevelFilter::DEBUG)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .event_format(LogFormatter::standard())
            .with_writer(io::stdout)
            .with_filter(LevelFilter::INFO)
            .boxed()
    }
}

fn file_layers(config: &LoggingConfig) -> Result<Vec<BoxedLayer>> {
    let log_dir = config.log_dir_path();
    ensure_dir_exists(&log_dir)?;

    let info_writer = RotatingFileWriter::open(
        log_dir.join(INFO_LOG_FILE),
        config.max_bytes,
        config.backup_count,
    )?;
    let error_path = log_dir.join(ERROR_LOG_FILE);
    let error_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&error_path)
        .with_context(|| format!("Failed to open log file {:?}", error_path))?;

    let plain = LogFormatter::verbose().with_ansi(false);
    Ok(vec![
        tracing_subscriber::fmt::layer()
            .event_format(plain)
            .with_writer(Mutex::new(info_writer))
            .with_filter(LevelFilter::INFO)
            .boxed(),
        tracing_subscriber::fmt::layer()
            .event_format(plain)
            .with_writer(Mutex::new(error_file))
            .with_filter(LevelFilter::WARN)
            .boxed(),
    ])
}

/// Installs the global subscriber described by `config`.
///
/// Each call builds its layers from scratch; nothing is shared between calls.
///
/// # Errors
///
/// Returns an `Err` if:
/// - The filter directive is invalid (e.g. a malformed `target`).
/// - The log directory or log files cannot be created.
/// - A global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let directive = default_directive(config);
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&directive)
            .with_context(|| format!("Invalid log filter directive '{}'", directive))?,
    };

    let mut layers = vec![console_layer(config)];
    if config.log_to_file {
        layers.extend(file_layers(config)?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install logging subscriber (already initialized?)")?;

    tracing::debug!(
        "Logging initialized (target '{}', debug console: {}, files: {})",
        config.target,
        config.debug_console,
        config.log_to_file
    );
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;
    use tracing_subscriber::fmt::MakeWriter;

    /// In-memory writer shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuffer {
        type Writer = SharedBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(formatter: LogFormatter, emit: impl FnOnce()) -> String {
        let buffer = SharedBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .event_format(formatter)
            .with_writer(buffer.clone())
            .with_max_level(LevelFilter::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        buffer.contents()
    }

    fn assert_short_timestamp(line: &str) {
        let bytes = line.as_bytes();
        assert_eq!(bytes[2], b':', "line: {line}");
        assert_eq!(bytes[5], b':', "line: {line}");
        assert_eq!(bytes[8], b'.', "line: {line}");
        assert_eq!(bytes[12], b' ', "line: {line}");
    }

    #[test]
    fn test_simple_format_colors_level() {
        let output = capture(LogFormatter::simple(), || {
            tracing::debug!("checking {}", "reads");
        });
        let line = output.lines().next().unwrap();
        assert_short_timestamp(line);
        assert_eq!(
            &line[13..],
            format!("\x1b[36m{:<10} checking reads\x1b[39m", "DEBUG")
        );
    }

    #[test]
    fn test_verbose_format_includes_target() {
        let output = capture(LogFormatter::verbose().with_ansi(false), || {
            tracing::warn!(target: "pipeline::qc", "low coverage");
        });
        let line = output.lines().next().unwrap();
        assert_short_timestamp(line);
        assert_eq!(
            &line[13..],
            format!("{:<20} {:<10} low coverage", "pipeline::qc", "WARN")
        );
    }

    #[test]
    fn test_standard_format() {
        let output = capture(LogFormatter::standard(), || {
            tracing::error!("boom");
        });
        let line = output.lines().next().unwrap();
        // 2024-05-01 12:00:00,123 [ERROR] boom
        assert_eq!(line.as_bytes()[4], b'-');
        assert_eq!(line.as_bytes()[19], b',');
        assert!(line.ends_with(" [ERROR] boom"), "line: {line}");
        assert!(!line.contains('\x1b'));
    }

    #[test]
    fn test_level_colors() {
        assert_eq!(level_color(Level::ERROR), "\x1b[31m");
        assert_eq!(level_color(Level::WARN), "\x1b[33m");
        assert_eq!(level_color(Level::INFO), "\x1b[37m");
        assert_eq!(level_color(Level::DEBUG), "\x1b[36m");
        assert_eq!(level_color(Level::TRACE), "\x1b[34m");
    }

    #[test]
    fn test_default_directive() {
        let mut config = LoggingConfig::default();
        assert_eq!(default_directive(&config), "info");
        config.debug_console = true;
        assert_eq!(default_directive(&config), "debug");
        config.target = "pipeline".to_string();
        assert_eq!(default_directive(&config), "pipeline=debug");
    }

    #[test]
    fn test_rotating_writer_rotates_and_caps_backups() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("info.log");
        let mut writer = RotatingFileWriter::open(&path, 10, 2)?;

        writer.write_all(b"aaaaaaaa\n")?; // 9 bytes, fits
        writer.write_all(b"bbbbbbbb\n")?; // would exceed, rotates first
        writer.write_all(b"cccccccc\n")?;
        writer.write_all(b"dddddddd\n")?;
        writer.flush()?;

        assert_eq!(fs::read_to_string(&path)?, "dddddddd\n");
        assert_eq!(fs::read_to_string(writer.backup_path(1))?, "cccccccc\n");
        assert_eq!(fs::read_to_string(writer.backup_path(2))?, "bbbbbbbb\n");
        // Only two backups are kept.
        assert!(!writer.backup_path(3).exists());
        Ok(())
    }

    #[test]
    fn test_rotating_writer_appends_to_existing_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("info.log");
        fs::write(&path, "old\n")?;
        let mut writer = RotatingFileWriter::open(&path, 1024, 1)?;
        writer.write_all(b"new\n")?;
        assert_eq!(fs::read_to_string(&path)?, "old\nnew\n");
        assert_eq!(writer.path(), path.as_path());
        Ok(())
    }

    #[test]
    fn test_rotating_writer_without_backups_truncates() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("info.log");
        let mut writer = RotatingFileWriter::open(&path, 4, 0)?;
        writer.write_all(b"abc\n")?;
        writer.write_all(b"xyz\n")?;
        assert_eq!(fs::read_to_string(&path)?, "xyz\n");
        assert!(!writer.backup_path(1).exists());
        Ok(())
    }
}
