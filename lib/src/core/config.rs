//! # Configuration System
//!
//! File: lib/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads the utilities' configuration from a TOML file. Today the
//! only section is `[logging]`, which drives `core::logging::init_logging`.
//!
//! ## Architecture
//!
//! - Structured data models (`Config`, `LoggingConfig`) are deserialized with
//!   `serde`, rejecting unknown fields so typos surface immediately.
//! - Missing fields fall back to the defaults defined in this file.
//! - Paths are expanded (`~` to the home directory) after parsing.
//! - The result is validated before being handed out.
//!
//! A `Config` is a plain value: build one (from a file or in code) and pass it
//! by reference to whatever needs it. Nothing here keeps global state.
//!
//! ## Examples
//!
//! ```toml
//! [logging]
//! target = "pipeline"
//! debug_console = true
//! log_to_file = true
//! log_dir = "~/pipeline/logs"
//! max_bytes = 1048576
//! backup_count = 100
//! ```
//!
//! ```rust,no_run
//! use pipeline_utils::core::{config, logging};
//! use std::path::Path;
//!
//! # fn run_example() -> pipeline_utils::core::error::Result<()> {
//! let cfg = config::load_config(Path::new("pipeline.toml"))?;
//! logging::init_logging(&cfg.logging)?;
//! # Ok(())
//! # }
//! ```
//!
use crate::common::fs::io::read_file_to_string;
use crate::core::error::{Result, UtilsError};
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Top-level configuration, one field per TOML table.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for `core::logging::init_logging`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Tracing target (module path prefix) to log for. Empty means everything.
    #[serde(default)]
    pub target: String,
    /// Log at debug level to the console with the verbose, colored format.
    #[serde(default)]
    pub debug_console: bool,
    /// Also write `info.log` (rotating) and `error.log` in `log_dir`.
    #[serde(default)]
    pub log_to_file: bool,
    /// Directory for log files (can use ~). Will be expanded.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Size at which `info.log` is rotated.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    /// Number of rotated `info.log.N` files kept.
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            debug_console: false,
            log_to_file: false,
            log_dir: default_log_dir(),
            max_bytes: default_max_bytes(),
            backup_count: default_backup_count(),
        }
    }
}

impl LoggingConfig {
    /// Defaults, logging only events under `target`.
    pub fn for_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn log_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.log_dir)
    }
}

fn default_log_dir() -> String {
    ".".to_string()
}
fn default_max_bytes() -> u64 {
    1024 * 1024
}
fn default_backup_count() -> usize {
    100
}

/// Loads, expands and validates the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    info!("Loading configuration from: {}", path.display());
    let content = read_file_to_string(path)?;
    parse_config(&content)
        .with_context(|| format!("Invalid configuration file: {}", path.display()))
}

/// Parses, expands and validates configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content).context("Failed to parse TOML")?;
    expand_config_paths(&mut config);
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn expand_config_paths(config: &mut Config) {
    config.logging.log_dir = shellexpand::tilde(&config.logging.log_dir).into_owned();
    debug!("Expanded log directory: {}", config.logging.log_dir);
}

fn validate_config(config: &Config) -> Result<()> {
    let logging = &config.logging;
    if logging.log_dir.is_empty() {
        return Err(anyhow!(UtilsError::Config(
            "log_dir cannot be empty".to_string()
        )));
    }
    if logging.max_bytes == 0 {
        return Err(anyhow!(UtilsError::Config(
            "max_bytes must be greater than zero".to_string()
        )));
    }
    let log_dir = logging.log_dir_path();
    if !log_dir.exists() {
        if logging.log_to_file {
            warn!(
                "Log directory '{}' does not exist yet, it will be created.",
                log_dir.display()
            );
        }
    } else if !log_dir.is_dir() {
        return Err(anyhow!(UtilsError::Config(format!(
            "Configured log directory '{}' exists but is not a directory.",
            log_dir.display()
        ))));
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_basic_toml() {
        let toml_content = r#"
            [logging]
            target = "pipeline"
            debug_console = true
            log_dir = "/var/log/pipeline"
        "#;

        let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");

        assert_eq!(config.logging.target, "pipeline");
        assert!(config.logging.debug_console);
        assert!(!config.logging.log_to_file); // Default
        assert_eq!(config.logging.log_dir, "/var/log/pipeline");
        assert_eq!(config.logging.max_bytes, 1_048_576); // Default
        assert_eq!(config.logging.backup_count, 100); // Default
    }

    #[test]
    fn test_empty_document_uses_defaults() -> Result<()> {
        let config = parse_config("")?;
        assert_eq!(config, Config::default());
        assert_eq!(config.logging.log_dir, ".");
        Ok(())
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = parse_config("[logging]\nlevel = \"debug\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_path_expansion() -> Result<()> {
        let config = parse_config("[logging]\nlog_dir = \"~/pipeline_logs_test\"\n")?;
        let home_dir = dirs::home_dir().unwrap();
        assert_eq!(
            config.logging.log_dir,
            home_dir.join("pipeline_logs_test").to_string_lossy()
        );
        Ok(())
    }

    #[test]
    fn test_validate_zero_max_bytes() {
        let err = parse_config("[logging]\nmax_bytes = 0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("max_bytes must be greater than zero"));
    }

    #[test]
    fn test_validate_log_dir_is_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("not_a_dir");
        fs::write(&file_path, "").unwrap();

        let config = Config {
            logging: LoggingConfig {
                log_dir: file_path.to_string_lossy().to_string(),
                ..Default::default()
            },
        };
        let result = validate_config(&config);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("is not a directory"));
    }

    #[test]
    fn test_load_config_from_file() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("pipeline.toml");
        fs::write(
            &path,
            format!(
                "[logging]\nlog_to_file = true\nlog_dir = {:?}\n",
                temp_dir.path().to_string_lossy()
            ),
        )?;
        let config = load_config(&path)?;
        assert!(config.logging.log_to_file);
        assert_eq!(config.logging.log_dir_path(), temp_dir.path());
        Ok(())
    }

    #[test]
    fn test_for_target() {
        let cfg = LoggingConfig::for_target("pipeline::align");
        assert_eq!(cfg.target, "pipeline::align");
        assert!(!cfg.debug_console);
    }
}
