//! # Logging Integration Tests
//!
//! File: lib/tests/logging.rs
//!
//! ## Overview
//!
//! `init_logging` installs a process-wide subscriber, which can only happen
//! once per test binary. Everything that needs the global subscriber therefore
//! lives in a single test here.
//!

mod common;

use pipeline_utils::core::config::LoggingConfig;
use pipeline_utils::core::logging::{init_logging, ERROR_LOG_FILE, INFO_LOG_FILE};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_init_logging_writes_log_files() {
    std::env::remove_var("RUST_LOG");
    let dir = tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    let config = LoggingConfig {
        log_to_file: true,
        log_dir: log_dir.to_string_lossy().into_owned(),
        ..LoggingConfig::default()
    };

    init_logging(&config).unwrap();
    assert!(log_dir.is_dir());

    tracing::debug!(target: "pipeline::qc", "not written anywhere");
    tracing::info!(target: "pipeline::qc", "sample loaded");
    tracing::warn!(target: "pipeline::qc", "low coverage");

    let info = fs::read_to_string(log_dir.join(INFO_LOG_FILE)).unwrap();
    let errors = fs::read_to_string(log_dir.join(ERROR_LOG_FILE)).unwrap();

    assert!(info.contains("sample loaded"));
    assert!(info.contains("low coverage"));
    assert!(info.contains("pipeline::qc"));
    assert!(!info.contains("not written anywhere"));
    assert!(!info.contains('\x1b'));

    assert!(!errors.contains("sample loaded"));
    assert!(errors.contains("WARN"));
    assert!(errors.contains("low coverage"));

    // A second installation is refused instead of panicking.
    assert!(init_logging(&LoggingConfig::default()).is_err());
}
