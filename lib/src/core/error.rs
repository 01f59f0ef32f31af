//! # Pipeline Utilities Error Types
//!
//! File: lib/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types shared by every utility in the crate.
//! Two pieces work together:
//! - `UtilsError`: a `thiserror` enum naming the failures a caller may want to
//!   react to specifically (a command exiting non-zero, a missing input file,
//!   a link conflict, ...).
//! - `Result<T>`: an alias for `anyhow::Result<T>`, so functions can attach
//!   context with `.with_context(...)` while still carrying a `UtilsError`
//!   underneath.
//!
//! ## Examples
//!
//! Reacting to a specific failure from the process runner:
//!
//! ```rust,no_run
//! use pipeline_utils::common::process::{self, CommandSpec};
//! use pipeline_utils::core::error::UtilsError;
//!
//! # fn run_example() -> pipeline_utils::core::error::Result<()> {
//! let spec = CommandSpec::new(["false"], ".")?;
//! match process::run_command(&spec) {
//!     Ok(outcome) => println!("exit code {}", outcome.code()),
//!     Err(e) => match e.downcast_ref::<UtilsError>() {
//!         Some(UtilsError::CommandExecution { program, code, .. }) => {
//!             println!("{program} failed with {code}");
//!         }
//!         _ => return Err(e),
//!     },
//! }
//! # Ok(())
//! # }
//! ```
//!
use std::path::PathBuf;
use thiserror::Error;

/// One failed invocation inside a `run_pool` batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Position of the command in the submitted batch.
    pub index: usize,
    /// Program name (first token) of the failed command.
    pub program: String,
    /// Rendered error chain of the failure.
    pub message: String,
}

/// Custom error type for the pipeline utilities.
#[derive(Error, Debug)]
pub enum UtilsError {
    #[error("Cannot run an empty command")]
    EmptyCommand,

    #[error("Input file not found or unreadable: {}: {source}", .path.display())]
    InputFileMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start '{program}': {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command error running {program} (exit code {code}): {stderr}")]
    CommandExecution {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("{failed} of {total} pooled commands failed")]
    BatchFailed {
        failed: usize,
        total: usize,
        failures: Vec<BatchFailure>,
    },

    #[error("{name} not found at {}", .path.display())]
    PathNotFound { name: String, path: PathBuf },

    #[error("Path already exists and is not the expected link: {}", .path.display())]
    LinkConflict { path: PathBuf },

    #[error("Directory already exists: {}", .path.display())]
    DirectoryExists { path: PathBuf },

    #[error("No directory registered under key {key}")]
    UnknownDirectory { key: String },

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result using anyhow::Error, matching how the rest of the
/// crate adds context to failures.
pub type Result<T> = anyhow::Result<T>;
