//! # Pipeline Utilities
//!
//! File: lib/src/lib.rs
//!
//! ## Overview
//!
//! Shared helpers for data-processing pipelines that drive external tools.
//! The centerpiece is subprocess execution: run one command and check its
//! exit status, or run a batch of independent commands on a bounded pool of
//! workers. Around it sit the small pieces most pipelines end up needing:
//! filesystem helpers, a directory registry, colored terminal output, a TOML
//! configuration file and a logging setup.
//!
//! ## Architecture
//!
//! - **`common`**: the helpers pipeline steps call directly
//!     - `process`: `run_command`, `run` and `run_pool`
//!     - `fs`: existence checks, moves, symlinks, `DirectoryRegistry`
//!     - `ui`: `Colored` text and `Header` banners
//! - **`core`**: infrastructure behind the helpers
//!     - `error`: `UtilsError` and the `Result` alias
//!     - `config`: `Config` / `LoggingConfig` loaded from TOML
//!     - `logging`: `init_logging` and the log formatters
//!
//! Nothing in this crate installs a logger by itself. Helpers emit `tracing`
//! events; call `core::logging::init_logging` (or install any other
//! subscriber) to see them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pipeline_utils::{run_command, run_pool, CommandSpec, LoggingConfig, Result};
//! use std::path::Path;
//!
//! # fn run_example() -> Result<()> {
//! pipeline_utils::core::logging::init_logging(&LoggingConfig::default())?;
//!
//! let work_dir = Path::new("/data/run42");
//! let sorted = CommandSpec::new(["sort", "reads.txt"], work_dir)?
//!     .capture_output(true)
//!     .print_output_to_debug(true);
//! let outcome = run_command(&sorted)?;
//! println!("{} bytes sorted", outcome.stdout().map_or(0, |s| s.len()));
//!
//! run_pool(
//!     vec![vec!["gzip", "-k", "a.txt"], vec!["gzip", "-k", "b.txt"]],
//!     work_dir,
//! )?;
//! # Ok(())
//! # }
//! ```
//!

pub mod common;
pub mod core;

pub use crate::common::process::{
    run, run_command, run_pool, CommandArg, CommandOptions, CommandOutcome, CommandSpec,
};
pub use crate::core::config::{Config, LoggingConfig};
pub use crate::core::error::{Result, UtilsError};
