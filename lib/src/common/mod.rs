//! # Common Utilities (`common`)
//!
//! File: lib/src/common/mod.rs
//!
//! ## Overview
//!
//! This module is the entry point for the shared helpers the pipeline steps
//! call directly. Infrastructure that the helpers themselves rely on
//! (errors, configuration, logging setup) lives in `core`.
//!
//! ## Architecture
//!
//! - **`fs`**: filesystem helpers (existence checks, moves, links, directory registry).
//! - **`process`**: running external commands, alone or as a parallel batch.
//! - **`ui`**: colored terminal text and banner headers.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pipeline_utils::common::{fs, process};
//! use pipeline_utils::core::error::Result;
//! use std::path::Path;
//!
//! # fn run_example() -> Result<()> {
//! let work_dir = Path::new("./run");
//! fs::io::ensure_dir_exists(work_dir)?;
//! process::run(["touch", "started"], work_dir)?;
//! # Ok(())
//! # }
//! ```
//!

/// Filesystem helpers (io, links, registry).
pub mod fs;
/// External command execution.
pub mod process;
/// Terminal presentation helpers.
pub mod ui;
