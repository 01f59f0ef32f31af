//! # Filesystem Utilities (`common::fs`)
//!
//! File: lib/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! This module groups the filesystem helpers used by pipeline steps:
//! validating that inputs exist, creating and tracking output directories,
//! moving results around and linking shared inputs into step directories.
//!
//! ## Architecture
//!
//! Functionality is delegated to the following submodules:
//!
//! - **`io`**: existence checks (`check_exists`), `ensure_dir_exists`,
//!   `read_file_to_string` and `move_to_directory`.
//! - **`links`**: idempotent symbolic link creation (`link`).
//! - **`registry`**: `DirectoryRegistry`, the keyed record of a run's directories.
//!
//! Callers import the submodule they need, e.g. `use pipeline_utils::common::fs::io;`.
//!

/// Existence checks, directory creation, reads and moves.
pub mod io;
/// Symbolic link creation.
pub mod links;
/// Keyed registry of a pipeline run's directories.
pub mod registry;
