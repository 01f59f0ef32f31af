//! # Filesystem I/O Operations
//!
//! File: lib/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Small wrappers around `std::fs` used by pipeline steps to validate inputs
//! and shuffle results between directories. Every function logs what it does
//! and attaches context to I/O errors.
//!
//! ## Architecture
//!
//! - **`check_exists`**: Resolves a path to an absolute one and fails with
//!   `UtilsError::PathNotFound` if nothing is there. Returns the resolved path so
//!   it can be used inline: `let reads = check_exists(&reads, "Reads file")?;`.
//! - **`ensure_dir_exists`**: `mkdir -p`, refusing paths that exist as files.
//! - **`read_file_to_string`**: `fs::read_to_string` with context.
//! - **`move_to_directory`**: Moves a file or directory into another directory,
//!   keeping its name. A plain rename is tried first; when that fails (for
//!   example across filesystems) the move falls back to `fs_extra`'s
//!   copy-and-delete.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pipeline_utils::common::fs::io;
//! use pipeline_utils::core::error::Result;
//! use std::path::Path;
//!
//! # fn run_example() -> Result<()> {
//! let reads = io::check_exists(Path::new("reads.fq"), "Reads file")?;
//! io::ensure_dir_exists(Path::new("results/qc"))?;
//! let moved = io::move_to_directory(&reads, Path::new("results/qc"))?;
//! println!("now at {}", moved.display());
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{Result, UtilsError}; // Crate-wide Result and error enum
use anyhow::Context; // For adding context to errors
use std::fs; // Standard filesystem module
use std::path::{Path, PathBuf}; // Filesystem path types
use tracing::{debug, error, info, warn}; // Logging utilities

/// Checks that `path` exists and returns it in absolute form.
///
/// Existing paths are canonicalized (symlinks resolved). `name` only appears in
/// log and error messages, e.g. `"Reference genome"`.
///
/// # Errors
///
/// Returns `UtilsError::PathNotFound` if nothing exists at `path`.
pub fn check_exists(path: &Path, name: &str) -> Result<PathBuf> {
    let resolved = match path.canonicalize() {
        Ok(canonical) => canonical,
        // Not resolvable, most likely missing. Keep an absolute path for the message.
        Err(_) if path.is_absolute() => path.to_path_buf(),
        Err(_) => std::env::current_dir()
            .context("Failed to get current directory")?
            .join(path),
    };
    if !resolved.exists() {
        error!(
            "{} not found at {}, path does not exist",
            name,
            resolved.display()
        );
        anyhow::bail!(UtilsError::PathNotFound {
            name: name.to_string(),
            path: resolved,
        });
    }
    debug!("{} found at {}", name, resolved.display());
    Ok(resolved)
}

/// Ensures that a directory exists at the specified path.
///
/// Missing directories are created together with their parents (like `mkdir -p`).
///
/// # Errors
///
/// Returns an `Err` if:
/// - The path exists but is not a directory.
/// - Creating the directory fails (e.g., due to permissions).
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        // Path does not exist, create it recursively.
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        // It exists but is something else (e.g., a file).
        anyhow::bail!(UtilsError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string, with the file name in the error.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Moves `input_path` into `output_directory`, keeping its file name.
///
/// # Returns
///
/// * `Result<PathBuf>` - The new location, `output_directory/<name>`.
///
/// # Errors
///
/// Returns an `Err` if:
/// - `input_path` does not exist (`UtilsError::PathNotFound`).
/// - `output_directory` does not exist or is not a directory (`UtilsError::PathNotFound`).
/// - `input_path` has no file name (e.g. `/` or `..`).
/// - Both the rename and the copy-and-delete fallback fail.
pub fn move_to_directory(input_path: &Path, output_directory: &Path) -> Result<PathBuf> {
    debug!("Moving {:?} to {:?}", input_path, output_directory);

    // `symlink_metadata` so that a dangling symlink still counts as movable.
    if input_path.symlink_metadata().is_err() {
        error!("Input path {:?} does not exist", input_path);
        anyhow::bail!(UtilsError::PathNotFound {
            name: "Input path".to_string(),
            path: input_path.to_path_buf(),
        });
    }
    if !output_directory.is_dir() {
        error!("Output directory {:?} does not exist", output_directory);
        anyhow::bail!(UtilsError::PathNotFound {
            name: "Output directory".to_string(),
            path: output_directory.to_path_buf(),
        });
    }

    let file_name = input_path.file_name().ok_or_else(|| {
        UtilsError::FileSystem(format!("Cannot move {:?}: path has no file name", input_path))
    })?;
    let destination = output_directory.join(file_name);

    if let Err(rename_err) = fs::rename(input_path, &destination) {
        warn!(
            "Rename of {:?} failed ({}), falling back to copy and delete",
            input_path, rename_err
        );
        move_by_copy(input_path, output_directory, &destination)?;
    }

    info!("Moved {:?} to {:?}", input_path, destination);
    Ok(destination)
}

/// Copy-and-delete move through `fs_extra`, used when a rename is not possible.
fn move_by_copy(input_path: &Path, output_directory: &Path, destination: &Path) -> Result<()> {
    if input_path.is_dir() {
        // `move_dir` places `input_path` inside `output_directory` under its own name.
        let options = fs_extra::dir::CopyOptions::new();
        fs_extra::dir::move_dir(input_path, output_directory, &options).map_err(|e| {
            anyhow::anyhow!(e).context(format!(
                "Failed to move directory {:?} to {:?}",
                input_path, output_directory
            ))
        })?;
    } else {
        let options = fs_extra::file::CopyOptions::new();
        fs_extra::file::move_file(input_path, destination, &options).map_err(|e| {
            anyhow::anyhow!(e).context(format!(
                "Failed to move file {:?} to {:?}",
                input_path, destination
            ))
        })?;
    }
    Ok(())
}
