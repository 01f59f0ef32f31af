//! # Filesystem Link Operations
//!
//! File: lib/src/common/fs/links.rs
//!
//! ## Overview
//!
//! Pipeline steps often expose an input under a second name instead of copying
//! it (e.g. linking a reference genome into a step's working directory). This
//! module provides `link`, which creates such a symbolic link and is safe to
//! call again on a re-run.
//!
//! ## Architecture
//!
//! `link(source, target)`:
//! - **Source Validation:** the `source` must exist, otherwise `UtilsError::PathNotFound`.
//! - **Target Parent Creation:** the parent directory of `target` is created if needed.
//! - **Existing Target Handling:**
//!     - A symlink at `target` that already resolves to `source` is left alone (idempotent).
//!     - Anything else at `target` (regular file, directory, a link pointing
//!       elsewhere, a dangling link) is a `UtilsError::LinkConflict`. Existing
//!       data is never replaced or renamed.
//! - **Platform-Specific Link Creation:** `std::os::unix::fs::symlink` on Unix,
//!   `symlink_dir`/`symlink_file` on Windows.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pipeline_utils::common::fs::links;
//! use pipeline_utils::core::error::Result;
//! use std::path::Path;
//!
//! # fn run_example() -> Result<()> {
//! let reference = Path::new("/refs/GRCh38.fa");
//! let step_input = Path::new("/data/run42/align/genome.fa");
//! links::link(reference, step_input)?;
//! // Running it again is fine.
//! links::link(reference, step_input)?;
//! # Ok(())
//! # }
//! ```
//!
use crate::common::fs::io::ensure_dir_exists; // Helper from sibling io module
use crate::core::error::{Result, UtilsError};
use anyhow::Context;
use std::path::Path;
use tracing::{debug, error, info};

/// Creates a symbolic link at `target` pointing to `source`.
///
/// # Errors
///
/// Returns an `Err` if:
/// - The `source` path does not exist (`UtilsError::PathNotFound`).
/// - Something other than a link to `source` already exists at `target` (`UtilsError::LinkConflict`).
/// - The parent directory of `target` cannot be created.
/// - Creating the symbolic link itself fails (e.g., permissions, unsupported filesystem).
pub fn link(source: &Path, target: &Path) -> Result<()> {
    debug!("Symlinking {:?} to {:?}", source, target);

    if !source.exists() {
        error!("Input file {:?} does not exist", source);
        anyhow::bail!(UtilsError::PathNotFound {
            name: "Link source".to_string(),
            path: source.to_path_buf(),
        });
    }

    // `symlink_metadata` does not follow links, so dangling links are seen too.
    if target.symlink_metadata().is_ok() {
        if let Ok(existing_link_target) = std::fs::read_link(target) {
            debug!("Symlink already exists to {:?}", existing_link_target);
            if points_to(target, &existing_link_target, source) {
                debug!("Correct symlink already exists, skipping.");
                return Ok(());
            }
            error!(
                "Symlink {:?} already exists to a different file, please delete or resolve.",
                target
            );
        } else {
            error!("File already exists at {:?}", target);
        }
        anyhow::bail!(UtilsError::LinkConflict {
            path: target.to_path_buf(),
        });
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_exists(parent).with_context(|| {
                format!("Failed to create parent directory for target {:?}", target)
            })?;
        }
    }

    create_platform_symlink(source, target)?;
    info!("Created symlink: {:?} -> {:?}", target, source);
    Ok(())
}

/// Whether the link at `link_path`, whose raw content is `link_content`,
/// resolves to the same place as `source`.
fn points_to(link_path: &Path, link_content: &Path, source: &Path) -> bool {
    // Relative link contents are relative to the link's own directory.
    let link_parent = link_path.parent().unwrap_or_else(|| Path::new("."));
    let resolved_existing = link_parent.join(link_content);
    match (resolved_existing.canonicalize(), source.canonicalize()) {
        (Ok(existing), Ok(expected)) => existing == expected,
        // A dangling link never matches an existing source.
        _ => false,
    }
}

#[cfg(unix)]
fn create_platform_symlink(source: &Path, target: &Path) -> Result<()> {
    std::os::unix::fs::symlink(source, target)
        .with_context(|| format!("Failed to create symlink from {:?} to {:?}", source, target))
}

#[cfg(windows)]
fn create_platform_symlink(source: &Path, target: &Path) -> Result<()> {
    // Windows requires different functions for file vs. directory links.
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target).with_context(|| {
            format!(
                "Failed to create directory symlink from {:?} to {:?}",
                source, target
            )
        })
    } else {
        std::os::windows::fs::symlink_file(source, target).with_context(|| {
            format!(
                "Failed to create file symlink from {:?} to {:?}",
                source, target
            )
        })
    }
}

#[cfg(not(any(unix, windows)))]
fn create_platform_symlink(_source: &Path, _target: &Path) -> Result<()> {
    anyhow::bail!("Symlink creation not implemented for this platform.")
}

// --- Unit Tests ---
#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_link_basic() -> Result<()> {
        let dir = tempdir()?;
        let source_file = dir.path().join("source.txt");
        let target_link = dir.path().join("target.link");
        fs::write(&source_file, "test")?;
        link(&source_file, &target_link)?;
        assert!(target_link.is_symlink(), "Target should be a symlink");
        assert_eq!(fs::read_link(&target_link)?, source_file);
        Ok(())
    }

    #[test]
    fn test_link_creates_parent_directories() -> Result<()> {
        let dir = tempdir()?;
        let source_file = dir.path().join("genome.fa");
        let target_link = dir.path().join("step/align/genome.fa");
        fs::write(&source_file, ">chr1")?;
        link(&source_file, &target_link)?;
        assert_eq!(fs::read_to_string(&target_link)?, ">chr1");
        Ok(())
    }

    #[test]
    fn test_link_already_correct() -> Result<()> {
        let dir = tempdir()?;
        let source_file = dir.path().join("source.txt");
        let target_link = dir.path().join("target.link");
        fs::write(&source_file, "test")?;
        std::os::unix::fs::symlink(&source_file, &target_link)?;
        link(&source_file, &target_link)?;
        assert_eq!(fs::read_link(&target_link)?, source_file);
        Ok(())
    }

    #[test]
    fn test_link_relative_existing_link_is_accepted() -> Result<()> {
        let dir = tempdir()?;
        let source_file = dir.path().join("source.txt");
        let target_link = dir.path().join("target.link");
        fs::write(&source_file, "test")?;
        std::os::unix::fs::symlink("source.txt", &target_link)?;
        link(&source_file, &target_link)?;
        Ok(())
    }

    #[test]
    fn test_link_points_elsewhere_is_conflict() -> Result<()> {
        let dir = tempdir()?;
        let source_file = dir.path().join("source.txt");
        let other_file = dir.path().join("other.txt");
        let target_link = dir.path().join("target.link");
        fs::write(&source_file, "source")?;
        fs::write(&other_file, "other")?;
        std::os::unix::fs::symlink(&other_file, &target_link)?;

        let err = link(&source_file, &target_link).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UtilsError>(),
            Some(UtilsError::LinkConflict { .. })
        ));
        // Existing link is left as it was.
        assert_eq!(fs::read_link(&target_link)?, other_file);
        Ok(())
    }

    #[test]
    fn test_link_regular_file_is_conflict() -> Result<()> {
        let dir = tempdir()?;
        let source_file = dir.path().join("source.txt");
        let target = dir.path().join("target.txt");
        fs::write(&source_file, "source")?;
        fs::write(&target, "keep me")?;

        let err = link(&source_file, &target).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UtilsError>(),
            Some(UtilsError::LinkConflict { .. })
        ));
        assert_eq!(fs::read_to_string(&target)?, "keep me");
        Ok(())
    }

    #[test]
    fn test_link_dangling_target_is_conflict() -> Result<()> {
        let dir = tempdir()?;
        let source_file = dir.path().join("source.txt");
        let target_link = dir.path().join("target.link");
        fs::write(&source_file, "source")?;
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), &target_link)?;
        assert!(link(&source_file, &target_link).is_err());
        Ok(())
    }

    #[test]
    fn test_link_source_missing() {
        let dir = tempdir().unwrap();
        let source_file = dir.path().join("nonexistent_source.txt");
        let target_link = dir.path().join("target.link");
        let err = link(&source_file, &target_link).unwrap_err();
        assert!(err.to_string().contains("Link source not found"));
        assert!(target_link.symlink_metadata().is_err());
    }
}
