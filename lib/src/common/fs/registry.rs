//! # Directory Registry
//!
//! File: lib/src/common/fs/registry.rs
//!
//! ## Overview
//!
//! A pipeline run produces a handful of directories (inputs, intermediate
//! results per step, final outputs, logs). `DirectoryRegistry` creates them
//! under one root and remembers them by key, so later steps can ask for
//! "the alignment directory" instead of rebuilding paths by hand.
//!
//! Keys can be any `Eq + Hash + Debug` type. `DirectoryKind` covers the usual
//! steps; pipelines with their own stages can use their own enum or plain strings.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pipeline_utils::common::fs::registry::{DirectoryKind, DirectoryRegistry};
//! use pipeline_utils::core::error::Result;
//!
//! # fn run_example() -> Result<()> {
//! let mut dirs = DirectoryRegistry::new("/data/run42");
//! dirs.make_directory(DirectoryKind::Intermediate, "tmp", true)?;
//! dirs.make_directory(DirectoryKind::Output, "results", false)?;
//!
//! let out = dirs.get_directory(&DirectoryKind::Output)?;
//! println!("writing to {}", out.display());
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{Result, UtilsError};
use anyhow::Context;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Common directory roles in a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryKind {
    Input,
    Intermediate,
    Output,
    Logs,
    Scratch,
}

/// Keeps track of the directories of one pipeline run, keyed by `K`.
#[derive(Debug, Clone)]
pub struct DirectoryRegistry<K = DirectoryKind> {
    root_path: PathBuf,
    directories: HashMap<K, PathBuf>,
}

impl<K> DirectoryRegistry<K>
where
    K: Eq + Hash + Debug,
{
    /// Creates an empty registry. The root itself is not created.
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            directories: HashMap::new(),
        }
    }

    /// The root every `make_directory` call is relative to.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Looks up a registered directory.
    ///
    /// # Errors
    ///
    /// Returns `UtilsError::UnknownDirectory` if nothing is registered under `key`.
    pub fn get_directory(&self, key: &K) -> Result<&Path> {
        self.directories
            .get(key)
            .map(PathBuf::as_path)
            .ok_or_else(|| {
                UtilsError::UnknownDirectory {
                    key: format!("{:?}", key),
                }
                .into()
            })
    }

    /// Registers `path` under `key`, creating the directory if it is missing.
    ///
    /// An already-existing directory is accepted with a warning when `exist_ok`
    /// is set (the warning is skipped with `suppress_warning`), and rejected
    /// otherwise. Registering a key again replaces the previous path.
    ///
    /// # Errors
    ///
    /// - `UtilsError::DirectoryExists` if the directory exists and `exist_ok` is false.
    /// - Creating the directory fails.
    pub fn register_directory(
        &mut self,
        key: K,
        path: impl Into<PathBuf>,
        exist_ok: bool,
        suppress_warning: bool,
    ) -> Result<&Path> {
        let path = path.into();
        debug!("Registering directory {:?} as {:?}", path, key);

        if !path.exists() {
            debug!("Directory not found, making directory");
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory {:?}", path))?;
        } else if exist_ok {
            if !suppress_warning {
                warn!(
                    "Directory {:?} already exists, existing data may be overwritten!",
                    path
                );
            }
        } else {
            error!("Directory {:?} already exists.", path);
            anyhow::bail!(UtilsError::DirectoryExists { path });
        }

        let stored = match self.directories.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.insert(path);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(path),
        };
        Ok(stored.as_path())
    }

    /// Registers `root_path/name` under `key`. See `register_directory`.
    pub fn make_directory(&mut self, key: K, name: &str, exist_ok: bool) -> Result<&Path> {
        let path = self.root_path.join(name);
        self.register_directory(key, path, exist_ok, false)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.directories.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// All registered `(key, path)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Path)> {
        self.directories
            .iter()
            .map(|(key, path)| (key, path.as_path()))
    }
}
