//! Input selection and file-list resolution
//!
//! An [`InputSelection`] is what the user picked: one folder, or an ordered
//! set of documents. [`InputSelection::resolve`] turns it into the list of
//! documents a run will convert.

use crate::config::Config;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// What the user selected as conversion input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSelection {
    /// Every matching document inside one folder
    Folder(PathBuf),
    /// Explicit documents, converted in the given order
    FileSet(Vec<PathBuf>),
}

impl InputSelection {
    /// Build a selection from command-line style paths.
    ///
    /// A single directory becomes [`InputSelection::Folder`]; anything else is
    /// taken as an explicit file set.
    pub fn from_paths(paths: Vec<PathBuf>) -> Option<Self> {
        match paths.as_slice() {
            [] => None,
            [single] if single.is_dir() => Some(InputSelection::Folder(single.clone())),
            _ => Some(InputSelection::FileSet(paths)),
        }
    }

    /// Build a selection from a typed path
    pub fn from_typed_path(text: &str) -> Result<Self> {
        let path = PathBuf::from(text.trim());
        if path.is_dir() {
            Ok(InputSelection::Folder(path))
        } else if path.is_file() {
            Ok(InputSelection::FileSet(vec![path]))
        } else {
            Err(Error::InputNotFound { path })
        }
    }

    /// Human-readable description for the confirmation screen
    pub fn describe(&self) -> String {
        match self {
            InputSelection::Folder(path) => path.display().to_string(),
            InputSelection::FileSet(paths) => paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Resolve the selection into the ordered list of documents to convert.
    ///
    /// An empty result is reported as [`Error::NoInputFound`].
    pub fn resolve(&self, config: &Config) -> Result<Vec<PathBuf>> {
        let files = match self {
            InputSelection::Folder(folder) => list_folder(folder, config)?,
            InputSelection::FileSet(paths) => paths.clone(),
        };

        if files.is_empty() {
            return Err(Error::NoInputFound {
                source_info: self.describe(),
                extension: config.extension.clone(),
            });
        }

        check_output_collisions(&files, config)?;

        debug!(count = files.len(), "Resolved input files");
        Ok(files)
    }
}

/// With a shared `output_dir`, documents with the same stem in different
/// folders would overwrite each other's PDF.
fn check_output_collisions(files: &[PathBuf], config: &Config) -> Result<()> {
    if config.output_dir.is_none() {
        return Ok(());
    }

    let mut seen: HashMap<PathBuf, &PathBuf> = HashMap::with_capacity(files.len());
    for file in files {
        let output = config.output_path_for(file);
        if let Some(first) = seen.get(&output) {
            return Err(Error::OutputCollision {
                first: (*first).clone(),
                second: file.clone(),
                output,
            });
        }
        seen.insert(output, file);
    }

    Ok(())
}

/// List matching documents in a folder, sorted by path
fn list_folder(folder: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(Error::InputNotFound {
            path: folder.to_path_buf(),
        });
    }

    let max_depth = if config.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            // The folder itself could not be read
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if config.is_lock_file(&name) {
            debug!(path = %entry.path().display(), "Skipping Word lock file");
            continue;
        }

        if config.matches_extension(&name) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
