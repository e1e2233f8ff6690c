//! Scoped view of the working tree being patched.
//!
//! All reject and spec-file lookups go through a [`Worktree`] rooted at an
//! explicit directory, never through the process working directory.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::Result;

pub const REJECT_SUFFIX: &str = ".rej";
pub const SPEC_SUFFIX: &str = ".spec";

#[derive(Debug, Clone)]
pub struct Worktree {
    root: PathBuf,
}

impl Worktree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` against the root unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// `path` relative to the root, or unchanged when outside of it.
    pub fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Every `*.rej` file in the tree.
    pub fn rejects(&self) -> Result<Vec<PathBuf>> {
        self.files_ending_with(REJECT_SUFFIX)
    }

    /// Every `*.spec.rej` file in the tree.
    pub fn spec_rejects(&self) -> Result<Vec<PathBuf>> {
        self.files_ending_with(".spec.rej")
    }

    pub fn spec_files(&self) -> Result<Vec<PathBuf>> {
        self.files_ending_with(SPEC_SUFFIX)
    }

    pub fn has_rejects(&self) -> Result<bool> {
        Ok(!self.rejects()?.is_empty())
    }

    fn files_ending_with(&self, suffix: &str) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_git_dir(entry));
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(suffix)
            {
                found.push(entry.into_path());
            }
        }
        Ok(found)
    }
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == ".git"
}
