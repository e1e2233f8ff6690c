//! Traits for the external collaborators of the applicator.
//!
//! Production implementations live in [`crate::fetch`], [`crate::git`] and
//! [`crate::changelog`]; [`crate::fakes`] provides scripted doubles.

use std::path::Path;

use crate::error::Result;

/// Downloads patch content.
pub trait ContentFetcher {
    /// Blocking GET of `url`. Non-success statuses are errors.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// The patch-apply mechanism of the version control system.
///
/// Apply and continue return the process exit code instead of an error so
/// that the applicator can propagate it unchanged.
pub trait VersionControl {
    /// Apply a mailbox patch, writing `.rej` files for failed hunks.
    fn apply_patch(&self, patch: &Path) -> Result<i32>;

    /// Stage `path` (relative to the worktree root). Failure is an error.
    fn stage(&self, path: &Path) -> Result<()>;

    /// Resume an interrupted apply after conflicts were staged.
    fn continue_apply(&self) -> Result<i32>;
}

/// Adds a changelog stanza to a spec file and bumps its `Release:` field.
pub trait ChangelogUpdater {
    fn update(&self, author: &str, changelog: &str, target: &Path) -> Result<()>;
}
