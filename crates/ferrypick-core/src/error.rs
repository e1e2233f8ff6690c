//! Error taxonomy for ferrypick.

use std::path::PathBuf;

/// Errors produced while resolving, fetching or applying a patch.
///
/// Apply failures and unrecognised reject shapes are not errors: they are
/// reported through [`crate::ApplyOutcome`] with the exit code of the
/// underlying `git am` invocation.
#[derive(Debug, thiserror::Error)]
pub enum FerrypickError {
    /// The reference is neither an existing file nor a known forge link.
    #[error("unrecognized link: {0}")]
    UnrecognizedLink(String),

    #[error("failed to download {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("git error: {0}")]
    Git(String),

    #[error("changelog update of {} failed: {}", .target.display(), .reason)]
    ChangelogUpdate { target: PathBuf, reason: String },

    #[error("not inside a git worktree: {}", .0.display())]
    NotAWorktree(PathBuf),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to walk worktree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ferrypick operations.
pub type Result<T> = std::result::Result<T, FerrypickError>;
