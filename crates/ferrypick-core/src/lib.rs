//! ferrypick core library
//!
//! Cherry-picks dist-git patches between packages that were renamed across
//! branches. Re-exports the components used by the `ferrypick` binary:
//!
//! - [`LinkClassifier`] turns forge commit/pull-request links into patch URLs
//! - [`RenameRule`] rewrites `a/<pkg>.spec` style paths to the current package
//! - [`RejectAnalyzer`] recovers release-bump/changelog-only rejects
//! - [`PatchApplicator`] ties them together around `git am --reject`

pub mod apply;
pub mod changelog;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod fakes;
pub mod fetch;
pub mod git;
pub mod link;
pub mod reject;
pub mod rename;
pub mod telemetry;
pub mod worktree;

pub use apply::{ApplyOutcome, PatchApplicator};
pub use changelog::BumpspecCommand;
pub use collaborators::{ChangelogUpdater, ContentFetcher, VersionControl};
pub use config::FerrypickConfig;
pub use error::{FerrypickError, Result};
pub use fetch::HttpFetcher;
pub use git::{package_name_of, toplevel, GitCli};
pub use link::{LinkClassifier, PatchReference, PKGNAME_PATTERN};
pub use reject::{
    classify, ChangelogEntry, RejectAnalyzer, RejectDocument, RejectOutcome, RejectVerdict,
    SkipReason,
};
pub use rename::{rename, RenameRule};
pub use telemetry::init_tracing;
pub use worktree::Worktree;
