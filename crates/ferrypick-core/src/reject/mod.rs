//! Reject (`.rej`) file parsing, classification and recovery.

pub mod analyzer;
pub mod document;

pub use analyzer::{
    classify, reject_target, ChangelogEntry, RejectAnalyzer, RejectOutcome, RejectVerdict,
    SkipReason, CHANGELOG_MARKER, RELEASE_FIELD,
};
pub use document::{RejectDocument, RejectHunk, RejectLine};
