//! Patch application with release/changelog reject recovery.
//!
//! Flow: read or download the patch, rename spec paths to the current
//! package, write the transient patch file into the worktree, run
//! `git am --reject`. When that fails and no rejects pre-dated the run, each
//! spec reject is handed to the [`RejectAnalyzer`]; if nothing is left over
//! the spec files are staged and `git am --continue` is attempted.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::collaborators::{ChangelogUpdater, ContentFetcher, VersionControl};
use crate::config::FerrypickConfig;
use crate::error::Result;
use crate::link::PatchReference;
use crate::reject::{RejectAnalyzer, RejectOutcome};
use crate::rename::RenameRule;
use crate::worktree::Worktree;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// `git am` succeeded on the first attempt.
    Applied,
    /// Rejects were recovered and `git am --continue` succeeded.
    Resumed,
    /// `git am` failed and `.rej` files already existed before the run.
    RefusedPreexistingRejects { exit_code: i32 },
    /// Some rejects could not be recovered.
    Unresolved { exit_code: i32, remaining: Vec<PathBuf> },
    /// `git am --continue` failed after recovery.
    ResumeFailed { exit_code: i32 },
}

impl ApplyOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            ApplyOutcome::Applied | ApplyOutcome::Resumed => 0,
            ApplyOutcome::RefusedPreexistingRejects { exit_code }
            | ApplyOutcome::Unresolved { exit_code, .. }
            | ApplyOutcome::ResumeFailed { exit_code } => *exit_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == 0
    }
}

/// Orchestrates one ferrypick run against a worktree.
pub struct PatchApplicator<'a> {
    worktree: &'a Worktree,
    vcs: &'a dyn VersionControl,
    fetcher: &'a dyn ContentFetcher,
    updater: &'a dyn ChangelogUpdater,
    patch_file: PathBuf,
}

impl<'a> PatchApplicator<'a> {
    pub fn new(
        worktree: &'a Worktree,
        vcs: &'a dyn VersionControl,
        fetcher: &'a dyn ContentFetcher,
        updater: &'a dyn ChangelogUpdater,
        config: &FerrypickConfig,
    ) -> Self {
        Self {
            worktree,
            vcs,
            fetcher,
            updater,
            patch_file: worktree.resolve(&config.patch_file),
        }
    }

    /// Where the transient patch is written.
    pub fn patch_file(&self) -> &Path {
        &self.patch_file
    }

    /// Fetch, rename and apply `reference` for the package `current_name`.
    ///
    /// The patch file is removed on success and kept otherwise.
    pub fn apply(&self, reference: &PatchReference, current_name: &str) -> Result<ApplyOutcome> {
        let content = self.patch_content(reference)?;
        let rule = RenameRule::new(reference.original_name(), current_name)?;
        std::fs::write(&self.patch_file, rule.apply(&content))?;

        let outcome = self.apply_patch_file()?;
        if outcome.is_success() {
            std::fs::remove_file(&self.patch_file)?;
        } else {
            warn!(patch = %self.patch_file.display(), "patch stored for manual follow-up");
        }
        Ok(outcome)
    }

    fn patch_content(&self, reference: &PatchReference) -> Result<Vec<u8>> {
        match reference {
            PatchReference::Local { file_path } => Ok(std::fs::read(file_path)?),
            PatchReference::Remote { patch_url, .. } => self.fetcher.fetch(patch_url),
        }
    }

    /// Apply the already written patch file, recovering harmless rejects.
    pub fn apply_patch_file(&self) -> Result<ApplyOutcome> {
        let previous_rejects = self.worktree.has_rejects()?;
        let exit_code = self.vcs.apply_patch(&self.patch_file)?;
        if exit_code == 0 {
            return Ok(ApplyOutcome::Applied);
        }

        if previous_rejects {
            error!(
                exit_code,
                "not attempting to process rejected patches: there were pre-existing *.rej files in the worktree"
            );
            return Ok(ApplyOutcome::RefusedPreexistingRejects { exit_code });
        }
        error!(exit_code, patch = %self.patch_file.display(), "git am failed");

        let analyzer = RejectAnalyzer::new(self.updater);
        for reject in self.worktree.spec_rejects()? {
            info!(reject = %reject.display(), "processing rejects");
            if let RejectOutcome::Skipped(reason) = analyzer.process(&reject)? {
                info!(reject = %reject.display(), %reason, "reject kept");
            }
        }

        let remaining = self.worktree.rejects()?;
        if !remaining.is_empty() {
            for reject in &remaining {
                error!(reject = %reject.display(), "unresolved reject");
            }
            return Ok(ApplyOutcome::Unresolved {
                exit_code,
                remaining,
            });
        }

        for spec in self.worktree.spec_files()? {
            self.vcs.stage(self.worktree.relative(&spec))?;
        }
        let exit_code = self.vcs.continue_apply()?;
        if exit_code != 0 {
            error!(exit_code, "git am --continue failed");
            return Ok(ApplyOutcome::ResumeFailed { exit_code });
        }
        Ok(ApplyOutcome::Resumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ApplyOutcome::Applied.exit_code(), 0);
        assert_eq!(ApplyOutcome::Resumed.exit_code(), 0);
        assert_eq!(
            ApplyOutcome::RefusedPreexistingRejects { exit_code: 128 }.exit_code(),
            128
        );
        assert_eq!(
            ApplyOutcome::Unresolved {
                exit_code: 1,
                remaining: vec![PathBuf::from("foo.spec.rej")]
            }
            .exit_code(),
            1
        );
        assert!(!ApplyOutcome::ResumeFailed { exit_code: 2 }.is_success());
    }
}
