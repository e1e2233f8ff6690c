//! Git integration: worktree discovery and the `git am` apply mechanism.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::collaborators::VersionControl;
use crate::error::{FerrypickError, Result};

/// Top-level directory of the git worktree containing `dir`.
///
/// Runs `git rev-parse --show-toplevel`.
pub fn toplevel(git_program: &str, dir: &Path) -> Result<PathBuf> {
    let output = Command::new(git_program)
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(dir)
        .output()
        .map_err(|e| FerrypickError::Git(format!("failed to run {git_program}: {e}")))?;

    if !output.status.success() {
        return Err(FerrypickError::NotAWorktree(dir.to_path_buf()));
    }

    let top = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
    if top.is_empty() {
        return Err(FerrypickError::NotAWorktree(dir.to_path_buf()));
    }
    Ok(PathBuf::from(top))
}

/// Base name of the worktree root, used as the current package name.
pub fn package_name_of(root: &Path) -> Result<String> {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| FerrypickError::NotAWorktree(root.to_path_buf()))
}

/// Exit code of a finished process; termination by signal counts as 1.
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// `git am` driven through the git command line, run in the worktree root.
pub struct GitCli {
    program: String,
    root: PathBuf,
}

impl GitCli {
    pub fn new(program: &str, root: &Path) -> Self {
        Self {
            program: program.to_string(),
            root: root.to_path_buf(),
        }
    }

    /// Run git with inherited stdio so the user sees its output.
    fn run(&self, args: &[&str]) -> Result<i32> {
        info!(command = %format!("{} {}", self.program, args.join(" ")), "running");
        let status = Command::new(&self.program)
            .args(args)
            .current_dir(&self.root)
            .status()
            .map_err(|e| FerrypickError::Git(format!("failed to run {}: {e}", self.program)))?;
        Ok(exit_code(status))
    }
}

impl VersionControl for GitCli {
    fn apply_patch(&self, patch: &Path) -> Result<i32> {
        let patch = patch.to_string_lossy();
        self.run(&["am", "--committer-date-is-author-date", "--reject", &patch])
    }

    fn stage(&self, path: &Path) -> Result<()> {
        let path_arg = path.to_string_lossy();
        let code = self.run(&["add", &path_arg])?;
        if code != 0 {
            return Err(FerrypickError::Git(format!(
                "git add {} failed with exit code {code}",
                path.display()
            )));
        }
        Ok(())
    }

    fn continue_apply(&self) -> Result<i32> {
        self.run(&["am", "--continue"])
    }
}
