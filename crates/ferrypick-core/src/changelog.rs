//! Changelog updates through `rpmdev-bumpspec`.

use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::collaborators::ChangelogUpdater;
use crate::error::{FerrypickError, Result};

/// Runs `<program> -u <author> -c <changelog> <target>`.
pub struct BumpspecCommand {
    program: String,
}

impl BumpspecCommand {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl ChangelogUpdater for BumpspecCommand {
    fn update(&self, author: &str, changelog: &str, target: &Path) -> Result<()> {
        info!(program = %self.program, target = %target.display(), %author, "bumping spec");
        let output = Command::new(&self.program)
            .arg("-u")
            .arg(author)
            .arg("-c")
            .arg(changelog)
            .arg(target)
            .output()
            .map_err(|e| FerrypickError::ChangelogUpdate {
                target: target.to_path_buf(),
                reason: format!("failed to run {}: {e}", self.program),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FerrypickError::ChangelogUpdate {
                target: target.to_path_buf(),
                reason: format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}
