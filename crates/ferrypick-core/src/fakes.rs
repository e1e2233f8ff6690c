//! In-process fakes for the collaborator traits (testing only)
//!
//! Provides `StaticFetcher`, `ScriptedVcs` and `RecordingUpdater`, which
//! satisfy the collaborator contracts without network access, git or
//! `rpmdev-bumpspec`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::collaborators::{ChangelogUpdater, ContentFetcher, VersionControl};
use crate::error::{FerrypickError, Result};

// ---------------------------------------------------------------------------
// StaticFetcher
// ---------------------------------------------------------------------------

/// Serves canned responses keyed by URL and records every request.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Vec<u8>>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.to_string(), body.into());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl ContentFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requested.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| FerrypickError::Fetch {
                url: url.to_string(),
                reason: "404 Not Found".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// ScriptedVcs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Apply(PathBuf),
    Stage(PathBuf),
    Continue,
}

/// Version control double with scripted exit codes.
///
/// On `apply_patch` it captures the patch content and writes the configured
/// reject files (relative to `root`), imitating `git am --reject`.
#[derive(Debug)]
pub struct ScriptedVcs {
    root: PathBuf,
    apply_code: i32,
    continue_code: i32,
    rejects: Vec<(PathBuf, String)>,
    calls: Mutex<Vec<VcsCall>>,
    applied: Mutex<Option<Vec<u8>>>,
}

impl ScriptedVcs {
    /// A VCS whose apply and continue both succeed.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            apply_code: 0,
            continue_code: 0,
            rejects: Vec::new(),
            calls: Mutex::new(Vec::new()),
            applied: Mutex::new(None),
        }
    }

    pub fn apply_exit(mut self, code: i32) -> Self {
        self.apply_code = code;
        self
    }

    pub fn continue_exit(mut self, code: i32) -> Self {
        self.continue_code = code;
        self
    }

    /// Write `content` to `path` when the patch is applied.
    pub fn with_reject(mut self, path: &str, content: &str) -> Self {
        self.rejects.push((PathBuf::from(path), content.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Content of the patch file at the time it was applied.
    pub fn applied_content(&self) -> Option<Vec<u8>> {
        self.applied.lock().unwrap().clone()
    }
}

impl VersionControl for ScriptedVcs {
    fn apply_patch(&self, patch: &Path) -> Result<i32> {
        self.calls
            .lock()
            .unwrap()
            .push(VcsCall::Apply(patch.to_path_buf()));
        *self.applied.lock().unwrap() = Some(std::fs::read(patch)?);
        for (path, content) in &self.rejects {
            std::fs::write(self.root.join(path), content)?;
        }
        Ok(self.apply_code)
    }

    fn stage(&self, path: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(VcsCall::Stage(path.to_path_buf()));
        Ok(())
    }

    fn continue_apply(&self) -> Result<i32> {
        self.calls.lock().unwrap().push(VcsCall::Continue);
        Ok(self.continue_code)
    }
}

// ---------------------------------------------------------------------------
// RecordingUpdater
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub author: String,
    pub changelog: String,
    pub target: PathBuf,
}

/// Changelog updater that records its calls.
///
/// `bumping()` additionally edits the target like `rpmdev-bumpspec` would:
/// the first `Release:` number is incremented and a stanza with a fixed date
/// is inserted below `%changelog`.
#[derive(Debug, Default)]
pub struct RecordingUpdater {
    fail: bool,
    edit: bool,
    calls: Mutex<Vec<UpdateCall>>,
}

impl RecordingUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn bumping() -> Self {
        Self {
            edit: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<UpdateCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChangelogUpdater for RecordingUpdater {
    fn update(&self, author: &str, changelog: &str, target: &Path) -> Result<()> {
        self.calls.lock().unwrap().push(UpdateCall {
            author: author.to_string(),
            changelog: changelog.to_string(),
            target: target.to_path_buf(),
        });
        if self.fail {
            return Err(FerrypickError::ChangelogUpdate {
                target: target.to_path_buf(),
                reason: "scripted failure".to_string(),
            });
        }
        if self.edit {
            let spec = std::fs::read_to_string(target)?;
            std::fs::write(target, bump_spec(&spec, author, changelog))?;
        }
        Ok(())
    }
}

/// Minimal stand-in for `rpmdev-bumpspec`.
pub fn bump_spec(spec: &str, author: &str, changelog: &str) -> String {
    let mut out = String::with_capacity(spec.len() + changelog.len() + 64);
    let mut bumped = false;
    for line in spec.split_inclusive('\n') {
        if !bumped {
            if let Some(value) = line.strip_prefix("Release:") {
                let value = value.trim_start();
                let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
                if let Ok(release) = digits.parse::<u64>() {
                    out.push_str(&format!("Release: {}{}", release + 1, &value[digits.len()..]));
                    bumped = true;
                    continue;
                }
            }
        }
        out.push_str(line);
        if line.trim() == "%changelog" {
            out.push_str(&format!("* Thu Jan 01 1970 {author}\n{changelog}\n\n"));
        }
    }
    out
}
