//! Recognition and recovery of release-bump/changelog-only rejects.
//!
//! A spec-file reject is harmless when every edit it carries is either a
//! `Release:` field change or an addition below `%changelog`. Such a reject
//! is resolved by re-creating the changelog stanza with the changelog
//! updater (which also bumps `Release:`) and deleting the `.rej` file.
//! Everything else is left for a human.

use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use super::document::{RejectDocument, RejectLine};
use crate::collaborators::ChangelogUpdater;
use crate::error::Result;

pub const CHANGELOG_MARKER: &str = "%changelog";
pub const RELEASE_FIELD: &str = "Release:";

/// `* Mon Oct 05 2020 Jane Doe <jane@example.com> - 3.9.0-4`
static STANZA_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*\s+(?:\S+\s+){4}(?P<author>[^>]+>)").expect("Invalid Regex")
});

/// Changelog stanza recovered from a reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub author: String,
    /// Added lines without their `+` marker, newlines included.
    pub body: Vec<String>,
}

impl ChangelogEntry {
    /// The body as handed to the changelog updater.
    pub fn text(&self) -> String {
        self.body.concat().trim().to_string()
    }
}

/// Why a reject was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoHunks,
    NoAuthor,
    RemovedChangelogLine { line: usize },
    UnexpectedEdit { line: usize },
    UnknownLine { line: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoHunks => write!(f, "no hunks found in reject"),
            SkipReason::NoAuthor => write!(f, "no author found in reject"),
            SkipReason::RemovedChangelogLine { line } => {
                write!(f, "line {line} removes an existing changelog entry")
            }
            SkipReason::UnexpectedEdit { line } => {
                write!(f, "line {line} edits something other than {RELEASE_FIELD}")
            }
            SkipReason::UnknownLine { line } => write!(f, "line {line} is not a diff line"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectVerdict {
    Harmless(ChangelogEntry),
    Skipped(SkipReason),
}

/// Scan position relative to the `%changelog` section.
enum ScanState {
    OutsideChangelog,
    InsideChangelog { body: Vec<String> },
}

/// Author of a changelog stanza header line, if it is one.
fn stanza_author(text: &str) -> Option<String> {
    STANZA_HEADER
        .captures(text)
        .map(|caps| caps["author"].to_string())
}

/// Decide whether `doc` only bumps `Release:` and adds a changelog stanza.
///
/// Only the first stanza author is kept; later stanza headers are dropped
/// from the body without replacing it.
pub fn classify(doc: &RejectDocument) -> RejectVerdict {
    if doc.is_empty() {
        return RejectVerdict::Skipped(SkipReason::NoHunks);
    }

    let mut state = ScanState::OutsideChangelog;
    let mut author: Option<String> = None;

    for line in doc.lines() {
        debug!(line = line.line_number(), content = ?line, "scanning reject");
        state = match (state, line) {
            (state, RejectLine::Header { .. }) => state,
            (_, RejectLine::Context { text, .. }) if text.trim() == CHANGELOG_MARKER => {
                ScanState::InsideChangelog { body: Vec::new() }
            }
            (state, RejectLine::Context { .. }) => state,
            (ScanState::InsideChangelog { .. }, RejectLine::Removed { line, .. }) => {
                return RejectVerdict::Skipped(SkipReason::RemovedChangelogLine { line: *line });
            }
            (ScanState::InsideChangelog { mut body }, RejectLine::Added { text, .. }) => {
                match stanza_author(text) {
                    Some(found) => {
                        author.get_or_insert(found);
                    }
                    None => body.push(text.clone()),
                }
                ScanState::InsideChangelog { body }
            }
            (
                ScanState::OutsideChangelog,
                RejectLine::Added { text, line } | RejectLine::Removed { text, line },
            ) => {
                if !text.starts_with(RELEASE_FIELD) {
                    return RejectVerdict::Skipped(SkipReason::UnexpectedEdit { line: *line });
                }
                ScanState::OutsideChangelog
            }
            (_, RejectLine::Unknown { line, .. }) => {
                return RejectVerdict::Skipped(SkipReason::UnknownLine { line: *line });
            }
        };
    }

    let Some(author) = author else {
        return RejectVerdict::Skipped(SkipReason::NoAuthor);
    };
    let body = match state {
        ScanState::InsideChangelog { body } => body,
        ScanState::OutsideChangelog => Vec::new(),
    };
    RejectVerdict::Harmless(ChangelogEntry { author, body })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectOutcome {
    /// The changelog was regenerated and the reject file deleted.
    Recovered,
    /// Nothing was touched.
    Skipped(SkipReason),
}

/// The file a reject belongs to: `foo.spec.rej` -> `foo.spec`.
pub fn reject_target(reject_path: &Path) -> PathBuf {
    reject_path.with_extension("")
}

/// Processes spec-file rejects against a changelog updater.
pub struct RejectAnalyzer<'a> {
    updater: &'a dyn ChangelogUpdater,
}

impl<'a> RejectAnalyzer<'a> {
    pub fn new(updater: &'a dyn ChangelogUpdater) -> Self {
        Self { updater }
    }

    /// Classify `reject_path` and, when harmless, recover it.
    ///
    /// A failing updater is an error and keeps the reject file.
    pub fn process(&self, reject_path: &Path) -> Result<RejectOutcome> {
        let raw = std::fs::read(reject_path)?;
        let doc = RejectDocument::parse(&String::from_utf8_lossy(&raw));

        let entry = match classify(&doc) {
            RejectVerdict::Harmless(entry) => entry,
            RejectVerdict::Skipped(reason) => {
                warn!(reject = %reject_path.display(), %reason, "leaving reject for manual resolution");
                return Ok(RejectOutcome::Skipped(reason));
            }
        };

        info!(reject = %reject_path.display(), author = %entry.author, "rejects look harmless");
        let target = reject_target(reject_path);
        self.updater.update(&entry.author, &entry.text(), &target)?;
        std::fs::remove_file(reject_path)?;
        Ok(RejectOutcome::Recovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::RecordingUpdater;

    const HARMLESS: &str = "\
diff a/python39.spec b/python39.spec\t(rejected hunks)
@@ -17,7 +17,7 @@
 Name: python%{pyshortver}
 Summary: Version %{pybasever} of the Python interpreter
 URL: https://www.python.org/
-Release: 3%{?dist}
+Release: 4%{?dist}
 License: Python
@@ -1700,6 +1700,10 @@
 # ======================================================
 %changelog
+* Mon Oct 05 2020 Miro Hron\u{10d}ok <mhroncok@redhat.com> - 3.9.0-4
+- Use upstream architecture names on Fedora 34+
+- https://fedoraproject.org/wiki/Changes/Python_Upstream_Architecture_Names
+
 * Thu Sep 24 2020 Tomas Hrnciar <thrnciar@redhat.com> - 3.9.0-3
 - Update to 3.9.0rc2
";

    fn verdict(content: &str) -> RejectVerdict {
        classify(&RejectDocument::parse(content))
    }

    #[test]
    fn test_classify_release_and_changelog_is_harmless() {
        let RejectVerdict::Harmless(entry) = verdict(HARMLESS) else {
            panic!("expected harmless verdict");
        };
        assert_eq!(entry.author, "Miro Hron\u{10d}ok <mhroncok@redhat.com>");
        assert_eq!(
            entry.text(),
            "- Use upstream architecture names on Fedora 34+\n\
             - https://fedoraproject.org/wiki/Changes/Python_Upstream_Architecture_Names"
        );
    }

    #[test]
    fn test_classify_removed_changelog_line_is_skipped() {
        let content = "@@ -1,3 +1,3 @@\n %changelog\n+* Mon Oct 05 2020 A <a@b> - 1-2\n-- old entry\n";
        assert_eq!(
            verdict(content),
            RejectVerdict::Skipped(SkipReason::RemovedChangelogLine { line: 4 })
        );
    }

    #[test]
    fn test_classify_other_edit_is_skipped() {
        let content = "@@ -1,2 +1,2 @@\n-Version: 1.0\n+Version: 1.1\n";
        assert_eq!(
            verdict(content),
            RejectVerdict::Skipped(SkipReason::UnexpectedEdit { line: 2 })
        );
    }

    #[test]
    fn test_classify_blank_line_is_unknown() {
        let content = "@@ -1,2 +1,2 @@\n-Release: 1\n\n+Release: 2\n";
        assert_eq!(
            verdict(content),
            RejectVerdict::Skipped(SkipReason::UnknownLine { line: 3 })
        );
    }

    #[test]
    fn test_classify_release_only_has_no_author() {
        let content = "@@ -1,2 +1,2 @@\n-Release: 1%{?dist}\n+Release: 2%{?dist}\n";
        assert_eq!(verdict(content), RejectVerdict::Skipped(SkipReason::NoAuthor));
    }

    #[test]
    fn test_classify_without_hunks() {
        assert_eq!(
            verdict("diff a/x.spec b/x.spec\n"),
            RejectVerdict::Skipped(SkipReason::NoHunks)
        );
    }

    #[test]
    fn test_classify_keeps_first_author_of_several_stanzas() {
        let content = "\
@@ -1,2 +1,8 @@
 %changelog
+* Tue Oct 06 2020 First Person <first@example.com> - 1-3
+- second change
+
+* Mon Oct 05 2020 Second Person <second@example.com> - 1-2
+- first change
+
";
        let RejectVerdict::Harmless(entry) = verdict(content) else {
            panic!("expected harmless verdict");
        };
        assert_eq!(entry.author, "First Person <first@example.com>");
        assert_eq!(entry.text(), "- second change\n\n- first change");
    }

    #[test]
    fn test_classify_second_marker_resets_body() {
        let content = "\
@@ -1,2 +1,3 @@
 %changelog
+- stray line
@@ -9,2 +9,4 @@
 %changelog
+* Mon Oct 05 2020 A Person <a@example.com> - 1-2
+- kept line
";
        let RejectVerdict::Harmless(entry) = verdict(content) else {
            panic!("expected harmless verdict");
        };
        assert_eq!(entry.text(), "- kept line");
    }

    #[test]
    fn test_classify_release_inside_changelog_is_body() {
        let content = "@@ -1,2 +1,3 @@\n %changelog\n+* Mon Oct 05 2020 A <a@b> - 1-2\n+Release: weird\n";
        let RejectVerdict::Harmless(entry) = verdict(content) else {
            panic!("expected harmless verdict");
        };
        assert_eq!(entry.text(), "Release: weird");
    }

    #[test]
    fn test_process_recovers_and_deletes_reject() {
        let dir = tempfile::tempdir().unwrap();
        let reject = dir.path().join("python39.spec.rej");
        std::fs::write(&reject, HARMLESS).unwrap();

        let updater = RecordingUpdater::new();
        let outcome = RejectAnalyzer::new(&updater).process(&reject).unwrap();

        assert_eq!(outcome, RejectOutcome::Recovered);
        assert!(!reject.exists());
        let calls = updater.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].target, dir.path().join("python39.spec"));
        assert!(calls[0].changelog.starts_with("- Use upstream"));
    }

    #[test]
    fn test_process_skip_leaves_reject() {
        let dir = tempfile::tempdir().unwrap();
        let reject = dir.path().join("foo.spec.rej");
        std::fs::write(&reject, "@@ -1 +1 @@\n-Version: 1\n+Version: 2\n").unwrap();

        let updater = RecordingUpdater::new();
        let outcome = RejectAnalyzer::new(&updater).process(&reject).unwrap();

        assert_eq!(
            outcome,
            RejectOutcome::Skipped(SkipReason::UnexpectedEdit { line: 2 })
        );
        assert!(reject.exists());
        assert!(updater.calls().is_empty());
    }

    #[test]
    fn test_process_updater_failure_keeps_reject() {
        let dir = tempfile::tempdir().unwrap();
        let reject = dir.path().join("python39.spec.rej");
        std::fs::write(&reject, HARMLESS).unwrap();

        let updater = RecordingUpdater::failing();
        let result = RejectAnalyzer::new(&updater).process(&reject);

        assert!(result.is_err());
        assert!(reject.exists());
    }

    #[test]
    fn test_reject_target_strips_suffix() {
        assert_eq!(
            reject_target(Path::new("sub/python39.spec.rej")),
            PathBuf::from("sub/python39.spec")
        );
    }
}
