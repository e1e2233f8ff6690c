//! Package-name substitution in patch content.
//!
//! When a package was renamed between branches (e.g. `python3.9` on rawhide
//! is `python39` elsewhere), the spec file and rpmlint config are renamed with
//! it. Only the `a/` and `b/` path markers of those two files are rewritten;
//! any other mention of the package name is left alone.

use regex::bytes::{Captures, Regex};

use crate::error::Result;
use crate::link::PKGNAME_PATTERN;

/// Path markers used by git in diff headers, as in `a/python37.spec`.
const PREFIXES_PATTERN: &str = "a|b";
/// Files named after the package.
const SUFFIXES_PATTERN: &str = r"\.(?:spec|rpmlintrc)";

/// Rewrite rule from the package of origin (or any package) to the target.
#[derive(Debug, Clone)]
pub struct RenameRule {
    original_name: Option<String>,
    target_name: String,
    regex: Regex,
}

impl RenameRule {
    /// Without `original_name`, any package-name token in a spec or rpmlintrc
    /// path is rewritten.
    pub fn new(original_name: Option<&str>, target_name: &str) -> Result<Self> {
        let name_pattern = match original_name {
            Some(name) => regex::escape(name),
            None => PKGNAME_PATTERN.to_string(),
        };
        let regex = Regex::new(&format!(
            "(?P<prefix>{PREFIXES_PATTERN})/{name_pattern}(?P<suffix>{SUFFIXES_PATTERN})"
        ))?;
        Ok(Self {
            original_name: original_name.map(str::to_string),
            target_name: target_name.to_string(),
            regex,
        })
    }

    pub fn is_noop(&self) -> bool {
        self.original_name.as_deref() == Some(self.target_name.as_str())
    }

    /// Apply the rule to raw patch bytes.
    pub fn apply(&self, content: &[u8]) -> Vec<u8> {
        if self.is_noop() {
            return content.to_vec();
        }
        let new_name = self.target_name.as_bytes();
        self.regex
            .replace_all(content, |caps: &Captures<'_>| {
                let mut replacement = caps["prefix"].to_vec();
                replacement.push(b'/');
                replacement.extend_from_slice(new_name);
                replacement.extend_from_slice(&caps["suffix"]);
                replacement
            })
            .into_owned()
    }
}

/// Replace `original_name` with `target_name` in spec/rpmlintrc paths.
pub fn rename(content: &[u8], original_name: Option<&str>, target_name: &str) -> Result<Vec<u8>> {
    Ok(RenameRule::new(original_name, target_name)?.apply(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_git_diff_spec() {
        let line = b"diff --git a/python3.7.spec b/python3.7.spec";
        let new = rename(line, Some("python3.7"), "python37").unwrap();
        assert_eq!(new, b"diff --git a/python37.spec b/python37.spec");
    }

    #[test]
    fn test_rename_git_diff_rpmlintrc() {
        let line = b"+++ b/python3.rpmlintrc";
        let new = rename(line, Some("python3"), "python3.9").unwrap();
        assert_eq!(new, b"+++ b/python3.9.rpmlintrc");
    }

    #[test]
    fn test_rename_leaves_random_occurrence() {
        let line = b" #  remember to update the python3-docs package as well";
        let new = rename(line, Some("python3-docs"), "python-docs").unwrap();
        assert_eq!(new, line);
    }

    #[test]
    fn test_rename_same_name_is_noop() {
        let rule = RenameRule::new(Some("python3.9"), "python3.9").unwrap();
        assert!(rule.is_noop());
        let content = b"--- a/python3.9.spec\n+++ b/python3.9.spec\n";
        assert_eq!(rule.apply(content), content);
    }

    #[test]
    fn test_rename_is_idempotent() {
        let rule = RenameRule::new(Some("python3.7"), "python37").unwrap();
        let once = rule.apply(b"--- a/python3.7.spec\n+++ b/python3.7.spec\n");
        let twice = rule.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rename_escapes_original_name() {
        // `.` must not match any character
        let content = b"+++ b/python3x7.spec";
        let new = rename(content, Some("python3.7"), "python37").unwrap();
        assert_eq!(new, content);
    }

    #[test]
    fn test_rename_only_known_suffixes() {
        let content = b"+++ b/python3.7.changes\n+++ b/python3.7.spec.orig-not";
        let new = rename(content, Some("python3.7"), "python37").unwrap();
        assert_eq!(new, b"+++ b/python3.7.changes\n+++ b/python37.spec.orig-not");
    }

    #[test]
    fn test_rename_without_original_name_matches_any_package() {
        let content = b"diff --git a/foo-bar.spec b/foo-bar.spec\n+%global foo-bar 1\n";
        let new = rename(content, None, "baz").unwrap();
        assert_eq!(new, b"diff --git a/baz.spec b/baz.spec\n+%global foo-bar 1\n");
    }

    #[test]
    fn test_rename_without_original_name_rewrites_same_name() {
        let content = b"+++ b/baz.spec";
        let new = rename(content, None, "baz").unwrap();
        assert_eq!(new, content);
    }

    #[test]
    fn test_rename_target_with_dollar_is_literal() {
        let new = rename(b"+++ b/foo.spec", Some("foo"), "$1bar").unwrap();
        assert_eq!(new, b"+++ b/$1bar.spec");
    }

    #[test]
    fn test_rename_non_utf8_content() {
        let mut content = b"+\xff\xfe binary\n--- a/foo.spec\n".to_vec();
        content.push(0x80);
        let new = rename(&content, Some("foo"), "bar").unwrap();
        let mut expected = b"+\xff\xfe binary\n--- a/bar.spec\n".to_vec();
        expected.push(0x80);
        assert_eq!(new, expected);
    }
}
