//! Forge link classification and patch reference resolution.
//!
//! Two link shapes are understood, both anchored at the forge base URL:
//!
//! - commit view: `<forge>/<path>/<package>/c/<hex>` (query string ignored)
//! - pull request: `<forge>/<path>/<package>/pull-request/<n>`
//!
//! The patch is served at the matched prefix with `.patch` appended.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{FerrypickError, Result};

/// Character set of a package name (Fedora packaging guidelines).
pub const PKGNAME_PATTERN: &str = r"[a-zA-Z0-9_.+-]+";

/// Where the patch comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchReference {
    /// A forge link; `package_name` is the package the patch was made for.
    Remote {
        package_name: String,
        patch_url: String,
    },
    /// A patch file on disk. Its package of origin is unknown.
    Local { file_path: PathBuf },
}

impl PatchReference {
    /// Resolve the command-line reference. An existing path wins over link
    /// classification.
    pub fn resolve(input: &str, classifier: &LinkClassifier) -> Result<Self> {
        let path = Path::new(input);
        if path.exists() {
            return Ok(PatchReference::Local {
                file_path: path.to_path_buf(),
            });
        }
        let (package_name, patch_url) = classifier.classify(input)?;
        Ok(PatchReference::Remote {
            package_name,
            patch_url,
        })
    }

    /// Package the patch was written for, when known.
    pub fn original_name(&self) -> Option<&str> {
        match self {
            PatchReference::Remote { package_name, .. } => Some(package_name),
            PatchReference::Local { .. } => None,
        }
    }
}

/// Recognises commit and pull-request links of one forge.
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    commit: Regex,
    pull_request: Regex,
}

impl LinkClassifier {
    pub fn new(forge_url: &str) -> Result<Self> {
        let forge = regex::escape(forge_url.trim_end_matches('/'));
        let commit = Regex::new(&format!(
            r"^{forge}/\S+/(?P<package>{PKGNAME_PATTERN})/c/[0-9a-f]+"
        ))?;
        let pull_request = Regex::new(&format!(
            r"^{forge}/\S+/(?P<package>{PKGNAME_PATTERN})/pull-request/\d+"
        ))?;
        Ok(Self {
            commit,
            pull_request,
        })
    }

    /// Return `(package_name, patch_url)` for a forge link.
    pub fn classify(&self, link: &str) -> Result<(String, String)> {
        for regex in [&self.commit, &self.pull_request] {
            if let Some(caps) = regex.captures(link) {
                let package = caps["package"].to_string();
                let patch_url = format!("{}.patch", &caps[0]);
                return Ok((package, patch_url));
            }
        }
        Err(FerrypickError::UnrecognizedLink(link.to_string()))
    }
}
