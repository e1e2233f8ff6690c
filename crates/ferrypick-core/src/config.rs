//! Runtime configuration.
//!
//! Everything has a sensible default for Fedora dist-git; the environment
//! can override each value:
//!
//! | Variable               | Default                          |
//! |------------------------|----------------------------------|
//! | `FERRYPICK_FORGE_URL`  | `https://src.fedoraproject.org`  |
//! | `FERRYPICK_PATCH_FILE` | `ferrypick.patch`                |
//! | `FERRYPICK_BUMPSPEC`   | `rpmdev-bumpspec`                |
//! | `FERRYPICK_GIT`        | `git`                            |

use std::path::PathBuf;

pub const DEFAULT_FORGE_URL: &str = "https://src.fedoraproject.org";
pub const DEFAULT_PATCH_FILE: &str = "ferrypick.patch";
pub const DEFAULT_BUMPSPEC: &str = "rpmdev-bumpspec";
pub const DEFAULT_GIT: &str = "git";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FerrypickConfig {
    /// Base URL of the package forge whose links are recognised.
    pub forge_url: String,
    /// Transient patch file, relative to the worktree root unless absolute.
    pub patch_file: PathBuf,
    /// Command used to add a changelog stanza and bump `Release:`.
    pub bumpspec_program: String,
    pub git_program: String,
}

impl Default for FerrypickConfig {
    fn default() -> Self {
        FerrypickConfig {
            forge_url: DEFAULT_FORGE_URL.to_string(),
            patch_file: PathBuf::from(DEFAULT_PATCH_FILE),
            bumpspec_program: DEFAULT_BUMPSPEC.to_string(),
            git_program: DEFAULT_GIT.to_string(),
        }
    }
}

impl FerrypickConfig {
    /// Build a config from `FERRYPICK_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        FerrypickConfig {
            forge_url: lookup("FERRYPICK_FORGE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.forge_url),
            patch_file: lookup("FERRYPICK_PATCH_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.patch_file),
            bumpspec_program: lookup("FERRYPICK_BUMPSPEC").unwrap_or(defaults.bumpspec_program),
            git_program: lookup("FERRYPICK_GIT").unwrap_or(defaults.git_program),
        }
    }

    /// Override the forge URL.
    pub fn with_forge_url(mut self, forge_url: &str) -> Self {
        self.forge_url = forge_url.trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_target_fedora() {
        let config = FerrypickConfig::default();
        assert_eq!(config.forge_url, "https://src.fedoraproject.org");
        assert_eq!(config.patch_file, PathBuf::from("ferrypick.patch"));
        assert_eq!(config.bumpspec_program, "rpmdev-bumpspec");
        assert_eq!(config.git_program, "git");
    }

    #[test]
    fn test_lookup_overrides_and_trims_forge_url() {
        let vars: HashMap<&str, &str> = [
            ("FERRYPICK_FORGE_URL", "https://pkgs.example.org/"),
            ("FERRYPICK_BUMPSPEC", "/usr/local/bin/bumpspec"),
        ]
        .into_iter()
        .collect();

        let config = FerrypickConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.forge_url, "https://pkgs.example.org");
        assert_eq!(config.bumpspec_program, "/usr/local/bin/bumpspec");
        assert_eq!(config.patch_file, PathBuf::from(DEFAULT_PATCH_FILE));
        assert_eq!(config.git_program, DEFAULT_GIT);
    }
}
