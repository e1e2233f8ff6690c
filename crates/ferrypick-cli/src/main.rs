//! ferrypick - cherry-pick dist-git patches across renamed packages
//!
//! ```text
//! ferrypick COMMIT [CURRENT_PKGNAME]
//! ferrypick PR_LINK [CURRENT_PKGNAME]
//! ferrypick FILENAME [CURRENT_PKGNAME]
//! ```
//!
//! The current package name defaults to the base name of the git worktree.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::{info, Level};

use ferrypick_core::{
    init_tracing, package_name_of, toplevel, ApplyOutcome, BumpspecCommand, FerrypickConfig,
    GitCli, HttpFetcher, LinkClassifier, PatchApplicator, PatchReference, Worktree,
};

#[derive(Parser)]
#[command(name = "ferrypick")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cherry-pick a dist-git commit or pull request into a renamed package", long_about = None)]
struct Cli {
    /// Commit link, pull-request link or local patch file
    reference: Option<String>,

    /// Package name of the current repository (default: worktree directory name)
    current_name: Option<String>,

    /// Forge whose links are recognised (overrides FERRYPICK_FORGE_URL)
    #[arg(long)]
    forge_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(reference) = cli.reference.as_deref() else {
        print_usage();
        return ExitCode::from(1);
    };

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match run(&cli, reference) {
        Ok(outcome) => ExitCode::from(exit_status(&outcome)),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    let bin = Cli::command().get_name().to_string();
    for arg in ["COMMIT", "PR_LINK", "FILENAME"] {
        println!("Usage: {bin} {arg} [CURRENT_PKGNAME]");
    }
}

fn run(cli: &Cli, reference: &str) -> Result<ApplyOutcome> {
    let mut config = FerrypickConfig::from_env();
    if let Some(forge_url) = &cli.forge_url {
        config = config.with_forge_url(forge_url);
    }

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let root = toplevel(&config.git_program, &cwd)?;
    let current_name = match &cli.current_name {
        Some(name) => name.clone(),
        None => package_name_of(&root)?,
    };

    let classifier = LinkClassifier::new(&config.forge_url)?;
    let reference = PatchReference::resolve(reference, &classifier)
        .with_context(|| format!("Cannot use {reference} as a patch source"))?;
    info!(?reference, current_name = %current_name, "resolved patch reference");

    let worktree = Worktree::new(&root);
    let git = GitCli::new(&config.git_program, &root);
    let fetcher = HttpFetcher::new()?;
    let updater = BumpspecCommand::new(&config.bumpspec_program);
    let applicator = PatchApplicator::new(&worktree, &git, &fetcher, &updater, &config);

    let outcome = applicator.apply(&reference, &current_name)?;
    report(&outcome, applicator.patch_file());
    Ok(outcome)
}

fn report(outcome: &ApplyOutcome, patch_file: &Path) {
    match outcome {
        ApplyOutcome::Applied => {}
        ApplyOutcome::Resumed => println!("Rejects resolved, patch applied"),
        ApplyOutcome::RefusedPreexistingRejects { exit_code } => {
            eprintln!(
                "Not attempting to process rejected patches: there were pre-existing *.rej files in your worktree."
            );
            eprintln!("git am failed with exit code {exit_code}");
            eprintln!("Patch stored as: {}", patch_file.display());
        }
        ApplyOutcome::Unresolved {
            exit_code,
            remaining,
        } => {
            eprintln!("git am failed with exit code {exit_code}");
            for reject in remaining {
                eprintln!("Unresolved rejects: {}", reject.display());
            }
            eprintln!("Patch stored as: {}", patch_file.display());
        }
        ApplyOutcome::ResumeFailed { exit_code } => {
            eprintln!("git am --continue failed with exit code {exit_code}");
            eprintln!("Patch stored as: {}", patch_file.display());
        }
    }
}

/// Map an outcome to a process exit status; failures never map to 0.
fn exit_status(outcome: &ApplyOutcome) -> u8 {
    match outcome.exit_code() {
        0 => 0,
        code => u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_reference_and_name() {
        let cli = Cli::try_parse_from([
            "ferrypick",
            "https://src.fedoraproject.org/rpms/python3.9/c/a0928446",
            "python3.8",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(
            cli.reference.as_deref(),
            Some("https://src.fedoraproject.org/rpms/python3.9/c/a0928446")
        );
        assert_eq!(cli.current_name.as_deref(), Some("python3.8"));
        assert!(cli.verbose);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_reference_is_optional() {
        let cli = Cli::try_parse_from(["ferrypick"]).unwrap();
        assert!(cli.reference.is_none());
    }

    #[test]
    fn test_exit_status_mapping() {
        assert_eq!(exit_status(&ApplyOutcome::Applied), 0);
        assert_eq!(exit_status(&ApplyOutcome::Resumed), 0);
        assert_eq!(
            exit_status(&ApplyOutcome::RefusedPreexistingRejects { exit_code: 128 }),
            128
        );
        assert_eq!(exit_status(&ApplyOutcome::ResumeFailed { exit_code: 256 }), 1);
        assert_eq!(exit_status(&ApplyOutcome::ResumeFailed { exit_code: -1 }), 1);
    }
}
