//! cli
//!
//! Command-line interface layer for tributary.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments
//! - Build the [`ConfigSet`] from source tokens
//! - Drive the [`RepoMerger`] and print the report
//!
//! The CLI layer is thin: all merge logic lives in [`crate::merge`], all
//! repository access in [`crate::git`].

pub mod args;

pub use args::Cli;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context as _, Result};

use crate::core::config::ConfigSet;
use crate::merge::{MergedRef, RepoMerger};
use crate::ui::output::{self, Verbosity};

/// Fixed destination directory, relative to the working directory.
pub const OUTPUT_DIR: &str = "merged-repo";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`. Usage errors
/// surface as [`crate::core::config::ConfigError`] values inside the
/// returned error; `main` maps those to exit code 64.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    // Deliberately not wrapped in context: main downcasts ConfigError to
    // pick the usage exit code.
    let configs = ConfigSet::from_tokens(&cli.sources)?;

    let output_dir = Path::new(OUTPUT_DIR);
    output::print(
        format!(
            "Merging {} repositories into one, output directory: {}",
            configs.len(),
            output_dir.display()
        ),
        verbosity,
    );

    let start = Instant::now();
    let merger = RepoMerger::new(output_dir, configs)
        .context("failed to open the destination repository")?;
    let merged = merger.run().context("merge run failed")?;

    report(&merged, cli.json, verbosity)?;

    output::print(
        format!(
            "Done, took {} ms; merged repository: {}",
            start.elapsed().as_millis(),
            output_dir.display()
        ),
        verbosity,
    );

    Ok(())
}

/// Print the per-ref report: overlaps as errors, incomplete refs as
/// warnings, per-ref ids at debug level, and optionally the whole record
/// list as JSON.
fn report(merged: &[MergedRef], json: bool, verbosity: Verbosity) -> Result<()> {
    for record in merged {
        for overlap in &record.overlaps {
            output::error(format!("{} '{}': {}", record.kind, record.name, overlap));
        }

        if !record.is_complete() {
            output::warn(
                format!(
                    "{} '{}' was not in: {}",
                    record.kind,
                    record.name,
                    record.missing.join(", ")
                ),
                verbosity,
            );
        }

        match &record.commit {
            Some(commit) => output::debug(
                format!("{} '{}' -> {}", record.kind, record.name, commit.short(12)),
                verbosity,
            ),
            None => output::debug(
                format!("{} '{}' skipped (overlaps)", record.kind, record.name),
                verbosity,
            ),
        }
    }

    if json {
        let rendered =
            serde_json::to_string_pretty(merged).context("failed to render JSON report")?;
        println!("{}", rendered);
    }

    Ok(())
}
