//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Usage
//!
//! ```text
//! tributary <repository_url>:<target_directory>...
//! ```
//!
//! One positional token per source. The last colon splits URL from target
//! directory; a directory of `.` places the source at the root of the
//! merged tree. Malformed tokens (and an empty token list) are usage
//! errors and exit with code 64.

use clap::Parser;

/// Tributary - fuse multiple Git repositories into one, preserving every history
#[derive(Parser, Debug)]
#[command(name = "tributary")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Sources to merge, one '<repository_url>:<target_directory>' per source
    #[arg(value_name = "URL:DIR")]
    pub sources: Vec<String>,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Print the merge report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sources_and_flags() {
        let cli = Cli::parse_from([
            "tributary",
            "--quiet",
            "https://a.example/a.git:.",
            "https://b.example/b.git:libs/b",
        ]);
        assert!(cli.quiet);
        assert!(!cli.json);
        assert_eq!(cli.sources.len(), 2);
    }

    #[test]
    fn zero_sources_is_accepted_by_clap() {
        // Validation (and the exit-64 diagnostic) happens in config
        // parsing, not in clap.
        let cli = Cli::parse_from(["tributary"]);
        assert!(cli.sources.is_empty());
    }
}
