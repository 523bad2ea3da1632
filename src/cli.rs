// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The tool is meant to be run from inside the built site with no arguments
// at all, so every flag is optional and the defaults reproduce a plain audit
// of the current directory.
// =============================================================================

use std::path::PathBuf;

use clap::{ArgAction, Parser};

// #[derive(Parser)] tells clap to automatically generate parsing code
#[derive(Parser, Debug)]
#[command(
    name = "site-audit",
    version,
    about = "Audit a static HTML site for dead links, orphan pages and SEO hygiene",
    long_about = "site-audit walks a built static site, checks every page for headings, structured \
                  data and link hygiene, resolves internal links against the files on disk, probes \
                  external links, and prints a 0-100 health score."
)]
pub struct Cli {
    /// Site root to audit
    #[arg(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Base URL of the site (skips detection from index.html)
    ///
    /// Example: --base-url https://example.com
    #[arg(long)]
    pub base_url: Option<String>,

    /// Extra directory substring to skip (repeatable)
    #[arg(long = "ignore-path", value_name = "SUBSTR")]
    pub ignore_paths: Vec<String>,

    /// Extra file name to skip (repeatable)
    #[arg(long = "ignore-file", value_name = "NAME")]
    pub ignore_files: Vec<String>,

    /// Don't probe external links
    #[arg(long)]
    pub skip_external: bool,

    /// Maximum external requests in flight
    #[arg(long, default_value_t = 10)]
    pub workers: usize,

    /// Per-request timeout for external links, in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// How many pages to list in the inbound-link ranking
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Deduct an extra 5 points for a missing <h1>, like older audit reports did
    #[arg(long)]
    pub legacy_h1_penalty: bool,

    /// Print the final report as JSON instead of the human-readable report
    #[arg(long)]
    pub json: bool,

    /// Log more to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_needed() {
        let cli = Cli::try_parse_from(["site-audit"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.base_url.is_none());
        assert!(!cli.skip_external);
        assert_eq!(cli.workers, 10);
        assert_eq!(cli.timeout, 5);
        assert_eq!(cli.top, 10);
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "site-audit",
            "--root",
            "public",
            "--base-url",
            "https://example.com",
            "--ignore-path",
            "drafts",
            "--ignore-path",
            "vendor",
            "--ignore-file",
            "offline.html",
            "--skip-external",
            "--workers",
            "4",
            "--timeout",
            "2",
            "--top",
            "3",
            "--legacy-h1-penalty",
            "--json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.root, PathBuf::from("public"));
        assert_eq!(cli.base_url.as_deref(), Some("https://example.com"));
        assert_eq!(cli.ignore_paths, vec!["drafts", "vendor"]);
        assert_eq!(cli.ignore_files, vec!["offline.html"]);
        assert!(cli.skip_external);
        assert_eq!(cli.workers, 4);
        assert_eq!(cli.timeout, 2);
        assert_eq!(cli.top, 3);
        assert!(cli.legacy_h1_penalty);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_rejects_non_numeric_workers() {
        assert!(Cli::try_parse_from(["site-audit", "--workers", "many"]).is_err());
    }
}
