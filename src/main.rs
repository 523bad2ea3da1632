// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) on stderr
// 3. Run one audit over the site root
// 4. Print the report (human-readable, or JSON with --json)
//
// Exit codes: 0 whenever an audit completes, however bad the score (the
// report is informational). 2 only if the audit couldn't start at all,
// e.g. the root isn't a directory.
// =============================================================================

mod audit;   // src/audit/ - run context, ledger, link graph
mod checker; // src/checker/ - page inspection and external probing
mod cli;     // src/cli.rs - command-line parsing
mod config;  // src/config.rs - defaults + auto-detection
mod error;   // src/error.rs - error types
mod report;  // src/report.rs - terminal and JSON output
mod site;    // src/site/ - discovery, path resolution, sitemap

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables the parse() method
use tracing::Level;

use audit::{AuditOptions, Auditor};
use cli::Cli;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = AuditOptions {
        base_url: cli.base_url,
        extra_ignore_paths: cli.ignore_paths,
        extra_ignore_files: cli.ignore_files,
        check_external: !cli.skip_external,
        workers: cli.workers,
        timeout: Duration::from_secs(cli.timeout),
        top: cli.top,
        legacy_h1_penalty: cli.legacy_h1_penalty,
        echo: !cli.json,
    };

    let auditor = Auditor::new(&cli.root, options)
        .with_context(|| format!("cannot audit {}", cli.root.display()))?;
    let report = auditor.run().await;

    if cli.json {
        println!("{}", report::render_json(&report)?);
    } else {
        report::print_summary(&report);
    }

    Ok(())
}

// Logs go to stderr so they never mix with the report (or the JSON) on stdout.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
