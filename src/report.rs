// src/report.rs
// =============================================================================
// Everything the user sees on stdout.
//
// The human report is printed in pieces while the audit runs (banner, each
// finding as it is recorded, the top-pages table, the external-check header)
// and finished off with print_summary(). With --json nothing is printed along
// the way and the whole AuditReport is emitted at the end instead.
// =============================================================================

use std::path::Path;

use colored::{ColoredString, Colorize};

use crate::audit::{AuditReport, Finding, ScoreBand, Severity, TopPage};

const RULE: &str = "==================================================";

fn paint(severity: Severity, text: &str) -> ColoredString {
    match severity {
        Severity::Error => text.red(),
        Severity::Warn => text.yellow(),
        Severity::Success => text.green(),
        Severity::Info => text.blue(),
    }
}

/// "[WARN] about.html: Missing Schema Markup (-2 pts)"
pub fn format_finding(finding: &Finding) -> String {
    let mut line = format!("[{}] {}", finding.severity.label(), finding.message);
    if finding.deduction > 0 {
        line.push_str(&format!(" (-{} pts)", finding.deduction));
    }
    line
}

pub fn print_finding(finding: &Finding) {
    println!("{}", paint(finding.severity, &format_finding(finding)));
}

pub fn print_banner(root: &Path, base_url: Option<&str>) {
    println!("{}", format!("Starting SEO Audit for: {}", root.display()).cyan());
    match base_url {
        Some(url) => println!("{}", format!("Base URL: {}", url).blue()),
        None => println!("{}", "Base URL: Not detected".yellow()),
    }
}

pub fn print_discovered(count: usize) {
    println!("{}", format!("Found {} HTML files to audit.", count).blue());
}

pub fn print_top_pages(top: &[TopPage]) {
    println!();
    println!("{}", format!("--- Top {} Internal Pages by Inbound Links ---", top.len()).cyan());
    for entry in top {
        println!("{}: {} links", entry.page, entry.inbound);
    }
}

pub fn print_external_header(count: usize) {
    println!();
    println!("{}", format!("Checking {} external links...", count).cyan());
}

fn paint_score(band: ScoreBand, text: &str) -> ColoredString {
    match band {
        ScoreBand::Good => text.green(),
        ScoreBand::Fair => text.yellow(),
        ScoreBand::Poor => text.red(),
    }
}

// Final block: counts, skipped pages, the score line and generic advice.
pub fn print_summary(report: &AuditReport) {
    println!();
    println!("{}", RULE.cyan());
    println!("{}", "                  AUDIT REPORT                    ".cyan());
    println!("{}", RULE.cyan());

    let errors = report
        .findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    let warnings = report
        .findings
        .iter()
        .filter(|f| f.severity == Severity::Warn)
        .count();

    println!("Pages discovered: {}", report.pages_discovered);
    println!("Errors: {}   Warnings: {}", errors, warnings);
    println!("Dead links: {}", report.dead_links.len());
    println!("Orphan pages: {}", report.orphan_pages.len());
    let broken = report.external_checks.iter().filter(|c| c.is_broken()).count();
    println!(
        "External links checked: {} ({} broken)",
        report.external_checks.len(),
        broken
    );

    if !report.skipped_pages.is_empty() {
        println!();
        println!("{}", "Skipped (could not be processed):".red());
        for skipped in &report.skipped_pages {
            println!("{}", format!("  {}: {}", skipped.page, skipped.reason).red());
        }
    }

    println!();
    println!(
        "Final Score: {}",
        paint_score(report.band, &format!("{}/100", report.score)).bold()
    );

    if report.score < 100 {
        println!();
        println!("{}", "Actionable Advice:".yellow());
        println!("{}", "- Review the [ERROR] and [WARN] lines above.".yellow());
        println!("{}", "- Fix dead links first; each one costs 10 points.".yellow());
        println!("{}", "- Run site-audit again after fixes.".yellow());
    }
}

pub fn render_json(report: &AuditReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
