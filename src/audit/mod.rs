// src/audit/mod.rs
// =============================================================================
// One audit run, start to finish.
//
// Order of phases:
// 1. Configuration detection (root index.html)
// 2. File discovery
// 3. Page inspection, one page at a time (sequential, no locking needed)
// 4. Sitemap cross-check (if there is one)
// 5. Orphan analysis and inbound-link ranking
// 6. External link probing (the only concurrent phase)
// 7. Final report
//
// All mutable state for a run lives in RunContext. Nothing is global, so two
// runs never see each other's findings.
// =============================================================================

mod graph;
mod ledger;

pub use graph::LinkGraph;
pub use ledger::{Finding, FindingKind, Ledger, ScoreBand, Severity};

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::checker::{ExternalCheck, ExternalChecker, ExternalStatus, PageInspector, Unreachable};
use crate::checker::{DEFAULT_TIMEOUT, DEFAULT_WORKERS};
use crate::config::Config;
use crate::error::{AuditError, Result};
use crate::report;
use crate::site::{self, discover_pages, relative_display, Page, PathResolver};

/// An internal link that doesn't land on any file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadLink {
    /// Page the link was found on (relative to the root)
    pub page: String,
    /// The href exactly as written
    pub href: String,
    /// Where the resolver looked last
    pub resolved: PathBuf,
}

/// A page that couldn't be read; its content checks were skipped
#[derive(Debug, Clone, Serialize)]
pub struct SkippedPage {
    pub page: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPage {
    pub page: String,
    pub inbound: usize,
}

// Shared mutable state for one run.
//
// Page inspection writes into it directly; external results are merged in
// once, after all probes have finished.
#[derive(Debug)]
pub struct RunContext {
    pub ledger: Ledger,
    pub graph: LinkGraph,
    /// Every distinct external URL seen on any page
    pub external_urls: BTreeSet<String>,
    pub dead_links: Vec<DeadLink>,
    pub skipped: Vec<SkippedPage>,
}

impl RunContext {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            graph: LinkGraph::new(),
            external_urls: BTreeSet::new(),
            dead_links: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn record_dead_link(&mut self, page: &Page, href: &str, resolved: PathBuf) {
        self.dead_links.push(DeadLink {
            page: page.relative.clone(),
            href: href.to_string(),
            resolved,
        });
    }

    // Folds probe results into the ledger.
    //
    // Only a bad status costs points. Unreachable URLs are recorded as
    // warnings worth zero.
    pub fn merge_external(&mut self, results: &[ExternalCheck]) {
        for check in results {
            match &check.status {
                ExternalStatus::Ok { .. } => {}
                ExternalStatus::BadStatus { code } => self.ledger.record(
                    FindingKind::BrokenExternalLink,
                    format!("Broken External Link: {} (Status {})", check.url, code),
                ),
                ExternalStatus::Unreachable { reason, detail } => {
                    debug!("{} unreachable: {}", check.url, detail);
                    let why = match reason {
                        Unreachable::Timeout => "Timeout",
                        Unreachable::Connection => "Connection Error",
                        Unreachable::Other => "Request Error",
                    };
                    self.ledger.record(
                        FindingKind::ExternalUnreachable,
                        format!(
                            "External Link Unreachable: {} ({}) - Skipped deduction (likely network/environment limitation)",
                            check.url, why
                        ),
                    );
                }
            }
        }

        if !results.is_empty() && results.iter().all(ExternalCheck::is_ok) {
            self.ledger.record(
                FindingKind::Summary,
                format!("All {} external link(s) responded", results.len()),
            );
        }
    }
}

/// Knobs for a run; the defaults match a bare `site-audit` invocation
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Use this base URL instead of detecting one
    pub base_url: Option<String>,
    pub extra_ignore_paths: Vec<String>,
    pub extra_ignore_files: Vec<String>,
    pub check_external: bool,
    pub workers: usize,
    pub timeout: Duration,
    /// How many entries the inbound-link ranking shows
    pub top: usize,
    pub legacy_h1_penalty: bool,
    /// Print progress and findings to stdout while running
    pub echo: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            extra_ignore_paths: Vec::new(),
            extra_ignore_files: Vec::new(),
            check_external: true,
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT,
            top: 10,
            legacy_h1_penalty: false,
            echo: false,
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub root: PathBuf,
    pub base_url: Option<String>,
    pub keywords: Vec<String>,
    pub pages_discovered: usize,
    /// Clamped to 0..=100
    pub score: u32,
    pub band: ScoreBand,
    pub findings: Vec<Finding>,
    pub dead_links: Vec<DeadLink>,
    pub orphan_pages: Vec<String>,
    pub top_pages: Vec<TopPage>,
    pub external_checks: Vec<ExternalCheck>,
    pub skipped_pages: Vec<SkippedPage>,
}

pub struct Auditor {
    root: PathBuf,
    config: Config,
    options: AuditOptions,
    checker: Option<ExternalChecker>,
    ctx: RunContext,
}

impl Auditor {
    // Prepares a run: validates the root and detects configuration.
    //
    // Errors here are the only ones that stop an audit before it starts.
    pub fn new(root: &Path, options: AuditOptions) -> Result<Self> {
        let root = fs::canonicalize(root).map_err(|e| AuditError::read(root, e))?;
        if !root.is_dir() {
            return Err(AuditError::RootNotDirectory(root));
        }

        let checker = if options.check_external {
            Some(ExternalChecker::new(options.workers, options.timeout)?)
        } else {
            None
        };

        let mut ledger = Ledger::new().with_legacy_h1_penalty(options.legacy_h1_penalty);
        if options.echo {
            ledger = ledger.with_sink(report::print_finding);
        }
        let config = Config::detect(&root, options.base_url.clone(), &mut ledger)
            .with_extra_ignores(&options.extra_ignore_paths, &options.extra_ignore_files);

        Ok(Self {
            root,
            config,
            options,
            checker,
            ctx: RunContext::new(ledger),
        })
    }

    pub async fn run(self) -> AuditReport {
        let Auditor {
            root,
            config,
            options,
            checker,
            mut ctx,
        } = self;
        let echo = options.echo;

        if echo {
            report::print_banner(&root, config.base_url.as_deref());
        }

        let pages = discover_pages(&root, &config);
        info!("found {} page(s) to audit", pages.len());
        if echo {
            report::print_discovered(pages.len());
        }

        let resolver = PathResolver::new(&root);
        let inspector = PageInspector::new(&config, &resolver);

        inspect_pages(&inspector, &pages, &mut ctx);

        site::sitemap::cross_check(&resolver, &config, &pages, &mut ctx.ledger);

        let orphans = ctx.graph.orphans(&pages, &root, &config);
        for orphan in &orphans {
            ctx.ledger.record(
                FindingKind::OrphanPage,
                format!("Orphan Page (No incoming links): {}", orphan.relative),
            );
        }
        if orphans.is_empty() && !pages.is_empty() {
            ctx.ledger.record(FindingKind::Summary, "No orphan pages");
        }
        let orphan_pages: Vec<String> = orphans.iter().map(|p| p.relative.clone()).collect();

        let top_pages: Vec<TopPage> = ctx
            .graph
            .top_targets(&pages, options.top)
            .into_iter()
            .map(|(path, inbound)| TopPage {
                page: relative_display(&root, &path),
                inbound,
            })
            .collect();
        if echo {
            report::print_top_pages(&top_pages);
        }

        let external_checks = match &checker {
            Some(checker) if !ctx.external_urls.is_empty() => {
                if echo {
                    report::print_external_header(ctx.external_urls.len());
                }
                let results = checker.check_all(&ctx.external_urls).await;
                ctx.merge_external(&results);
                results
            }
            Some(_) => Vec::new(),
            None => {
                info!("external link checking disabled");
                Vec::new()
            }
        };

        info!(
            "audit finished: {} finding(s), {} point(s) deducted, {} internal edge(s)",
            ctx.ledger.findings().len(),
            ctx.ledger.total_deducted(),
            ctx.graph.edge_count()
        );

        let score = ctx.ledger.score();
        AuditReport {
            root,
            base_url: config.base_url.clone(),
            keywords: config.keywords.clone(),
            pages_discovered: pages.len(),
            score,
            band: ScoreBand::for_score(score),
            findings: ctx.ledger.into_findings(),
            dead_links: ctx.dead_links,
            orphan_pages,
            top_pages,
            external_checks,
            skipped_pages: ctx.skipped,
        }
    }
}

// Inspects each page in order. A page that can't be read is listed as
// skipped and the run carries on with the next one.
fn inspect_pages(inspector: &PageInspector<'_>, pages: &[Page], ctx: &mut RunContext) {
    for page in pages {
        match read_page(&page.path) {
            Ok(html) => inspector.inspect(page, &html, ctx),
            Err(e) => {
                warn!("failed to process {}: {}", page.relative, e);
                ctx.skipped.push(SkippedPage {
                    page: page.relative.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

// Reads a page as text. Invalid UTF-8 is replaced rather than rejected; only
// IO errors make a page unreadable.
fn read_page(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| AuditError::read(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
