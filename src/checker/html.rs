// src/checker/html.rs
// =============================================================================
// This module inspects one HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Is built on html5ever (Mozilla's HTML parser), so it never "fails" on
//   broken markup, it just recovers the way a browser would
//
// The rest of the audit never touches scraper directly. It asks questions
// through the small MarkupQuery trait below, so the parser can be swapped
// without touching the checks.
//
// Checks per page (each independent):
// 1. Exactly one <h1>
// 2. A <script type="application/ld+json"> block (structured data)
// 3. Breadcrumb navigation on pages below the root (INFO only)
// 4. Every <a href>: classified, style-checked, and resolved
// =============================================================================

use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use crate::audit::{FindingKind, RunContext};
use crate::config::{Config, PAGE_EXTENSION};
use crate::site::{strip_query_and_fragment, Page, PathResolver};

/// rel tokens every external link should carry
const PROTECTION_RELS: [&str; 3] = ["nofollow", "noopener", "noreferrer"];

/// One <a> element with a non-empty href
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// href with surrounding whitespace trimmed
    pub href: String,
    /// rel attribute split into lowercase tokens
    pub rel: Vec<String>,
}

// The questions the audit asks of a parsed page.
//
// Kept deliberately small: find elements by tag, find by attribute
// predicate, and read an attribute as a token set (via Anchor::rel).
pub trait MarkupQuery {
    /// Number of elements with this tag name
    fn count_tag(&self, tag: &str) -> usize;

    /// Attribute `want` of the first `tag` element whose `attr` contains the
    /// whitespace-separated token `token` (case-insensitive)
    fn find_attr(&self, tag: &str, attr: &str, token: &str, want: &str) -> Option<String>;

    /// Does any element carry `attr` with a value matching `pred`?
    fn any_attr(&self, attr: &str, pred: &dyn Fn(&str) -> bool) -> bool;

    /// Every anchor with a non-empty href, in document order
    fn anchors(&self) -> Vec<Anchor>;
}

/// scraper-backed implementation of MarkupQuery
pub struct HtmlDoc {
    document: Html,
}

fn all_elements() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    // Constant selector, known to be valid
    SELECTOR.get_or_init(|| Selector::parse("*").unwrap())
}

impl HtmlDoc {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.document.select(all_elements())
    }

    fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.elements()
            .filter(move |el| el.value().name().eq_ignore_ascii_case(tag))
    }
}

fn has_token(value: Option<&str>, token: &str) -> bool {
    value.is_some_and(|v| v.split_whitespace().any(|t| t.eq_ignore_ascii_case(token)))
}

impl MarkupQuery for HtmlDoc {
    fn count_tag(&self, tag: &str) -> usize {
        self.tagged(tag).count()
    }

    fn find_attr(&self, tag: &str, attr: &str, token: &str, want: &str) -> Option<String> {
        self.tagged(tag)
            .find(|el| has_token(el.value().attr(attr), token))
            .and_then(|el| el.value().attr(want))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn any_attr(&self, attr: &str, pred: &dyn Fn(&str) -> bool) -> bool {
        self.elements()
            .any(|el| el.value().attr(attr).is_some_and(pred))
    }

    fn anchors(&self) -> Vec<Anchor> {
        self.tagged("a")
            .filter_map(|el| {
                let href = el.value().attr("href")?.trim();
                if href.is_empty() {
                    return None;
                }
                let rel = el
                    .value()
                    .attr("rel")
                    .map(|r| r.split_whitespace().map(|t| t.to_ascii_lowercase()).collect())
                    .unwrap_or_default();
                Some(Anchor {
                    href: href.to_string(),
                    rel,
                })
            })
            .collect()
    }
}

// How a single href should be treated
#[derive(Debug, PartialEq, Eq)]
enum LinkForm {
    /// Full URL into our own site; holds the root-relative path part
    AbsoluteInternal(String),
    /// Full http(s) URL somewhere else
    External,
    /// Path-form link, resolved on disk
    Internal,
}

// Runs the per-page checks and feeds the results into the run context.
pub struct PageInspector<'a> {
    config: &'a Config,
    resolver: &'a PathResolver,
}

impl<'a> PageInspector<'a> {
    pub fn new(config: &'a Config, resolver: &'a PathResolver) -> Self {
        Self { config, resolver }
    }

    // Inspects one page.
    //
    // Parameters:
    //   page: the page being audited
    //   html: its content (already read from disk)
    //   ctx: the run context that collects findings, edges and external URLs
    pub fn inspect(&self, page: &Page, html: &str, ctx: &mut RunContext) {
        let doc = HtmlDoc::parse(html);
        self.inspect_doc(page, &doc, ctx);
    }

    /// Same as inspect, for any MarkupQuery implementation
    pub fn inspect_doc(&self, page: &Page, doc: &impl MarkupQuery, ctx: &mut RunContext) {
        let rel_path = page.relative.as_str();

        match doc.count_tag("h1") {
            0 => ctx.ledger.record(
                FindingKind::MissingH1,
                format!("{}: Missing <h1> tag", rel_path),
            ),
            1 => {}
            n => ctx.ledger.record(
                FindingKind::MultipleH1,
                format!("{}: Multiple <h1> tags found ({})", rel_path, n),
            ),
        }

        if doc
            .find_attr("script", "type", "application/ld+json", "type")
            .is_none()
        {
            ctx.ledger.record(
                FindingKind::MissingStructuredData,
                format!("{}: Missing Schema Markup (application/ld+json)", rel_path),
            );
        }

        if rel_path.contains('/') && !has_breadcrumb(doc) {
            ctx.ledger.record(
                FindingKind::MissingBreadcrumb,
                format!("{}: No breadcrumb navigation found", rel_path),
            );
        }

        let anchors = doc.anchors();
        debug!("{}: {} anchor(s)", rel_path, anchors.len());
        for anchor in &anchors {
            self.check_anchor(page, anchor, ctx);
        }
    }

    fn check_anchor(&self, page: &Page, anchor: &Anchor, ctx: &mut RunContext) {
        let href = anchor.href.as_str();
        let rel_path = page.relative.as_str();

        if self.config.is_ignored_url(href) {
            trace!("{}: ignoring {}", rel_path, href);
            return;
        }

        match self.classify(href) {
            LinkForm::AbsoluteInternal(path) => {
                ctx.ledger.record(
                    FindingKind::AbsoluteInternalLink,
                    format!(
                        "{}: Absolute internal link found: {} -> Use path instead (e.g. {})",
                        rel_path,
                        href,
                        strip_query_and_fragment(&path)
                    ),
                );
                self.follow(page, href, &path, "Dead Link (Internal Absolute)", ctx);
            }
            LinkForm::External => {
                ctx.external_urls.insert(href.to_string());

                let missing: Vec<&str> = PROTECTION_RELS
                    .iter()
                    .copied()
                    .filter(|wanted| !anchor.rel.iter().any(|r| r == wanted))
                    .collect();
                if !missing.is_empty() {
                    ctx.ledger.record(
                        FindingKind::UnprotectedExternalLink,
                        format!(
                            "{}: External link {} missing protection: {}",
                            rel_path,
                            href,
                            missing.join(", ")
                        ),
                    );
                }
            }
            LinkForm::Internal => {
                if !href.starts_with('/') {
                    ctx.ledger.record(
                        FindingKind::RelativeLink,
                        format!(
                            "{}: Relative path used: {} -> Should be absolute (e.g. /blog/post)",
                            rel_path, href
                        ),
                    );
                }

                let suffix = format!(".{}", PAGE_EXTENSION);
                if strip_query_and_fragment(href).ends_with(&suffix) {
                    ctx.ledger.record(
                        FindingKind::ExtensionLink,
                        format!("{}: .{} extension used: {} -> Should be Clean URL", rel_path, PAGE_EXTENSION, href),
                    );
                }

                self.follow(page, href, href, "Dead Link", ctx);
            }
        }
    }

    // Resolves `target` on disk: a hit becomes a graph edge, a miss a dead
    // link reported under the href the author actually wrote.
    fn follow(&self, page: &Page, href: &str, target: &str, label: &str, ctx: &mut RunContext) {
        let resolution = self.resolver.resolve(&page.path, target);
        if resolution.exists {
            ctx.graph.add_edge(resolution.path, page.path.clone());
        } else {
            debug!("{}: {} -> {} (missing)", page.relative, href, resolution.path.display());
            ctx.ledger.record(
                FindingKind::DeadLink,
                format!("{}: {}: {}", page.relative, label, href),
            );
            ctx.record_dead_link(page, href, resolution.path);
        }
    }

    fn classify(&self, href: &str) -> LinkForm {
        // Decided by prefix alone: a malformed web URL still belongs to the
        // external set, where a failed probe costs nothing.
        if !is_web_url(href) {
            return LinkForm::Internal;
        }

        match self.config.internal_path_of(href) {
            Some(path) => LinkForm::AbsoluteInternal(path),
            None => LinkForm::External,
        }
    }
}

fn is_web_url(href: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        href.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

fn has_breadcrumb(doc: &impl MarkupQuery) -> bool {
    doc.any_attr("aria-label", &|v: &str| v.trim().eq_ignore_ascii_case("breadcrumb"))
        || doc.any_attr("class", &|v: &str| v.contains("breadcrumb"))
}
