// src/site/sitemap.rs
// =============================================================================
// Optional cross-check between sitemap.xml and the pages on disk.
//
// The build pipeline emits a sitemap listing every public URL. If one is
// present we check it both ways:
// - every <loc> under our base URL should land on a real page
// - every audited page should be listed
//
// Both produce INFO findings only. The sitemap is generated, so a mismatch
// usually means a stale build rather than a broken site.
// =============================================================================

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::audit::{FindingKind, Ledger};
use crate::config::{Config, INDEX_PAGE};
use crate::site::{Page, PathResolver};

pub const SITEMAP_FILE: &str = "sitemap.xml";

fn loc_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    // Constant selector, known to be valid
    SELECTOR.get_or_init(|| Selector::parse("loc").unwrap())
}

/// Pulls every <loc> value out of a sitemap document
pub fn extract_locs(xml: &str) -> Vec<String> {
    // html5ever is lenient enough to read sitemap markup: <loc> is just an
    // unknown element and its text survives intact.
    let document = Html::parse_document(xml);
    document
        .select(loc_selector())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect()
}

// Runs the cross-check if the site has a sitemap and we know the base URL.
//
// Returns: how many sitemap entries were examined (0 when skipped)
pub fn cross_check(
    resolver: &PathResolver,
    config: &Config,
    pages: &[Page],
    ledger: &mut Ledger,
) -> usize {
    let root = resolver.root();
    let sitemap_path = root.join(SITEMAP_FILE);
    if !sitemap_path.is_file() {
        debug!("no {} found, skipping sitemap cross-check", SITEMAP_FILE);
        return 0;
    }
    if config.base_url.is_none() {
        debug!("base URL unknown, skipping sitemap cross-check");
        return 0;
    }

    let xml = match fs::read(&sitemap_path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("failed to read {}: {}", sitemap_path.display(), e);
            return 0;
        }
    };

    let locs = extract_locs(&xml);
    let listed = check_entries(root, resolver, config, &locs, ledger);

    for page in pages {
        if !listed.contains(&page.path) {
            ledger.record(
                FindingKind::NotInSitemap,
                format!("{}: Not listed in {}", page.relative, SITEMAP_FILE),
            );
        }
    }

    locs.len()
}

// Resolves each sitemap entry; returns the set of pages the sitemap covers.
fn check_entries(
    root: &Path,
    resolver: &PathResolver,
    config: &Config,
    locs: &[String],
    ledger: &mut Ledger,
) -> HashSet<PathBuf> {
    let source = root.join(INDEX_PAGE);
    let mut listed = HashSet::new();

    for loc in locs {
        let Some(path) = config.internal_path_of(loc) else {
            debug!("sitemap entry {} is outside the base URL", loc);
            continue;
        };

        let resolution = resolver.resolve(&source, &path);
        if resolution.exists {
            listed.insert(resolution.path);
        } else {
            ledger.record(
                FindingKind::SitemapEntryMissing,
                format!("Sitemap entry points to a missing page: {}", loc),
            );
        }
    }

    listed
}
