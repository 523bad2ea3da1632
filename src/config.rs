// src/config.rs
// =============================================================================
// Run configuration: hard-coded defaults, then whatever we can detect from the
// site's root index.html, then command-line overrides.
//
// What we detect:
// - Base URL: <link rel="canonical"> href, else <meta property="og:url">
// - Keywords: <meta name="keywords"> content, split on commas
//
// Detection never aborts the run. If the root page is missing or unreadable
// we record a WARN (worth zero points) and keep the defaults.
// =============================================================================

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::audit::{FindingKind, Ledger};
use crate::checker::{HtmlDoc, MarkupQuery};

/// Name of the page that stands for a directory
pub const INDEX_PAGE: &str = "index.html";

/// Extension of the files we audit (without the dot)
pub const PAGE_EXTENSION: &str = "html";

#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical site URL without a trailing slash
    pub base_url: Option<String>,
    /// Keywords from the root page's meta tag, in order
    pub keywords: Vec<String>,
    /// Directories whose path (relative to the root) contains one of these are skipped
    pub ignore_path_substrings: Vec<String>,
    /// hrefs starting with one of these are not checked at all
    pub ignore_url_prefixes: Vec<String>,
    /// hrefs containing one of these are not checked at all
    pub ignore_url_substrings: Vec<String>,
    /// Exact file names that are never audited (e.g. 404.html)
    pub ignore_filenames: Vec<String>,
    /// File names containing one of these are never audited
    pub ignore_filename_substrings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            keywords: Vec::new(),
            ignore_path_substrings: strings(&[".git", "node_modules", "__pycache__", "MasterTool"]),
            ignore_url_prefixes: strings(&["/go/", "javascript:", "mailto:", "tel:", "#"]),
            ignore_url_substrings: strings(&["cdn-cgi"]),
            ignore_filenames: strings(&["404.html"]),
            ignore_filename_substrings: strings(&["google"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    // Builds the configuration for a site root.
    //
    // Parameters:
    //   root: the site root directory
    //   preset_base_url: a base URL given on the command line; when present
    //                    we don't try to detect one (and don't warn about it)
    //   ledger: where detection warnings go
    pub fn detect(root: &Path, preset_base_url: Option<String>, ledger: &mut Ledger) -> Self {
        let mut config = Config {
            base_url: preset_base_url.map(|url| trim_base_url(&url)),
            ..Config::default()
        };

        let index_path = root.join(INDEX_PAGE);
        if !index_path.is_file() {
            ledger.record(
                FindingKind::ConfigDetection,
                "Root index.html not found. Auto-configuration limited.",
            );
            return config;
        }

        let html = match fs::read(&index_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!("failed to read {} for config: {}", index_path.display(), e);
                ledger.record(
                    FindingKind::ConfigDetection,
                    format!("Failed to read index.html for config: {}", e),
                );
                return config;
            }
        };

        let doc = HtmlDoc::parse(&html);

        if config.base_url.is_none() {
            config.base_url = detect_base_url(&doc);
            match &config.base_url {
                Some(url) => debug!("detected base URL {}", url),
                None => ledger.record(
                    FindingKind::ConfigDetection,
                    "Could not determine Base URL from index.html (checked canonical and og:url).",
                ),
            }
        }

        config.keywords = detect_keywords(&doc);
        config
    }

    /// Adds command-line ignore rules on top of the defaults
    pub fn with_extra_ignores(mut self, paths: &[String], files: &[String]) -> Self {
        self.ignore_path_substrings.extend(paths.iter().cloned());
        self.ignore_filenames.extend(files.iter().cloned());
        self
    }

    /// Is this directory (given relative to the root) pruned from discovery?
    pub fn is_ignored_path(&self, relative: &str) -> bool {
        self.ignore_path_substrings
            .iter()
            .any(|ignore| relative.contains(ignore.as_str()))
    }

    /// Is a file with this name excluded from the audit?
    pub fn is_ignored_file(&self, filename: &str) -> bool {
        self.ignore_filenames.iter().any(|f| f == filename)
            || self
                .ignore_filename_substrings
                .iter()
                .any(|s| filename.contains(s.as_str()))
    }

    /// Should this href be skipped entirely?
    pub fn is_ignored_url(&self, href: &str) -> bool {
        self.ignore_url_prefixes
            .iter()
            .any(|p| href.starts_with(p.as_str()))
            || self
                .ignore_url_substrings
                .iter()
                .any(|s| href.contains(s.as_str()))
    }

    // If `href` is an absolute link into our own site, returns the path part
    // (always starting with '/').
    //
    // The base URL must match at a path boundary, so with a base of
    // "https://example.com" the link "https://example.com.evil.net/" is
    // still external.
    pub fn internal_path_of(&self, href: &str) -> Option<String> {
        let base = self.base_url.as_deref()?;
        let rest = href.strip_prefix(base)?;

        if rest.is_empty() {
            return Some("/".to_string());
        }
        match rest.chars().next() {
            Some('/') => Some(rest.to_string()),
            Some('?') | Some('#') => Some(format!("/{}", rest)),
            _ => None,
        }
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn detect_base_url(doc: &impl MarkupQuery) -> Option<String> {
    doc.find_attr("link", "rel", "canonical", "href")
        .or_else(|| doc.find_attr("meta", "property", "og:url", "content"))
        .map(|url| trim_base_url(&url))
        .filter(|url| !url.is_empty())
}

fn detect_keywords(doc: &impl MarkupQuery) -> Vec<String> {
    match doc.find_attr("meta", "name", "keywords", "content") {
        Some(content) => content.split(',').map(|k| k.trim().to_string()).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site_with_index(html: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), html).unwrap();
        dir
    }

    #[test]
    fn test_canonical_wins_over_og_url() {
        let dir = site_with_index(
            r#"<html><head>
                <link rel="canonical" href="https://example.com/">
                <meta property="og:url" content="https://other.example/">
            </head></html>"#,
        );
        let mut ledger = Ledger::new();
        let config = Config::detect(dir.path(), None, &mut ledger);
        assert_eq!(config.base_url.as_deref(), Some("https://example.com"));
        assert!(ledger.findings().is_empty());
    }

    #[test]
    fn test_og_url_fallback_and_keywords() {
        let dir = site_with_index(
            r#"<html><head>
                <meta property="og:url" content="https://example.com/">
                <meta name="keywords" content="rust, static sites ,seo">
            </head></html>"#,
        );
        let mut ledger = Ledger::new();
        let config = Config::detect(dir.path(), None, &mut ledger);
        assert_eq!(config.base_url.as_deref(), Some("https://example.com"));
        assert_eq!(config.keywords, vec!["rust", "static sites", "seo"]);
    }

    #[test]
    fn test_missing_base_url_warns_without_deduction() {
        let dir = site_with_index("<html><head><title>x</title></head></html>");
        let mut ledger = Ledger::new();
        let config = Config::detect(dir.path(), None, &mut ledger);
        assert!(config.base_url.is_none());
        assert_eq!(ledger.count(FindingKind::ConfigDetection), 1);
        assert_eq!(ledger.score(), 100);
    }

    #[test]
    fn test_missing_index_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let mut ledger = Ledger::new();
        let config = Config::detect(dir.path(), None, &mut ledger);
        assert!(config.base_url.is_none());
        assert!(config.keywords.is_empty());
        assert_eq!(config.ignore_filenames, vec!["404.html"]);
        assert_eq!(ledger.count(FindingKind::ConfigDetection), 1);
        assert_eq!(ledger.score(), 100);
    }

    #[test]
    fn test_preset_base_url_skips_detection() {
        let dir = site_with_index("<html></html>");
        let mut ledger = Ledger::new();
        let config = Config::detect(dir.path(), Some("https://cli.example/".into()), &mut ledger);
        assert_eq!(config.base_url.as_deref(), Some("https://cli.example"));
        assert!(ledger.findings().is_empty());
    }

    #[test]
    fn test_ignore_rules() {
        let config = Config::default();
        assert!(config.is_ignored_url("mailto:me@example.com"));
        assert!(config.is_ignored_url("#top"));
        assert!(config.is_ignored_url("/cdn-cgi/l/email-protection"));
        assert!(!config.is_ignored_url("/blog/post"));

        assert!(config.is_ignored_file("404.html"));
        assert!(config.is_ignored_file("google1234abcd.html"));
        assert!(!config.is_ignored_file("about.html"));

        assert!(config.is_ignored_path("node_modules/pkg"));
        assert!(!config.is_ignored_path("blog"));
    }

    #[test]
    fn test_internal_path_of() {
        let config = Config {
            base_url: Some("https://example.com".into()),
            ..Config::default()
        };
        assert_eq!(config.internal_path_of("https://example.com/blog/post.html").as_deref(), Some("/blog/post.html"));
        assert_eq!(config.internal_path_of("https://example.com").as_deref(), Some("/"));
        assert_eq!(config.internal_path_of("https://example.com?ref=x").as_deref(), Some("/?ref=x"));
        assert_eq!(config.internal_path_of("https://example.com.evil.net/"), None);
        assert_eq!(config.internal_path_of("https://other.com/blog"), None);
    }

    #[test]
    fn test_internal_path_with_base_path_segment() {
        // A base URL with a path maps that path onto the site root
        let config = Config {
            base_url: Some("https://example.com/docs".into()),
            ..Config::default()
        };
        assert_eq!(config.internal_path_of("https://example.com/docs/intro").as_deref(), Some("/intro"));
        assert_eq!(config.internal_path_of("https://example.com/docsearch"), None);
        assert_eq!(config.internal_path_of("https://example.com/blog"), None);
    }

    #[test]
    fn test_extra_ignores_append() {
        let config = Config::default().with_extra_ignores(&["drafts".into()], &["secret.html".into()]);
        assert!(config.is_ignored_path("drafts/x"));
        assert!(config.is_ignored_file("secret.html"));
        assert!(config.is_ignored_file("404.html"));
    }
}
