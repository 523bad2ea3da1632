// src/site/discovery.rs
// =============================================================================
// Finds every page under the site root.
//
// How it works:
// 1. Walk the root recursively (entries sorted by name, so the order is
//    the same on every run)
// 2. Prune any directory whose path contains an ignore-path substring
//    *before* descending into it
// 3. Keep files ending in .html that aren't on the ignore-file lists
// =============================================================================

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{Config, PAGE_EXTENSION};

/// One discovered markup file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Absolute path; this is the page's identity
    pub path: PathBuf,
    /// Path relative to the site root with '/' separators, for reporting
    pub relative: String,
}

impl Page {
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let relative = relative_display(root, &path);
        Self { path, relative }
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Renders `path` relative to `root` the same way on every platform
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// Walks `root` and returns the pages to audit, in traversal order.
//
// Unreadable directory entries are logged and skipped; discovery itself
// never fails.
pub fn discover_pages(root: &Path, config: &Config) -> Vec<Page> {
    let mut pages = Vec::new();
    let suffix = format!(".{}", PAGE_EXTENSION);

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(root, entry, config));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(&suffix) || config.is_ignored_file(&name) {
            continue;
        }

        pages.push(Page::new(root, entry.into_path()));
    }

    debug!("discovered {} page(s) under {}", pages.len(), root.display());
    pages
}

// Directories are matched on their path relative to the root, so a root
// that happens to live under e.g. ".git-work/" is still audited.
fn is_pruned(root: &Path, entry: &DirEntry, config: &Config) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let relative = relative_display(root, entry.path());
    let pruned = config.is_ignored_path(&relative);
    if pruned {
        debug!("pruning {}", relative);
    }
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<html></html>").unwrap();
    }

    fn relatives(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.relative.as_str()).collect()
    }

    #[test]
    fn test_finds_html_files_recursively() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.html");
        touch(dir.path(), "about.html");
        touch(dir.path(), "blog/post.html");
        touch(dir.path(), "blog/index.html");
        touch(dir.path(), "style.css");

        let pages = discover_pages(dir.path(), &Config::default());
        assert_eq!(
            relatives(&pages),
            vec!["about.html", "blog/index.html", "blog/post.html", "index.html"]
        );
    }

    #[test]
    fn test_ignored_directories_are_pruned() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.html");
        touch(dir.path(), "node_modules/pkg/readme.html");
        touch(dir.path(), ".git/hooks/x.html");
        touch(dir.path(), "MasterTool/tool.html");

        let pages = discover_pages(dir.path(), &Config::default());
        assert_eq!(relatives(&pages), vec!["index.html"]);
    }

    #[test]
    fn test_ignored_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.html");
        touch(dir.path(), "404.html");
        touch(dir.path(), "google8f1e2d.html");

        let pages = discover_pages(dir.path(), &Config::default());
        assert_eq!(relatives(&pages), vec!["index.html"]);
    }

    #[test]
    fn test_order_is_stable() {
        let dir = TempDir::new().unwrap();
        for name in ["c.html", "a.html", "b/z.html", "b.html"] {
            touch(dir.path(), name);
        }
        let first = discover_pages(dir.path(), &Config::default());
        let second = discover_pages(dir.path(), &Config::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_page_file_name() {
        let page = Page::new(Path::new("/site"), PathBuf::from("/site/blog/post.html"));
        assert_eq!(page.file_name(), "post.html");
        assert_eq!(page.relative, "blog/post.html");
    }
}
