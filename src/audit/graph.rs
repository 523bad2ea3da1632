// src/audit/graph.rs
// =============================================================================
// The internal link graph: target page -> pages that link to it.
//
// Edges only exist for links that resolved to a real file, so "no inbound
// edges" really means "nothing in the site reaches this page".
//
// Targets are remembered in first-seen order and sources in insertion
// order, so two runs over the same tree rank and print identically.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::{Config, INDEX_PAGE};
use crate::site::Page;

#[derive(Debug, Default)]
pub struct LinkGraph {
    inbound: HashMap<PathBuf, Vec<PathBuf>>,
    /// Targets in the order they first received an edge
    order: Vec<PathBuf>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `source` links to `target`
    pub fn add_edge(&mut self, target: PathBuf, source: PathBuf) {
        match self.inbound.get_mut(&target) {
            Some(sources) => sources.push(source),
            None => {
                self.order.push(target.clone());
                self.inbound.insert(target, vec![source]);
            }
        }
    }

    pub fn inbound_count(&self, target: &Path) -> usize {
        self.inbound.get(target).map_or(0, Vec::len)
    }

    pub fn is_target(&self, path: &Path) -> bool {
        self.inbound.contains_key(path)
    }

    pub fn edge_count(&self) -> usize {
        self.inbound.values().map(Vec::len).sum()
    }

    // Pages nothing links to.
    //
    // Never orphans: any index.html (directory landing pages, including
    // the root), and files on the ignore lists.
    pub fn orphans<'p>(&self, pages: &'p [Page], root: &Path, config: &Config) -> Vec<&'p Page> {
        let root_index = root.join(INDEX_PAGE);
        pages
            .iter()
            .filter(|page| !self.is_target(&page.path))
            .filter(|page| page.file_name() != INDEX_PAGE)
            .filter(|page| page.path != root_index)
            .filter(|page| !config.is_ignored_file(page.file_name()))
            .collect()
    }

    // The `n` most linked-to targets, most inbound edges first.
    //
    // Ties keep discovery order: audited pages first in the order they
    // were found, then any other linked files in the order they were
    // first linked.
    pub fn top_targets(&self, pages: &[Page], n: usize) -> Vec<(PathBuf, usize)> {
        let mut ranked: Vec<(PathBuf, usize)> = pages
            .iter()
            .filter(|page| self.is_target(&page.path))
            .map(|page| (page.path.clone(), self.inbound_count(&page.path)))
            .collect();

        let audited: HashSet<&Path> = pages.iter().map(|page| page.path.as_path()).collect();
        for target in &self.order {
            if !audited.contains(target.as_path()) {
                ranked.push((target.clone(), self.inbound_count(target)));
            }
        }

        // sort_by is stable, so equal counts keep the order built above
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
