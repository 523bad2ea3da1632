// src/site/mod.rs
// =============================================================================
// Everything that deals with the site tree on disk.
//
// Submodules:
// - discovery: walks the root and lists the pages to audit
// - resolve: maps an href to a file, with clean-URL and index fallbacks
// - sitemap: optional cross-check against sitemap.xml
// =============================================================================

mod discovery;
mod resolve;
pub mod sitemap;

pub use discovery::{discover_pages, relative_display, Page};
pub use resolve::{strip_query_and_fragment, PathResolver};
