// src/checker/mod.rs
// =============================================================================
// This module contains the per-link and per-page checking logic.
//
// Submodules:
// - html: Parses a page, runs the structural checks and classifies links
// - http: Probes external URLs concurrently
//
// This file (mod.rs) is the module root - it re-exports the public API so
// the rest of the crate can write `checker::PageInspector` instead of
// `checker::html::PageInspector`.
// =============================================================================

mod html;
mod http;

pub use html::{HtmlDoc, MarkupQuery, PageInspector};
pub use http::{
    ExternalCheck, ExternalChecker, ExternalStatus, Unreachable, DEFAULT_TIMEOUT, DEFAULT_WORKERS,
};
