// src/error.rs
// =============================================================================
// Error types for the audit engine.
//
// Almost nothing in an audit is fatal: dead links, orphan pages and broken
// external links are *findings*, not errors. The variants here cover the few
// things that can go wrong while setting up a run or reading a single page.
// Page-level errors are caught by the auditor and turned into "skipped page"
// entries so the rest of the site is still audited.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("site root {0} is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AuditError {
    /// Wraps an IO error with the path that caused it
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuditError::Read {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
