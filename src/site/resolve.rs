// src/site/resolve.rs
// =============================================================================
// Maps a link as written in a page to a file on disk.
//
// Static hosts serve the same page under several URLs, so a link is alive if
// ANY of these exist (first match wins):
//   a. the exact file                 /blog/post.html
//   b. an existing directory's index  /blog/      -> /blog/index.html
//   c. the "clean URL" + extension    /blog/post  -> /blog/post.html
//   d. the nested index file          /blog/post  -> /blog/post/index.html
//
// (b) and (d) look alike. (b) only fires when the directory itself is on
// disk; (d) checks the file path directly.
//
// Resolution is purely lexical plus `is_file`/`is_dir` checks. We never
// canonicalize, so symlinks are taken at face value.
// =============================================================================

use std::path::{Component, Path, PathBuf};

use crate::config::{INDEX_PAGE, PAGE_EXTENSION};

/// Where a link pointed and whether anything is there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: PathBuf,
    pub exists: bool,
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Resolves `href` as written on the page at `source`.
    //
    // Parameters:
    //   source: absolute path of the page containing the link
    //   href: the raw href value (query string and fragment allowed)
    //
    // Returns: the file the link lands on with exists=true, or the
    //          normalized target path with exists=false
    //
    // Examples (root = /site, source = /site/blog/index.html):
    //   "/about"      -> /site/about.html        (tier c)
    //   "post?x=1#y"  -> /site/blog/post.html    (tier c)
    //   "../"         -> /site/index.html        (tier b)
    //   "/../etc/x"   -> /etc/x                  (outside root, never exists)
    pub fn resolve(&self, source: &Path, href: &str) -> Resolution {
        let target = self.target_path(source, href);

        // `..` past the root lands outside the site: dead, whatever is there
        if !target.starts_with(&self.root) {
            return Resolution {
                path: target,
                exists: false,
            };
        }

        if target.is_file() {
            return found(target);
        }

        if target.is_dir() {
            let index = target.join(INDEX_PAGE);
            if index.is_file() {
                return found(index);
            }
        }

        let with_extension = append_extension(&target);
        if with_extension.is_file() {
            return found(with_extension);
        }

        let nested_index = target.join(INDEX_PAGE);
        if nested_index.is_file() {
            return found(nested_index);
        }

        Resolution {
            path: target,
            exists: false,
        }
    }

    // Steps 1-3: strip query/fragment, anchor at the root or the page's
    // directory, then collapse `.` and `..`.
    fn target_path(&self, source: &Path, href: &str) -> PathBuf {
        let url_path = strip_query_and_fragment(href);

        // Strip every leading '/', otherwise Path::join on "//x" would
        // replace the root instead of extending it
        let joined = if url_path.starts_with('/') {
            self.root.join(url_path.trim_start_matches('/'))
        } else {
            source
                .parent()
                .unwrap_or(&self.root)
                .join(url_path)
        };

        normalize(&joined)
    }
}

fn found(path: PathBuf) -> Resolution {
    Resolution { path, exists: true }
}

/// "/a/b?x=1#top" -> "/a/b"
pub fn strip_query_and_fragment(href: &str) -> &str {
    let end = href.find(['?', '#']).unwrap_or(href.len());
    &href[..end]
}

// "post" -> "post.html". Not Path::with_extension, which would turn
// "v1.2" into "v1.html".
fn append_extension(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".");
    os.push(PAGE_EXTENSION);
    PathBuf::from(os)
}

// Lexical normalization. `..` at the filesystem root stays at the root,
// like most path normalizers do.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if !at_root {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why return the normalized path even when nothing exists?
//    - Dead-link reports show the original href to the user, but the
//      normalized path is handy when debugging why a link didn't resolve
//
// 2. Why not std::fs::canonicalize?
//    - canonicalize fails on paths that don't exist, which is exactly the
//      case we care about for dead links
//    - It also resolves symlinks, which would make page identities differ
//      from the paths discovery produced
//
// 3. What does str::find(['?', '#']) do?
//    - An array of chars is a pattern matching ANY of those chars
//    - So we cut at whichever comes first
// -----------------------------------------------------------------------------
