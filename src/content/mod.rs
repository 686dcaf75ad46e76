//! Content module - Markdown documents turned into blog posts and pages

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use frontmatter::{parse_date_string, FrontMatter};
pub use loader::BlogLoader;
pub use markdown::MarkdownRenderer;
pub use post::{sort_newest_first, BlogPost};

/// Errors raised while reading content from disk
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ContentError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        ContentError::Io { path, source }
    }
}
