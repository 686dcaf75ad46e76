//! Blog post model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::frontmatter::{parse_date_string, FrontMatter};

/// A blog post (or static page) rendered from one Markdown document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Slug taken from the file name, used in `/blog/{id}`
    pub id: String,

    /// Post title, empty when the front-matter has none
    pub title: String,

    /// Date exactly as written in the front-matter
    pub date: String,

    /// Post tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Rendered HTML body
    pub content: String,
}

impl BlogPost {
    /// Build a post from parsed front-matter and rendered HTML
    pub fn from_parts(id: String, fm: FrontMatter, content: String) -> Self {
        Self {
            id,
            title: fm.title.unwrap_or_default(),
            date: fm.date.unwrap_or_default(),
            tags: fm.tags,
            content,
        }
    }

    /// The date as a sortable timestamp, if it can be parsed
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_date_string(&self.date)
    }
}

/// Sort newest first. Posts without a usable date go last; the sort is
/// stable so equal dates keep their listing order.
pub fn sort_newest_first(posts: &mut [BlogPost]) {
    posts.sort_by_cached_key(|p| std::cmp::Reverse(p.timestamp()));
}
