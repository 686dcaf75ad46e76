//! Content loader - loads blog posts from a directory of Markdown files

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::post::sort_newest_first;
use super::{BlogPost, ContentError, FrontMatter, MarkdownRenderer};
use crate::config::MarkdownConfig;

/// Loads posts from one directory. Every call reads the directory afresh.
pub struct BlogLoader {
    dir: PathBuf,
    renderer: MarkdownRenderer,
}

impl BlogLoader {
    /// Create a loader for `dir`
    pub fn new<P: Into<PathBuf>>(dir: P, markdown: &MarkdownConfig) -> Self {
        Self {
            dir: dir.into(),
            renderer: MarkdownRenderer::with_config(markdown),
        }
    }

    /// Directory this loader reads from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load every post, newest first
    pub fn list_posts(&self) -> Result<Vec<BlogPost>, ContentError> {
        let mut posts = Vec::new();

        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ContentError::walk(&self.dir, e))?;
            let path = entry.path();
            if entry.file_type().is_file() && is_markdown_file(path) {
                posts.push(self.load_post(path)?);
            }
        }

        sort_newest_first(&mut posts);
        tracing::debug!("Loaded {} posts from {:?}", posts.len(), self.dir);

        Ok(posts)
    }

    /// Load the post stored as `{id}.md`, or `None` when there is no such file
    pub fn get_post(&self, id: &str) -> Result<Option<BlogPost>, ContentError> {
        if !is_valid_id(id) {
            return Ok(None);
        }

        let path = self.dir.join(format!("{}.{}", id, POST_EXTENSION));
        if !path.is_file() {
            return Ok(None);
        }

        self.load_post(&path).map(Some)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<BlogPost, ContentError> {
        let raw = fs::read_to_string(path).map_err(|e| ContentError::io(path, e))?;
        let (fm, body) = FrontMatter::parse(&raw);

        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        if fm.title.is_none() || fm.date.is_none() {
            tracing::debug!("{:?} is missing title or date in its front-matter", path);
        }

        let content = self.renderer.render(body);
        Ok(BlogPost::from_parts(id, fm, content))
    }
}

/// Extension `get_post` resolves; listing accepts the same files only
const POST_EXTENSION: &str = "md";

/// Check if a file is a visible markdown file
fn is_markdown_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(true);

    !hidden
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == POST_EXTENSION)
            .unwrap_or(false)
}

/// Ids come from URLs; anything that could leave the directory is rejected
fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && !id.starts_with('.') && !id.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn loader(dir: &Path) -> BlogLoader {
        BlogLoader::new(dir, &MarkdownConfig::default())
    }

    fn two_posts() -> TempDir {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "---\ntitle: First\ndate: 2024-01-01\n---\nHello from a.\n");
        write(
            tmp.path(),
            "b.md",
            "---\ntitle: Second\ndate: 2024-06-01\ntags: [news, drones]\n---\n# B\n",
        );
        tmp
    }

    #[test]
    fn test_list_posts_newest_first() {
        let tmp = two_posts();
        let posts = loader(tmp.path()).list_posts().unwrap();

        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "First"]);
        assert_eq!(posts[0].id, "b");
        assert_eq!(posts[0].tags, vec!["news", "drones"]);
        assert_eq!(posts[1].id, "a");
        assert!(posts[1].tags.is_empty());
    }

    #[test]
    fn test_one_post_per_document() {
        let tmp = two_posts();
        write(tmp.path(), "c.md", "---\ntitle: Third\ndate: 2023-01-01\n---\nC\n");
        let posts = loader(tmp.path()).list_posts().unwrap();

        let mut ids: Vec<_> = posts.iter().map(|p| p.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_listed_ids_are_unique_and_resolvable() {
        let tmp = two_posts();
        write(tmp.path(), "a.markdown", "---\ntitle: Shadow\ndate: 2025-01-01\n---\nS\n");
        write(tmp.path(), "c.markdown", "---\ntitle: Other\ndate: 2023-01-01\n---\nC\n");
        let loader = loader(tmp.path());
        let posts = loader.list_posts().unwrap();

        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        for post in &posts {
            assert_eq!(loader.get_post(&post.id).unwrap().as_ref(), Some(post));
        }
        assert_eq!(loader.get_post("c").unwrap(), None);
    }

    #[test]
    fn test_adjacent_posts_are_ordered() {
        let tmp = TempDir::new().unwrap();
        for (name, date) in [
            ("p1", "2021-05-01"),
            ("p2", "2024-02-10"),
            ("p3", "2022-11-30 08:00"),
            ("p4", "2024-02-10"),
            ("p5", "2019/07/04"),
        ] {
            write(
                tmp.path(),
                &format!("{}.md", name),
                &format!("---\ntitle: {}\ndate: {}\n---\nbody\n", name, date),
            );
        }

        let posts = loader(tmp.path()).list_posts().unwrap();
        for pair in posts.windows(2) {
            assert!(pair[0].timestamp() >= pair[1].timestamp());
        }
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p4", "p3", "p1", "p5"]);
    }

    #[test]
    fn test_content_is_rendered_body_only() {
        let tmp = two_posts();
        let posts = loader(tmp.path()).list_posts().unwrap();
        let b = &posts[0];
        assert_eq!(b.content, "<h1>B</h1>\n");
        assert!(!b.content.contains("title:"));
    }

    #[test]
    fn test_byte_order_mark_does_not_leak_into_content() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "bom.md", "\u{feff}---\ntitle: Bom\ndate: 2024-01-01\n---\nBody\n");

        let post = loader(tmp.path()).get_post("bom").unwrap().unwrap();
        assert_eq!(post.title, "Bom");
        assert_eq!(post.date, "2024-01-01");
        assert_eq!(post.content, "<p>Body</p>\n");
    }

    #[test]
    fn test_list_posts_is_idempotent() {
        let tmp = two_posts();
        let loader = loader(tmp.path());
        assert_eq!(loader.list_posts().unwrap(), loader.list_posts().unwrap());
    }

    #[test]
    fn test_empty_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(loader(tmp.path()).list_posts().unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let err = loader(&missing).list_posts().unwrap_err();
        assert!(matches!(err, ContentError::Io { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_ignores_other_files() {
        let tmp = two_posts();
        write(tmp.path(), "notes.txt", "not a post");
        write(tmp.path(), ".draft.md", "---\ntitle: Hidden\n---\n");
        fs::create_dir(tmp.path().join("nested.md")).unwrap();

        let posts = loader(tmp.path()).list_posts().unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn test_missing_metadata_is_kept() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "bare.md", "Just a body.\n");
        write(tmp.path(), "dated.md", "---\ndate: 2024-01-01\n---\nDated.\n");

        let posts = loader(tmp.path()).list_posts().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "dated");
        assert_eq!(posts[0].title, "");
        assert_eq!(posts[1].id, "bare");
        assert_eq!(posts[1].date, "");
        assert_eq!(posts[1].content, "<p>Just a body.</p>\n");
    }

    #[test]
    fn test_get_post() {
        let tmp = two_posts();
        let loader = loader(tmp.path());

        let post = loader.get_post("a").unwrap().unwrap();
        assert_eq!(post.title, "First");
        assert_eq!(post.date, "2024-01-01");
        assert_eq!(post.content, "<p>Hello from a.</p>\n");

        assert_eq!(loader.get_post("missing").unwrap(), None);
    }

    #[test]
    fn test_get_post_rejects_path_escapes() {
        let tmp = two_posts();
        write(tmp.path(), "secret.md", "---\ntitle: Secret\n---\n");
        let posts_dir = tmp.path().join("posts");
        fs::create_dir(&posts_dir).unwrap();
        let loader = loader(&posts_dir);

        assert_eq!(loader.get_post("../secret").unwrap(), None);
        assert_eq!(loader.get_post("").unwrap(), None);
        assert_eq!(loader.get_post(".hidden").unwrap(), None);
    }
}
