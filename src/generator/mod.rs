//! Generator module - exports the site as static HTML files

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::BlogPost;
use crate::templates::TemplateRenderer;
use crate::Site;

/// Static site generator using the built-in templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
}

/// What a generation run produced
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateStats {
    pub posts: usize,
    pub pages: usize,
    pub assets: usize,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            renderer: TemplateRenderer::new(&site.config)?,
        })
    }

    /// Generate the entire site into the public directory
    pub fn generate(&self) -> Result<GenerateStats> {
        let posts = self.site.list_posts()?;
        let pages = if self.site.pages_dir.is_dir() {
            self.site.pages().list_posts()?
        } else {
            Vec::new()
        };

        let public = &self.site.public_dir;
        fs::create_dir_all(public)?;

        let assets = self.copy_static_assets()?;

        let recent: Vec<BlogPost> = posts
            .iter()
            .take(self.site.config.recent_posts)
            .cloned()
            .collect();
        write_file(&public.join("index.html"), &self.renderer.home(&recent)?)?;
        write_file(
            &public.join("blog").join("index.html"),
            &self.renderer.blog(&posts)?,
        )?;

        for post in &posts {
            let path = public.join("blog").join(&post.id).join("index.html");
            write_file(&path, &self.renderer.post(post)?)?;
        }

        let mut written_pages = 0;
        for page in &pages {
            if is_reserved(&page.id) {
                tracing::warn!("Skipping page {:?}: the name is used by the blog", page.id);
                continue;
            }
            let path = public.join(&page.id).join("index.html");
            write_file(&path, &self.renderer.page(page)?)?;
            written_pages += 1;
        }

        write_file(&public.join("404.html"), &self.renderer.not_found("Página")?)?;
        write_file(
            &public.join("api").join("posts.json"),
            &serde_json::to_string_pretty(&posts)?,
        )?;

        Ok(GenerateStats {
            posts: posts.len(),
            pages: written_pages,
            assets,
        })
    }

    /// Copy the static directory into the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest).with_context(|| format!("Failed to copy {:?}", path))?;
            copied += 1;
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(copied)
    }
}

/// Top-level names the blog export already writes
fn is_reserved(slug: &str) -> bool {
    matches!(slug, "blog" | "api" | "index" | "404")
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!("Generated: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn site_with_posts() -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("a.md"), "---\ntitle: First\ndate: 2024-01-01\n---\nA\n").unwrap();
        fs::write(posts.join("b.md"), "---\ntitle: Second\ndate: 2024-06-01\n---\nB\n").unwrap();
        let site = Site::with_config(tmp.path(), SiteConfig::default());
        (tmp, site)
    }

    #[test]
    fn test_generate_writes_every_page() {
        let (tmp, site) = site_with_posts();
        fs::create_dir_all(tmp.path().join("pages")).unwrap();
        fs::write(tmp.path().join("pages/terminos.md"), "---\ntitle: Términos\n---\nT\n").unwrap();
        fs::write(tmp.path().join("pages/blog.md"), "---\ntitle: Clash\n---\n").unwrap();
        fs::create_dir_all(tmp.path().join("static/img")).unwrap();
        fs::write(tmp.path().join("static/img/logo.svg"), "<svg/>").unwrap();

        let stats = Generator::new(&site).unwrap().generate().unwrap();
        assert_eq!(stats, GenerateStats { posts: 2, pages: 1, assets: 1 });

        let public = tmp.path().join("public");
        for file in [
            "index.html",
            "blog/index.html",
            "blog/a/index.html",
            "blog/b/index.html",
            "terminos/index.html",
            "404.html",
            "api/posts.json",
            "img/logo.svg",
        ] {
            assert!(public.join(file).is_file(), "missing {}", file);
        }
        let blog_index = fs::read_to_string(public.join("blog/index.html")).unwrap();
        assert!(blog_index.contains("/blog/a"));
        assert!(!blog_index.contains("Clash"));

        let json = fs::read_to_string(public.join("api/posts.json")).unwrap();
        let posts: Vec<BlogPost> = serde_json::from_str(&json).unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_generate_fails_without_posts_dir() {
        let tmp = TempDir::new().unwrap();
        let site = Site::with_config(tmp.path(), SiteConfig::default());
        assert!(Generator::new(&site).unwrap().generate().is_err());
        assert!(!tmp.path().join("public").exists());
    }
}
