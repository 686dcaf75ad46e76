//! siteblog: a marketing site with a file-backed Markdown blog
//!
//! Blog posts are Markdown files with YAML front-matter. They are read,
//! rendered and sorted on every request; nothing is cached. The same
//! pipeline renders static pages, and the site can be served over HTTP or
//! exported as plain HTML files.

pub mod commands;
pub mod config;
pub mod contact;
pub mod content;
pub mod generator;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{BlogLoader, BlogPost, ContentError};

/// The site application
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Blog posts directory
    pub posts_dir: PathBuf,
    /// Static pages directory
    pub pages_dir: PathBuf,
    /// Assets served verbatim
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Create a new site from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = base_dir.join(&config.posts_dir);
        let pages_dir = base_dir.join(&config.pages_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            posts_dir,
            pages_dir,
            static_dir,
            public_dir,
        }
    }

    /// Loader for blog posts
    pub fn posts(&self) -> BlogLoader {
        BlogLoader::new(&self.posts_dir, &self.config.markdown)
    }

    /// Loader for static pages
    pub fn pages(&self) -> BlogLoader {
        BlogLoader::new(&self.pages_dir, &self.config.markdown)
    }

    /// All blog posts, newest first
    pub fn list_posts(&self) -> Result<Vec<BlogPost>, ContentError> {
        self.posts().list_posts()
    }

    /// A single blog post by id
    pub fn get_post(&self, id: &str) -> Result<Option<BlogPost>, ContentError> {
        self.posts().get_post(id)
    }

    /// A static page by slug
    pub fn get_page(&self, slug: &str) -> Result<Option<BlogPost>, ContentError> {
        self.pages().get_post(slug)
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::init_site(&self.base_dir)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
