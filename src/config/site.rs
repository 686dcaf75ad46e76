//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable that overrides `contact.endpoint`
pub const CONTACT_URL_ENV: &str = "SITEBLOG_CONTACT_URL";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub url: String,
    pub language: String,

    // Directory
    pub posts_dir: String,
    pub pages_dir: String,
    pub static_dir: String,
    pub public_dir: String,

    // Display
    pub date_format: String,
    pub recent_posts: usize,
    pub menu: Vec<MenuItem>,

    pub markdown: MarkdownConfig,
    pub contact: ContactConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Site".to_string(),
            description: String::new(),
            url: "http://localhost:4000".to_string(),
            language: "es".to_string(),

            posts_dir: "posts".to_string(),
            pages_dir: "pages".to_string(),
            static_dir: "static".to_string(),
            public_dir: "public".to_string(),

            date_format: "%d/%m/%Y".to_string(),
            recent_posts: 3,
            menu: Vec::new(),

            markdown: MarkdownConfig::default(),
            contact: ContactConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_contact_url(std::env::var(CONTACT_URL_ENV).ok());
    }

    fn apply_contact_url(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Contact endpoint overridden by {}", CONTACT_URL_ENV);
            self.contact.endpoint = Some(url);
        }
    }
}

/// Header navigation entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub title: String,
    pub path: String,
}

/// Markdown rendering options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Tables, footnotes, strikethrough and task lists
    pub extensions: bool,
    /// Pass raw HTML through instead of escaping it
    pub allow_raw_html: bool,
    pub highlight: bool,
    pub highlight_theme: String,
    pub line_numbers: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: true,
            allow_raw_html: false,
            highlight: false,
            highlight_theme: "base16-ocean.dark".to_string(),
            line_numbers: false,
        }
    }
}

/// Contact form forwarding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub require_privacy: bool,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 10,
            require_privacy: true,
        }
    }
}
