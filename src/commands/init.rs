//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Site
title: Site
description: ''
url: http://localhost:4000
language: es

# Directory
posts_dir: posts
pages_dir: pages
static_dir: static
public_dir: public

# Display
date_format: '%d/%m/%Y'
recent_posts: 3
menu: []

# Writing
markdown:
  extensions: true
  allow_raw_html: false
  highlight: false
  highlight_theme: base16-ocean.dark
  line_numbers: false

# Contact form (SITEBLOG_CONTACT_URL overrides the endpoint)
contact:
  endpoint:
  timeout_secs: 10
  require_privacy: true
"#;

const DEFAULT_STYLESHEET: &str = r#"body { font-family: system-ui, sans-serif; margin: 0; color: #222; }
main { max-width: 64rem; margin: 0 auto; padding: 2rem 1rem; }
.site-header, .site-footer { padding: 1rem; background: #343432; color: #fff; }
.site-header a, .site-footer a { color: #fff; margin-right: 1rem; }
.cards { display: grid; gap: 2rem; grid-template-columns: repeat(auto-fill, minmax(16rem, 1fr)); }
.card { border-radius: 0.75rem; box-shadow: 0 1px 4px rgba(0, 0, 0, 0.15); padding: 1.5rem; }
.tags { list-style: none; padding: 0; display: flex; gap: 0.5rem; }
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("posts"))?;
    fs::create_dir_all(target_dir.join("pages"))?;
    fs::create_dir_all(target_dir.join("static/css"))?;

    write_if_missing(&target_dir.join("_config.yml"), DEFAULT_CONFIG)?;
    write_if_missing(&target_dir.join("static/css/site.css"), DEFAULT_STYLESHEET)?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    let hello_world = format!(
        r#"---
title: Hello World
date: {}
tags: [welcome]
---

Welcome to your new site. This post lives in `posts/hello-world.md`.

## Quick Start

- Create a post: `siteblog new "My New Post"`
- Run the server: `siteblog server`
- Export static files: `siteblog generate`
"#,
        today
    );
    write_if_missing(&target_dir.join("posts/hello-world.md"), &hello_world)?;

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::debug!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, content)?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}
