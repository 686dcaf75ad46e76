//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping stays on: the only
//! value inserted raw is the rendered post/page body, via `| safe`.

use anyhow::Result;
use chrono::Datelike;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;
use tera::{Context, Tera};

use crate::config::{MenuItem, SiteConfig};
use crate::content::{parse_date_string, BlogPost};

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("cards.html", include_str!("site/cards.html")),
            ("home.html", include_str!("site/home.html")),
            ("blog.html", include_str!("site/blog.html")),
            ("post.html", include_str!("site/post.html")),
            ("page.html", include_str!("site/page.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("error.html", include_str!("site/error.html")),
        ])?;
        tera.set_escape_fn(escape_html);

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self {
            tera,
            site: SiteData::from(config),
        })
    }

    /// Landing page with the most recent posts
    pub fn home(&self, recent: &[BlogPost]) -> Result<String> {
        let mut context = self.context();
        context.insert("posts", recent);
        self.render("home.html", &context)
    }

    /// Blog index
    pub fn blog(&self, posts: &[BlogPost]) -> Result<String> {
        let mut context = self.context();
        context.insert("posts", posts);
        self.render("blog.html", &context)
    }

    /// Single post page
    pub fn post(&self, post: &BlogPost) -> Result<String> {
        let mut context = self.context();
        context.insert("post", post);
        self.render("post.html", &context)
    }

    /// Static page
    pub fn page(&self, page: &BlogPost) -> Result<String> {
        let mut context = self.context();
        context.insert("page", page);
        self.render("page.html", &context)
    }

    /// 404 page; `what` names the missing thing ("Post", "Página")
    pub fn not_found(&self, what: &str) -> Result<String> {
        let mut context = self.context();
        context.insert("what", what);
        self.render("not_found.html", &context)
    }

    /// Generic failure page
    pub fn error(&self) -> Result<String> {
        self.render("error.html", &self.context())
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("year", &chrono::Local::now().year());
        context
    }
}

/// Site-wide values available to every template as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub url: String,
    pub language: String,
    pub date_format: String,
    pub menu: Vec<MenuItem>,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            url: config.url.clone(),
            language: config.language.clone(),
            date_format: config.date_format.clone(),
            menu: config.menu.clone(),
        }
    }
}

/// Autoescape without Tera's `/` escaping, so paths and dates stay readable
fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(c),
        }
    }
    output
}

/// Tera filter: strip HTML tags and decode the entities the Markdown
/// renderer emits, leaving plain text for autoescaping
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    let text = result
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    Ok(tera::Value::String(
        text.split_whitespace().collect::<Vec<_>>().join(" "),
    ))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "…".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: format a front-matter date string with a strftime pattern.
/// Strings that are not dates are returned unchanged.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%Y-%m-%d".to_string(),
    };

    let Some(date) = parse_date_string(&s) else {
        return Ok(tera::Value::String(s));
    };
    // chrono reports an invalid pattern as a fmt::Error
    let mut out = String::new();
    if write!(out, "{}", date.format(&format)).is_err() {
        return Err(tera::Error::msg(format!("Invalid date format: {}", format)));
    }
    Ok(tera::Value::String(out))
}
