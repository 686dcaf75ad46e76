//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Accept any YAML scalar and keep its textual form.
///
/// An unquoted `date: 2024-01-01` is a plain string for serde_yaml, but
/// `date: 2024` or `title: 42` are numbers, and a post must not lose its
/// metadata over that.
fn scalar_to_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| scalar_text(&v)))
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

/// Custom deserializer that handles both a single scalar and a list of scalars
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    let tags = match value {
        Some(serde_yaml::Value::Sequence(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(&other).into_iter().collect(),
        None => Vec::new(),
    };
    Ok(tags)
}

/// Front-matter data from a post or page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar_to_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_to_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Split a document into its front-matter and Markdown body.
    ///
    /// Never fails: a block that cannot be decoded yields default metadata,
    /// and the body still starts after the closing delimiter.
    pub fn parse(content: &str) -> (Self, &str) {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let content = content.trim_start();

        let Some((yaml, body)) = split_block(content) else {
            return (FrontMatter::default(), content);
        };

        if yaml.trim().is_empty() {
            return (FrontMatter::default(), body);
        }

        if !looks_like_yaml(yaml) {
            return (FrontMatter::default(), content);
        }

        match serde_yaml::from_str::<FrontMatter>(yaml) {
            Ok(fm) => (fm, body),
            Err(e) => {
                tracing::warn!("Failed to parse YAML front-matter, using empty metadata: {}", e);
                (FrontMatter::default(), body)
            }
        }
    }

    /// Parse the date string into a sortable timestamp
    pub fn parse_date(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// Find a `---` delimited block at the start of `content`.
/// Returns (block, remaining body).
fn split_block(content: &str) -> Option<(&str, &str)> {
    let first_line_end = content.find('\n')?;
    if content[..first_line_end].trim_end() != "---" {
        return None;
    }
    let rest = &content[first_line_end + 1..];

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((block, body.trim_start_matches(['\n', '\r'])));
        }
        offset += line.len();
    }
    None
}

/// Valid front-matter has at least one `key: value` line. A Markdown
/// thematic break followed by prose does not.
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

/// Parse a date string in the formats authors actually write
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
tags:
  - rust
  - drones
---

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert_eq!(fm.tags, vec!["rust", "drones"]);
        assert_eq!(body, "This is the content.\n");
    }

    #[test]
    fn test_missing_tags_default_to_empty() {
        let (fm, _) = FrontMatter::parse("---\ntitle: No tags\ndate: 2024-01-01\n---\nBody\n");
        assert!(fm.tags.is_empty());
    }

    #[test]
    fn test_single_string_tag() {
        let (fm, _) = FrontMatter::parse("---\ntitle: One\ntags: Notes\n---\nBody\n");
        assert_eq!(fm.tags, vec!["Notes"]);
    }

    #[test]
    fn test_numeric_scalars_are_stringified() {
        let (fm, _) = FrontMatter::parse("---\ntitle: 2024\ndate: 2024\ntags: [1, two]\n---\n");
        assert_eq!(fm.title.as_deref(), Some("2024"));
        assert_eq!(fm.date.as_deref(), Some("2024"));
        assert_eq!(fm.tags, vec!["1", "two"]);
    }

    #[test]
    fn test_missing_required_fields_are_empty() {
        let (fm, body) = FrontMatter::parse("---\ntags: [a]\n---\n# Heading\n");
        assert_eq!(fm.title, None);
        assert_eq!(fm.date, None);
        assert_eq!(body, "# Heading\n");
    }

    #[test]
    fn test_malformed_yaml_never_leaks_into_body() {
        let content = "---\ntitle: [unclosed\ndate: 2024-01-01\n---\nThe body.\n";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "The body.\n");
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, body) = FrontMatter::parse("# Just markdown\n\nText.");
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "# Just markdown\n\nText.");
    }

    #[test]
    fn test_unclosed_block_is_body() {
        let content = "---\ntitle: Oops\nno closing delimiter";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert_eq!(body, content);
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"---
Check out https://example.com/path and some prose.
---
More content here.
"#;

        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert!(body.contains("https://example.com"));
    }

    #[test]
    fn test_crlf_delimiters() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.title.as_deref(), Some("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let content = "\u{feff}---\ntitle: Bom\ndate: 2024-01-01\n---\nBody\n";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.title.as_deref(), Some("Bom"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-01"));
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_extra_fields_are_kept() {
        let (fm, _) = FrontMatter::parse("---\ntitle: T\nauthor: Ana\n---\n");
        assert_eq!(
            fm.extra.get("author"),
            Some(&serde_yaml::Value::String("Ana".to_string()))
        );
    }

    #[test]
    fn test_parse_date_formats() {
        let day = |s: &str| parse_date_string(s).map(|d| d.format("%Y-%m-%d %H:%M").to_string());
        assert_eq!(day("2024-01-15").as_deref(), Some("2024-01-15 00:00"));
        assert_eq!(day("2024/01/15 10:30").as_deref(), Some("2024-01-15 10:30"));
        assert_eq!(day("2024-01-15T10:30:00").as_deref(), Some("2024-01-15 10:30"));
        assert_eq!(day("2024-01-15T10:30:00+02:00").as_deref(), Some("2024-01-15 08:30"));
        assert_eq!(day("yesterday"), None);
    }
}
