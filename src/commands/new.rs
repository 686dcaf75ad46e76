//! Create a new post or page

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Front-matter written into new documents
#[derive(Serialize)]
struct Scaffold<'a> {
    title: &'a str,
    date: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

/// Create a new post (or static page) and return its path
pub fn create_post(
    site: &Site,
    title: &str,
    page: bool,
    slug: Option<&str>,
    tags: &[String],
) -> Result<PathBuf> {
    let target_dir = if page { &site.pages_dir } else { &site.posts_dir };
    fs::create_dir_all(target_dir)?;

    let slug = match slug {
        Some(s) => slug::slugify(s),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from {:?}; pass --slug", title);
    }

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold = Scaffold {
        title,
        date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        tags: tags.to_vec(),
    };
    let content = format!("---\n{}---\n\n", serde_yaml::to_string(&scaffold)?);

    fs::write(&file_path, content)?;
    println!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn site() -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let site = Site::with_config(tmp.path(), SiteConfig::default());
        (tmp, site)
    }

    #[test]
    fn test_new_post_round_trips_through_loader() {
        let (_tmp, site) = site();
        let tags = vec!["drones".to_string(), "news".to_string()];
        let path = create_post(&site, "Vuelo: primera prueba", false, None, &tags).unwrap();
        assert_eq!(path.file_name().unwrap(), "vuelo-primera-prueba.md");

        let post = site.get_post("vuelo-primera-prueba").unwrap().unwrap();
        assert_eq!(post.title, "Vuelo: primera prueba");
        assert_eq!(post.tags, tags);
        assert!(post.timestamp().is_some());
    }

    #[test]
    fn test_new_page_with_slug() {
        let (_tmp, site) = site();
        create_post(&site, "Sobre nosotros", true, Some("sobrenosotros"), &[]).unwrap();

        let page = site.get_page("sobrenosotros").unwrap().unwrap();
        assert_eq!(page.title, "Sobre nosotros");
        assert!(page.tags.is_empty());
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let (_tmp, site) = site();
        create_post(&site, "Hello", false, None, &[]).unwrap();
        assert!(create_post(&site, "Hello", false, None, &[]).is_err());
    }
}
