//! Shared test utilities.
//!
//! Builders for configs, posts and on-disk content items, plus a minimal
//! template set whose output is easy to assert against.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut model = SiteModel::new(test_config());
//! model.add_post(post("Hello", "2024-03-01", &["Tech"]));
//! assert_eq!(titles(model.posts()), ["Hello"]);
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::context::BuildInfo;
use crate::model::{CategoryLink, ContentItem, PostEntry};
use crate::types::ContentKind;
use crate::walk::parse_date;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Model builders
// =========================================================================

/// Config with `Tech`, `Life` and `Art` categories and a site name.
pub fn test_config() -> SiteConfig {
    let category_map = [("Tech", "tech"), ("Life", "life"), ("Art", "art")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut extra = BTreeMap::new();
    extra.insert("name".to_string(), serde_json::json!("Test Blog"));
    SiteConfig {
        category_map,
        extra,
    }
}

/// Build info with a fixed timestamp.
pub fn test_info() -> BuildInfo {
    BuildInfo::new(
        "Quire test",
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    )
}

/// A post titled `title`, URL `<lowercase title>/`, dated `date`.
///
/// Category display URLs are the lowercased category names.
pub fn post(title: &str, date: &str, categories: &[&str]) -> ContentItem {
    let mut item = ContentItem::new(
        ContentKind::Post,
        PathBuf::from(format!("posts/{}.md", title.to_lowercase())),
        format!("{}/", title.to_lowercase()),
    );
    item.meta
        .insert("title".to_string(), serde_json::json!(title));
    item.date = Some(date.to_string());
    item.datetime = Some(parse_date(date).unwrap_or_else(|| panic!("bad test date {date}")));
    item.categories = categories.iter().map(|c| c.to_string()).collect();
    item.category_display = categories
        .iter()
        .map(|c| CategoryLink {
            category: c.to_string(),
            url: c.to_lowercase(),
        })
        .collect();
    item
}

/// Titles of a listing, in order.
pub fn titles(items: &[PostEntry]) -> Vec<String> {
    items
        .iter()
        .map(|p| {
            p.meta
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

// =========================================================================
// On-disk content
// =========================================================================

/// Write `<stem>.md` and `<stem>.yaml` into `dir`; returns the `.md` path.
pub fn write_item(dir: &Path, stem: &str, yaml: &str, markdown: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let md = dir.join(format!("{stem}.md"));
    fs::write(&md, markdown).unwrap();
    fs::write(dir.join(format!("{stem}.yaml")), yaml).unwrap();
    md
}

/// Write a minimal template set into `dir`.
///
/// - post: title, body, `cats:` list of `category=url;`, `count:` of `posts`
/// - page: title and body
/// - categories: `page.title` then `titles:` of `posts`
/// - atom: `updated` and `feed:` titles
pub fn write_templates(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("post.html"),
        "<h1>{{ page.title }}</h1>{{ page.content|safe }}\
         cats:{% for c in page.categoryDisplay %}{{ c.category }}={{ c.url }};{% endfor %}\
         count:{{ posts|length }}",
    )
    .unwrap();
    fs::write(
        dir.join("page.html"),
        "<h1>{{ page.title }}</h1>{{ page.content|safe }}",
    )
    .unwrap();
    fs::write(
        dir.join("categories.html"),
        "<h1>{{ page.title }}</h1>titles:{% for p in posts %}{{ p.title }};{% endfor %}",
    )
    .unwrap();
    fs::write(
        dir.join("atom.xml"),
        "<updated>{{ updated }}</updated>feed:{% for p in feed %}{{ p.title }};{% endfor %}",
    )
    .unwrap();
}
