//! Site generation: the build orchestrator.
//!
//! Runs the phases in a fixed order. The order is part of the contract, since
//! later phases read state earlier phases produced:
//!
//! ```text
//! 1. mkdir <output>
//! 2. walk posts/          → <output>/<url>/index.html, fills archive + categories
//! 3. sort archive         newest first, stable
//! 4. walk pages/          → <output>/<url>/index.html, sees the sorted archive
//! 5. feed                 → <output>/atom.xml, first 21 archive entries
//! 6. mkdir <output>/categories
//! 7. per category (A→Z)   sort bucket → <output>/categories/<slug>/index.html
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── atom.xml
//! ├── hello/index.html              # posts/hello.md
//! ├── about/index.html              # pages/about.md
//! └── categories/
//!     └── tech/index.html           # every post in category "Tech"
//! ```
//!
//! Rebuilding unchanged input with the same `updated` timestamp produces
//! byte-identical files: filenames are walked sorted, categories are emitted
//! in lexical order, and all sorts are stable.

use crate::config::{self, ConfigError};
use crate::context::{BuildContext, BuildInfo, CurrentPage, Listing};
use crate::model::{FEED_LIMIT, SiteModel};
use crate::naming;
use crate::template::{TemplateEngine, TemplateEngineConfig, TemplateError, TemplateKind};
use crate::types::{Artifact, BuildEvent, ContentKind, report};
use crate::walk::{WalkError, Walker, write_output};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("category '{0}' has posts but no slug in categoryMap")]
    UnmappedCategory(String),
}

/// Where a site's inputs live and where its output goes.
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub config: PathBuf,
    pub posts: PathBuf,
    pub pages: PathBuf,
    pub templates: PathBuf,
    pub output: PathBuf,
}

impl SitePaths {
    /// The conventional layout under `root`.
    pub fn from_root(root: &Path) -> Self {
        Self {
            config: root.join("quire.yaml"),
            posts: root.join(ContentKind::Post.dir_name()),
            pages: root.join(ContentKind::Page.dir_name()),
            templates: root.join("themes/templates"),
            output: root.join("public"),
        }
    }

    pub fn content_dir(&self, kind: ContentKind) -> &Path {
        match kind {
            ContentKind::Post => &self.posts,
            ContentKind::Page => &self.pages,
        }
    }
}

/// What a build produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub posts: usize,
    pub pages: usize,
    pub feed_entries: usize,
    /// `(category, slug)` for every listing written, in emission order.
    pub categories: Vec<(String, String)>,
}

/// Load config and templates, then render the whole site.
pub fn generate(
    paths: &SitePaths,
    info: &BuildInfo,
    events: Option<&Sender<BuildEvent>>,
) -> Result<BuildSummary, GenerateError> {
    let config = config::load_config(&paths.config)?;
    let engine = TemplateEngine::new(&TemplateEngineConfig {
        template_dir: paths.templates.clone(),
    })?;
    let mut model = SiteModel::new(config);
    render_site(paths, &mut model, &engine, info, events)
}

/// Run every phase against an already-loaded model and engine.
pub fn render_site(
    paths: &SitePaths,
    model: &mut SiteModel,
    engine: &TemplateEngine,
    info: &BuildInfo,
    events: Option<&Sender<BuildEvent>>,
) -> Result<BuildSummary, GenerateError> {
    create_dir(&paths.output)?;

    let walker = Walker {
        engine,
        info,
        output_root: &paths.output,
        events,
    };

    let posts = walker.walk(paths.content_dir(ContentKind::Post), ContentKind::Post, model)?;
    model.sort_posts_by_date_descending();

    let pages = walker.walk(paths.content_dir(ContentKind::Page), ContentKind::Page, model)?;

    let feed_entries = render_feed(paths, model, engine, info, events)?;
    let categories = render_categories(paths, model, engine, info, events)?;

    Ok(BuildSummary {
        posts,
        pages,
        feed_entries,
        categories,
    })
}

fn render_feed(
    paths: &SitePaths,
    model: &SiteModel,
    engine: &TemplateEngine,
    info: &BuildInfo,
    events: Option<&Sender<BuildEvent>>,
) -> Result<usize, GenerateError> {
    let feed = model.feed_slice(FEED_LIMIT);
    let ctx = BuildContext::new(info, model).with_feed(feed);
    let xml = engine.render(TemplateKind::Atom, &ctx)?;
    write_file(&paths.output.join(naming::FEED_FILE), &xml)?;
    report(events, Artifact::Feed { entries: feed.len() });
    Ok(feed.len())
}

fn render_categories(
    paths: &SitePaths,
    model: &mut SiteModel,
    engine: &TemplateEngine,
    info: &BuildInfo,
    events: Option<&Sender<BuildEvent>>,
) -> Result<Vec<(String, String)>, GenerateError> {
    create_dir(&paths.output.join(naming::CATEGORIES_DIR))?;

    let names: Vec<String> = model.category_names().map(String::from).collect();
    let mut written = Vec::with_capacity(names.len());
    for name in names {
        let slug = model
            .config()
            .category_slug(&name)
            .ok_or_else(|| GenerateError::UnmappedCategory(name.clone()))?
            .to_string();

        model.sort_category_by_date_descending(&name);
        let bucket = model.category_posts(&name).unwrap_or_default();

        let listing = Listing {
            title: name.clone(),
            url: naming::category_url(&slug),
        };
        let ctx = BuildContext::new(info, model)
            .with_posts(bucket)
            .with_page(CurrentPage::Listing(&listing));
        let html = engine.render(TemplateKind::Categories, &ctx)?;
        write_file(&naming::category_output_path(&paths.output, &slug), &html)?;

        report(
            events,
            Artifact::Category {
                name: name.clone(),
                url: listing.url.clone(),
            },
        );
        written.push((name, slug));
    }
    Ok(written)
}

fn create_dir(path: &Path) -> Result<(), GenerateError> {
    fs::create_dir_all(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), GenerateError> {
    write_output(path, contents).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{test_info, write_item, write_templates};
    use tempfile::TempDir;

    const CONFIG: &str = "name: Test Blog\ncategoryMap:\n  Tech: tech\n  Life: life\n";

    fn site() -> (TempDir, SitePaths) {
        let tmp = TempDir::new().unwrap();
        let paths = SitePaths::from_root(tmp.path());
        fs::write(&paths.config, CONFIG).unwrap();
        write_templates(&paths.templates);
        (tmp, paths)
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
    }

    #[test]
    fn from_root_uses_conventional_layout() {
        let paths = SitePaths::from_root(Path::new("site"));
        assert_eq!(paths.config, Path::new("site/quire.yaml"));
        assert_eq!(paths.posts, Path::new("site/posts"));
        assert_eq!(paths.pages, Path::new("site/pages"));
        assert_eq!(paths.templates, Path::new("site/themes/templates"));
        assert_eq!(paths.output, Path::new("site/public"));
    }

    #[test]
    fn category_page_lists_newest_first() {
        let (_tmp, paths) = site();
        write_item(&paths.posts, "jan", "title: January\ndate: 2024-01-01\ncategories: [Tech]\n", "");
        write_item(&paths.posts, "mar", "title: March\ndate: 2024-03-01\ncategories: [Tech]\n", "");

        let summary = generate(&paths, &test_info(), None).unwrap();

        assert_eq!(summary.categories, [("Tech".to_string(), "tech".to_string())]);
        let html = read(&paths.output.join("categories/tech/index.html"));
        assert!(html.contains("<h1>Tech</h1>"));
        assert!(html.contains("titles:March;January;"));
    }

    #[test]
    fn post_without_url_lands_at_basename() {
        let (_tmp, paths) = site();
        write_item(&paths.posts, "hello", "title: Hello\ndate: 2024-01-01\n", "hi");
        generate(&paths, &test_info(), None).unwrap();
        assert!(paths.output.join("hello/index.html").is_file());
    }

    #[test]
    fn feed_holds_21_most_recent() {
        let (_tmp, paths) = site();
        for day in 1..=25 {
            write_item(
                &paths.posts,
                &format!("p{day:02}"),
                &format!("title: p{day:02}\ndate: 2024-01-{day:02}\n"),
                "",
            );
        }
        let summary = generate(&paths, &test_info(), None).unwrap();

        assert_eq!(summary.posts, 25);
        assert_eq!(summary.feed_entries, 21);
        let xml = read(&paths.output.join("atom.xml"));
        let expected: String = (5..=25).rev().map(|d| format!("p{d:02};")).collect();
        assert!(xml.contains(&format!("feed:{expected}")), "{xml}");
        assert!(xml.contains("<updated>2024-06-01T12:00:00Z</updated>"));
    }

    #[test]
    fn pages_see_sorted_archive() {
        let (_tmp, paths) = site();
        write_item(&paths.posts, "a-old", "title: Old\ndate: 2023-01-01\n", "");
        write_item(&paths.posts, "b-new", "title: New\ndate: 2024-01-01\n", "");
        write_item(
            &paths.pages,
            "archive",
            "title: Archive\n",
            "{% for p in posts %}{{ p.title }},{% endfor %}",
        );
        generate(&paths, &test_info(), None).unwrap();

        let html = read(&paths.output.join("archive/index.html"));
        assert!(html.contains("New,Old,"));
    }

    #[test]
    fn no_posts_still_writes_feed_and_categories_dir() {
        let (_tmp, paths) = site();
        let summary = generate(&paths, &test_info(), None).unwrap();
        assert_eq!(summary, BuildSummary::default());
        assert!(paths.output.join("atom.xml").is_file());
        assert!(paths.output.join("categories").is_dir());
    }

    #[test]
    fn missing_descriptor_aborts_build() {
        let (_tmp, paths) = site();
        fs::create_dir_all(&paths.posts).unwrap();
        fs::write(paths.posts.join("orphan.md"), "# Orphan").unwrap();

        let err = generate(&paths, &test_info(), None).unwrap_err();
        assert!(matches!(err, GenerateError::Walk(WalkError::MissingMetadata(_))));
        assert!(!paths.output.join("orphan").exists());
        assert!(!paths.output.join("atom.xml").exists());
    }

    #[test]
    fn missing_config_aborts_before_output() {
        let (_tmp, paths) = site();
        fs::remove_file(&paths.config).unwrap();
        let err = generate(&paths, &test_info(), None).unwrap_err();
        assert!(matches!(err, GenerateError::Config(ConfigError::NotFound(_))));
        assert!(!paths.output.exists());
    }

    #[test]
    fn missing_template_aborts_before_output() {
        let (_tmp, paths) = site();
        fs::remove_file(paths.templates.join("categories.html")).unwrap();
        let err = generate(&paths, &test_info(), None).unwrap_err();
        assert!(matches!(err, GenerateError::Template(TemplateError::Missing { .. })));
        assert!(!paths.output.exists());
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let (_tmp, paths) = site();
        write_item(&paths.posts, "a", "title: A\ndate: 2024-01-01\ncategories: [Tech, Life]\n", "a");
        write_item(&paths.posts, "b", "title: B\ndate: 2024-01-01\ncategories: [Life]\n", "b");
        write_item(&paths.pages, "about", "title: About\n", "about");

        let files = [
            "a/index.html",
            "b/index.html",
            "about/index.html",
            "atom.xml",
            "categories/tech/index.html",
            "categories/life/index.html",
        ];
        generate(&paths, &test_info(), None).unwrap();
        let first: Vec<String> = files.iter().map(|f| read(&paths.output.join(f))).collect();
        generate(&paths, &test_info(), None).unwrap();
        let second: Vec<String> = files.iter().map(|f| read(&paths.output.join(f))).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn events_follow_phase_order() {
        let (_tmp, paths) = site();
        write_item(&paths.posts, "p", "title: P\ndate: 2024-01-01\ncategories: [Life]\n", "");
        write_item(&paths.pages, "about", "title: About\n", "");
        let (tx, rx) = std::sync::mpsc::channel();
        generate(&paths, &test_info(), Some(&tx)).unwrap();
        drop(tx);

        let artifacts: Vec<Artifact> = rx.iter().map(|e| e.artifact).collect();
        assert_eq!(
            artifacts,
            [
                Artifact::Post { url: "p/".into() },
                Artifact::Page { url: "about/".into() },
                Artifact::Feed { entries: 1 },
                Artifact::Category {
                    name: "Life".into(),
                    url: "categories/life/".into()
                },
            ]
        );
    }
}
