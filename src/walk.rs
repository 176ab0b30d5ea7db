//! Content walking: one content directory in, one HTML file per item out.
//!
//! For every `<name>.md` in the directory, in lexical filename order:
//!
//! 1. Load the paired descriptor (`<name>.yaml`, `.yml` or `.toml`).
//! 2. Resolve the item URL (`url` field, or `<name>/`).
//! 3. For posts: parse `date`, map `categories` through `categoryMap`.
//! 4. Render the Markdown to HTML, then render that HTML as a template with
//!    the current build context, so bodies can use `{{ site.name }}` and
//!    friends. The result becomes `page.content`.
//! 5. For posts: register the item in the [`SiteModel`].
//! 6. Render the directory's template and write `<output>/<url>/index.html`.
//!
//! Only files with the exact extension `.md` are content; everything else,
//! subdirectories included, is ignored. Any error stops the walk immediately
//! and names the file; nothing is written for the item that failed.

use crate::config::SiteConfig;
use crate::context::{BuildContext, BuildInfo, CurrentPage};
use crate::descriptor::{self, DescriptorError, Metadata};
use crate::markdown;
use crate::model::{CategoryLink, ContentItem, SiteModel};
use crate::naming::{self, UrlClaims, UrlConflict};
use crate::template::{TemplateEngine, TemplateError};
use crate::types::{Artifact, BuildEvent, ContentKind, report};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no metadata descriptor for {0} (expected a .yaml, .yml or .toml file with the same name)")]
    MissingMetadata(PathBuf),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error("{0}: post has no 'date' field")]
    MissingDate(PathBuf),
    #[error("{path}: cannot parse date '{value}'")]
    DateParse { path: PathBuf, value: String },
    #[error("{path}: unknown category '{category}' (not in categoryMap)")]
    UnknownCategory { path: PathBuf, category: String },
    #[error("{path}: invalid url '{url}'")]
    InvalidUrl { path: PathBuf, url: String },
    #[error("{path}: field '{field}' {expected}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        expected: &'static str,
    },
    #[error("{path}: url '{url}' is already used by {first}")]
    DuplicateUrl {
        path: PathBuf,
        url: String,
        first: PathBuf,
    },
    #[error("{path}: url '{url}' is reserved for generated output")]
    ReservedUrl { path: PathBuf, url: String },
    #[error("{path}: {source}")]
    Template {
        path: PathBuf,
        source: TemplateError,
    },
}

/// Descriptor keys the pipeline computes itself; authors cannot set them.
const COMPUTED_KEYS: &[&str] = &["content", "datetime", "categoryDisplay"];

/// Naive formats tried after RFC 3339 / RFC 2822. Naive times are UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a post date.
///
/// Accepts RFC 3339 (`2024-03-01T10:00:00+01:00`), RFC 2822,
/// `2024-03-01 10:00:00 +0100`, the naive forms in
/// [`NAIVE_DATETIME_FORMATS`], and a bare `2024-03-01` (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt);
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

/// All `.md` files directly inside `dir`, sorted by path.
///
/// A missing directory has no content.
pub fn list_markdown_files(dir: &Path) -> Result<Vec<PathBuf>, WalkError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| WalkError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut md_files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension().map(|e| e == "md").unwrap_or(false)
        })
        .collect();
    md_files.sort();
    Ok(md_files)
}

/// Build an item from a Markdown file's descriptor, without touching the body.
///
/// Everything that can be validated up front is validated here: descriptor
/// presence, URL shape, and for posts the date and every category.
pub fn load_item(
    md_path: &Path,
    kind: ContentKind,
    config: &SiteConfig,
) -> Result<ContentItem, WalkError> {
    let descriptor_path = descriptor::find_sidecar(md_path)
        .ok_or_else(|| WalkError::MissingMetadata(md_path.to_path_buf()))?;
    let mut meta = descriptor::load(&descriptor_path)?;
    for key in COMPUTED_KEYS {
        meta.remove(*key);
    }

    let stem = md_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let url = resolve_url(&mut meta, &stem, md_path)?;

    let mut item = ContentItem::new(kind, md_path.to_path_buf(), url);
    if kind.is_post() {
        let raw_date = take_date(&mut meta, md_path)?;
        item.datetime = Some(parse_date(&raw_date).ok_or_else(|| WalkError::DateParse {
            path: md_path.to_path_buf(),
            value: raw_date.clone(),
        })?);
        item.date = Some(raw_date);
        item.categories = take_categories(&mut meta, md_path)?;
        item.category_display = category_display(&item.categories, config, md_path)?;
    }
    item.meta = meta;
    Ok(item)
}

fn resolve_url(meta: &mut Metadata, stem: &str, path: &Path) -> Result<String, WalkError> {
    match meta.remove("url") {
        None | Some(Value::Null) => Ok(naming::default_url(stem)),
        Some(Value::String(raw)) => {
            naming::normalize_url(&raw).ok_or_else(|| WalkError::InvalidUrl {
                path: path.to_path_buf(),
                url: raw,
            })
        }
        Some(_) => Err(WalkError::InvalidField {
            path: path.to_path_buf(),
            field: "url",
            expected: "must be a string",
        }),
    }
}

fn take_date(meta: &mut Metadata, path: &Path) -> Result<String, WalkError> {
    match meta.remove("date") {
        None | Some(Value::Null) => Err(WalkError::MissingDate(path.to_path_buf())),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(WalkError::DateParse {
            path: path.to_path_buf(),
            value: other.to_string(),
        }),
    }
}

/// Declared categories in declaration order, first occurrence wins.
fn take_categories(meta: &mut Metadata, path: &Path) -> Result<Vec<String>, WalkError> {
    let invalid = || WalkError::InvalidField {
        path: path.to_path_buf(),
        field: "categories",
        expected: "must be a list of category names",
    };
    let items = match meta.remove("categories") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid()),
    };
    let mut categories: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let Value::String(name) = item else {
            return Err(invalid());
        };
        if !categories.contains(&name) {
            categories.push(name);
        }
    }
    Ok(categories)
}

fn category_display(
    categories: &[String],
    config: &SiteConfig,
    path: &Path,
) -> Result<Vec<CategoryLink>, WalkError> {
    categories
        .iter()
        .map(|category| {
            let slug =
                config
                    .category_slug(category)
                    .ok_or_else(|| WalkError::UnknownCategory {
                        path: path.to_path_buf(),
                        category: category.clone(),
                    })?;
            Ok(CategoryLink {
                category: category.clone(),
                url: slug.to_string(),
            })
        })
        .collect()
}

/// Claim `item.url` for the item's source file.
pub fn claim_url(claims: &mut UrlClaims, item: &ContentItem) -> Result<(), WalkError> {
    claims
        .claim(&item.url, &item.source)
        .map_err(|conflict| url_conflict(item, conflict))
}

fn url_conflict(item: &ContentItem, conflict: UrlConflict) -> WalkError {
    match conflict {
        UrlConflict::Taken(first) => WalkError::DuplicateUrl {
            path: item.source.clone(),
            url: item.url.clone(),
            first,
        },
        UrlConflict::Reserved => WalkError::ReservedUrl {
            path: item.source.clone(),
            url: item.url.clone(),
        },
    }
}

/// Write `contents` to `path`, creating parent directories as needed.
pub(crate) fn write_output(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Renders content directories into an output root.
pub struct Walker<'a> {
    pub engine: &'a TemplateEngine,
    pub info: &'a BuildInfo,
    pub output_root: &'a Path,
    pub events: Option<&'a Sender<BuildEvent>>,
}

impl Walker<'_> {
    /// Render every Markdown file in `dir` as `kind`. Returns the number of
    /// items written.
    ///
    /// Posts are registered in `model`; pages only read it.
    pub fn walk(
        &self,
        dir: &Path,
        kind: ContentKind,
        model: &mut SiteModel,
    ) -> Result<usize, WalkError> {
        let files = list_markdown_files(dir)?;
        for md_path in &files {
            self.render_file(md_path, kind, model)?;
        }
        Ok(files.len())
    }

    fn render_file(
        &self,
        md_path: &Path,
        kind: ContentKind,
        model: &mut SiteModel,
    ) -> Result<(), WalkError> {
        let mut item = load_item(md_path, kind, model.config())?;
        model
            .claim_url(&item.url, md_path)
            .map_err(|conflict| url_conflict(&item, conflict))?;
        let template_err = |source| WalkError::Template {
            path: md_path.to_path_buf(),
            source,
        };

        let source = fs::read_to_string(md_path).map_err(|source| WalkError::Io {
            path: md_path.to_path_buf(),
            source,
        })?;
        let body_html = markdown::to_html(&source);
        item.content = {
            let ctx = BuildContext::new(self.info, model).with_page(CurrentPage::Item(&item));
            self.engine
                .render_str(&md_path.display().to_string(), &body_html, &ctx)
                .map_err(template_err)?
        };

        let item = if kind.is_post() {
            Rc::clone(model.add_post(item).item())
        } else {
            Rc::new(item)
        };

        let html = {
            let ctx = BuildContext::new(self.info, model).with_page(CurrentPage::Item(&item));
            self.engine
                .render(kind.template(), &ctx)
                .map_err(template_err)?
        };

        let out_path = naming::item_output_path(self.output_root, &item.url);
        write_output(&out_path, &html).map_err(|source| WalkError::Io {
            path: out_path.clone(),
            source,
        })?;

        let url = item.url.clone();
        report(
            self.events,
            match kind {
                ContentKind::Post => Artifact::Post { url },
                ContentKind::Page => Artifact::Page { url },
            },
        );
        Ok(())
    }
}
