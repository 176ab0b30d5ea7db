//! URL and output-path conventions.
//!
//! Every rendered item lives in its own directory so the public URL never
//! carries a file extension:
//!
//! ```text
//! posts/hello.md            → public/hello/index.html         (url "hello/")
//! pages/about.md + url: me  → public/me/index.html            (url "me/")
//! category "Tech" → "tech"  → public/categories/tech/index.html
//! feed                      → public/atom.xml
//! ```
//!
//! URLs are stored relative to the output root with a trailing slash and no
//! leading slash, so `output_root.join(url)` is always the item directory.
//!
//! Every output URL has exactly one owner. [`UrlClaims`] tracks owners during
//! a build; category listing URLs and the feed are reserved up front.

use crate::config::SiteConfig;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// File written inside every item directory.
pub const INDEX_FILE: &str = "index.html";

/// Feed file written at the output root.
pub const FEED_FILE: &str = "atom.xml";

/// Directory under the output root that holds one listing per category.
pub const CATEGORIES_DIR: &str = "categories";

/// URL used when a descriptor does not set one: the file stem plus `/`.
pub fn default_url(stem: &str) -> String {
    format!("{stem}/")
}

/// Normalize a descriptor-supplied URL.
///
/// - `"/about"` → `"about/"`
/// - `"2024/hello/"` → `"2024/hello/"`
/// - `""`, `"/"`, `"../etc"`, `"a/./b"` → `None`
///
/// Rejected URLs would either write to the output root itself or escape it.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('/');
    let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() || segments.iter().any(|s| *s == "." || *s == "..") {
        return None;
    }
    Some(format!("{}/", segments.join("/")))
}

/// Directory an item with `url` is written into.
pub fn item_dir(output_root: &Path, url: &str) -> PathBuf {
    output_root.join(url)
}

/// `index.html` path for an item with `url`.
pub fn item_output_path(output_root: &Path, url: &str) -> PathBuf {
    item_dir(output_root, url).join(INDEX_FILE)
}

/// Site-relative URL of a category listing.
pub fn category_url(slug: &str) -> String {
    format!("{CATEGORIES_DIR}/{slug}/")
}

/// `index.html` path for the listing of the category with `slug`.
pub fn category_output_path(output_root: &Path, slug: &str) -> PathBuf {
    item_output_path(output_root, &category_url(slug))
}

/// Why a URL could not be claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlConflict {
    /// Another content file already renders to this URL.
    Taken(PathBuf),
    /// The URL belongs to generated output (a category listing or the feed).
    Reserved,
}

/// Output URLs claimed so far in one build, and the file behind each.
#[derive(Debug, Default)]
pub struct UrlClaims {
    reserved: BTreeSet<String>,
    owners: BTreeMap<String, PathBuf>,
}

impl UrlClaims {
    /// Claims with the feed and every mapped category listing reserved.
    pub fn for_site(config: &SiteConfig) -> Self {
        let mut reserved: BTreeSet<String> =
            config.category_map.values().map(|slug| category_url(slug)).collect();
        reserved.insert(format!("{FEED_FILE}/"));
        Self {
            reserved,
            owners: BTreeMap::new(),
        }
    }

    /// Record `source` as the owner of `url`.
    pub fn claim(&mut self, url: &str, source: &Path) -> Result<(), UrlConflict> {
        if self.reserved.contains(url) {
            return Err(UrlConflict::Reserved);
        }
        match self.owners.entry(url.to_string()) {
            Entry::Occupied(owner) => Err(UrlConflict::Taken(owner.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(source.to_path_buf());
                Ok(())
            }
        }
    }
}
