//! The site model: everything the build accumulates while walking content.
//!
//! ```text
//! SiteModel
//! ├── config        SiteConfig (immutable)
//! ├── posts         [post, post, ...]            discovery order, then date-desc
//! ├── categories    { "Tech": [post, ...], ... }  walk order, then date-desc per bucket
//! └── urls          every output URL claimed so far
//! ```
//!
//! Posts are shared between `posts` and the category buckets through `Rc`, so a
//! post tagged with three categories exists once. A post is in bucket `c` if
//! and only if `c` is one of its declared categories.
//!
//! Each post is converted to a template value once, when it is registered.
//! Listings serialize through that value, so handing the archive to a render
//! costs one reference per post however long the bodies are.
//!
//! All sorting is stable: posts with the same date keep their discovery order,
//! which (because the walker sorts filenames) makes every listing reproducible.

use crate::config::SiteConfig;
use crate::descriptor::Metadata;
use crate::naming::{UrlClaims, UrlConflict};
use crate::types::ContentKind;
use chrono::{DateTime, FixedOffset};
use minijinja::Value;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Number of most recent posts included in the feed.
pub const FEED_LIMIT: usize = 21;

/// One entry of a post's `categoryDisplay` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLink {
    pub category: String,
    pub url: String,
}

/// A rendered post or page, as seen by templates.
///
/// Descriptor fields the pipeline does not interpret stay in `meta` and are
/// flattened next to the typed fields, so `page.title` or `page.summary` work
/// the same as `page.url`.
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    #[serde(skip)]
    pub kind: ContentKind,
    /// The Markdown file this item was built from.
    #[serde(skip)]
    pub source: PathBuf,
    #[serde(flatten)]
    pub meta: Metadata,
    pub url: String,
    pub content: String,
    /// `date` exactly as written in the descriptor (posts only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_datetime"
    )]
    pub datetime: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(rename = "categoryDisplay", skip_serializing_if = "Vec::is_empty")]
    pub category_display: Vec<CategoryLink>,
}

fn serialize_datetime<S: Serializer>(
    value: &Option<DateTime<FixedOffset>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

impl ContentItem {
    /// An item with no metadata, body or post fields yet.
    pub fn new(kind: ContentKind, source: PathBuf, url: String) -> Self {
        Self {
            kind,
            source,
            meta: Metadata::new(),
            url,
            content: String::new(),
            date: None,
            datetime: None,
            categories: Vec::new(),
            category_display: Vec::new(),
        }
    }
}

/// A registered post: the item plus its template value.
#[derive(Debug, Clone)]
pub struct PostEntry {
    item: Rc<ContentItem>,
    value: Value,
}

impl PostEntry {
    fn new(item: ContentItem) -> Self {
        let value = Value::from_serialize(&item);
        Self {
            item: Rc::new(item),
            value,
        }
    }

    pub fn item(&self) -> &Rc<ContentItem> {
        &self.item
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Deref for PostEntry {
    type Target = ContentItem;

    fn deref(&self) -> &ContentItem {
        &self.item
    }
}

impl Serialize for PostEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

/// Stable sort, newest first.
pub fn sort_by_date_descending(items: &mut [PostEntry]) {
    items.sort_by(|a, b| b.datetime.cmp(&a.datetime));
}

/// The single mutable aggregate of a build.
#[derive(Debug)]
pub struct SiteModel {
    config: SiteConfig,
    posts: Vec<PostEntry>,
    categories: BTreeMap<String, Vec<PostEntry>>,
    urls: UrlClaims,
}

impl SiteModel {
    pub fn new(config: SiteConfig) -> Self {
        let urls = UrlClaims::for_site(&config);
        Self {
            config,
            posts: Vec::new(),
            categories: BTreeMap::new(),
            urls,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn posts(&self) -> &[PostEntry] {
        &self.posts
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// Full category index, keyed by category name in lexical order.
    pub fn categories(&self) -> &BTreeMap<String, Vec<PostEntry>> {
        &self.categories
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn category_posts(&self, category: &str) -> Option<&[PostEntry]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Record that `source` renders to `url`.
    pub fn claim_url(&mut self, url: &str, source: &Path) -> Result<(), UrlConflict> {
        self.urls.claim(url, source)
    }

    /// Append a post to the archive and to the bucket of every category it
    /// declares. Categories are expected to be distinct.
    pub fn add_post(&mut self, item: ContentItem) -> PostEntry {
        let entry = PostEntry::new(item);
        for category in &entry.categories {
            self.categories
                .entry(category.clone())
                .or_default()
                .push(entry.clone());
        }
        self.posts.push(entry.clone());
        entry
    }

    pub fn sort_posts_by_date_descending(&mut self) {
        sort_by_date_descending(&mut self.posts);
    }

    /// Sort one category bucket. Returns the sorted bucket, or `None` if no post
    /// declared the category.
    pub fn sort_category_by_date_descending(
        &mut self,
        category: &str,
    ) -> Option<&[PostEntry]> {
        let bucket = self.categories.get_mut(category)?;
        sort_by_date_descending(bucket);
        Some(bucket.as_slice())
    }

    /// Sort the archive and every category bucket.
    pub fn sort_all_by_date_descending(&mut self) {
        self.sort_posts_by_date_descending();
        for bucket in self.categories.values_mut() {
            sort_by_date_descending(bucket);
        }
    }

    /// The first `limit` posts. Only meaningful after the archive is sorted.
    pub fn feed_slice(&self, limit: usize) -> &[PostEntry] {
        &self.posts[..limit.min(self.posts.len())]
    }
}
