//! The build context handed to every template render.
//!
//! | Name | Value |
//! |------|-------|
//! | `version` | generator name and version |
//! | `updated` | build timestamp, `YYYY-MM-DDTHH:MM:SSZ` |
//! | `site` | the site config (`categoryMap` plus author metadata) |
//! | `posts` | the current listing, see below |
//! | `categories` | full category index: name → posts |
//! | `page` | the item being rendered; absent between items |
//! | `feed` | the feed window; only present while rendering `atom.xml` |
//!
//! `posts` changes meaning by phase: the in-progress archive while posts are
//! walked, the sorted archive while pages and the feed are rendered, and the
//! category bucket while a category listing is rendered.

use crate::config::SiteConfig;
use crate::model::{ContentItem, PostEntry, SiteModel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Format of the `updated` timestamp.
pub const UPDATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Values fixed for the whole build.
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: String,
    pub updated: String,
}

impl BuildInfo {
    pub fn new(version: impl Into<String>, updated: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            updated: updated.format(UPDATED_FORMAT).to_string(),
        }
    }
}

/// Title and URL of a category listing, exposed as `page`.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub title: String,
    pub url: String,
}

/// Whatever occupies the `page` slot.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum CurrentPage<'a> {
    Empty,
    Item(&'a ContentItem),
    Listing(&'a Listing),
}

impl CurrentPage<'_> {
    pub fn is_empty(&self) -> bool {
        matches!(self, CurrentPage::Empty)
    }
}

/// One render's worth of named values.
#[derive(Debug, Clone, Serialize)]
pub struct BuildContext<'a> {
    pub version: &'a str,
    pub updated: &'a str,
    pub site: &'a SiteConfig,
    pub posts: &'a [PostEntry],
    pub categories: &'a BTreeMap<String, Vec<PostEntry>>,
    #[serde(skip_serializing_if = "CurrentPage::is_empty")]
    pub page: CurrentPage<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<&'a [PostEntry]>,
}

impl<'a> BuildContext<'a> {
    /// Context over the model's archive with an empty `page` slot.
    pub fn new(info: &'a BuildInfo, model: &'a SiteModel) -> Self {
        Self {
            version: &info.version,
            updated: &info.updated,
            site: model.config(),
            posts: model.posts(),
            categories: model.categories(),
            page: CurrentPage::Empty,
            feed: None,
        }
    }

    pub fn with_page(mut self, page: CurrentPage<'a>) -> Self {
        self.page = page;
        self
    }

    pub fn with_posts(mut self, posts: &'a [PostEntry]) -> Self {
        self.posts = posts;
        self
    }

    pub fn with_feed(mut self, feed: &'a [PostEntry]) -> Self {
        self.feed = Some(feed);
        self
    }
}
