//! Content validation without rendering.
//!
//! Loads the config and templates and validates every content item the way a
//! build would (descriptor present, URL valid and unclaimed, post dates parse,
//! categories known), then stops. Nothing is written. A site that passes `check` can
//! still fail to build only through template runtime errors or the filesystem.

use crate::config;
use crate::generate::{GenerateError, SitePaths};
use crate::model::ContentItem;
use crate::naming::UrlClaims;
use crate::template::{TemplateEngine, TemplateEngineConfig};
use crate::types::ContentKind;
use crate::walk;
use std::collections::{BTreeMap, BTreeSet};

/// Items found by a successful check.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub posts: Vec<ContentItem>,
    pub pages: Vec<ContentItem>,
    /// Category name → number of posts declaring it.
    pub categories: BTreeMap<String, usize>,
    /// Categories in `categoryMap` that no post uses.
    pub unused_categories: Vec<String>,
}

pub fn check(paths: &SitePaths) -> Result<CheckReport, GenerateError> {
    let config = config::load_config(&paths.config)?;
    TemplateEngine::new(&TemplateEngineConfig {
        template_dir: paths.templates.clone(),
    })?;

    let mut report = CheckReport::default();
    let mut urls = UrlClaims::for_site(&config);
    for kind in [ContentKind::Post, ContentKind::Page] {
        for md_path in walk::list_markdown_files(paths.content_dir(kind))? {
            let item = walk::load_item(&md_path, kind, &config)?;
            walk::claim_url(&mut urls, &item)?;
            match kind {
                ContentKind::Post => {
                    for category in &item.categories {
                        *report.categories.entry(category.clone()).or_default() += 1;
                    }
                    report.posts.push(item);
                }
                ContentKind::Page => report.pages.push(item),
            }
        }
    }

    let used: BTreeSet<&String> = report.categories.keys().collect();
    report.unused_categories = config
        .category_map
        .keys()
        .filter(|name| !used.contains(name))
        .cloned()
        .collect();

    Ok(report)
}
