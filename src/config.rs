//! Site configuration module.
//!
//! Loads and validates `quire.yaml` from the site root. The file carries two
//! kinds of data:
//!
//! - **`categoryMap`** (required): maps every category name a post may declare
//!   to the URL slug of its listing page.
//! - **Everything else**: author-defined metadata (name, description, base URL,
//!   author, ...) passed verbatim to templates as `site.*`.
//!
//! ```yaml
//! name: My Weblog
//! description: Notes on software
//! url: https://example.org/
//! author: Jane Doe
//!
//! categoryMap:
//!   Tech: tech
//!   Life & Travel: life-travel
//! ```
//!
//! The config is loaded once before anything is rendered and never mutated
//! afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("site config not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `quire.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Category name → URL slug of its listing page.
    #[serde(rename = "categoryMap")]
    pub category_map: BTreeMap<String, String>,
    /// Author-defined site metadata, exposed to templates unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SiteConfig {
    /// Slug for a category, if the category is known.
    pub fn category_slug(&self, category: &str) -> Option<&str> {
        self.category_map.get(category).map(String::as_str)
    }

    /// Validate the category map.
    ///
    /// Slugs become directory names under `categories/`, so each must be a
    /// single non-empty path segment, and no two categories may share one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (category, slug) in &self.category_map {
            if slug.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "categoryMap.{category}: slug must not be empty"
                )));
            }
            if slug.contains('/') || slug.contains('\\') || slug == "." || slug == ".." {
                return Err(ConfigError::Validation(format!(
                    "categoryMap.{category}: slug '{slug}' must be a single path segment"
                )));
            }
            if let Some(other) = seen.insert(slug.as_str(), category.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "categoryMap: '{other}' and '{category}' share the slug '{slug}'"
                )));
            }
        }
        Ok(())
    }
}

/// Load and validate the site config at `path`.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let config = parse_config(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

fn parse_config(content: &str) -> Result<SiteConfig, serde_yaml_ng::Error> {
    serde_yaml_ng::from_str(content)
}

/// A documented starter `quire.yaml`.
pub fn stock_config_yaml() -> &'static str {
    r#"# Quire site configuration.
#
# Every key except `categoryMap` is passed to templates unchanged as `site.*`,
# so add whatever your theme needs.

name: My Weblog
description: Notes, essays and the occasional rant
url: https://example.org/
author: Your Name

# Category name (as written in a post's `categories` list) -> URL slug.
# Listing pages are written to categories/<slug>/index.html.
# A post declaring a category missing from this map fails the build.
categoryMap:
  Tech: tech
  Travel: travel
"#
}
