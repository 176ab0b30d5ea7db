//! # Quire
//!
//! A small static site generator for Markdown blogs. Posts and pages are
//! Markdown files paired with a metadata descriptor; the build renders them
//! through four templates into a plain directory of HTML plus an Atom feed.
//!
//! ```text
//! site/
//! ├── quire.yaml               # site metadata + categoryMap
//! ├── posts/
//! │   ├── hello.md             # body
//! │   └── hello.yaml           # title, date, categories, url?
//! ├── pages/
//! │   ├── about.md
//! │   └── about.yaml
//! └── themes/templates/
//!     ├── post.html  page.html  categories.html  atom.xml
//!     └── (partials)
//! ```
//!
//! # Pipeline
//!
//! The posts directory is walked exactly once. While walking, each post is
//! appended to the archive and to the bucket of every category it declares.
//! Everything aggregate (archive order, feed window, category listings) is
//! derived from that model afterwards, in a fixed phase order. See
//! [`generate`] for the phases.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`generate`] | Build orchestrator: posts → sort → pages → feed → categories |
//! | [`walk`] | Content walker: pairs `.md` with descriptors, renders, writes |
//! | [`model`] | Site model: archive, category index, stable date sort, feed slice |
//! | [`context`] | Typed build context handed to every template render |
//! | [`check`] | Validate a site without writing anything |
//! | [`config`] | `quire.yaml` loading and validation |
//! | [`descriptor`] | YAML/TOML descriptor loading and sidecar lookup |
//! | [`markdown`] | Markdown → HTML via pulldown-cmark |
//! | [`template`] | minijinja environment over an explicit template directory |
//! | [`naming`] | URL normalization and output path layout |
//! | [`types`] | Content kinds and build progress events |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Deterministic Output
//!
//! Content files are processed in sorted filename order, categories are
//! emitted in lexical order, and every date sort is stable. Given the same
//! input and the same `--updated` timestamp, two builds write byte-identical
//! files.
//!
//! ## Strict Content, Lenient Templates
//!
//! Post dates, category names and URLs are validated when a descriptor is
//! loaded, each output URL may be claimed by one file only, and any failure
//! (a template error included) stops the build with the offending path. A half
//! rendered site with a broken archive order or dead category links is worse
//! than no site. Templates, on the other hand, treat missing values as empty
//! so themes can reference optional descriptor fields freely.
//!
//! ## Bodies Are Templates
//!
//! A post body is rendered to HTML and then rendered again as a template with
//! the full build context, so `{{ site.url }}` or a loop over `posts` works
//! inside Markdown.

pub mod check;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod generate;
pub mod markdown;
pub mod model;
pub mod naming;
pub mod output;
pub mod template;
pub mod types;
pub mod walk;

/// Generator name exposed to templates as `version`.
pub const GENERATOR: &str = concat!("Quire ", env!("CARGO_PKG_VERSION"));

#[cfg(test)]
pub(crate) mod test_helpers;
