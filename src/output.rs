//! CLI output formatting.
//!
//! # Build progress
//!
//! One timestamped line per artifact, printed as it is written:
//!
//! ```text
//! [21:04:11] Rendering hello/
//! [21:04:11] Rendering about/
//! [21:04:11] Rendering atom.xml (21 entries)
//! [21:04:11] Rendering categories/tech/ (Tech)
//! ```
//!
//! followed by a summary:
//!
//! ```text
//! Generated 25 posts, 2 pages, 3 categories, 21 feed entries
//! ```
//!
//! # Check
//!
//! ```text
//! Posts
//! 001 Hello → hello/
//!     Source: posts/hello.md
//!     Categories: Tech, Life
//!
//! Pages
//! 001 About → about/
//!     Source: pages/about.md
//!
//! Categories
//!     Life (1 post)
//!     Tech (1 post)
//!     Unused: Travel
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns lines) for testability and
//! a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::check::CheckReport;
use crate::generate::BuildSummary;
use crate::model::ContentItem;
use crate::types::{Artifact, BuildEvent};
use std::path::Path;

/// Format of the progress timestamp.
const TIME_FORMAT: &str = "%H:%M:%S";

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// `1 post`, `2 posts`, `0 categories`.
fn count(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Display title of an item: its `title`, or the URL when untitled.
fn item_title(item: &ContentItem) -> &str {
    item.meta
        .get("title")
        .and_then(|t| t.as_str())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(item.url.as_str())
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build progress event.
pub fn format_build_event(event: &BuildEvent) -> String {
    let what = match &event.artifact {
        Artifact::Post { url } | Artifact::Page { url } => url.clone(),
        Artifact::Feed { entries } => {
            format!(
                "{} ({})",
                crate::naming::FEED_FILE,
                count(*entries, "entry", "entries")
            )
        }
        Artifact::Category { name, url } => format!("{url} ({name})"),
    };
    format!("[{}] Rendering {}", event.at.format(TIME_FORMAT), what)
}

/// Format the end-of-build summary.
pub fn format_build_summary(summary: &BuildSummary, output_dir: &Path) -> Vec<String> {
    vec![
        format!(
            "Generated {}, {}, {}, {}",
            count(summary.posts, "post", "posts"),
            count(summary.pages, "page", "pages"),
            count(summary.categories.len(), "category", "categories"),
            count(summary.feed_entries, "feed entry", "feed entries"),
        ),
        format!("Site written to {}", output_dir.display()),
    ]
}

pub fn print_build_summary(summary: &BuildSummary, output_dir: &Path) {
    for line in format_build_summary(summary, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

fn item_lines(lines: &mut Vec<String>, items: &[ContentItem], site_root: &Path) {
    for (i, item) in items.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            item_title(item),
            item.url
        ));
        let source = item.source.strip_prefix(site_root).unwrap_or(&item.source);
        lines.push(format!("    Source: {}", source.display()));
        if !item.categories.is_empty() {
            lines.push(format!("    Categories: {}", item.categories.join(", ")));
        }
    }
}

/// Format the content inventory found by `check`.
pub fn format_check_report(report: &CheckReport, site_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Posts".to_string());
    item_lines(&mut lines, &report.posts, site_root);

    if !report.pages.is_empty() {
        lines.push(String::new());
        lines.push("Pages".to_string());
        item_lines(&mut lines, &report.pages, site_root);
    }

    lines.push(String::new());
    lines.push("Categories".to_string());
    for (name, posts) in &report.categories {
        lines.push(format!("    {} ({})", name, count(*posts, "post", "posts")));
    }
    if !report.unused_categories.is_empty() {
        lines.push(format!("    Unused: {}", report.unused_categories.join(", ")));
    }

    lines
}

pub fn print_check_report(report: &CheckReport, site_root: &Path) {
    for line in format_check_report(report, site_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::post;
    use crate::types::ContentKind;
    use chrono::NaiveTime;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn event(artifact: Artifact) -> BuildEvent {
        BuildEvent {
            at: NaiveTime::from_hms_opt(21, 4, 11).unwrap(),
            artifact,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn count_handles_one() {
        assert_eq!(count(1, "post", "posts"), "1 post");
        assert_eq!(count(0, "post", "posts"), "0 posts");
        assert_eq!(count(2, "category", "categories"), "2 categories");
    }

    #[test]
    fn post_event_shows_url() {
        let line = format_build_event(&event(Artifact::Post {
            url: "hello/".into(),
        }));
        assert_eq!(line, "[21:04:11] Rendering hello/");
    }

    #[test]
    fn feed_event_shows_entry_count() {
        let line = format_build_event(&event(Artifact::Feed { entries: 21 }));
        assert_eq!(line, "[21:04:11] Rendering atom.xml (21 entries)");
        let line = format_build_event(&event(Artifact::Feed { entries: 1 }));
        assert_eq!(line, "[21:04:11] Rendering atom.xml (1 entry)");
    }

    #[test]
    fn category_event_shows_url_and_name() {
        let line = format_build_event(&event(Artifact::Category {
            name: "Tech".into(),
            url: "categories/tech/".into(),
        }));
        assert_eq!(line, "[21:04:11] Rendering categories/tech/ (Tech)");
    }

    #[test]
    fn build_summary_lines() {
        let summary = BuildSummary {
            posts: 25,
            pages: 1,
            feed_entries: 21,
            categories: vec![("Tech".into(), "tech".into())],
        };
        let lines = format_build_summary(&summary, Path::new("public"));
        assert_eq!(
            lines,
            [
                "Generated 25 posts, 1 page, 1 category, 21 feed entries",
                "Site written to public",
            ]
        );
    }

    #[test]
    fn check_report_lists_items_and_categories() {
        let mut about = ContentItem::new(
            ContentKind::Page,
            PathBuf::from("/site/pages/about.md"),
            "about/".into(),
        );
        about
            .meta
            .insert("title".into(), serde_json::json!("About"));
        let mut hello = post("Hello", "2024-01-01", &["Tech", "Life"]);
        hello.source = PathBuf::from("/site/posts/hello.md");

        let report = CheckReport {
            posts: vec![hello],
            pages: vec![about],
            categories: BTreeMap::from([("Life".into(), 1), ("Tech".into(), 2)]),
            unused_categories: vec!["Travel".into()],
        };
        let lines = format_check_report(&report, Path::new("/site"));
        assert_eq!(
            lines,
            [
                "Posts",
                "001 Hello \u{2192} hello/",
                "    Source: posts/hello.md",
                "    Categories: Tech, Life",
                "",
                "Pages",
                "001 About \u{2192} about/",
                "    Source: pages/about.md",
                "",
                "Categories",
                "    Life (1 post)",
                "    Tech (2 posts)",
                "    Unused: Travel",
            ]
        );
    }

    #[test]
    fn untitled_item_falls_back_to_url() {
        let item = ContentItem::new(ContentKind::Page, PathBuf::from("x.md"), "x/".into());
        assert_eq!(item_title(&item), "x/");
    }
}
