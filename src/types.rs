//! Shared types used across the walker, the orchestrator and the check pass.

use chrono::NaiveTime;
use serde::Serialize;

/// Which content directory an item was discovered in.
///
/// The kind decides the source directory, the template used to render each
/// item, and whether the item takes part in the post archive (date parsing,
/// category registration, feed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Page,
}

impl ContentKind {
    /// Directory name under the site root.
    pub fn dir_name(self) -> &'static str {
        match self {
            ContentKind::Post => "posts",
            ContentKind::Page => "pages",
        }
    }

    /// Template rendered once per item of this kind.
    pub fn template(self) -> crate::template::TemplateKind {
        match self {
            ContentKind::Post => crate::template::TemplateKind::Posts,
            ContentKind::Page => crate::template::TemplateKind::Pages,
        }
    }

    pub fn is_post(self) -> bool {
        self == ContentKind::Post
    }
}

/// An artifact written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Post { url: String },
    Page { url: String },
    Feed { entries: usize },
    Category { name: String, url: String },
}

/// Progress event sent once per written artifact.
///
/// The build sends these over an optional channel; the CLI prints them from a
/// separate thread via [`crate::output::format_build_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEvent {
    /// Local wall-clock time the artifact was written.
    pub at: NaiveTime,
    pub artifact: Artifact,
}

impl BuildEvent {
    pub fn now(artifact: Artifact) -> Self {
        Self {
            at: chrono::Local::now().time(),
            artifact,
        }
    }
}

/// Send `artifact` on `events`, if anyone is listening.
///
/// A dropped receiver only means nobody prints progress; the build goes on.
pub(crate) fn report(events: Option<&std::sync::mpsc::Sender<BuildEvent>>, artifact: Artifact) {
    if let Some(tx) = events {
        tx.send(BuildEvent::now(artifact)).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateKind;

    #[test]
    fn post_kind_reads_posts_dir_with_posts_template() {
        assert_eq!(ContentKind::Post.dir_name(), "posts");
        assert_eq!(ContentKind::Post.template(), TemplateKind::Posts);
        assert!(ContentKind::Post.is_post());
    }

    #[test]
    fn report_sends_when_listening() {
        let (tx, rx) = std::sync::mpsc::channel();
        report(Some(&tx), Artifact::Feed { entries: 3 });
        report(None, Artifact::Feed { entries: 4 });
        drop(tx);
        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].artifact, Artifact::Feed { entries: 3 });
    }

    #[test]
    fn report_ignores_dropped_receiver() {
        let (tx, rx) = std::sync::mpsc::channel();
        drop(rx);
        report(Some(&tx), Artifact::Feed { entries: 1 });
    }

    #[test]
    fn page_kind_reads_pages_dir_with_pages_template() {
        assert_eq!(ContentKind::Page.dir_name(), "pages");
        assert_eq!(ContentKind::Page.template(), TemplateKind::Pages);
        assert!(!ContentKind::Page.is_post());
    }
}
