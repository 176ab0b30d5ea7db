//! Markdown → HTML conversion.
//!
//! Thin wrapper over pulldown-cmark with the GFM-style extensions content
//! authors expect. Raw HTML passes through unchanged, and so do template
//! placeholders like `{{ site.name }}`: the walker renders the returned HTML as
//! a template afterwards.

use pulldown_cmark::{Options, Parser, html as md_html};

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
}

/// Render Markdown source to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    md_html::push_html(&mut html, parser);
    html
}
