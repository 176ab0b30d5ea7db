//! Template rendering.
//!
//! A site ships four named templates in its template directory:
//!
//! | Kind | File | Rendered for |
//! |------|------|--------------|
//! | `posts` | `post.html` | every file in `posts/` |
//! | `pages` | `page.html` | every file in `pages/` |
//! | `categories` | `categories.html` | every category listing |
//! | `atom` | `atom.xml` | the feed |
//!
//! Templates use minijinja syntax. Any other file in the directory can be
//! pulled in with `{% include %}` or `{% extends %}`.
//!
//! ## Permissive lookups
//!
//! Undefined values render as empty and are falsy in conditions, and chained
//! lookups through them (`page.author.name` with no `author`) do not fail.
//! Content authors rely on this for optional descriptor fields. Required
//! fields are validated by the walker before anything reaches a template.
//!
//! ## Escaping
//!
//! `.html` and `.xml` templates auto-escape interpolated values; rendered
//! bodies must be emitted with `{{ page.content|safe }}`. Inline templates
//! (post bodies) are not escaped, since they are already HTML.

use minijinja::{Environment, UndefinedBehavior, path_loader};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template '{kind}' not found: {path}")]
    Missing { kind: &'static str, path: PathBuf },
    #[error("template '{name}' failed to compile: {source}")]
    Compile {
        name: String,
        source: minijinja::Error,
    },
    #[error("failed to render '{name}': {source}")]
    Render {
        name: String,
        source: minijinja::Error,
    },
}

/// Where templates are loaded from.
#[derive(Debug, Clone)]
pub struct TemplateEngineConfig {
    pub template_dir: PathBuf,
}

/// The four templates every site provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Posts,
    Pages,
    Categories,
    Atom,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Posts,
        TemplateKind::Pages,
        TemplateKind::Categories,
        TemplateKind::Atom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TemplateKind::Posts => "posts",
            TemplateKind::Pages => "pages",
            TemplateKind::Categories => "categories",
            TemplateKind::Atom => "atom",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::Posts => "post.html",
            TemplateKind::Pages => "page.html",
            TemplateKind::Categories => "categories.html",
            TemplateKind::Atom => "atom.xml",
        }
    }
}

/// Compiled templates for one build.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Load and compile all four templates from `config.template_dir`.
    ///
    /// Fails before any output is produced if a template is missing or has a
    /// syntax error.
    pub fn new(config: &TemplateEngineConfig) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_loader(path_loader(config.template_dir.clone()));

        for kind in TemplateKind::ALL {
            let path = config.template_dir.join(kind.file_name());
            if !path.is_file() {
                return Err(TemplateError::Missing {
                    kind: kind.name(),
                    path,
                });
            }
            env.get_template(kind.file_name())
                .map_err(|source| TemplateError::Compile {
                    name: kind.file_name().to_string(),
                    source,
                })?;
        }

        Ok(Self { env })
    }

    /// Render one of the named templates with `ctx`.
    pub fn render<S: Serialize>(&self, kind: TemplateKind, ctx: &S) -> Result<String, TemplateError> {
        let render_err = |source: minijinja::Error| TemplateError::Render {
            name: kind.file_name().to_string(),
            source,
        };
        let template = self.env.get_template(kind.file_name()).map_err(render_err)?;
        template.render(ctx).map_err(render_err)
    }

    /// Render an inline template, such as a post body, with `ctx`.
    ///
    /// `name` only labels errors.
    pub fn render_str<S: Serialize>(
        &self,
        name: &str,
        source: &str,
        ctx: &S,
    ) -> Result<String, TemplateError> {
        self.env
            .render_str(source, ctx)
            .map_err(|source| TemplateError::Render {
                name: name.to_string(),
                source,
            })
    }
}
