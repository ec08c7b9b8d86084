//! Template engine based on MiniJinja
//!
//! The Rust-emitting backends render through built-in templates compiled into
//! the binary. Contexts are plain `Serialize` view models carrying resolved
//! types and identifiers; derived method and resource names come from the
//! `snakecase` and `plural` filters.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::error::{Result, TemplateError};
use crate::filters;

/// Built-in templates: (name, source)
const TEMPLATES: &[(&str, &str)] = &[
    ("types.rs.jinja", include_str!("../templates/types.rs.jinja")),
    ("client.rs.jinja", include_str!("../templates/client.rs.jinja")),
    ("fake.rs.jinja", include_str!("../templates/fake.rs.jinja")),
];

/// The template engine
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        env.add_filter("snakecase", filters::snakecase);
        env.add_filter("plural", filters::plural);
        env.add_filter("quote", filters::quote);

        Self { env }
    }

    /// Render a built-in template
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String> {
        let (_, source) = TEMPLATES
            .iter()
            .find(|(n, _)| *n == name)
            .ok_or_else(|| TemplateError::unknown(name))?;
        self.render_str(name, source, context)
    }

    /// Render an ad-hoc template string
    pub fn render_str<S: Serialize>(&self, name: &str, source: &str, context: S) -> Result<String> {
        let rendered = self
            .env
            .render_named_str(name, source, context)
            .map_err(|e| TemplateError::from_minijinja(e, name, source))?;
        Ok(rendered)
    }
}
