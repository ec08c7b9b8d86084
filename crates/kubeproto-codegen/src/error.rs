//! Backend error types
//!
//! Template and formatting failures carry the offending text as a
//! [`miette`] source so the CLI can point at the exact line.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use kubeproto_core::CoreError;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, CodegenError>;

#[derive(Error, Debug, Diagnostic)]
pub enum CodegenError {
    #[error(transparent)]
    #[diagnostic(code(kubeproto::schema))]
    Core(#[from] CoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    /// Kinds of one proto package must share a group/version
    #[error("package '{package}' declares Kinds in both {first} and {second}")]
    #[diagnostic(
        code(kubeproto::codegen::mixed_group_version),
        help("split the package so each one maps to a single group/version")
    )]
    MixedGroupVersion {
        package: String,
        first: String,
        second: String,
    },

    /// Two versions of one Kind disagree on scope
    #[error("Kind '{kind}' in group '{group}' is {first} in one version and {second} in another")]
    #[diagnostic(code(kubeproto::crd::scope))]
    ConflictingScope {
        group: String,
        kind: String,
        first: String,
        second: String,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A built-in template failed to render
#[derive(Error, Debug, Diagnostic)]
#[error("template '{name}' failed: {message}")]
#[diagnostic(code(kubeproto::codegen::template))]
pub struct TemplateError {
    pub name: String,
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("error occurred here")]
    pub span: Option<SourceSpan>,
}

impl TemplateError {
    pub fn from_minijinja(err: minijinja::Error, name: &str, source: &str) -> Self {
        let span = err.line().and_then(|line| line_span(source, line));
        let message = err
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| err.kind().to_string());
        Self {
            name: name.to_string(),
            message,
            src: NamedSource::new(name, source.to_string()),
            span,
        }
    }

    /// No built-in template is registered under `name`
    pub fn unknown(name: &str) -> Self {
        Self {
            name: name.to_string(),
            message: format!("unknown template '{}'", name),
            src: NamedSource::new(name, String::new()),
            span: None,
        }
    }
}

/// Emitted source is not valid Rust
///
/// The help text is a line-numbered listing around the failure.
#[derive(Error, Debug, Diagnostic)]
#[error("generated file '{path}' does not parse: {message}")]
#[diagnostic(code(kubeproto::codegen::format))]
pub struct FormatError {
    pub path: String,
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("does not parse here")]
    pub span: Option<SourceSpan>,

    #[help]
    pub listing: String,
}

/// Span covering one 1-based line of `source`
pub(crate) fn line_span(source: &str, line: usize) -> Option<SourceSpan> {
    let mut offset = 0;
    for (i, text) in source.split('\n').enumerate() {
        if i + 1 == line {
            return Some(SourceSpan::new(offset.into(), text.len()));
        }
        offset += text.len() + 1;
    }
    None
}
