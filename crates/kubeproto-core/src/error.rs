//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// A field references a message or enum that is not part of the IR
    #[error("unresolved type '{type_name}' referenced by field '{field}'{}", suggestion_suffix(.suggestion))]
    UnresolvedType {
        field: String,
        type_name: String,
        suggestion: Option<String>,
    },

    /// A Kind lives in a file without the group/version annotation
    #[error("message '{message}' is a Kind but file '{file}' has no {missing} in its kubeproto.k8s annotation")]
    MissingGroupVersion {
        message: String,
        file: String,
        missing: &'static str,
    },

    #[error("invalid annotation '{name}' on {target}: {message}")]
    InvalidAnnotation {
        name: String,
        target: String,
        message: String,
    },

    #[error("type name '{name}' is produced by both '{first}' and '{second}' in package '{package}'")]
    NameCollision {
        name: String,
        first: String,
        second: String,
        package: String,
    },

    #[error("message '{message}' embeds itself by value through {path}")]
    RecursiveEmbedding { message: String, path: String },

    #[error("type '{0}' is declared more than once in the primary file set")]
    DuplicateType(String),

    #[error("file '{0}' not found in descriptor set")]
    FileNotFound(String),

    #[error("failed to decode descriptor set: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
