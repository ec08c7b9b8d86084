//! Error types for kubeproto-runtime

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors returned by backends, the scheme and selectors
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    #[error("{kind} '{name}' not found{}", in_namespace(.namespace))]
    NotFound {
        kind: String,
        namespace: Option<String>,
        name: String,
    },

    #[error("{kind} '{name}' already exists{}", in_namespace(.namespace))]
    AlreadyExists {
        kind: String,
        namespace: Option<String>,
        name: String,
    },

    /// Object has no name to address it by
    #[error("{kind} has no metadata.name")]
    MissingName { kind: String },

    /// A different type is already registered for this group/version/kind
    #[error("{gvk} is already registered to {registered}, cannot register {attempted}")]
    SchemeConflict {
        gvk: String,
        registered: &'static str,
        attempted: &'static str,
    },

    #[error("invalid label selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// Error injected by a fake reactor
    #[error("{0}")]
    Injected(String),

    /// Watch stream reported an error
    #[error("watch error: {0}")]
    Watch(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn in_namespace(namespace: &Option<String>) -> String {
    match namespace.as_deref() {
        Some(ns) if !ns.is_empty() => format!(" in namespace '{}'", ns),
        _ => String::new(),
    }
}

impl RuntimeError {
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Api(kube::Error::Api(response)) => response.code == 404,
            _ => false,
        }
    }

    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::AlreadyExists { .. } => true,
            Self::Api(kube::Error::Api(response)) => response.code == 409,
            _ => false,
        }
    }
}
