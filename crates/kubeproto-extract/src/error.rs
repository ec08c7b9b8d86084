//! Error and warning types for the extractor

use std::path::PathBuf;
use thiserror::Error;

/// Extractor error
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to parse {path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("'{name}' is declared twice ({first} and {second})")]
    DuplicateDeclaration {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("'{record}' reuses the fields of '{source_record}', which is not a struct in the source tree")]
    UnknownSource {
        record: String,
        source_record: String,
    },

    #[error("Package '{0}' does not end in a Kubernetes version (e.g. storage.v1)")]
    UnversionedPackage(String),
}

/// Result type for extractor operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// A declaration the extractor could only translate approximately
///
/// Warnings never abort extraction: the output is a starting point a human
/// reviews before compiling it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractWarning {
    pub file: PathBuf,
    pub line: Option<usize>,
    /// `Record.field` or the declaration name
    pub declaration: String,
    pub message: String,
}

impl ExtractWarning {
    pub fn new(file: impl Into<PathBuf>, declaration: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
            declaration: declaration.into(),
            message: message.into(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, " {} - {}", self.declaration, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = ExtractWarning::new("src/api.rs", "Bucket.window", "unsupported type 'tuple'").at_line(12);
        assert_eq!(
            warning.to_string(),
            "src/api.rs:12 Bucket.window - unsupported type 'tuple'"
        );

        let warning = ExtractWarning::new("src/api.rs", "Phase", "not an enum");
        assert_eq!(warning.to_string(), "src/api.rs Phase - not an enum");
    }
}
