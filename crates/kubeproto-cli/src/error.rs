//! CLI error types with exit code handling
//!
//! Library errors are wrapped as they are, so their diagnostics (codes,
//! help, source spans) survive to the report printed by `main`.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use kubeproto_codegen::CodegenError;
use kubeproto_core::CoreError;
use kubeproto_extract::ExtractError;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Descriptor set could not be loaded or resolved
    #[error(transparent)]
    #[diagnostic(code(kubeproto::cli::schema))]
    Schema(#[from] CoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Codegen(#[from] CodegenError),

    #[error(transparent)]
    #[diagnostic(code(kubeproto::cli::extract))]
    Extract(#[from] ExtractError),

    #[error("failed to load config '{path}': {source}")]
    #[diagnostic(
        code(kubeproto::cli::config),
        help("keys are camelCase: outputDir, modules, runtimeCrate, crd.split, crd.categories")
    )]
    Config {
        path: PathBuf,
        #[source]
        source: CoreError,
    },

    #[error("{action} '{path}': {source}")]
    #[diagnostic(code(kubeproto::cli::io))]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `--check` found files that differ from the generated output
    #[error("{stale} of {total} generated file(s) are out of date")]
    #[diagnostic(
        code(kubeproto::cli::check),
        help("run the same command without --check to regenerate")
    )]
    CheckFailed { stale: usize, total: usize },

    #[error("{message}")]
    #[diagnostic(code(kubeproto::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Schema(CoreError::Io(_)) => exit_codes::IO_ERROR,
            CliError::Schema(_) => exit_codes::SCHEMA_ERROR,
            CliError::Codegen(CodegenError::Core(_)) => exit_codes::SCHEMA_ERROR,
            CliError::Codegen(_) => exit_codes::CODEGEN_ERROR,
            CliError::Extract(ExtractError::Io(_) | ExtractError::DirectoryNotFound(_)) => {
                exit_codes::IO_ERROR
            }
            CliError::Extract(_) => exit_codes::EXTRACT_ERROR,
            CliError::Config { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::CheckFailed { .. } => exit_codes::CHECK_FAILED,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
        }
    }

    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
