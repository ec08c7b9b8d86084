//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Schema error - the descriptor set does not form a valid schema
pub const SCHEMA_ERROR: i32 = 2;

/// Codegen error - a backend failed to render its output
pub const CODEGEN_ERROR: i32 = 3;

/// Extract error - Rust sources could not be turned into a proto schema
pub const EXTRACT_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Check failed - generated output differs from what is on disk
pub const CHECK_FAILED: i32 = 6;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
