//! CLI commands

pub mod extract;
pub mod generate;
