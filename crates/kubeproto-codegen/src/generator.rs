//! Backend selection and output blobs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use kubeproto_core::{GeneratorConfig, Schema};
use tracing::info;

use crate::error::Result;
use crate::{client, crd, deepcopy, fake, types};

/// A generated output blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory
    pub path: PathBuf,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// One artifact family produced from a schema
pub trait Generator {
    fn target(&self) -> Target;

    /// Files in a stable order
    fn generate(&self, schema: &Schema) -> Result<Vec<GeneratedFile>>;
}

/// The backends, one per CLI subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    Types,
    DeepCopy,
    Crd,
    Client,
    Fake,
}

impl Target {
    pub const ALL: [Target; 5] = [
        Self::Types,
        Self::DeepCopy,
        Self::Crd,
        Self::Client,
        Self::Fake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Types => "types",
            Self::DeepCopy => "deepcopy",
            Self::Crd => "crd",
            Self::Client => "client",
            Self::Fake => "fake",
        }
    }

    pub fn generator(&self, config: &GeneratorConfig) -> Box<dyn Generator> {
        match self {
            Self::Types => Box::new(types::TypesGenerator::new(config)),
            Self::DeepCopy => Box::new(deepcopy::DeepCopyGenerator::new(config)),
            Self::Crd => Box::new(crd::CrdGenerator::new(config)),
            Self::Client => Box::new(client::ClientGenerator::new(config)),
            Self::Fake => Box::new(fake::FakeGenerator::new(config)),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown backend '{}'", s))
    }
}

/// Run one backend over a finished schema
pub fn generate(target: Target, schema: &Schema, config: &GeneratorConfig) -> Result<Vec<GeneratedFile>> {
    let files = target.generator(config).generate(schema)?;
    info!(backend = %target, files = files.len(), "generated");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_round_trips_through_str() {
        for target in Target::ALL {
            assert_eq!(target.as_str().parse::<Target>().unwrap(), target);
        }
        assert!("openapi".parse::<Target>().is_err());
    }
}
