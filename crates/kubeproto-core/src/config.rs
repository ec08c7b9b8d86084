//! Generator configuration
//!
//! Read from `kubeproto.yaml` next to the descriptor set, or from the path
//! given on the command line. Every key is optional.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "kubeproto.yaml";

/// Crate path emitted code imports the runtime from
pub const DEFAULT_RUNTIME_CRATE: &str = "kubeproto_runtime";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Directory generated files are written under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Proto package -> Rust module path
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, String>,

    #[serde(default = "default_runtime_crate")]
    pub runtime_crate: String,

    #[serde(default)]
    pub crd: CrdConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdConfig {
    /// One file per Kind instead of a single stream
    #[serde(default)]
    pub split: bool,

    /// `spec.names.categories` on every manifest
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

fn default_api_version() -> String {
    "kubeproto.dev/v1".to_string()
}

fn default_runtime_crate() -> String {
    DEFAULT_RUNTIME_CRATE.to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            output_dir: None,
            modules: BTreeMap::new(),
            runtime_crate: default_runtime_crate(),
            crd: CrdConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load `kubeproto.yaml` from a directory, or defaults when absent
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Output directory, falling back to the current directory
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
