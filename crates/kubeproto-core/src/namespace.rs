//! Import namespace management
//!
//! Assigns stable, collision-free local aliases to the module paths a
//! generated file imports from. Well-known paths are seeded with fixed
//! aliases so emitted code is stable across regenerations; everything else
//! is aliased first-come-first-served.

use std::collections::{BTreeMap, BTreeSet};

/// Module path of the Kubernetes meta/v1 types
pub const METAV1_MODULE: &str = "k8s_openapi::apimachinery::pkg::apis::meta::v1";

/// Module path of kube's core types (TypeMeta lives here)
pub const KUBE_CORE_MODULE: &str = "kube::core";

/// Paths that always receive the same alias
pub const WELL_KNOWN_ALIASES: &[(&str, &str)] = &[
    (METAV1_MODULE, "metav1"),
    (KUBE_CORE_MODULE, "kubecore"),
];

/// Separator between module path segments
const PATH_SEPARATOR: &str = "::";

/// Registry of module path -> local alias for one generated file
#[derive(Debug, Clone)]
pub struct NamespaceManager {
    /// path -> alias, one-to-one
    aliases: BTreeMap<String, String>,
    /// aliases already handed out, for collision checks
    taken: BTreeSet<String>,
    /// paths actually referenced by emitted code
    used: BTreeSet<String>,
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceManager {
    /// Create a manager seeded with the well-known aliases
    pub fn new() -> Self {
        Self::with_seeds(WELL_KNOWN_ALIASES.iter().copied())
    }

    /// Create a manager seeded with the given path/alias pairs
    pub fn with_seeds<'a>(seeds: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut manager = Self {
            aliases: BTreeMap::new(),
            taken: BTreeSet::new(),
            used: BTreeSet::new(),
        };
        for (path, alias) in seeds {
            manager.insert(path, alias);
        }
        manager
    }

    /// Register a module path and return its alias
    ///
    /// A path registered earlier keeps its alias. Otherwise the suggested
    /// alias (or the path's last segment) is used, with `_1`, `_2`, ...
    /// appended until it no longer collides with another path's alias.
    pub fn add(&mut self, module_path: &str, suggested_alias: Option<&str>) -> String {
        self.used.insert(module_path.to_string());
        if let Some(alias) = self.aliases.get(module_path) {
            return alias.clone();
        }

        let base = suggested_alias
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| basename(module_path).to_string());

        let mut candidate = base.clone();
        let mut suffix = 0;
        while self.taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", base, suffix);
        }

        self.insert(module_path, &candidate);
        candidate
    }

    /// Look up the alias for a path without registering it
    ///
    /// Returns an empty string when the path is unknown or when its alias
    /// equals the path's own last segment (no `as` clause needed).
    pub fn alias(&self, module_path: &str) -> &str {
        match self.aliases.get(module_path) {
            Some(alias) if alias != basename(module_path) => alias,
            _ => "",
        }
    }

    /// Snapshot of every registered path and its alias
    pub fn all(&self) -> BTreeMap<String, String> {
        self.aliases.clone()
    }

    /// `use` lines for every path referenced through [`add`](Self::add),
    /// sorted by path
    pub fn use_statements(&self) -> Vec<String> {
        self.used
            .iter()
            .map(|path| match self.alias(path) {
                "" => format!("use {};", path),
                alias => format!("use {} as {};", path, alias),
            })
            .collect()
    }

    fn insert(&mut self, path: &str, alias: &str) {
        self.aliases.insert(path.to_string(), alias.to_string());
        self.taken.insert(alias.to_string());
    }
}

/// Last segment of a module path
pub fn basename(module_path: &str) -> &str {
    module_path
        .rsplit(PATH_SEPARATOR)
        .next()
        .unwrap_or(module_path)
}
