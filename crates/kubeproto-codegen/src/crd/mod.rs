//! CRD/Schema backend
//!
//! One CustomResourceDefinition per Kind, aggregating every version of that
//! Kind found in the schema:
//!
//! - **Schema model** (`schema`): serializable manifest types
//! - **Builder** (`builder`): message graph to OpenAPI v3 properties, and
//!   Kubernetes version priority for picking the storage version
//!
//! Manifests are ordered by name and written either as one YAML stream
//! (`crds.yaml`) or, with `crd.split`, one `<plural>.<group>.yaml` each.

mod builder;
mod schema;

pub use builder::{SchemaBuilder, version_priority};
pub use schema::{
    CRD_API_VERSION, CRD_KIND, CrdMetadata, CrdNames, CrdSchema, CrdScope, CrdVersionSchema,
    CustomResourceDefinition, PropertyType, ScaleSubresource, SchemaProperty, StatusSubresource,
    Subresources, VersionSchema,
};

use std::collections::BTreeMap;

use kubeproto_core::naming::pluralize;
use kubeproto_core::{CrdConfig, GeneratorConfig, KindPair, Schema, Scope};
use tracing::debug;

use crate::error::{CodegenError, Result};
use crate::generator::{GeneratedFile, Generator, Target};

/// Output file of the single-stream mode
pub const CRDS_FILE: &str = "crds.yaml";

pub struct CrdGenerator {
    config: CrdConfig,
}

impl CrdGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            config: config.crd.clone(),
        }
    }

    /// Every CRD of the schema, sorted by name
    pub fn definitions(&self, schema: &Schema) -> Result<Vec<CustomResourceDefinition>> {
        // (group, kind) -> versions
        let mut by_kind: BTreeMap<(String, String), Vec<KindPair>> = BTreeMap::new();
        for pair in schema.kinds() {
            let message = schema.message(pair.kind);
            if let Some(info) = &message.kind {
                by_kind
                    .entry((info.group_version.group.clone(), message.short_name.clone()))
                    .or_default()
                    .push(pair);
            }
        }

        let mut definitions = by_kind
            .into_iter()
            .map(|((group, kind), pairs)| self.definition(schema, group, kind, pairs))
            .collect::<Result<Vec<_>>>()?;
        definitions.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(definitions)
    }

    fn definition(
        &self,
        schema: &Schema,
        group: String,
        kind: String,
        pairs: Vec<KindPair>,
    ) -> Result<CustomResourceDefinition> {
        let mut scope = None;
        let mut versions = Vec::with_capacity(pairs.len());

        for pair in &pairs {
            let Some(info) = &schema.message(pair.kind).kind else {
                continue;
            };
            match scope {
                None => scope = Some(info.scope),
                Some(first) if first != info.scope => {
                    return Err(CodegenError::ConflictingScope {
                        group,
                        kind,
                        first: first.to_string(),
                        second: info.scope.to_string(),
                    });
                }
                Some(_) => {}
            }

            let mut builder = SchemaBuilder::new(schema);
            versions.push(CrdVersionSchema {
                name: info.group_version.version.clone(),
                served: true,
                storage: false,
                schema: VersionSchema {
                    open_api_v3_schema: builder.kind_root(pair.kind),
                },
                subresources: builder.subresources(pair.kind),
            });
        }

        versions.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(storage) = versions
            .iter_mut()
            .max_by_key(|v| version_priority(&v.name))
        {
            storage.storage = true;
        }

        let list_kind = pairs
            .first()
            .map(|p| schema.message(p.list).short_name.clone())
            .unwrap_or_else(|| format!("{}List", kind));

        let crd = CustomResourceDefinition::new(CrdSchema {
            group,
            names: CrdNames {
                plural: pluralize(&kind),
                singular: kind.to_lowercase(),
                list_kind,
                categories: self.config.categories.clone(),
                kind,
            },
            scope: match scope {
                Some(Scope::Cluster) => CrdScope::Cluster,
                _ => CrdScope::Namespaced,
            },
            versions,
        });
        debug!(
            crd = crd.name(),
            versions = crd.spec.versions.len(),
            storage = crd.spec.storage_version().map(|v| v.name.as_str()),
            "built CRD"
        );
        Ok(crd)
    }
}

impl Generator for CrdGenerator {
    fn target(&self) -> Target {
        Target::Crd
    }

    fn generate(&self, schema: &Schema) -> Result<Vec<GeneratedFile>> {
        let definitions = self.definitions(schema)?;
        if self.config.split {
            return definitions
                .iter()
                .map(|crd| {
                    Ok(GeneratedFile::new(
                        format!("{}.yaml", crd.name()),
                        format!("---\n{}", serde_yaml::to_string(crd)?),
                    ))
                })
                .collect();
        }

        if definitions.is_empty() {
            return Ok(Vec::new());
        }
        let mut stream = String::new();
        for crd in &definitions {
            stream.push_str("---\n");
            stream.push_str(&serde_yaml::to_string(crd)?);
        }
        Ok(vec![GeneratedFile::new(CRDS_FILE, stream)])
    }
}
