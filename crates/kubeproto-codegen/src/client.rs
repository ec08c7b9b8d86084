//! Client/Informer backend
//!
//! Per group/version module: a typed client generic over the runtime
//! `Backend`, REST wiring, and a `<Kind>Informer`/`<Kind>Lister` pair per
//! Kind backed by the runtime's shared informer factory.

use kubeproto_core::{GeneratorConfig, GroupVersion, Schema};
use serde::Serialize;
use tracing::debug;

use crate::engine::TemplateEngine;
use crate::error::Result;
use crate::format::format_source;
use crate::generator::{GeneratedFile, Generator, Target};
use crate::rust::{PackageUnit, client_ident, group_version_ident, package_units};

pub const CLIENT_FILE: &str = "client.rs";

/// View model shared by the client and fake templates
#[derive(Debug, Serialize)]
pub(crate) struct ClientContext {
    proto_package: String,
    runtime: String,
    api_version: String,
    client: String,
    /// `StorageV1`, prefix of the seed enum and fake constructor
    group_version: String,
    kinds: Vec<ClientKind>,
}

#[derive(Debug, Serialize)]
struct ClientKind {
    name: String,
    list: String,
    namespaced: bool,
}

impl ClientContext {
    pub(crate) fn new(schema: &Schema, unit: &PackageUnit, gv: &GroupVersion, runtime: &str) -> Self {
        Self {
            proto_package: unit.proto_package.clone(),
            runtime: runtime.to_string(),
            api_version: gv.api_version(),
            client: client_ident(gv),
            group_version: group_version_ident(gv),
            kinds: unit
                .kinds
                .iter()
                .map(|pair| {
                    let kind = schema.message(pair.kind);
                    ClientKind {
                        name: kind.short_name.clone(),
                        list: schema.message(pair.list).short_name.clone(),
                        namespaced: kind.kind.as_ref().is_none_or(|k| k.scope.is_namespaced()),
                    }
                })
                .collect(),
        }
    }
}

/// Units holding Kinds, with their group/version
pub(crate) fn kind_units(schema: &Schema) -> Result<Vec<(PackageUnit, GroupVersion)>> {
    Ok(package_units(schema)?
        .into_iter()
        .filter_map(|unit| {
            let gv = unit.group_version.clone()?;
            Some((unit, gv))
        })
        .collect())
}

/// Render one template per Kind-holding unit into `file`
pub(crate) fn render_units(
    engine: &TemplateEngine,
    schema: &Schema,
    runtime: &str,
    template: &str,
    file: &str,
) -> Result<Vec<GeneratedFile>> {
    kind_units(schema)?
        .iter()
        .map(|(unit, gv)| {
            let context = ClientContext::new(schema, unit, gv, runtime);
            let path = unit.file_path(file);
            let rendered = engine.render(template, &context)?;
            let content = format_source(&path.to_string_lossy(), &rendered)?;
            debug!(path = %path.display(), kinds = unit.kinds.len(), "rendered {}", template);
            Ok(GeneratedFile::new(path, content))
        })
        .collect()
}

pub struct ClientGenerator {
    runtime: String,
    engine: TemplateEngine,
}

impl ClientGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            runtime: config.runtime_crate.clone(),
            engine: TemplateEngine::new(),
        }
    }
}

impl Generator for ClientGenerator {
    fn target(&self) -> Target {
        Target::Client
    }

    fn generate(&self, schema: &Schema) -> Result<Vec<GeneratedFile>> {
        render_units(&self.engine, schema, &self.runtime, "client.rs.jinja", CLIENT_FILE)
    }
}
