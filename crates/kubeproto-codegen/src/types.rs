//! Object/Type backend
//!
//! One `types.rs` per module: plain data structs for every emitted message,
//! enum newtypes with one associated const per symbol, and for modules
//! holding Kinds the group/version consts, `Object`/`ObjectList` impls and
//! `add_to_scheme`.

use kubeproto_core::wellknown;
use kubeproto_core::{Field, FieldKind, GeneratorConfig, MessageId, Schema};
use serde::Serialize;
use tracing::debug;

use crate::engine::TemplateEngine;
use crate::error::Result;
use crate::format::format_source;
use crate::generator::{GeneratedFile, Generator, Target};
use crate::rust::{
    Holding, PackageUnit, TypeRenderer, const_idents, field_ident, holding, needs_rename,
    package_units,
};

pub const TYPES_FILE: &str = "types.rs";

#[derive(Debug, Serialize)]
struct TypesContext {
    proto_package: String,
    runtime: String,
    imports: Vec<String>,
    uses_map: bool,
    group_version: Option<GroupVersionView>,
    enums: Vec<EnumView>,
    structs: Vec<StructView>,
    kinds: Vec<KindView>,
    type_meta: String,
    object_meta: String,
    list_meta: String,
}

#[derive(Debug, Serialize)]
struct GroupVersionView {
    group: String,
    version: String,
    api_version: String,
}

#[derive(Debug, Serialize)]
struct EnumView {
    name: String,
    values: Vec<ConstView>,
}

#[derive(Debug, Serialize)]
struct ConstView {
    ident: String,
    symbol: String,
}

#[derive(Debug, Serialize)]
struct StructView {
    name: String,
    fields: Vec<FieldView>,
}

#[derive(Debug, Serialize)]
struct FieldView {
    ident: String,
    ty: String,
    serde: String,
}

#[derive(Debug, Serialize)]
struct KindView {
    name: String,
    list: String,
    namespaced: bool,
    type_meta_field: String,
    list_type_meta_field: String,
}

pub struct TypesGenerator {
    runtime: String,
    engine: TemplateEngine,
}

impl TypesGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            runtime: config.runtime_crate.clone(),
            engine: TemplateEngine::new(),
        }
    }

    fn render_unit(&self, schema: &Schema, unit: &PackageUnit) -> Result<GeneratedFile> {
        let mut types = TypeRenderer::new(schema, &unit.module_path);

        let structs = unit
            .messages
            .iter()
            .map(|&id| {
                let message = schema.message(id);
                StructView {
                    name: message.short_name.clone(),
                    fields: message
                        .fields
                        .iter()
                        .map(|field| FieldView {
                            ident: field_ident(field),
                            ty: types.field_type(id, field),
                            serde: serde_attribute(schema, id, field),
                        })
                        .collect(),
                }
            })
            .collect();

        let enums = unit
            .enums
            .iter()
            .map(|&id| {
                let e = schema.enumeration(id);
                let symbols: Vec<&str> = e.values.iter().map(|v| v.symbol.as_str()).collect();
                EnumView {
                    name: e.short_name.clone(),
                    values: const_idents(&symbols)
                        .into_iter()
                        .zip(&symbols)
                        .map(|(ident, symbol)| ConstView {
                            ident,
                            symbol: symbol.to_string(),
                        })
                        .collect(),
                }
            })
            .collect();

        let mut virtual_type = |name: &str| {
            schema
                .find_message(name)
                .map(|id| types.message_path(id))
                .unwrap_or_default()
        };
        let (type_meta, object_meta, list_meta) = if unit.kinds.is_empty() {
            Default::default()
        } else {
            (
                virtual_type(wellknown::TYPE_META),
                virtual_type(wellknown::OBJECT_META),
                virtual_type(wellknown::LIST_META),
            )
        };

        let kinds = unit
            .kinds
            .iter()
            .map(|pair| {
                let kind = schema.message(pair.kind);
                KindView {
                    name: kind.short_name.clone(),
                    list: schema.message(pair.list).short_name.clone(),
                    namespaced: kind.kind.as_ref().is_none_or(|k| k.scope.is_namespaced()),
                    type_meta_field: type_meta_field(schema, pair.kind),
                    list_type_meta_field: type_meta_field(schema, pair.list),
                }
            })
            .collect();

        let context = TypesContext {
            proto_package: unit.proto_package.clone(),
            runtime: self.runtime.clone(),
            imports: types.use_statements(),
            uses_map: types.uses_map(),
            group_version: unit.group_version.as_ref().map(|gv| GroupVersionView {
                group: gv.group.clone(),
                version: gv.version.clone(),
                api_version: gv.api_version(),
            }),
            enums,
            structs,
            kinds,
            type_meta,
            object_meta,
            list_meta,
        };

        let path = unit.file_path(TYPES_FILE);
        let rendered = self.engine.render("types.rs.jinja", &context)?;
        let content = format_source(&path.to_string_lossy(), &rendered)?;
        debug!(path = %path.display(), structs = unit.messages.len(), "rendered types");
        Ok(GeneratedFile::new(path, content))
    }
}

impl Generator for TypesGenerator {
    fn target(&self) -> Target {
        Target::Types
    }

    fn generate(&self, schema: &Schema) -> Result<Vec<GeneratedFile>> {
        package_units(schema)?
            .iter()
            .map(|unit| self.render_unit(schema, unit))
            .collect()
    }
}

/// Contents of the `#[serde(...)]` attribute of a field
fn serde_attribute(schema: &Schema, owner: MessageId, field: &Field) -> String {
    if field.inline {
        return "flatten".to_string();
    }
    let mut parts = Vec::new();
    if needs_rename(field) {
        parts.push(format!("rename = {:?}", field.api_name));
    }
    parts.push("default".to_string());
    match holding(schema, owner, field) {
        Holding::Value => {}
        Holding::Optional { .. } => parts.push("skip_serializing_if = \"Option::is_none\"".to_string()),
        Holding::Repeated => parts.push("skip_serializing_if = \"Vec::is_empty\"".to_string()),
        Holding::Map => parts.push("skip_serializing_if = \"BTreeMap::is_empty\"".to_string()),
    }
    parts.join(", ")
}

/// Name of the field holding the inlined `TypeMeta`
fn type_meta_field(schema: &Schema, id: MessageId) -> String {
    let type_meta = schema.find_message(wellknown::TYPE_META);
    schema
        .message(id)
        .fields
        .iter()
        .find(|f| matches!(f.kind, FieldKind::Message(m) if Some(m) == type_meta))
        .map(field_ident)
        .unwrap_or_else(|| "type_meta".to_string())
}
