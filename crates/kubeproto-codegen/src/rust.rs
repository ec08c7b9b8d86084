//! Shared pieces of Rust emission: package units, identifiers and type paths

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use kubeproto_core::namespace::basename;
use kubeproto_core::naming::{pascal_case, rust_ident, screaming_snake_case, snake_case};
use kubeproto_core::wellknown::{self, VirtualShape};
use kubeproto_core::{
    EnumId, Field, FieldKind, GroupVersion, KindPair, Message, MessageId, NamespaceManager, Schema,
};

use crate::error::{CodegenError, Result};

/// Everything emitted into one Rust module
#[derive(Debug, Clone)]
pub struct PackageUnit {
    pub proto_package: String,
    pub module_path: String,
    /// Local messages in emission order
    pub messages: Vec<MessageId>,
    pub enums: Vec<EnumId>,
    pub kinds: Vec<KindPair>,
    /// Shared by every Kind of the unit; `None` without Kinds
    pub group_version: Option<GroupVersion>,
}

impl PackageUnit {
    /// Output path of a sibling file of this module (`storage/v1/types.rs`)
    pub fn file_path(&self, file: &str) -> PathBuf {
        module_dir(&self.module_path).join(file)
    }
}

/// Group the emitted messages and enums by module
///
/// Messages are every Kind and List plus whatever they reach through local
/// messages, in discovery order per Kind. Units are sorted by module path.
pub fn package_units(schema: &Schema) -> Result<Vec<PackageUnit>> {
    let mut units: BTreeMap<String, PackageUnit> = BTreeMap::new();
    let mut seen = BTreeSet::new();
    let mut emitted = Vec::new();

    for pair in schema.kinds() {
        for id in schema.reachable([pair.kind, pair.list], Message::is_local) {
            if !seen.insert(id) {
                continue;
            }
            emitted.push(id);
            let message = schema.message(id);
            unit_for(&mut units, &message.package.proto_package, &message.package.module_path)
                .messages
                .push(id);
        }

        let kind = schema.message(pair.kind);
        let unit = unit_for(&mut units, &kind.package.proto_package, &kind.package.module_path);
        unit.kinds.push(pair);
        if let Some(info) = &kind.kind {
            match &unit.group_version {
                None => unit.group_version = Some(info.group_version.clone()),
                Some(first) if *first != info.group_version => {
                    return Err(CodegenError::MixedGroupVersion {
                        package: kind.package.proto_package.clone(),
                        first: first.to_string(),
                        second: info.group_version.to_string(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    for id in schema.referenced_enums(&emitted) {
        let e = schema.enumeration(id);
        if e.dependency {
            continue;
        }
        unit_for(&mut units, &e.package.proto_package, &e.package.module_path)
            .enums
            .push(id);
    }

    Ok(units.into_values().collect())
}

fn unit_for<'a>(
    units: &'a mut BTreeMap<String, PackageUnit>,
    proto_package: &str,
    module_path: &str,
) -> &'a mut PackageUnit {
    units
        .entry(module_path.to_string())
        .or_insert_with(|| PackageUnit {
            proto_package: proto_package.to_string(),
            module_path: module_path.to_string(),
            messages: Vec::new(),
            enums: Vec::new(),
            kinds: Vec::new(),
            group_version: None,
        })
}

/// Directory of a module path relative to the crate root
pub fn module_dir(module_path: &str) -> PathBuf {
    let mut segments = module_path.split("::").peekable();
    if segments.peek() == Some(&"crate") {
        segments.next();
    }
    segments
        .map(|s| s.trim_start_matches("r#"))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Rust field identifier
pub fn field_ident(field: &Field) -> String {
    rust_ident(&snake_case(&field.name))
}

/// Whether serde needs a `rename` to produce the wire name
pub fn needs_rename(field: &Field) -> bool {
    let ident = field_ident(field);
    ident.trim_start_matches("r#") != field.api_name
}

/// Associated const names for an enum's symbols, unique within the enum
pub fn const_idents(symbols: &[&str]) -> Vec<String> {
    let mut taken = BTreeSet::new();
    symbols
        .iter()
        .map(|symbol| {
            let mut base: String = screaming_snake_case(symbol)
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();
            if base.is_empty() || base.chars().all(|c| c == '_') {
                base = "EMPTY".to_string();
            } else if base.starts_with(|c: char| c.is_ascii_digit()) {
                base.insert(0, '_');
            }
            let mut candidate = base.clone();
            let mut suffix = 0;
            while !taken.insert(candidate.clone()) {
                suffix += 1;
                candidate = format!("{}_{}", base, suffix);
            }
            candidate
        })
        .collect()
}

/// `StorageV1` for `storage.example.dev/v1`
pub fn group_version_ident(gv: &GroupVersion) -> String {
    let label = gv.group.split('.').next().unwrap_or_default();
    let label = if label.is_empty() { "core" } else { label };
    format!("{}{}", pascal_case(label), pascal_case(&gv.version))
}

/// `StorageV1Client`
pub fn client_ident(gv: &GroupVersion) -> String {
    format!("{}Client", group_version_ident(gv))
}

/// How a field is held by its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holding {
    Value,
    Optional { boxed: bool },
    Repeated,
    Map,
}

/// Holding of a field in the emitted struct
///
/// Timestamps have no `Default`, so they are always optional. An optional
/// message that can reach its owner again is boxed.
pub fn holding(schema: &Schema, owner: MessageId, field: &Field) -> Holding {
    if matches!(field.kind, FieldKind::Map { .. }) {
        return Holding::Map;
    }
    if field.repeated {
        return Holding::Repeated;
    }
    match field.kind {
        FieldKind::Message(target) => {
            if field.optional {
                Holding::Optional {
                    boxed: schema.reachable([target], |_| true).contains(&owner),
                }
            } else if is_timestamp(schema, target) {
                Holding::Optional { boxed: false }
            } else {
                Holding::Value
            }
        }
        _ if field.optional => Holding::Optional { boxed: false },
        _ => Holding::Value,
    }
}

/// Virtual message serialized as an RFC 3339 string
pub fn is_timestamp(schema: &Schema, id: MessageId) -> bool {
    let message = schema.message(id);
    message.is_virtual
        && wellknown::lookup(&message.full_name).is_some_and(|t| t.shape == VirtualShape::DateTime)
}

/// Renders Rust type expressions for one module, collecting its imports
pub struct TypeRenderer<'a> {
    schema: &'a Schema,
    module_path: String,
    imports: NamespaceManager,
    uses_map: bool,
}

impl<'a> TypeRenderer<'a> {
    pub fn new(schema: &'a Schema, module_path: &str) -> Self {
        Self {
            schema,
            module_path: module_path.to_string(),
            imports: NamespaceManager::new(),
            uses_map: false,
        }
    }

    /// Full type of a field as declared in its owner
    pub fn field_type(&mut self, owner: MessageId, field: &Field) -> String {
        let element = self.element_type(&field.kind);
        match holding(self.schema, owner, field) {
            Holding::Map | Holding::Value => element,
            Holding::Repeated => format!("Vec<{}>", element),
            Holding::Optional { boxed: true } => format!("Option<Box<{}>>", element),
            Holding::Optional { boxed: false } => format!("Option<{}>", element),
        }
    }

    pub fn element_type(&mut self, kind: &FieldKind) -> String {
        match kind {
            FieldKind::String => "String".to_string(),
            FieldKind::Bool => "bool".to_string(),
            FieldKind::Int32 => "i32".to_string(),
            FieldKind::Int64 => "i64".to_string(),
            FieldKind::Float => "f32".to_string(),
            FieldKind::Double => "f64".to_string(),
            FieldKind::Bytes => "k8s_openapi::ByteString".to_string(),
            FieldKind::Enum(id) => {
                let e = self.schema.enumeration(*id);
                self.qualify(&e.package.module_path, &e.package.alias, false, &e.short_name)
            }
            FieldKind::Message(id) => {
                let m = self.schema.message(*id);
                self.qualify(&m.package.module_path, &m.package.alias, m.is_virtual, &m.short_name)
            }
            FieldKind::Map { key, value } => {
                self.uses_map = true;
                format!("BTreeMap<{}, {}>", self.element_type(key), self.element_type(value))
            }
        }
    }

    /// Path of a named message from this module
    pub fn message_path(&mut self, id: MessageId) -> String {
        self.element_type(&FieldKind::Message(id))
    }

    fn qualify(&mut self, module_path: &str, alias: &str, is_virtual: bool, name: &str) -> String {
        if !is_virtual && module_path == self.module_path {
            return name.to_string();
        }
        let path = if is_virtual {
            module_path.to_string()
        } else {
            format!("{}::types", module_path)
        };
        let suggested = if alias.is_empty() {
            basename(module_path)
        } else {
            alias
        };
        let alias = self.imports.add(&path, Some(suggested));
        format!("{}::{}", alias, name)
    }

    pub fn uses_map(&self) -> bool {
        self.uses_map
    }

    /// `use` lines for every module referenced so far
    pub fn use_statements(&self) -> Vec<String> {
        self.imports.use_statements()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_dir() {
        assert_eq!(module_dir("crate::storage::v1"), PathBuf::from("storage/v1"));
        assert_eq!(module_dir("crate::r#type::v1"), PathBuf::from("type/v1"));
        assert_eq!(module_dir("crate"), PathBuf::new());
    }

    #[test]
    fn test_const_idents() {
        assert_eq!(
            const_idents(&["Standard", "ReadOnly", "3x", "", "read-only"]),
            vec!["STANDARD", "READ_ONLY", "_3X", "EMPTY", "READ_ONLY_1"]
        );
    }

    #[test]
    fn test_client_ident() {
        assert_eq!(client_ident(&GroupVersion::new("storage.example.dev", "v1")), "StorageV1Client");
        assert_eq!(
            group_version_ident(&GroupVersion::new("minio.example.dev", "v1alpha1")),
            "MinioV1alpha1"
        );
        assert_eq!(group_version_ident(&GroupVersion::new("", "v1")), "CoreV1");
    }

    #[test]
    fn test_field_rename() {
        let plain = Field::new("storage_class", "storageClass", FieldKind::String);
        assert!(needs_rename(&plain));
        let same = Field::new("spec", "spec", FieldKind::String);
        assert!(!needs_rename(&same));
        let keyword = Field::new("type", "type", FieldKind::String);
        assert_eq!(field_ident(&keyword), "r#type");
        assert!(!needs_rename(&keyword));
        let reserved = Field::new("self", "self", FieldKind::String);
        assert_eq!(field_ident(&reserved), "self_");
        assert!(needs_rename(&reserved));
    }
}
