//! Schema Lister
//!
//! Builds the [`Schema`] from a descriptor set:
//!
//! 1. Virtual well-known messages are injected.
//! 2. Primary files declare local messages and enums; their transitive
//!    dependencies declare `dependency` ones (first declaration wins).
//! 3. Field types are resolved; map entries fold into [`FieldKind::Map`].
//! 4. Kinds receive their identity header (`type_meta` + `metadata`).
//! 5. [`SchemaLister::filter_kind`] pairs every Kind with a List, synthesizing
//!    the List when the input has none.
//!
//! Any failure is fatal and returned as the first [`CoreError`] met.

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

use crate::annotations::{
    Annotations, FieldAnnotation, K8sAnnotation, KindAnnotation, enum_value_symbol,
};
use crate::error::{CoreError, Result};
use crate::ir::{
    Enum, EnumId, EnumValue, Field, FieldKind, GroupVersion, ImportPackage, KindInfo, Message, MessageId,
    Schema,
};
use crate::namespace::WELL_KNOWN_ALIASES;
use crate::naming::{enum_symbols, lower_camel_case, rust_ident};
use crate::wellknown::{self, METAV1_PACKAGE, WELL_KNOWN_TYPES};

/// Maximum Levenshtein distance for "did you mean" suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Per-file context shared by every declaration in the file
struct FileContext<'a> {
    file: &'a str,
    package: &'a str,
    dependency: bool,
    import: ImportPackage,
    k8s: K8sAnnotation,
}

/// A declared message whose fields are not resolved yet
struct PendingMessage {
    id: MessageId,
    fields: Vec<FieldDescriptorProto>,
    kind: Option<KindAnnotation>,
    k8s: K8sAnnotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Builds the IR from descriptors
#[derive(Debug)]
pub struct SchemaLister {
    schema: Schema,
    /// Fully-qualified map entry name -> entry descriptor
    map_entries: BTreeMap<String, DescriptorProto>,
    /// (package, short name) -> fully-qualified name
    short_names: BTreeMap<(String, String), String>,
    type_meta: MessageId,
    object_meta: MessageId,
    list_meta: MessageId,
}

impl SchemaLister {
    /// Load a descriptor set
    ///
    /// `primary` names the files to generate; when empty, every file that no
    /// other file in the set imports is primary. `modules` maps proto
    /// packages to Rust module paths.
    pub fn load(
        set: &FileDescriptorSet,
        primary: &[String],
        modules: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let files: BTreeMap<&str, &FileDescriptorProto> =
            set.file.iter().map(|f| (f.name(), f)).collect();

        let primary = if primary.is_empty() {
            default_primary_files(set)
        } else {
            primary.to_vec()
        };

        let mut lister = Self::with_virtual_types();
        let mut pending = Vec::new();

        for name in &primary {
            let file = files
                .get(name.as_str())
                .ok_or_else(|| CoreError::FileNotFound(name.clone()))?;
            lister.schema.primary_packages.insert(file.package().to_string());
            lister.declare_file(file, false, modules, &mut pending)?;
        }
        for name in transitive_dependencies(&files, &primary) {
            if let Some(file) = files.get(name.as_str()) {
                lister.declare_file(file, true, modules, &mut pending)?;
            }
        }

        lister.resolve(pending)?;

        let kinds: Vec<MessageId> = lister
            .schema
            .messages()
            .filter(|(_, m)| m.is_kind())
            .map(|(id, _)| id)
            .collect();
        for id in kinds {
            lister.ensure_identity_header(id);
        }

        Ok(lister)
    }

    /// The IR built so far
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Insert the identity header into a Kind
    ///
    /// Prepends an inlined `TypeMeta` field and an owned `metadata` field
    /// (`ObjectMeta`), each only when absent, so repeated calls leave the
    /// field list unchanged. Dependency messages are never touched.
    pub fn ensure_identity_header(&mut self, id: MessageId) {
        let (type_meta, object_meta) = (self.type_meta, self.object_meta);
        let message = &mut self.schema.messages[id.0];
        if message.dependency || message.is_virtual {
            return;
        }
        insert_header(&mut message.fields, type_meta, object_meta);
    }

    /// Local Kinds, pairing each with a List message
    ///
    /// A missing `{Kind}List` is synthesized in the Kind's package with an
    /// inlined `TypeMeta`, a `metadata` `ListMeta` and a repeated `items`
    /// field typed to the Kind. An existing List gets the same header.
    pub fn filter_kind(&mut self) -> Result<Vec<MessageId>> {
        let kinds: Vec<MessageId> = self
            .schema
            .messages()
            .filter(|(_, m)| m.is_kind() && m.is_local())
            .map(|(id, _)| id)
            .collect();

        for &kind in &kinds {
            if self.schema.lists.contains_key(&kind) {
                continue;
            }
            let list = self.pair_list(kind)?;
            self.schema.lists.insert(kind, list);
        }

        Ok(kinds)
    }

    /// Pair every Kind, validate, and hand out the finished IR
    pub fn finish(mut self) -> Result<Schema> {
        self.filter_kind()?;
        self.check_by_value_cycles()?;
        debug!(
            messages = self.schema.messages.len(),
            enums = self.schema.enums.len(),
            kinds = self.schema.lists.len(),
            "schema built"
        );
        Ok(self.schema)
    }

    fn with_virtual_types() -> Self {
        let mut schema = Schema::default();
        let mut ids = BTreeMap::new();

        for t in WELL_KNOWN_TYPES {
            let id = MessageId(schema.messages.len());
            let alias = WELL_KNOWN_ALIASES
                .iter()
                .find(|(path, _)| *path == t.module_path)
                .map(|(_, alias)| alias.to_string())
                .unwrap_or_default();
            schema.messages.push(Message {
                full_name: t.proto_name.to_string(),
                short_name: t.rust_name.to_string(),
                fields: Vec::new(),
                kind: None,
                dependency: true,
                is_virtual: true,
                synthesized: false,
                file: String::new(),
                package: ImportPackage {
                    proto_package: METAV1_PACKAGE.to_string(),
                    module_path: t.module_path.to_string(),
                    alias,
                },
            });
            schema.message_index.insert(t.proto_name.to_string(), id);
            if t.plain {
                schema.plain_virtuals.insert(id);
            }
            ids.insert(t.proto_name, id);
        }

        let id_of = |name: &str| ids.get(name).copied().unwrap_or(MessageId(0));
        Self {
            type_meta: id_of(wellknown::TYPE_META),
            object_meta: id_of(wellknown::OBJECT_META),
            list_meta: id_of(wellknown::LIST_META),
            schema,
            map_entries: BTreeMap::new(),
            short_names: BTreeMap::new(),
        }
    }

    fn declare_file(
        &mut self,
        file: &FileDescriptorProto,
        dependency: bool,
        modules: &BTreeMap<String, String>,
        pending: &mut Vec<PendingMessage>,
    ) -> Result<()> {
        let options = file
            .options
            .as_ref()
            .map(|o| o.uninterpreted_option.as_slice())
            .unwrap_or_default();
        let annotations = Annotations::parse(options, &format!("file '{}'", file.name()))?;
        let k8s = K8sAnnotation::from_annotations(&annotations);

        let ctx = FileContext {
            file: file.name(),
            package: file.package(),
            dependency,
            import: import_package(file.package(), &k8s, modules),
            k8s,
        };
        debug!(file = ctx.file, dependency, "declaring file");

        for message in &file.message_type {
            self.declare_message(message, ctx.package, "", &ctx, pending)?;
        }
        for enumeration in &file.enum_type {
            self.declare_enum(enumeration, ctx.package, "", &ctx)?;
        }
        Ok(())
    }

    fn declare_message(
        &mut self,
        descriptor: &DescriptorProto,
        scope: &str,
        short_prefix: &str,
        ctx: &FileContext<'_>,
        pending: &mut Vec<PendingMessage>,
    ) -> Result<()> {
        let full_name = qualified(scope, descriptor.name());

        if descriptor
            .options
            .as_ref()
            .is_some_and(|o| o.map_entry())
        {
            self.map_entries.insert(full_name, descriptor.clone());
            return Ok(());
        }

        if self.schema.find_message(&full_name).is_some() {
            if !ctx.dependency {
                return Err(CoreError::DuplicateType(full_name));
            }
            debug!(message = %full_name, "already declared, keeping first declaration");
            return Ok(());
        }

        let short_name = format!("{}{}", short_prefix, descriptor.name());
        self.claim_short_name(ctx.package, &short_name, &full_name)?;

        let options = descriptor
            .options
            .as_ref()
            .map(|o| o.uninterpreted_option.as_slice())
            .unwrap_or_default();
        let target = format!("message '{}'", full_name);
        let kind = KindAnnotation::from_annotations(&Annotations::parse(options, &target)?, &target)?;

        let id = MessageId(self.schema.messages.len());
        self.schema.messages.push(Message {
            full_name: full_name.clone(),
            short_name: short_name.clone(),
            fields: Vec::new(),
            kind: None,
            dependency: ctx.dependency,
            is_virtual: false,
            synthesized: false,
            file: ctx.file.to_string(),
            package: ctx.import.clone(),
        });
        self.schema.message_index.insert(full_name.clone(), id);
        pending.push(PendingMessage {
            id,
            fields: descriptor.field.clone(),
            kind,
            k8s: ctx.k8s.clone(),
        });

        for nested in &descriptor.nested_type {
            self.declare_message(nested, &full_name, &short_name, ctx, pending)?;
        }
        for nested in &descriptor.enum_type {
            self.declare_enum(nested, &full_name, &short_name, ctx)?;
        }
        Ok(())
    }

    fn declare_enum(
        &mut self,
        descriptor: &EnumDescriptorProto,
        scope: &str,
        short_prefix: &str,
        ctx: &FileContext<'_>,
    ) -> Result<()> {
        let full_name = qualified(scope, descriptor.name());
        if self.schema.find_enum(&full_name).is_some() {
            if ctx.dependency {
                return Ok(());
            }
            return Err(CoreError::DuplicateType(full_name));
        }

        let short_name = format!("{}{}", short_prefix, descriptor.name());
        self.claim_short_name(ctx.package, &short_name, &full_name)?;

        let raw: Vec<&str> = descriptor.value.iter().map(|v| v.name()).collect();
        let derived = enum_symbols(&short_name, &raw);

        let mut values = Vec::with_capacity(descriptor.value.len());
        for (value, derived) in descriptor.value.iter().zip(derived) {
            let options = value
                .options
                .as_ref()
                .map(|o| o.uninterpreted_option.as_slice())
                .unwrap_or_default();
            let target = format!("enum value '{}.{}'", full_name, value.name());
            let annotations = Annotations::parse(options, &target)?;
            values.push(EnumValue {
                name: value.name().to_string(),
                symbol: enum_value_symbol(&annotations).unwrap_or(derived),
                number: value.number(),
            });
        }

        let id = EnumId(self.schema.enums.len());
        self.schema.enums.push(Enum {
            full_name: full_name.clone(),
            short_name,
            values,
            dependency: ctx.dependency,
            package: ctx.import.clone(),
        });
        self.schema.enum_index.insert(full_name, id);
        Ok(())
    }

    fn claim_short_name(&mut self, package: &str, short_name: &str, full_name: &str) -> Result<()> {
        let key = (package.to_string(), short_name.to_string());
        match self.short_names.get(&key) {
            Some(first) if first != full_name => Err(CoreError::NameCollision {
                name: short_name.to_string(),
                first: first.clone(),
                second: full_name.to_string(),
                package: package.to_string(),
            }),
            _ => {
                self.short_names.insert(key, full_name.to_string());
                Ok(())
            }
        }
    }

    fn resolve(&mut self, pending: Vec<PendingMessage>) -> Result<()> {
        for item in pending {
            let owner = self.schema.message(item.id).full_name.clone();
            let fields = item
                .fields
                .iter()
                .map(|f| self.resolve_field(&owner, f))
                .collect::<Result<Vec<_>>>()?;

            let kind = match item.kind {
                Some(annotation) => self.kind_info(item.id, annotation, &item.k8s)?,
                None => None,
            };

            let message = &mut self.schema.messages[item.id.0];
            message.fields = fields;
            message.kind = kind;
        }
        Ok(())
    }

    fn kind_info(
        &self,
        id: MessageId,
        annotation: KindAnnotation,
        k8s: &K8sAnnotation,
    ) -> Result<Option<KindInfo>> {
        let message = self.schema.message(id);
        let missing = match (k8s.group(), k8s.version.as_deref()) {
            (Some(group), Some(version)) => {
                return Ok(Some(KindInfo {
                    group_version: GroupVersion::new(group, version),
                    scope: annotation.scope,
                }));
            }
            (None, _) => "domain",
            (_, None) => "version",
        };

        if message.dependency {
            debug!(message = %message.full_name, missing, "dependency Kind without group/version");
            return Ok(None);
        }
        Err(CoreError::MissingGroupVersion {
            message: message.full_name.clone(),
            file: message.file.clone(),
            missing,
        })
    }

    fn resolve_field(&self, owner: &str, descriptor: &FieldDescriptorProto) -> Result<Field> {
        let path = format!("{}.{}", owner, descriptor.name());
        let options = descriptor
            .options
            .as_ref()
            .map(|o| o.uninterpreted_option.as_slice())
            .unwrap_or_default();
        let annotation =
            FieldAnnotation::from_annotations(&Annotations::parse(options, &format!("field '{}'", path))?);

        let kind = self.resolve_type(&path, descriptor)?;
        let is_map = matches!(kind, FieldKind::Map { .. });

        let api_name = annotation.api_field_name.unwrap_or_else(|| {
            match descriptor.json_name() {
                "" => lower_camel_case(descriptor.name()),
                json => json.to_string(),
            }
        });

        Ok(Field {
            name: annotation
                .rust_name
                .unwrap_or_else(|| descriptor.name().to_string()),
            api_name,
            number: descriptor.number(),
            kind,
            repeated: descriptor.label() == Label::Repeated && !is_map,
            optional: descriptor.proto3_optional(),
            inline: annotation.inline,
            sub_resource: annotation.sub_resource,
        })
    }

    fn resolve_type(&self, path: &str, descriptor: &FieldDescriptorProto) -> Result<FieldKind> {
        let type_name = descriptor.type_name();
        Ok(match descriptor.r#type() {
            Type::Message => {
                if let Some(entry) = self.map_entries.get(type_name.trim_start_matches('.')) {
                    let part = |number: i32| {
                        entry
                            .field
                            .iter()
                            .find(|f| f.number() == number)
                            .ok_or_else(|| CoreError::UnresolvedType {
                                field: path.to_string(),
                                type_name: type_name.to_string(),
                                suggestion: None,
                            })
                    };
                    FieldKind::Map {
                        key: Box::new(self.resolve_type(path, part(1)?)?),
                        value: Box::new(self.resolve_type(path, part(2)?)?),
                    }
                } else {
                    match self.schema.find_message(type_name) {
                        Some(id) => FieldKind::Message(id),
                        None => {
                            return Err(self.unresolved(
                                path,
                                type_name,
                                self.schema.message_index.keys(),
                            ));
                        }
                    }
                }
            }
            Type::Enum => match self.schema.find_enum(type_name) {
                Some(id) => FieldKind::Enum(id),
                None => {
                    return Err(self.unresolved(path, type_name, self.schema.enum_index.keys()));
                }
            },
            Type::String => FieldKind::String,
            Type::Bool => FieldKind::Bool,
            Type::Int32 | Type::Sint32 | Type::Sfixed32 => FieldKind::Int32,
            Type::Int64
            | Type::Sint64
            | Type::Sfixed64
            | Type::Uint32
            | Type::Fixed32
            | Type::Uint64
            | Type::Fixed64 => FieldKind::Int64,
            Type::Float => FieldKind::Float,
            Type::Double => FieldKind::Double,
            Type::Bytes => FieldKind::Bytes,
            Type::Group => {
                return Err(CoreError::UnresolvedType {
                    field: path.to_string(),
                    type_name: "group".to_string(),
                    suggestion: None,
                });
            }
        })
    }

    fn unresolved<'a>(
        &self,
        path: &str,
        type_name: &str,
        candidates: impl Iterator<Item = &'a String>,
    ) -> CoreError {
        let wanted = type_name.trim_start_matches('.');
        let suggestion = candidates
            .map(|c| (strsim::levenshtein(wanted, c), c))
            .filter(|(d, _)| *d > 0 && *d <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(d, _)| *d)
            .map(|(_, c)| c.clone());
        CoreError::UnresolvedType {
            field: path.to_string(),
            type_name: type_name.to_string(),
            suggestion,
        }
    }

    fn pair_list(&mut self, kind: MessageId) -> Result<MessageId> {
        let (type_meta, list_meta) = (self.type_meta, self.list_meta);
        let source = self.schema.message(kind);
        let full_name = format!("{}List", source.full_name);
        let short_name = format!("{}List", source.short_name);
        let file = source.file.clone();
        let package = source.package.clone();

        if let Some(existing) = self.schema.find_message(&full_name) {
            let list = &mut self.schema.messages[existing.0];
            if list.is_local() {
                insert_header(&mut list.fields, type_meta, list_meta);
                if list.field("items").is_none() {
                    list.fields
                        .push(Field::new("items", "items", FieldKind::Message(kind)).repeated());
                }
            }
            return Ok(existing);
        }

        self.claim_short_name(&package.proto_package, &short_name, &full_name)?;
        let id = MessageId(self.schema.messages.len());
        self.schema.messages.push(Message {
            full_name: full_name.clone(),
            short_name,
            fields: vec![
                Field::new("type_meta", "", FieldKind::Message(type_meta)).inline(),
                Field::new("metadata", "metadata", FieldKind::Message(list_meta)),
                Field::new("items", "items", FieldKind::Message(kind)).repeated(),
            ],
            kind: None,
            dependency: false,
            is_virtual: false,
            synthesized: true,
            file,
            package,
        });
        self.schema.message_index.insert(full_name.clone(), id);
        debug!(list = %full_name, "synthesized list message");
        Ok(id)
    }

    /// Reject messages that contain themselves through by-value fields only
    fn check_by_value_cycles(&self) -> Result<()> {
        let mut marks = BTreeMap::new();
        let mut path = Vec::new();
        for (id, message) in self.schema.messages() {
            if message.is_local() {
                self.visit_by_value(id, &mut marks, &mut path)?;
            }
        }
        Ok(())
    }

    fn visit_by_value(
        &self,
        id: MessageId,
        marks: &mut BTreeMap<MessageId, Mark>,
        path: &mut Vec<(MessageId, String)>,
    ) -> Result<()> {
        match marks.get(&id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|(m, _)| *m == id).unwrap_or(0);
                let chain = path[start..]
                    .iter()
                    .map(|(m, field)| format!("{}.{}", self.schema.message(*m).short_name, field))
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(CoreError::RecursiveEmbedding {
                    message: self.schema.message(id).full_name.clone(),
                    path: chain,
                });
            }
            None => {}
        }

        marks.insert(id, Mark::Visiting);
        for field in &self.schema.message(id).fields {
            if field.repeated || field.optional {
                continue;
            }
            if let FieldKind::Message(child) = field.kind {
                path.push((id, field.name.clone()));
                self.visit_by_value(child, marks, path)?;
                path.pop();
            }
        }
        marks.insert(id, Mark::Done);
        Ok(())
    }
}

/// Build a finished schema in one call
pub fn build_schema(
    set: &FileDescriptorSet,
    primary: &[String],
    modules: &BTreeMap<String, String>,
) -> Result<Schema> {
    SchemaLister::load(set, primary, modules)?.finish()
}

/// Files no other file in the set imports, in set order
pub fn default_primary_files(set: &FileDescriptorSet) -> Vec<String> {
    let imported: BTreeSet<&str> = set
        .file
        .iter()
        .flat_map(|f| f.dependency.iter().map(String::as_str))
        .collect();
    set.file
        .iter()
        .map(|f| f.name())
        .filter(|name| !imported.contains(name))
        .map(str::to_string)
        .collect()
}

fn transitive_dependencies(
    files: &BTreeMap<&str, &FileDescriptorProto>,
    primary: &[String],
) -> Vec<String> {
    let mut seen: BTreeSet<String> = primary.iter().cloned().collect();
    let mut order = Vec::new();
    let mut queue: VecDeque<String> = primary.iter().cloned().collect();

    while let Some(name) = queue.pop_front() {
        let Some(file) = files.get(name.as_str()) else {
            debug!(file = %name, "import not present in descriptor set");
            continue;
        };
        for dep in &file.dependency {
            if seen.insert(dep.clone()) {
                order.push(dep.clone());
                queue.push_back(dep.clone());
            }
        }
    }
    order
}

fn insert_header(fields: &mut Vec<Field>, type_meta: MessageId, meta: MessageId) {
    let type_meta_at = match fields
        .iter()
        .position(|f| f.kind == FieldKind::Message(type_meta))
    {
        Some(pos) => pos,
        None => {
            fields.insert(
                0,
                Field::new("type_meta", "", FieldKind::Message(type_meta)).inline(),
            );
            0
        }
    };
    if !fields.iter().any(|f| f.name == "metadata") {
        fields.insert(
            type_meta_at + 1,
            Field::new("metadata", "metadata", FieldKind::Message(meta)),
        );
    }
}

fn import_package(
    package: &str,
    k8s: &K8sAnnotation,
    modules: &BTreeMap<String, String>,
) -> ImportPackage {
    let module_path = k8s
        .rust_module
        .clone()
        .or_else(|| modules.get(package).cloned())
        .unwrap_or_else(|| {
            if package.is_empty() {
                "crate".to_string()
            } else {
                let segments: Vec<String> = package.split('.').map(rust_ident).collect();
                format!("crate::{}", segments.join("::"))
            }
        });

    let group_label = k8s.sub_group.clone().or_else(|| {
        k8s.domain
            .as_deref()
            .and_then(|d| d.split('.').next())
            .map(str::to_string)
    });
    let alias = match (group_label, k8s.version.as_deref()) {
        (Some(group), Some(version)) => format!("{}{}", group, version)
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_lowercase(),
        _ => String::new(),
    };

    ImportPackage {
        proto_package: package.to_string(),
        module_path,
        alias,
    }
}

fn qualified(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        EnumBuilder, FieldBuilder, FileBuilder, MessageBuilder, Scalar, descriptor_set,
    };
    use crate::ir::Scope;

    const PKG: &str = "minio.v1alpha1";

    fn bucket_file() -> FileBuilder {
        FileBuilder::new("minio/v1alpha1/bucket.proto", PKG)
            .k8s("example.dev", Some("minio"), "v1alpha1")
            .message(
                MessageBuilder::new("Bucket")
                    .kind()
                    .field(FieldBuilder::message("spec", 2, "minio.v1alpha1.BucketSpec"))
                    .field(
                        FieldBuilder::message("status", 3, "minio.v1alpha1.BucketStatus")
                            .optional()
                            .sub_resource(),
                    ),
            )
            .message(
                MessageBuilder::new("BucketSpec")
                    .field(FieldBuilder::scalar("bucket_name", 1, Scalar::String))
                    .field(FieldBuilder::scalar("tags", 2, Scalar::String).repeated())
                    .map(
                        "labels",
                        3,
                        Scalar::String,
                        FieldBuilder::scalar("value", 2, Scalar::String),
                    ),
            )
            .message(
                MessageBuilder::new("BucketStatus")
                    .field(FieldBuilder::enumeration("phase", 1, "minio.v1alpha1.Phase")),
            )
            .enumeration(
                EnumBuilder::new("Phase")
                    .value("PHASE_PENDING", 0)
                    .value_with_symbol("PHASE_READY", 1, "Ready!"),
            )
    }

    fn load(files: Vec<FileBuilder>) -> Result<SchemaLister> {
        let set = descriptor_set(files.into_iter().map(FileBuilder::build));
        SchemaLister::load(&set, &[], &BTreeMap::new())
    }

    fn names(schema: &Schema, id: MessageId) -> Vec<String> {
        schema
            .message(id)
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    #[test]
    fn test_kind_gets_identity_header() {
        let lister = load(vec![bucket_file()]).unwrap();
        let schema = lister.schema();
        let bucket = schema.find_message("minio.v1alpha1.Bucket").unwrap();
        assert_eq!(names(schema, bucket), vec!["type_meta", "metadata", "spec", "status"]);

        let message = schema.message(bucket);
        assert!(message.fields[0].inline);
        assert_eq!(message.fields[0].api_name, "");
        let info = message.kind.as_ref().unwrap();
        assert_eq!(info.group_version.api_version(), "minio.example.dev/v1alpha1");
        assert_eq!(info.scope, Scope::Namespaced);
    }

    #[test]
    fn test_identity_header_idempotent() {
        let mut lister = load(vec![bucket_file()]).unwrap();
        let bucket = lister.schema().find_message("minio.v1alpha1.Bucket").unwrap();
        let once = lister.schema().message(bucket).fields.clone();
        lister.ensure_identity_header(bucket);
        lister.ensure_identity_header(bucket);
        assert_eq!(lister.schema().message(bucket).fields, once);
    }

    #[test]
    fn test_filter_kind_synthesizes_list() {
        let mut lister = load(vec![bucket_file()]).unwrap();
        let kinds = lister.filter_kind().unwrap();
        assert_eq!(kinds.len(), 1);

        let schema = lister.finish().unwrap();
        let bucket = schema.find_message("minio.v1alpha1.Bucket").unwrap();
        let list = schema.list_of(bucket).unwrap();
        let list_message = schema.message(list);
        assert_eq!(list_message.short_name, "BucketList");
        assert!(list_message.synthesized);
        assert_eq!(names(&schema, list), vec!["type_meta", "metadata", "items"]);

        let items = list_message.field("items").unwrap();
        assert!(items.repeated);
        assert_eq!(items.kind, FieldKind::Message(bucket));
        assert_eq!(schema.kind_of_list(list), Some(bucket));
    }

    #[test]
    fn test_filter_kind_twice_keeps_one_list() {
        let mut lister = load(vec![bucket_file()]).unwrap();
        lister.filter_kind().unwrap();
        let count = lister.schema().messages().count();
        lister.filter_kind().unwrap();
        assert_eq!(lister.schema().messages().count(), count);
    }

    #[test]
    fn test_existing_list_is_paired() {
        let file = FileBuilder::new("widget.proto", "demo.v1")
            .k8s("demo.dev", None, "v1")
            .message(MessageBuilder::new("Widget").kind().cluster_scoped())
            .message(
                MessageBuilder::new("WidgetList")
                    .field(FieldBuilder::message("items", 2, "demo.v1.Widget").repeated()),
            );
        let schema = load(vec![file]).unwrap().finish().unwrap();
        let widget = schema.find_message("demo.v1.Widget").unwrap();
        let list = schema.list_of(widget).unwrap();
        assert!(!schema.message(list).synthesized);
        assert_eq!(names(&schema, list), vec!["type_meta", "metadata", "items"]);
        assert_eq!(
            schema.message(widget).kind.as_ref().unwrap().scope,
            Scope::Cluster
        );
    }

    #[test]
    fn test_map_entries_fold_into_map_kind() {
        let schema = load(vec![bucket_file()]).unwrap().finish().unwrap();
        assert!(schema.find_message("minio.v1alpha1.BucketSpec.LabelsEntry").is_none());
        let spec = schema.find_message("minio.v1alpha1.BucketSpec").unwrap();
        let labels = schema.message(spec).field("labels").unwrap();
        assert!(!labels.repeated);
        assert_eq!(
            labels.kind,
            FieldKind::Map {
                key: Box::new(FieldKind::String),
                value: Box::new(FieldKind::String),
            }
        );
        assert_eq!(schema.message(spec).field("bucket_name").unwrap().api_name, "bucketName");
    }

    #[test]
    fn test_enum_symbols() {
        let schema = load(vec![bucket_file()]).unwrap().finish().unwrap();
        let phase = schema.enumeration(schema.find_enum(".minio.v1alpha1.Phase").unwrap());
        let symbols: Vec<&str> = phase.values.iter().map(|v| v.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Pending", "Ready!"]);
    }

    #[test]
    fn test_unresolved_type_suggests() {
        let file = FileBuilder::new("a.proto", "demo.v1").message(
            MessageBuilder::new("Holder")
                .field(FieldBuilder::message("spec", 1, "demo.v1.HolderSpc")),
        )
        .message(MessageBuilder::new("HolderSpec"));
        let err = load(vec![file]).unwrap_err();
        match err {
            CoreError::UnresolvedType {
                field, suggestion, ..
            } => {
                assert_eq!(field, "demo.v1.Holder.spec");
                assert_eq!(suggestion.as_deref(), Some("demo.v1.HolderSpec"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_kind_without_group_version_fails() {
        let file = FileBuilder::new("a.proto", "demo.v1")
            .message(MessageBuilder::new("Thing").kind());
        let err = load(vec![file]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::MissingGroupVersion { missing: "domain", .. }
        ));
    }

    #[test]
    fn test_dependency_messages_flagged_and_untouched() {
        let dep = FileBuilder::new("shared/v1/shared.proto", "shared.v1")
            .message(MessageBuilder::new("Ref").kind())
            .message(MessageBuilder::new("Unused"));
        let main = FileBuilder::new("main.proto", "demo.v1")
            .dependency("shared/v1/shared.proto")
            .k8s("demo.dev", None, "v1")
            .message(
                MessageBuilder::new("Thing")
                    .kind()
                    .field(FieldBuilder::message("target", 1, "shared.v1.Ref")),
            );
        let set = descriptor_set([dep.build(), main.build()]);
        let schema = build_schema(&set, &["main.proto".to_string()], &BTreeMap::new()).unwrap();

        let reference = schema.message(schema.find_message("shared.v1.Ref").unwrap());
        assert!(reference.dependency);
        assert!(reference.fields.is_empty());
        assert!(reference.kind.is_none());
        assert_eq!(schema.kinds().len(), 1);
        assert_eq!(schema.primary_packages().collect::<Vec<_>>(), vec!["demo.v1"]);
    }

    #[test]
    fn test_default_primary_files() {
        let dep = FileBuilder::new("dep.proto", "dep").build();
        let main = FileBuilder::new("main.proto", "main").dependency("dep.proto").build();
        let set = descriptor_set([dep, main]);
        assert_eq!(default_primary_files(&set), vec!["main.proto".to_string()]);
    }

    #[test]
    fn test_missing_primary_file() {
        let set = descriptor_set([FileBuilder::new("a.proto", "a").build()]);
        let err = SchemaLister::load(&set, &["b.proto".to_string()], &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, CoreError::FileNotFound(name) if name == "b.proto"));
    }

    #[test]
    fn test_nested_names_concatenate_and_collide() {
        let ok = FileBuilder::new("a.proto", "demo.v1").message(
            MessageBuilder::new("Outer").nested(MessageBuilder::new("Inner")),
        );
        let schema = load(vec![ok]).unwrap().finish().unwrap();
        let inner = schema.find_message("demo.v1.Outer.Inner").unwrap();
        assert_eq!(schema.message(inner).short_name, "OuterInner");

        let clash = FileBuilder::new("a.proto", "demo.v1")
            .message(MessageBuilder::new("Outer").nested(MessageBuilder::new("Inner")))
            .message(MessageBuilder::new("OuterInner"));
        assert!(matches!(
            load(vec![clash]).unwrap_err(),
            CoreError::NameCollision { .. }
        ));
    }

    #[test]
    fn test_by_value_cycle_rejected() {
        let file = FileBuilder::new("a.proto", "demo.v1")
            .message(MessageBuilder::new("A").field(FieldBuilder::message("b", 1, "demo.v1.B")))
            .message(MessageBuilder::new("B").field(FieldBuilder::message("a", 1, "demo.v1.A")));
        let err = load(vec![file]).unwrap().finish().unwrap_err();
        match err {
            CoreError::RecursiveEmbedding { path, .. } => assert_eq!(path, "A.b -> B.a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_optional_cycle_allowed() {
        let file = FileBuilder::new("a.proto", "demo.v1").message(
            MessageBuilder::new("Node")
                .field(FieldBuilder::message("next", 1, "demo.v1.Node").optional())
                .field(FieldBuilder::message("children", 2, "demo.v1.Node").repeated()),
        );
        assert!(load(vec![file]).unwrap().finish().is_ok());
    }

    #[test]
    fn test_field_annotations() {
        let file = FileBuilder::new("a.proto", "demo.v1").message(
            MessageBuilder::new("Holder")
                .field(
                    FieldBuilder::scalar("type", 1, Scalar::String)
                        .api_name("kindName")
                        .rust_name("kind_name"),
                )
                .field(FieldBuilder::scalar("count", 2, Scalar::Int32).optional()),
        );
        let schema = load(vec![file]).unwrap().finish().unwrap();
        let holder = schema.message(schema.find_message("demo.v1.Holder").unwrap());
        let renamed = holder.field("kind_name").unwrap();
        assert_eq!(renamed.api_name, "kindName");
        assert!(holder.field("count").unwrap().optional);
    }

    #[test]
    fn test_module_paths() {
        let mut modules = BTreeMap::new();
        modules.insert("demo.v1".to_string(), "crate::apis::demo".to_string());
        let set = descriptor_set([
            FileBuilder::new("a.proto", "demo.v1")
                .message(MessageBuilder::new("A"))
                .build(),
            FileBuilder::new("b.proto", "other.v2")
                .rust_module("my_api::other")
                .message(MessageBuilder::new("B"))
                .build(),
            FileBuilder::new("c.proto", "plain.v1")
                .k8s("plain.dev", None, "v1")
                .message(MessageBuilder::new("C"))
                .build(),
        ]);
        let schema = build_schema(&set, &[], &modules).unwrap();
        let module = |name: &str| {
            schema
                .message(schema.find_message(name).unwrap())
                .package
                .clone()
        };
        assert_eq!(module("demo.v1.A").module_path, "crate::apis::demo");
        assert_eq!(module("other.v2.B").module_path, "my_api::other");
        let c = module("plain.v1.C");
        assert_eq!(c.module_path, "crate::plain::v1");
        assert_eq!(c.alias, "plainv1");
    }
}
