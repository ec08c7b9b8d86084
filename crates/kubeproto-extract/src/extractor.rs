//! Declaration selection and translation into a proto file

use kubeproto_core::naming::{enum_symbols, lower_camel_case, screaming_snake_case, snake_case};
use kubeproto_core::wellknown;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::collect::{Collector, Declarations, EnumDecl, Record, RecordField};
use crate::error::{ExtractError, ExtractWarning, Result};
use crate::render::{
    FieldOption, GroupOption, METAV1_PROTO, ProtoEnum, ProtoEnumValue, ProtoField, ProtoFile,
    ProtoMessage,
};
use crate::shape::{KnownNames, Label, Shape, TypeRef, translate};
use crate::tags::Tags;

/// Options for the extractor
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Package of the emitted file, e.g. `storage.v1`
    pub package: String,
    /// Emit every public struct and enum, not only tagged ones
    pub all: bool,
    /// Additional imports (e.g. the file declaring the kubeproto options)
    pub imports: Vec<String>,
    /// API group domain; when set the file carries a `kubeproto.k8s` option
    /// derived from the package
    pub domain: Option<String>,
}

/// Result of an extraction
#[derive(Debug)]
pub struct Extraction {
    pub file: ProtoFile,
    pub warnings: Vec<ExtractWarning>,
}

impl Extraction {
    /// The proto3 text
    pub fn render(&self) -> String {
        self.file.render()
    }
}

pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Extract every `.rs` file under `dir`
    pub fn extract_dir(&self, dir: &Path) -> Result<Extraction> {
        if !dir.is_dir() {
            return Err(ExtractError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut collector = Collector::new();
        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }
            let source = fs::read_to_string(path)?;
            collector.add_file(path, &source)?;
        }
        self.build(collector.finish()?)
    }

    /// Extract from in-memory sources, in the given order
    pub fn extract_sources<'a>(
        &self,
        sources: impl IntoIterator<Item = (&'a Path, &'a str)>,
    ) -> Result<Extraction> {
        let mut collector = Collector::new();
        for (path, source) in sources {
            collector.add_file(path, source)?;
        }
        self.build(collector.finish()?)
    }

    fn build(&self, decls: Declarations) -> Result<Extraction> {
        let group = self.group_option()?;
        let mut builder = FileBuilder::new(&decls);
        builder.report_unknown_tags();

        for record in decls.records.values() {
            if self.is_root(&record.doc.tags, record.public) && !builder.lists.contains(&record.name) {
                builder.queue.push_back(record.name.clone());
            }
        }
        for decl in decls.enums.values() {
            if self.is_root(&decl.doc.tags, decl.public) {
                builder.enums.insert(decl.name.clone());
            }
        }

        let messages = builder.drain()?;
        let enums: Vec<ProtoEnum> = builder
            .enums
            .iter()
            .filter_map(|name| decls.enums.get(name))
            .map(proto_enum)
            .collect();

        let mut imports: BTreeSet<String> = self.options.imports.iter().cloned().collect();
        imports.extend(builder.imports);

        info!(
            package = %self.options.package,
            messages = messages.len(),
            enums = enums.len(),
            warnings = builder.warnings.len(),
            "extracted"
        );

        Ok(Extraction {
            file: ProtoFile {
                package: self.options.package.clone(),
                imports,
                group,
                messages,
                enums,
            },
            warnings: builder.warnings,
        })
    }

    fn is_root(&self, tags: &Tags, public: bool) -> bool {
        tags.selected() || (self.options.all && public && !tags.skip)
    }

    fn group_option(&self) -> Result<Option<GroupOption>> {
        let Some(domain) = &self.options.domain else {
            return Ok(None);
        };
        let segments: Vec<&str> = self.options.package.split('.').collect();
        let version = match segments.last() {
            Some(version) if is_kube_version(version) => version.to_string(),
            _ => return Err(ExtractError::UnversionedPackage(self.options.package.clone())),
        };
        let sub_group = (segments.len() >= 2).then(|| segments[segments.len() - 2].to_string());
        Ok(Some(GroupOption {
            domain: domain.clone(),
            sub_group,
            version,
        }))
    }
}

/// Extract a directory with the given options
pub fn extract(dir: &Path, options: ExtractOptions) -> Result<Extraction> {
    Extractor::new(options).extract_dir(dir)
}

/// Worklist over the records reachable from the selected roots
struct FileBuilder<'a> {
    decls: &'a Declarations,
    names: KnownNames,
    kinds: BTreeSet<String>,
    /// `<Kind>List` records; the schema lister pairs these itself
    lists: BTreeSet<String>,
    queue: VecDeque<String>,
    messages: BTreeMap<String, ProtoMessage>,
    enums: BTreeSet<String>,
    imports: BTreeSet<String>,
    warnings: Vec<ExtractWarning>,
}

impl<'a> FileBuilder<'a> {
    fn new(decls: &'a Declarations) -> Self {
        let names = KnownNames {
            records: decls.records.keys().cloned().collect(),
            enums: decls.enums.keys().cloned().collect(),
            strings: decls.strings.iter().cloned().collect(),
        };
        let kinds: BTreeSet<String> = decls
            .records
            .values()
            .filter(|r| is_kind(r, &names))
            .map(|r| r.name.clone())
            .collect();
        let lists = kinds
            .iter()
            .map(|kind| format!("{}List", kind))
            .filter(|list| decls.records.contains_key(list))
            .collect();

        for warning in &decls.warnings {
            warn!("{}", warning);
        }

        Self {
            decls,
            names,
            kinds,
            lists,
            queue: VecDeque::new(),
            messages: BTreeMap::new(),
            enums: BTreeSet::new(),
            imports: BTreeSet::new(),
            warnings: decls.warnings.clone(),
        }
    }

    fn warn(&mut self, warning: ExtractWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn report_unknown_tags(&mut self) {
        let decls = self.decls;
        let tagged = decls
            .records
            .values()
            .map(|r| (&r.name, &r.origin, &r.doc.tags))
            .chain(decls.enums.values().map(|e| (&e.name, &e.origin, &e.doc.tags)));
        for (name, origin, tags) in tagged {
            for tag in &tags.unknown {
                self.warn(origin.warning(name, format!("unknown tag '{}'", tag)));
            }
        }
    }

    fn drain(&mut self) -> Result<Vec<ProtoMessage>> {
        let decls = self.decls;
        while let Some(name) = self.queue.pop_front() {
            if self.messages.contains_key(&name) {
                continue;
            }
            let Some(record) = decls.records.get(&name) else {
                continue;
            };
            let message = self.message(record)?;
            debug!(message = %name, fields = message.fields.len(), "translated record");
            self.messages.insert(name, message);
        }
        Ok(std::mem::take(&mut self.messages).into_values().collect())
    }

    fn message(&mut self, record: &'a Record) -> Result<ProtoMessage> {
        let decls = self.decls;
        let source = match &record.doc.tags.from {
            Some(from) => decls
                .records
                .get(from)
                .ok_or_else(|| ExtractError::UnknownSource {
                    record: record.name.clone(),
                    source_record: from.clone(),
                })?,
            None => record,
        };
        let kind = self.kinds.contains(&source.name);

        let mut fields = Vec::new();
        for field in &source.fields {
            let declaration = format!("{}.{}", record.name, field.name);
            let shape = match translate(&field.ty, &self.names) {
                Ok(shape) => shape,
                Err(ty) => {
                    let warning = ExtractWarning::new(
                        &source.origin.file,
                        &declaration,
                        format!("unsupported type '{}', emitted as string", ty),
                    )
                    .at_line(field.line);
                    self.warn(warning);
                    Shape::Field {
                        label: Label::Singular,
                        target: TypeRef::Scalar("string"),
                    }
                }
            };
            if kind && is_identity_header(field, &shape) {
                continue;
            }
            let shape = self.follow(shape, &declaration, source, field);
            let options = self.field_options(field, &shape, &declaration, source);
            fields.push(ProtoField {
                name: snake_case(&field.name),
                number: fields.len() + 1,
                shape,
                options,
                doc: field.doc.lines.clone(),
            });
        }

        Ok(ProtoMessage {
            name: record.name.clone(),
            doc: record.doc.lines.clone(),
            kind,
            fields,
        })
    }

    /// Queue referenced declarations; references to skipped records degrade to string
    fn follow(&mut self, shape: Shape, declaration: &str, source: &Record, field: &RecordField) -> Shape {
        let skipped = shape.targets().find_map(|target| match target {
            TypeRef::Message(name)
                if self.decls.records.get(name).is_some_and(|r| r.doc.tags.skip) =>
            {
                Some(name.clone())
            }
            _ => None,
        });
        if let Some(name) = skipped {
            let warning = ExtractWarning::new(
                &source.origin.file,
                declaration,
                format!("refers to skipped '{}', emitted as string", name),
            )
            .at_line(field.line);
            self.warn(warning);
            return match shape {
                Shape::Field { label, .. } => Shape::Field {
                    label,
                    target: TypeRef::Scalar("string"),
                },
                Shape::Map { key, .. } => Shape::Map {
                    key,
                    value: TypeRef::Scalar("string"),
                },
            };
        }

        for target in shape.targets() {
            match target {
                TypeRef::Message(name) => self.queue.push_back(name.clone()),
                TypeRef::Enum(name) => {
                    self.enums.insert(name.clone());
                }
                TypeRef::WellKnown(_) => {
                    self.imports.insert(METAV1_PROTO.to_string());
                }
                TypeRef::Scalar(_) => {}
            }
        }
        shape
    }

    fn field_options(
        &mut self,
        field: &RecordField,
        shape: &Shape,
        declaration: &str,
        source: &Record,
    ) -> Vec<FieldOption> {
        let mut options = Vec::new();
        if let Some(rename) = &field.rename
            && *rename != lower_camel_case(&snake_case(&field.name))
        {
            options.push(FieldOption::ApiName(rename.clone()));
        }
        if field.flatten {
            match shape {
                Shape::Field {
                    label: Label::Singular,
                    target,
                } if target.is_message() => options.push(FieldOption::Inline),
                _ => {
                    let warning = ExtractWarning::new(
                        &source.origin.file,
                        declaration,
                        "flatten on a field that is not a single message is ignored",
                    )
                    .at_line(field.line);
                    self.warn(warning);
                }
            }
        }
        options
    }
}

/// A record flattening `TypeMeta` is a Kind, unless it carries `ListMeta`
fn is_kind(record: &Record, names: &KnownNames) -> bool {
    let meta = |field: &RecordField| match translate(&field.ty, names) {
        Ok(Shape::Field {
            label: Label::Singular,
            target: TypeRef::WellKnown(name),
        }) => Some(name),
        _ => None,
    };
    let has_type_meta = record
        .fields
        .iter()
        .any(|field| field.flatten && meta(field) == Some(wellknown::TYPE_META));
    let has_list_meta = record
        .fields
        .iter()
        .any(|field| meta(field) == Some(wellknown::LIST_META));
    has_type_meta && !has_list_meta
}

/// `type_meta`/`metadata` members the schema lister adds to every Kind
fn is_identity_header(field: &RecordField, shape: &Shape) -> bool {
    match shape {
        Shape::Field {
            target: TypeRef::WellKnown(name),
            ..
        } => {
            (*name == wellknown::TYPE_META && field.flatten)
                || (*name == wellknown::OBJECT_META && field.name == "metadata")
        }
        _ => false,
    }
}

fn proto_enum(decl: &EnumDecl) -> ProtoEnum {
    let prefix = format!("{}_", screaming_snake_case(&decl.name));
    let value_names: Vec<String> = decl
        .values
        .iter()
        .map(|value| {
            let name = screaming_snake_case(&value.ident);
            if name.starts_with(&prefix) {
                name
            } else {
                format!("{}{}", prefix, name)
            }
        })
        .collect();
    let refs: Vec<&str> = value_names.iter().map(String::as_str).collect();
    let derived = enum_symbols(&decl.name, &refs);

    ProtoEnum {
        name: decl.name.clone(),
        doc: decl.doc.lines.clone(),
        values: decl
            .values
            .iter()
            .zip(value_names)
            .zip(derived)
            .enumerate()
            .map(|(number, ((value, name), derived))| ProtoEnumValue {
                name,
                number,
                symbol: (value.symbol != derived).then(|| value.symbol.clone()),
                doc: value.doc.clone(),
            })
            .collect(),
    }
}

/// `v1`, `v2beta1`, `v1alpha3`
fn is_kube_version(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('v') else {
        return false;
    };
    let major_len = rest.chars().take_while(char::is_ascii_digit).count();
    if major_len == 0 {
        return false;
    }
    let rest = &rest[major_len..];
    if rest.is_empty() {
        return true;
    }
    let minor = rest
        .strip_prefix("alpha")
        .or_else(|| rest.strip_prefix("beta"));
    matches!(minor, Some(m) if !m.is_empty() && m.chars().all(|c| c.is_ascii_digit()))
}
