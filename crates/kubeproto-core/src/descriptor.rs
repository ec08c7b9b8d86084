//! Descriptor set I/O and a small builder for annotated descriptors
//!
//! The builder produces exactly what `protoc --descriptor_set_out` emits for
//! an annotated file when the kubeproto extensions are not linked in: the
//! annotations land in `uninterpreted_option`. Tests and fixtures use it to
//! describe inputs without shelling out to a proto compiler.

use prost::Message as _;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::uninterpreted_option::NamePart;
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto,
    EnumValueOptions, FieldDescriptorProto, FieldOptions, FileDescriptorProto, FileDescriptorSet,
    FileOptions, MessageOptions, UninterpretedOption,
};
use std::path::Path;

use crate::annotations::{
    FIELD_EXTENSION, K8S_EXTENSION, KIND_EXTENSION, VALUE_EXTENSION, aggregate_option,
    string_option,
};
use crate::error::Result;
use crate::naming::{lower_camel_case, pascal_case};

/// Decode a serialized `FileDescriptorSet`
pub fn decode_descriptor_set(bytes: &[u8]) -> Result<FileDescriptorSet> {
    Ok(FileDescriptorSet::decode(bytes)?)
}

/// Read and decode a descriptor set file
pub fn load_descriptor_set(path: impl AsRef<Path>) -> Result<FileDescriptorSet> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_descriptor_set(&bytes)
}

/// Serialize a descriptor set
pub fn encode_descriptor_set(set: &FileDescriptorSet) -> Vec<u8> {
    set.encode_to_vec()
}

/// Scalar field types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    String,
    Bool,
    Int32,
    Int64,
    Float,
    Double,
    Bytes,
}

impl Scalar {
    fn proto_type(self) -> Type {
        match self {
            Self::String => Type::String,
            Self::Bool => Type::Bool,
            Self::Int32 => Type::Int32,
            Self::Int64 => Type::Int64,
            Self::Float => Type::Float,
            Self::Double => Type::Double,
            Self::Bytes => Type::Bytes,
        }
    }
}

/// Builds one `FileDescriptorProto`
///
/// Map fields are only fully qualified once the file goes through
/// [`descriptor_set`].
#[derive(Debug, Clone)]
pub struct FileBuilder {
    file: FileDescriptorProto,
}

impl FileBuilder {
    pub fn new(name: &str, package: &str) -> Self {
        Self {
            file: FileDescriptorProto {
                name: Some(name.to_string()),
                package: Some(package.to_string()),
                syntax: Some("proto3".to_string()),
                ..Default::default()
            },
        }
    }

    pub fn dependency(mut self, name: &str) -> Self {
        self.file.dependency.push(name.to_string());
        self
    }

    /// Group/version annotation (`sub_group` is optional)
    pub fn k8s(mut self, domain: &str, sub_group: Option<&str>, version: &str) -> Self {
        let mut aggregate = format!("domain: \"{}\"", domain);
        if let Some(sub) = sub_group {
            aggregate.push_str(&format!(" sub_group: \"{}\"", sub));
        }
        aggregate.push_str(&format!(" version: \"{}\"", version));
        self.file_options()
            .uninterpreted_option
            .push(aggregate_option(K8S_EXTENSION, &aggregate));
        self
    }

    pub fn rust_module(mut self, module: &str) -> Self {
        self.file_options()
            .uninterpreted_option
            .push(string_option(K8S_EXTENSION, "rust_module", module));
        self
    }

    pub fn message(mut self, message: MessageBuilder) -> Self {
        self.file.message_type.push(message.build());
        self
    }

    pub fn enumeration(mut self, enumeration: EnumBuilder) -> Self {
        self.file.enum_type.push(enumeration.build());
        self
    }

    pub fn build(self) -> FileDescriptorProto {
        self.file
    }

    fn file_options(&mut self) -> &mut FileOptions {
        self.file.options.get_or_insert_with(FileOptions::default)
    }
}

/// Builds one `DescriptorProto`
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    message: DescriptorProto,
    /// field index -> map entry type name, qualified once the parent is known
    pending_maps: Vec<(usize, String)>,
}

impl MessageBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            message: DescriptorProto {
                name: Some(name.to_string()),
                ..Default::default()
            },
            pending_maps: Vec::new(),
        }
    }

    /// Mark as a namespaced Kind
    pub fn kind(mut self) -> Self {
        self.message_options()
            .uninterpreted_option
            .push(aggregate_option(KIND_EXTENSION, ""));
        self
    }

    /// Mark as a cluster-scoped Kind
    pub fn cluster_scoped(mut self) -> Self {
        self.message_options()
            .uninterpreted_option
            .push(aggregate_option(KIND_EXTENSION, "scope: Cluster"));
        self
    }

    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.message.field.push(field.build());
        self
    }

    pub fn nested(mut self, nested: MessageBuilder) -> Self {
        self.message.nested_type.push(nested.build());
        self
    }

    pub fn nested_enum(mut self, nested: EnumBuilder) -> Self {
        self.message.enum_type.push(nested.build());
        self
    }

    /// A `map<key, value>` field, with its synthetic entry message
    pub fn map(mut self, name: &str, number: i32, key: Scalar, value: FieldBuilder) -> Self {
        let entry_name = format!("{}Entry", pascal_case(name));
        let mut value = value.build();
        value.name = Some("value".to_string());
        value.json_name = Some("value".to_string());
        value.number = Some(2);
        value.label = Some(Label::Optional as i32);

        let entry = DescriptorProto {
            name: Some(entry_name.clone()),
            field: vec![
                FieldBuilder::scalar("key", 1, key).build(),
                value,
            ],
            options: Some(MessageOptions {
                map_entry: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        self.message.nested_type.push(entry);

        let field = FieldBuilder::message(name, number, "").repeated().build();
        self.pending_maps.push((self.message.field.len(), entry_name));
        self.message.field.push(field);
        self
    }

    fn build(self) -> DescriptorProto {
        // Qualified by `descriptor_set` once the package is known
        let mut message = self.message;
        for (index, entry) in self.pending_maps {
            message.field[index].type_name = Some(format!("{}{}", MAP_PLACEHOLDER, entry));
        }
        message
    }

    fn message_options(&mut self) -> &mut MessageOptions {
        self.message
            .options
            .get_or_insert_with(MessageOptions::default)
    }
}

/// Prefix marking a map field whose entry type still needs qualifying
const MAP_PLACEHOLDER: &str = "@entry:";

/// Builds one `FieldDescriptorProto`
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    field: FieldDescriptorProto,
    options: Vec<UninterpretedOption>,
}

impl FieldBuilder {
    fn base(name: &str, number: i32, ty: Type) -> Self {
        Self {
            field: FieldDescriptorProto {
                name: Some(name.to_string()),
                json_name: Some(lower_camel_case(name)),
                number: Some(number),
                label: Some(Label::Optional as i32),
                r#type: Some(ty as i32),
                ..Default::default()
            },
            options: Vec::new(),
        }
    }

    pub fn scalar(name: &str, number: i32, scalar: Scalar) -> Self {
        Self::base(name, number, scalar.proto_type())
    }

    /// Message-typed field; `type_name` is fully qualified (leading dot optional)
    pub fn message(name: &str, number: i32, type_name: &str) -> Self {
        let mut builder = Self::base(name, number, Type::Message);
        builder.field.type_name = Some(qualify(type_name));
        builder
    }

    pub fn enumeration(name: &str, number: i32, type_name: &str) -> Self {
        let mut builder = Self::base(name, number, Type::Enum);
        builder.field.type_name = Some(qualify(type_name));
        builder
    }

    pub fn repeated(mut self) -> Self {
        self.field.label = Some(Label::Repeated as i32);
        self
    }

    /// proto3 `optional`
    pub fn optional(mut self) -> Self {
        self.field.proto3_optional = Some(true);
        self
    }

    pub fn inline(mut self) -> Self {
        self.options.push(ident_option(FIELD_EXTENSION, "inline", "true"));
        self
    }

    pub fn sub_resource(mut self) -> Self {
        self.options
            .push(ident_option(FIELD_EXTENSION, "sub_resource", "true"));
        self
    }

    pub fn api_name(mut self, api_name: &str) -> Self {
        self.options
            .push(string_option(FIELD_EXTENSION, "api_field_name", api_name));
        self
    }

    pub fn rust_name(mut self, rust_name: &str) -> Self {
        self.options
            .push(string_option(FIELD_EXTENSION, "rust_name", rust_name));
        self
    }

    pub fn build(mut self) -> FieldDescriptorProto {
        if !self.options.is_empty() {
            self.field.options = Some(FieldOptions {
                uninterpreted_option: self.options,
                ..Default::default()
            });
        }
        self.field
    }
}

/// Builds one `EnumDescriptorProto`
#[derive(Debug, Clone)]
pub struct EnumBuilder {
    enumeration: EnumDescriptorProto,
}

impl EnumBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            enumeration: EnumDescriptorProto {
                name: Some(name.to_string()),
                ..Default::default()
            },
        }
    }

    pub fn value(self, name: &str, number: i32) -> Self {
        self.push_value(name, number, None)
    }

    /// A value carrying an explicit symbolic name
    pub fn value_with_symbol(self, name: &str, number: i32, symbol: &str) -> Self {
        self.push_value(
            name,
            number,
            Some(EnumValueOptions {
                uninterpreted_option: vec![string_option(VALUE_EXTENSION, "value", symbol)],
                ..Default::default()
            }),
        )
    }

    fn push_value(mut self, name: &str, number: i32, options: Option<EnumValueOptions>) -> Self {
        self.enumeration.value.push(EnumValueDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            options,
        });
        self
    }

    pub fn build(self) -> EnumDescriptorProto {
        self.enumeration
    }
}

/// Assemble a descriptor set, qualifying map entry references
pub fn descriptor_set(files: impl IntoIterator<Item = FileDescriptorProto>) -> FileDescriptorSet {
    FileDescriptorSet {
        file: files
            .into_iter()
            .map(|mut file| {
                let parent = format!(".{}", file.package.as_deref().unwrap_or_default());
                for message in &mut file.message_type {
                    qualify_maps(message, &parent);
                }
                file
            })
            .collect(),
    }
}

fn qualify_maps(message: &mut DescriptorProto, parent: &str) {
    let own = format!("{}.{}", parent, message.name.as_deref().unwrap_or_default());
    for field in &mut message.field {
        if let Some(entry) = field
            .type_name
            .as_deref()
            .and_then(|t| t.strip_prefix(MAP_PLACEHOLDER))
        {
            field.type_name = Some(format!("{}.{}", own, entry));
        }
    }
    for nested in &mut message.nested_type {
        qualify_maps(nested, &own);
    }
}

fn qualify(type_name: &str) -> String {
    if type_name.starts_with('.') || type_name.is_empty() {
        type_name.to_string()
    } else {
        format!(".{}", type_name)
    }
}

fn ident_option(extension: &str, key: &str, value: &str) -> UninterpretedOption {
    UninterpretedOption {
        name: vec![
            NamePart {
                name_part: extension.to_string(),
                is_extension: true,
            },
            NamePart {
                name_part: key.to_string(),
                is_extension: false,
            },
        ],
        identifier_value: Some(value.to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileDescriptorSet {
        descriptor_set([FileBuilder::new("minio/v1alpha1/bucket.proto", "minio.v1alpha1")
            .k8s("example.dev", Some("minio"), "v1alpha1")
            .message(
                MessageBuilder::new("Bucket")
                    .kind()
                    .field(FieldBuilder::message("spec", 2, "minio.v1alpha1.BucketSpec"))
                    .map("labels", 3, Scalar::String, FieldBuilder::scalar("value", 2, Scalar::String)),
            )
            .build()])
    }

    #[test]
    fn test_map_entry_is_qualified() {
        let set = sample();
        let bucket = &set.file[0].message_type[0];
        let labels = bucket.field.iter().find(|f| f.name() == "labels").unwrap();
        assert_eq!(labels.type_name(), ".minio.v1alpha1.Bucket.LabelsEntry");
        assert_eq!(labels.label(), Label::Repeated);
        let entry = &bucket.nested_type[0];
        assert_eq!(entry.name(), "LabelsEntry");
        assert!(entry.options.as_ref().unwrap().map_entry());
    }

    #[test]
    fn test_message_reference_gets_leading_dot() {
        let set = sample();
        let spec = &set.file[0].message_type[0].field[0];
        assert_eq!(spec.type_name(), ".minio.v1alpha1.BucketSpec");
        assert_eq!(spec.json_name(), "spec");
    }

    #[test]
    fn test_encode_decode() {
        let set = sample();
        let bytes = encode_descriptor_set(&set);
        let decoded = decode_descriptor_set(&bytes).unwrap();
        assert_eq!(decoded, set);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.pb");
        std::fs::write(&path, encode_descriptor_set(&sample())).unwrap();
        let loaded = load_descriptor_set(&path).unwrap();
        assert_eq!(loaded.file.len(), 1);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_descriptor_set(&[0xff, 0xff, 0xff]).is_err());
    }
}
