//! OpenAPI schema construction from the message graph

use std::collections::BTreeMap;

use kubeproto_core::wellknown::{self, VirtualShape};
use kubeproto_core::{Field, FieldKind, MessageId, Schema};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::schema::{ScaleSubresource, SchemaProperty, StatusSubresource, Subresources};

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v(\d+)(?:(alpha|beta)(\d+))?$").expect("valid regex"));

/// Kubernetes version priority: GA > beta > alpha, then by number
///
/// Versions that do not follow the `vN[alpha|betaM]` pattern sort below
/// every conforming one.
pub fn version_priority(version: &str) -> (u8, u64, u64) {
    let Some(caps) = VERSION_RE.captures(version) else {
        return (0, 0, 0);
    };
    let number = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    let stability = match caps.get(2).map(|m| m.as_str()) {
        None => 3,
        Some("beta") => 2,
        Some(_) => 1,
    };
    (stability, number(1), number(3))
}

/// Builds the `openAPIV3Schema` of one Kind version
pub struct SchemaBuilder<'a> {
    schema: &'a Schema,
    /// Messages currently being expanded; a revisit is a cycle
    stack: Vec<MessageId>,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            stack: Vec::new(),
        }
    }

    /// Root schema of a Kind: `apiVersion`, `kind`, `metadata` and its fields
    pub fn kind_root(&mut self, kind: MessageId) -> SchemaProperty {
        let mut properties = self.message_properties(kind);
        properties.insert("apiVersion".to_string(), SchemaProperty::string());
        properties.insert("kind".to_string(), SchemaProperty::string());
        // The API server owns metadata validation
        properties.insert("metadata".to_string(), SchemaProperty::default());
        SchemaProperty::object(properties)
    }

    /// Subresources declared by a Kind's top-level fields
    pub fn subresources(&self, kind: MessageId) -> Subresources {
        let mut subresources = Subresources::default();
        for field in self.schema.message(kind).fields.iter().filter(|f| f.sub_resource) {
            match field.api_name.as_str() {
                "status" => subresources.status = Some(StatusSubresource {}),
                "scale" => subresources.scale = Some(ScaleSubresource::default()),
                other => warn!(
                    kind = %self.schema.message(kind).full_name,
                    field = other,
                    "sub_resource field is neither status nor scale; no subresource emitted"
                ),
            }
        }
        subresources
    }

    fn message_properties(&mut self, id: MessageId) -> BTreeMap<String, SchemaProperty> {
        let schema = self.schema;
        self.stack.push(id);
        let mut properties = BTreeMap::new();
        for field in &schema.message(id).fields {
            match field.kind {
                FieldKind::Message(child) if field.inline => {
                    if schema.message(child).full_name == wellknown::TYPE_META {
                        properties.insert("apiVersion".to_string(), SchemaProperty::string());
                        properties.insert("kind".to_string(), SchemaProperty::string());
                    } else if self.stack.contains(&child) || schema.message(child).is_virtual {
                        warn!(
                            message = %schema.message(id).full_name,
                            field = %field.name,
                            "inline field not expanded; dropped from the CRD schema"
                        );
                    } else {
                        properties.extend(self.message_properties(child));
                    }
                }
                _ => {
                    properties.insert(field.api_name.clone(), self.field_property(field));
                }
            }
        }
        self.stack.pop();
        properties
    }

    fn field_property(&mut self, field: &Field) -> SchemaProperty {
        let element = self.kind_property(&field.kind);
        if field.repeated {
            SchemaProperty::array(element)
        } else {
            element
        }
    }

    fn kind_property(&mut self, kind: &FieldKind) -> SchemaProperty {
        match kind {
            FieldKind::String => SchemaProperty::string(),
            FieldKind::Bool => SchemaProperty::boolean(),
            FieldKind::Int32 => SchemaProperty::integer().with_format("int32"),
            FieldKind::Int64 => SchemaProperty::integer().with_format("int64"),
            FieldKind::Float => SchemaProperty::number().with_format("float"),
            FieldKind::Double => SchemaProperty::number().with_format("double"),
            FieldKind::Bytes => SchemaProperty::string().with_format("byte"),
            FieldKind::Enum(id) => SchemaProperty {
                enum_values: Some(
                    self.schema
                        .enumeration(*id)
                        .values
                        .iter()
                        .map(|v| v.symbol.clone())
                        .collect(),
                ),
                ..SchemaProperty::string()
            },
            FieldKind::Map { value, .. } => SchemaProperty::map(self.kind_property(value)),
            FieldKind::Message(id) => self.message_property(*id),
        }
    }

    fn message_property(&mut self, id: MessageId) -> SchemaProperty {
        let schema = self.schema;
        let message = schema.message(id);
        if message.is_virtual {
            return match wellknown::lookup(&message.full_name).map(|t| t.shape) {
                Some(VirtualShape::DateTime) => SchemaProperty::string().with_format("date-time"),
                _ => SchemaProperty::opaque_object(),
            };
        }
        if self.stack.contains(&id) {
            debug!(message = %message.full_name, "cycle cut");
            return SchemaProperty::opaque_object();
        }
        SchemaProperty::object(self.message_properties(id))
    }
}
