//! CustomResourceDefinition document model
//!
//! Structured types for the `apiextensions.k8s.io/v1` manifests the CRD
//! backend writes. Serialization order follows field declaration order, and
//! properties are kept in sorted maps so the emitted YAML is stable.

use serde::Serialize;
use std::collections::BTreeMap;

pub const CRD_API_VERSION: &str = "apiextensions.k8s.io/v1";
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// A complete CRD manifest
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinition {
    pub api_version: String,
    pub kind: String,
    pub metadata: CrdMetadata,
    pub spec: CrdSchema,
}

impl CustomResourceDefinition {
    pub fn new(schema: CrdSchema) -> Self {
        Self {
            api_version: CRD_API_VERSION.to_string(),
            kind: CRD_KIND.to_string(),
            metadata: CrdMetadata {
                name: schema.name(),
            },
            spec: schema,
        }
    }

    /// Full CRD name (e.g., "buckets.storage.example.dev")
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrdMetadata {
    pub name: String,
}

/// The `spec` of a CRD: one Kind across all its versions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdSchema {
    /// API group (e.g., "storage.example.dev")
    pub group: String,
    /// Resource names (kind, plural, singular, listKind)
    pub names: CrdNames,
    pub scope: CrdScope,
    /// Sorted by name
    pub versions: Vec<CrdVersionSchema>,
}

impl CrdSchema {
    pub fn name(&self) -> String {
        format!("{}.{}", self.names.plural, self.group)
    }

    /// The version marked for storage; exactly one per CRD
    pub fn storage_version(&self) -> Option<&CrdVersionSchema> {
        self.versions.iter().find(|v| v.storage)
    }
}

/// CRD scope - whether resources are namespaced or cluster-wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum CrdScope {
    #[default]
    Namespaced,
    Cluster,
}

/// CRD naming information
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdNames {
    /// Kind (e.g., "Bucket")
    pub kind: String,
    /// List kind (e.g., "BucketList")
    pub list_kind: String,
    /// Plural name (e.g., "buckets")
    pub plural: String,
    /// Singular name (e.g., "bucket")
    pub singular: String,
    /// Categories for grouping in kubectl (e.g., ["all"])
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

/// A single API version of a CRD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrdVersionSchema {
    /// Version name (e.g., "v1", "v1beta1", "v1alpha1")
    pub name: String,
    pub served: bool,
    pub storage: bool,
    pub schema: VersionSchema,
    #[serde(skip_serializing_if = "Subresources::is_empty")]
    pub subresources: Subresources,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionSchema {
    #[serde(rename = "openAPIV3Schema")]
    pub open_api_v3_schema: SchemaProperty,
}

/// Schema for a single property
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaProperty {
    #[serde(rename = "type")]
    pub type_: PropertyType,
    /// Format hint (e.g., "date-time", "int64", "byte")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Nested object properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaProperty>>,
    /// Array item schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,
    /// Map value schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaProperty>>,
    /// Preserve unknown fields
    #[serde(
        rename = "x-kubernetes-preserve-unknown-fields",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub x_preserve_unknown: bool,
}

impl SchemaProperty {
    /// Create a simple string property
    pub fn string() -> Self {
        Self {
            type_: PropertyType::String,
            ..Default::default()
        }
    }

    /// Create a simple integer property
    pub fn integer() -> Self {
        Self {
            type_: PropertyType::Integer,
            ..Default::default()
        }
    }

    pub fn number() -> Self {
        Self {
            type_: PropertyType::Number,
            ..Default::default()
        }
    }

    /// Create a simple boolean property
    pub fn boolean() -> Self {
        Self {
            type_: PropertyType::Boolean,
            ..Default::default()
        }
    }

    /// Create an object property with nested properties
    pub fn object(properties: BTreeMap<String, SchemaProperty>) -> Self {
        Self {
            type_: PropertyType::Object,
            properties: Some(properties),
            ..Default::default()
        }
    }

    /// An object whose content the API server keeps without validation
    pub fn opaque_object() -> Self {
        Self {
            type_: PropertyType::Object,
            x_preserve_unknown: true,
            ..Default::default()
        }
    }

    /// Create an array property with item schema
    pub fn array(items: SchemaProperty) -> Self {
        Self {
            type_: PropertyType::Array,
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// An object with arbitrary keys and uniform values
    pub fn map(values: SchemaProperty) -> Self {
        Self {
            type_: PropertyType::Object,
            additional_properties: Some(Box::new(values)),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }
}

/// Property type in OpenAPI schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    #[default]
    Object,
}

/// Subresources configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subresources {
    /// Serialized as `status: {}` when enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusSubresource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleSubresource>,
}

impl Subresources {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.scale.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusSubresource {}

/// Scale subresource configuration for HPA integration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSubresource {
    /// JSON path to spec.replicas
    pub spec_replicas_path: String,
    /// JSON path to status.replicas
    pub status_replicas_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector_path: Option<String>,
}

impl Default for ScaleSubresource {
    fn default() -> Self {
        Self {
            spec_replicas_path: ".spec.replicas".to_string(),
            status_replicas_path: ".status.replicas".to_string(),
            label_selector_path: None,
        }
    }
}
