//! kubeproto Core - schema IR for the kubeproto code generator
//!
//! This crate turns annotated protobuf descriptors into the resolved symbol
//! graph every backend consumes:
//! - `NamespaceManager`: collision-free import aliases
//! - `Schema`: the immutable IR (messages, fields, enums, Kind/List pairs)
//! - `SchemaLister`: descriptor set -> `Schema`
//! - `GeneratorConfig`: `kubeproto.yaml`

pub mod annotations;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod ir;
pub mod lister;
pub mod namespace;
pub mod naming;
pub mod wellknown;

pub use config::{CrdConfig, GeneratorConfig};
pub use error::{CoreError, Result};
pub use ir::{
    Enum, EnumId, EnumValue, Field, FieldKind, GroupVersion, ImportPackage, KindInfo, KindPair,
    Message, MessageId, Schema, Scope,
};
pub use lister::{SchemaLister, build_schema};
pub use namespace::NamespaceManager;
