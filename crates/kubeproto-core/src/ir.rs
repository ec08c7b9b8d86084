//! Symbol model shared by every backend
//!
//! The IR is an arena: messages and enums live in vectors and refer to each
//! other through [`MessageId`] / [`EnumId`]. It is produced once by the
//! [`SchemaLister`](crate::SchemaLister) and never mutated afterwards.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

/// Index of a message in [`Schema::messages`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub usize);

/// Index of an enum in [`Schema::enums`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnumId(pub usize);

/// A module generated code can import from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPackage {
    /// Proto package (e.g. `minio.extension.v1alpha1`)
    pub proto_package: String,
    /// Rust module path the package's types live in
    pub module_path: String,
    /// Alias to request from the namespace manager
    pub alias: String,
}

/// Resource scope of a Kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Scope {
    #[default]
    Namespaced,
    Cluster,
}

impl Scope {
    pub fn is_namespaced(&self) -> bool {
        matches!(self, Self::Namespaced)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespaced => write!(f, "Namespaced"),
            Self::Cluster => write!(f, "Cluster"),
        }
    }
}

/// API group and version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupVersion {
    pub group: String,
    pub version: String,
}

impl GroupVersion {
    pub fn new(group: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
        }
    }

    /// The `apiVersion` string (`group/version`, or just `version` for the core group)
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_version())
    }
}

/// Kind designation of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindInfo {
    pub group_version: GroupVersion,
    pub scope: Scope,
}

/// Shape of a field's value
///
/// Backends match on this exhaustively, so a new variant is a compile error
/// everywhere it needs handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Bool,
    Int32,
    Int64,
    Float,
    Double,
    Bytes,
    Enum(EnumId),
    Message(MessageId),
    Map {
        key: Box<FieldKind>,
        value: Box<FieldKind>,
    },
}

impl FieldKind {
    /// Scalars are plain values with no owned references
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Message(_) | Self::Map { .. })
    }

    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            Self::Message(id) => Some(*id),
            _ => None,
        }
    }
}

/// A message field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Declared name (snake_case; becomes the Rust field name)
    pub name: String,
    /// Serialized name on the wire
    pub api_name: String,
    /// Proto field number (0 for synthesized fields)
    pub number: i32,
    pub kind: FieldKind,
    /// Owns an independent sequence
    pub repeated: bool,
    /// Owned, nilable reference
    pub optional: bool,
    /// Members are promoted into the parent
    pub inline: bool,
    /// Maps to an API subresource (status, scale)
    pub sub_resource: bool,
}

impl Field {
    /// A plain singular field
    pub fn new(name: impl Into<String>, api_name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            api_name: api_name.into(),
            number: 0,
            kind,
            repeated: false,
            optional: false,
            inline: false,
            sub_resource: false,
        }
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }
}

/// A message in the IR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Fully-qualified proto name without leading dot
    pub full_name: String,
    /// Rust type name
    pub short_name: String,
    pub fields: Vec<Field>,
    /// Set when the message is a top-level API object
    pub kind: Option<KindInfo>,
    /// Defined outside the primary file set; referenced, never emitted
    pub dependency: bool,
    /// Well-known foreign type with no local descriptor
    pub is_virtual: bool,
    /// Created by the lister rather than read from a descriptor
    pub synthesized: bool,
    /// File the message was declared in (empty for virtual messages)
    pub file: String,
    pub package: ImportPackage,
}

impl Message {
    pub fn is_kind(&self) -> bool {
        self.kind.is_some()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// True when the message is emitted by this run
    pub fn is_local(&self) -> bool {
        !self.dependency && !self.is_virtual
    }
}

/// A symbolic enum value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Raw proto value name
    pub name: String,
    /// Symbolic value (what appears on the wire)
    pub symbol: String,
    pub number: i32,
}

/// An enum in the IR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub full_name: String,
    pub short_name: String,
    /// Order is display order and implicit index
    pub values: Vec<EnumValue>,
    pub dependency: bool,
    pub package: ImportPackage,
}

/// A Kind and its paired List message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct KindPair {
    pub kind: MessageId,
    pub list: MessageId,
}

/// The resolved symbol graph
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub(crate) messages: Vec<Message>,
    pub(crate) enums: Vec<Enum>,
    pub(crate) message_index: BTreeMap<String, MessageId>,
    pub(crate) enum_index: BTreeMap<String, EnumId>,
    /// Kind -> List
    pub(crate) lists: BTreeMap<MessageId, MessageId>,
    /// Proto packages of the primary files
    pub(crate) primary_packages: BTreeSet<String>,
    /// Scalar-like virtual messages (no owned references)
    pub(crate) plain_virtuals: BTreeSet<MessageId>,
}

impl Schema {
    pub fn message(&self, id: MessageId) -> &Message {
        &self.messages[id.0]
    }

    pub fn enumeration(&self, id: EnumId) -> &Enum {
        &self.enums[id.0]
    }

    pub fn messages(&self) -> impl Iterator<Item = (MessageId, &Message)> {
        self.messages
            .iter()
            .enumerate()
            .map(|(i, m)| (MessageId(i), m))
    }

    pub fn enums(&self) -> impl Iterator<Item = (EnumId, &Enum)> {
        self.enums.iter().enumerate().map(|(i, e)| (EnumId(i), e))
    }

    /// Look up a message by fully-qualified name (leading dot optional)
    pub fn find_message(&self, full_name: &str) -> Option<MessageId> {
        self.message_index
            .get(full_name.trim_start_matches('.'))
            .copied()
    }

    pub fn find_enum(&self, full_name: &str) -> Option<EnumId> {
        self.enum_index.get(full_name.trim_start_matches('.')).copied()
    }

    /// Proto packages of the primary files, sorted
    pub fn primary_packages(&self) -> impl Iterator<Item = &str> {
        self.primary_packages.iter().map(String::as_str)
    }

    /// Local Kinds with their List pairing, in declaration order
    pub fn kinds(&self) -> Vec<KindPair> {
        self.messages()
            .filter(|(_, m)| m.is_kind() && m.is_local())
            .filter_map(|(id, _)| {
                self.lists
                    .get(&id)
                    .map(|&list| KindPair { kind: id, list })
            })
            .collect()
    }

    /// The List paired with a Kind
    pub fn list_of(&self, kind: MessageId) -> Option<MessageId> {
        self.lists.get(&kind).copied()
    }

    /// The Kind a List message pairs with
    pub fn kind_of_list(&self, list: MessageId) -> Option<MessageId> {
        self.lists
            .iter()
            .find(|&(_, &l)| l == list)
            .map(|(&k, _)| k)
    }

    /// Local Kinds bucketed by group/version, sorted by group/version
    pub fn group_versions(&self) -> BTreeMap<GroupVersion, Vec<KindPair>> {
        let mut buckets: BTreeMap<GroupVersion, Vec<KindPair>> = BTreeMap::new();
        for pair in self.kinds() {
            if let Some(info) = &self.message(pair.kind).kind {
                buckets
                    .entry(info.group_version.clone())
                    .or_default()
                    .push(pair);
            }
        }
        buckets
    }

    /// Local Kinds declared in one proto package
    pub fn kinds_in_package(&self, package: &str) -> Vec<KindPair> {
        self.kinds()
            .into_iter()
            .filter(|p| self.message(p.kind).package.proto_package == package)
            .collect()
    }

    /// Messages reachable from `roots` through message-typed fields
    ///
    /// Worklist walk with a visited set: every message is returned once, in
    /// discovery order, even when shared by several parents or part of a
    /// cycle. `follow` decides which discovered messages are expanded and
    /// returned.
    pub fn reachable(
        &self,
        roots: impl IntoIterator<Item = MessageId>,
        follow: impl Fn(&Message) -> bool,
    ) -> Vec<MessageId> {
        let mut visited = BTreeSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<MessageId> = roots.into_iter().collect();

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) || !follow(self.message(id)) {
                continue;
            }
            order.push(id);
            for field in &self.message(id).fields {
                collect_message_ids(&field.kind, &mut |child| {
                    if !visited.contains(&child) {
                        queue.push_back(child);
                    }
                });
            }
        }

        order
    }

    /// Enums referenced by the given messages' fields, in first-use order
    pub fn referenced_enums(&self, messages: &[MessageId]) -> Vec<EnumId> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for &id in messages {
            for field in &self.message(id).fields {
                collect_enum_ids(&field.kind, &mut |e| {
                    if seen.insert(e) {
                        out.push(e);
                    }
                });
            }
        }
        out
    }

    /// Virtual message holding plain data only (`TypeMeta`, `Time`, ...)
    pub fn is_plain(&self, id: MessageId) -> bool {
        self.plain_virtuals.contains(&id)
    }

    /// Whether copying a value of this message needs more than a clone of
    /// plain data: any repeated, optional, map, or nested message member
    /// that itself owns references.
    pub fn owns_references(&self, id: MessageId) -> bool {
        let mut visiting = BTreeSet::new();
        self.owns_references_inner(id, &mut visiting)
    }

    fn owns_references_inner(&self, id: MessageId, visiting: &mut BTreeSet<MessageId>) -> bool {
        let message = self.message(id);
        if message.is_virtual {
            return !self.plain_virtuals.contains(&id);
        }
        if !visiting.insert(id) {
            // Only reachable through a by-value cycle, which the lister rejects
            return true;
        }
        message.fields.iter().any(|field| {
            if field.repeated || field.optional {
                return true;
            }
            match &field.kind {
                FieldKind::Map { .. } => true,
                FieldKind::Message(child) => self.owns_references_inner(*child, visiting),
                FieldKind::String
                | FieldKind::Bool
                | FieldKind::Int32
                | FieldKind::Int64
                | FieldKind::Float
                | FieldKind::Double
                | FieldKind::Bytes
                | FieldKind::Enum(_) => false,
            }
        })
    }
}

pub(crate) fn collect_message_ids(kind: &FieldKind, f: &mut impl FnMut(MessageId)) {
    match kind {
        FieldKind::Message(id) => f(*id),
        FieldKind::Map { key, value } => {
            collect_message_ids(key, f);
            collect_message_ids(value, f);
        }
        _ => {}
    }
}

fn collect_enum_ids(kind: &FieldKind, f: &mut impl FnMut(EnumId)) {
    match kind {
        FieldKind::Enum(id) => f(*id),
        FieldKind::Map { key, value } => {
            collect_enum_ids(key, f);
            collect_enum_ids(value, f);
        }
        _ => {}
    }
}
