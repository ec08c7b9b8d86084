//! Rust field types to proto field shapes
//!
//! A fixed table handles scalars and the Kubernetes meta types; containers
//! map to labels (`Vec` repeated, `Option` optional, `BTreeMap`/`HashMap`
//! map). Anything else is reported back as unsupported so the caller can
//! warn and fall back.

use kubeproto_core::wellknown;
use phf::phf_map;
use std::collections::BTreeSet;
use syn::{GenericArgument, PathArguments, Type};

/// Proto scalar for a Rust type name
static SCALAR_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "String" => "string",
    "str" => "string",
    "bool" => "bool",
    "i8" => "int32",
    "i16" => "int32",
    "i32" => "int32",
    "u8" => "int32",
    "u16" => "int32",
    "i64" => "int64",
    "isize" => "int64",
    "u32" => "int64",
    "u64" => "int64",
    "usize" => "int64",
    "f32" => "float",
    "f64" => "double",
    "ByteString" => "bytes",
    // Durations travel as nanoseconds
    "Duration" => "int64",
    // Opaque identifiers
    "Uid" => "string",
    "UID" => "string",
    "Uuid" => "string",
};

/// Kubernetes meta types, by Rust name
static WELL_KNOWN_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "Time" => wellknown::TIME,
    "MicroTime" => wellknown::MICRO_TIME,
    "ObjectMeta" => wellknown::OBJECT_META,
    "ListMeta" => wellknown::LIST_META,
    "TypeMeta" => wellknown::TYPE_META,
    "LabelSelector" => wellknown::LABEL_SELECTOR,
};

const MAP_TYPES: &[&str] = &["BTreeMap", "HashMap", "IndexMap"];
const POINTER_TYPES: &[&str] = &["Box", "Arc", "Rc"];
const MAP_KEY_TYPES: &[&str] = &["string", "int32", "int64", "bool"];

/// Declarations a field may refer to by name
#[derive(Debug, Default)]
pub struct KnownNames {
    pub records: BTreeSet<String>,
    pub enums: BTreeSet<String>,
    /// String aliases without constants
    pub strings: BTreeSet<String>,
}

/// Target of a singular field or of a collection's elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Scalar(&'static str),
    /// A meta type, by full proto name
    WellKnown(&'static str),
    Message(String),
    Enum(String),
}

impl TypeRef {
    pub fn proto_name(&self) -> &str {
        match self {
            Self::Scalar(name) | Self::WellKnown(name) => name,
            Self::Message(name) | Self::Enum(name) => name,
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, Self::WellKnown(_) | Self::Message(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Singular,
    Optional,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Field { label: Label, target: TypeRef },
    Map { key: &'static str, value: TypeRef },
}

impl Shape {
    fn singular(target: TypeRef) -> Self {
        Self::Field {
            label: Label::Singular,
            target,
        }
    }

    /// Every type the shape mentions
    pub fn targets(&self) -> impl Iterator<Item = &TypeRef> {
        match self {
            Self::Field { target, .. } => Some(target).into_iter(),
            Self::Map { value, .. } => Some(value).into_iter(),
        }
    }
}

/// Translate a field type, or describe what could not be translated
pub fn translate(ty: &Type, names: &KnownNames) -> Result<Shape, String> {
    match ty {
        Type::Reference(reference) => translate(&reference.elem, names),
        Type::Paren(paren) => translate(&paren.elem, names),
        Type::Path(path) if path.qself.is_none() => {
            let Some(segment) = path.path.segments.last() else {
                return Err(describe(ty));
            };
            let ident = segment.ident.to_string();
            let args = generic_types(&segment.arguments);

            match (ident.as_str(), args.as_slice()) {
                ("Option", [inner]) => match translate(inner, names)? {
                    Shape::Field {
                        label: Label::Singular,
                        target,
                    } => Ok(Shape::Field {
                        label: Label::Optional,
                        target,
                    }),
                    // Option<Vec<T>> and Option<BTreeMap<..>>: absence is the empty collection
                    Shape::Field {
                        label: Label::Repeated,
                        target,
                    } => Ok(Shape::Field {
                        label: Label::Repeated,
                        target,
                    }),
                    map @ Shape::Map { .. } => Ok(map),
                    Shape::Field { .. } => Err(describe(ty)),
                },
                (pointer, [inner]) if POINTER_TYPES.contains(&pointer) => translate(inner, names),
                ("Vec", [inner]) => {
                    if is_ident(inner, "u8") {
                        return Ok(Shape::singular(TypeRef::Scalar("bytes")));
                    }
                    let target = element(inner, names).ok_or_else(|| describe(ty))?;
                    Ok(Shape::Field {
                        label: Label::Repeated,
                        target,
                    })
                }
                (map, [key, value]) if MAP_TYPES.contains(&map) => {
                    let key = match element(key, names) {
                        Some(TypeRef::Scalar(key)) if MAP_KEY_TYPES.contains(&key) => key,
                        _ => return Err(describe(ty)),
                    };
                    let value = element(value, names).ok_or_else(|| describe(ty))?;
                    Ok(Shape::Map { key, value })
                }
                _ => element(ty, names)
                    .map(Shape::singular)
                    .ok_or_else(|| describe(ty)),
            }
        }
        _ => Err(describe(ty)),
    }
}

/// A non-container type
fn element(ty: &Type, names: &KnownNames) -> Option<TypeRef> {
    let ty = match ty {
        Type::Reference(reference) => &*reference.elem,
        other => other,
    };
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    let ident = segment.ident.to_string();

    if let [inner] = generic_types(&segment.arguments).as_slice() {
        return if POINTER_TYPES.contains(&ident.as_str()) {
            element(inner, names)
        } else {
            None
        };
    }
    if !segment.arguments.is_none() {
        return None;
    }

    if let Some(scalar) = SCALAR_TYPES.get(ident.as_str()) {
        return Some(TypeRef::Scalar(scalar));
    }
    if let Some(full_name) = WELL_KNOWN_TYPES.get(ident.as_str()) {
        return Some(TypeRef::WellKnown(full_name));
    }
    if names.records.contains(&ident) {
        return Some(TypeRef::Message(ident));
    }
    if names.enums.contains(&ident) {
        return Some(TypeRef::Enum(ident));
    }
    if names.strings.contains(&ident) {
        return Some(TypeRef::Scalar("string"));
    }
    None
}

fn generic_types(arguments: &PathArguments) -> Vec<&Type> {
    match arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn is_ident(ty: &Type, name: &str) -> bool {
    matches!(ty, Type::Path(path) if path.qself.is_none() && path.path.is_ident(name))
}

/// Short human-readable rendering of a type for warnings
pub fn describe(ty: &Type) -> String {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .iter()
            .map(|segment| {
                let args = generic_types(&segment.arguments);
                if args.is_empty() {
                    segment.ident.to_string()
                } else {
                    let inner: Vec<String> = args.into_iter().map(describe).collect();
                    format!("{}<{}>", segment.ident, inner.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join("::"),
        Type::Reference(reference) => format!("&{}", describe(&reference.elem)),
        Type::Paren(paren) => describe(&paren.elem),
        Type::Array(_) => "array".to_string(),
        Type::Slice(_) => "slice".to_string(),
        Type::Tuple(_) => "tuple".to_string(),
        Type::TraitObject(_) => "trait object".to_string(),
        Type::ImplTrait(_) => "impl trait".to_string(),
        Type::Ptr(_) => "raw pointer".to_string(),
        Type::BareFn(_) => "fn pointer".to_string(),
        _ => "type".to_string(),
    }
}
