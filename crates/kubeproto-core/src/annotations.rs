//! Custom annotation decoding
//!
//! kubeproto annotations travel as `uninterpreted_option` entries on the
//! descriptor options messages. Two spellings are accepted:
//!
//! ```text
//! option (kubeproto.k8s) = { domain: "example.dev" version: "v1alpha1" };  // aggregate
//! option (kubeproto.k8s).domain = "example.dev";                          // dotted
//! ```
//!
//! | Extension          | Target     | Keys                                              |
//! |--------------------|------------|---------------------------------------------------|
//! | `kubeproto.k8s`    | file       | `domain`, `sub_group`, `version`, `rust_module`   |
//! | `kubeproto.kind`   | message    | `scope` (`Namespaced` / `Cluster`)                |
//! | `kubeproto.field`  | field      | `api_field_name`, `inline`, `sub_resource`, `rust_name` |
//! | `kubeproto.value`  | enum value | `value`                                           |

use prost_types::UninterpretedOption;
use prost_types::uninterpreted_option::NamePart;
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};
use crate::ir::Scope;

pub const K8S_EXTENSION: &str = "kubeproto.k8s";
pub const KIND_EXTENSION: &str = "kubeproto.kind";
pub const FIELD_EXTENSION: &str = "kubeproto.field";
pub const VALUE_EXTENSION: &str = "kubeproto.value";

/// A scalar annotation value
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Str(String),
    Ident(String),
    Int(i64),
    Float(f64),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Ident(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Ident(s) if s == "true" => Some(true),
            Self::Ident(s) if s == "false" => Some(false),
            Self::Int(i) => Some(*i != 0),
            _ => None,
        }
    }
}

/// Every kubeproto annotation found on one options message
///
/// Extension name -> key -> value. An extension that appears with no keys
/// (e.g. `option (kubeproto.kind) = {};`) is still present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    entries: BTreeMap<String, BTreeMap<String, AnnotationValue>>,
}

impl Annotations {
    /// Decode the uninterpreted options of an options message
    pub fn parse(options: &[UninterpretedOption], target: &str) -> Result<Self> {
        let mut entries: BTreeMap<String, BTreeMap<String, AnnotationValue>> = BTreeMap::new();

        for option in options {
            let Some((first, rest)) = option.name.split_first() else {
                continue;
            };
            if !first.is_extension {
                continue;
            }
            let extension = first.name_part.trim_start_matches('.').to_string();
            if !extension.starts_with("kubeproto.") {
                continue;
            }

            let keys = entries.entry(extension.clone()).or_default();
            if let Some(aggregate) = &option.aggregate_value {
                for (key, value) in parse_aggregate(aggregate).map_err(|message| {
                    CoreError::InvalidAnnotation {
                        name: extension.clone(),
                        target: target.to_string(),
                        message,
                    }
                })? {
                    keys.insert(key, value);
                }
            } else if !rest.is_empty() {
                let key = dotted_key(rest);
                let value = scalar_value(option).ok_or_else(|| CoreError::InvalidAnnotation {
                    name: format!("{}.{}", extension, key),
                    target: target.to_string(),
                    message: "option has no value".to_string(),
                })?;
                keys.insert(key, value);
            } else if let Some(value) = scalar_value(option) {
                // `option (kubeproto.kind) = true;` style presence flags
                keys.insert(String::new(), value);
            }
        }

        Ok(Self { entries })
    }

    pub fn has(&self, extension: &str) -> bool {
        self.entries.contains_key(extension)
    }

    pub fn get(&self, extension: &str, key: &str) -> Option<&AnnotationValue> {
        self.entries.get(extension).and_then(|keys| keys.get(key))
    }

    pub fn get_str(&self, extension: &str, key: &str) -> Option<&str> {
        self.get(extension, key).and_then(AnnotationValue::as_str)
    }

    pub fn get_bool(&self, extension: &str, key: &str) -> bool {
        self.get(extension, key)
            .and_then(AnnotationValue::as_bool)
            .unwrap_or(false)
    }
}

/// File-level API group annotation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct K8sAnnotation {
    pub domain: Option<String>,
    pub sub_group: Option<String>,
    pub version: Option<String>,
    pub rust_module: Option<String>,
}

impl K8sAnnotation {
    pub fn from_annotations(a: &Annotations) -> Self {
        let get = |key| a.get_str(K8S_EXTENSION, key).map(str::to_string);
        Self {
            domain: get("domain"),
            sub_group: get("sub_group"),
            version: get("version"),
            rust_module: get("rust_module"),
        }
    }

    /// API group: `sub_group.domain`, or just `domain`
    pub fn group(&self) -> Option<String> {
        let domain = self.domain.as_deref()?;
        Some(match self.sub_group.as_deref() {
            Some(sub) if !sub.is_empty() => format!("{}.{}", sub, domain),
            _ => domain.to_string(),
        })
    }
}

/// Message-level Kind annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindAnnotation {
    pub scope: Scope,
}

impl KindAnnotation {
    /// Returns `None` when the message is not a Kind
    pub fn from_annotations(a: &Annotations, target: &str) -> Result<Option<Self>> {
        if !a.has(KIND_EXTENSION) {
            return Ok(None);
        }
        if a.get(KIND_EXTENSION, "").and_then(AnnotationValue::as_bool) == Some(false) {
            return Ok(None);
        }
        let scope = match a.get_str(KIND_EXTENSION, "scope") {
            None | Some("Namespaced") => Scope::Namespaced,
            Some("Cluster") => Scope::Cluster,
            Some(other) => {
                return Err(CoreError::InvalidAnnotation {
                    name: format!("{}.scope", KIND_EXTENSION),
                    target: target.to_string(),
                    message: format!("unknown scope '{}', expected Namespaced or Cluster", other),
                });
            }
        };
        Ok(Some(Self { scope }))
    }
}

/// Field-level annotation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAnnotation {
    pub api_field_name: Option<String>,
    pub rust_name: Option<String>,
    pub inline: bool,
    pub sub_resource: bool,
}

impl FieldAnnotation {
    pub fn from_annotations(a: &Annotations) -> Self {
        Self {
            api_field_name: a
                .get_str(FIELD_EXTENSION, "api_field_name")
                .map(str::to_string),
            rust_name: a.get_str(FIELD_EXTENSION, "rust_name").map(str::to_string),
            inline: a.get_bool(FIELD_EXTENSION, "inline"),
            sub_resource: a.get_bool(FIELD_EXTENSION, "sub_resource"),
        }
    }
}

/// Symbolic value declared on an enum value
pub fn enum_value_symbol(a: &Annotations) -> Option<String> {
    a.get_str(VALUE_EXTENSION, "value").map(str::to_string)
}

/// Build an aggregate option, as protoc leaves it when the extension is unknown
pub fn aggregate_option(extension: &str, aggregate: &str) -> UninterpretedOption {
    UninterpretedOption {
        name: vec![NamePart {
            name_part: extension.to_string(),
            is_extension: true,
        }],
        aggregate_value: Some(aggregate.to_string()),
        ..Default::default()
    }
}

/// Build a dotted string option (`(extension).key = "value"`)
pub fn string_option(extension: &str, key: &str, value: &str) -> UninterpretedOption {
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
        string_value: Some(value.as_bytes().to_vec()),
        ..Default::default()
    }
}

fn dotted_key(parts: &[NamePart]) -> String {
    parts
        .iter()
        .map(|p| p.name_part.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

fn scalar_value(option: &UninterpretedOption) -> Option<AnnotationValue> {
    if let Some(bytes) = &option.string_value {
        return Some(AnnotationValue::Str(
            String::from_utf8_lossy(bytes).into_owned(),
        ));
    }
    if let Some(ident) = &option.identifier_value {
        return Some(AnnotationValue::Ident(ident.clone()));
    }
    if let Some(v) = option.positive_int_value {
        return Some(AnnotationValue::Int(i64::try_from(v).unwrap_or(i64::MAX)));
    }
    if let Some(v) = option.negative_int_value {
        return Some(AnnotationValue::Int(v));
    }
    option.double_value.map(AnnotationValue::Float)
}

/// Parse the body of a text-format aggregate: `key: value` pairs separated
/// by whitespace, commas or semicolons. Nested messages are not part of the
/// vocabulary and are rejected.
fn parse_aggregate(input: &str) -> std::result::Result<Vec<(String, AnnotationValue)>, String> {
    let mut out = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars
            .peek()
            .is_some_and(|c| c.is_whitespace() || *c == ',' || *c == ';')
        {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                key.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if key.is_empty() {
            return Err(format!(
                "expected a field name in aggregate value '{}'",
                input
            ));
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.next() != Some(':') {
            return Err(format!("expected ':' after '{}'", key));
        }
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let value = match chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => {
                            if let Some(escaped) = chars.next() {
                                s.push(escaped);
                            }
                        }
                        Some(c) if c == quote => break,
                        Some(c) => s.push(c),
                        None => return Err(format!("unterminated string for '{}'", key)),
                    }
                }
                AnnotationValue::Str(s)
            }
            Some('{') => return Err(format!("nested message for '{}' is not supported", key)),
            Some(_) => {
                let mut token = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == ',' || c == ';' {
                        break;
                    }
                    token.push(c);
                    chars.next();
                }
                if let Ok(i) = token.parse::<i64>() {
                    AnnotationValue::Int(i)
                } else if let Ok(f) = token.parse::<f64>() {
                    AnnotationValue::Float(f)
                } else {
                    AnnotationValue::Ident(token)
                }
            }
            None => return Err(format!("missing value for '{}'", key)),
        };

        out.push((key, value));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aggregate_file_annotation() {
        let opts = vec![aggregate_option(
            "kubeproto.k8s",
            r#"domain: "example.dev" sub_group: "storage" version: "v1alpha1""#,
        )];
        let a = Annotations::parse(&opts, "file test.proto").unwrap();
        let k8s = K8sAnnotation::from_annotations(&a);
        assert_eq!(k8s.domain.as_deref(), Some("example.dev"));
        assert_eq!(k8s.version.as_deref(), Some("v1alpha1"));
        assert_eq!(k8s.group().as_deref(), Some("storage.example.dev"));
    }

    #[test]
    fn test_parse_dotted_option() {
        let opts = vec![
            string_option(".kubeproto.k8s", "domain", "example.dev"),
            string_option("kubeproto.k8s", "version", "v1"),
        ];
        let a = Annotations::parse(&opts, "file").unwrap();
        let k8s = K8sAnnotation::from_annotations(&a);
        assert_eq!(k8s.group().as_deref(), Some("example.dev"));
        assert_eq!(k8s.version.as_deref(), Some("v1"));
    }

    #[test]
    fn test_kind_presence_and_scope() {
        let a = Annotations::parse(&[aggregate_option("kubeproto.kind", "")], "m").unwrap();
        let kind = KindAnnotation::from_annotations(&a, "m").unwrap();
        assert_eq!(kind, Some(KindAnnotation { scope: Scope::Namespaced }));

        let a = Annotations::parse(&[aggregate_option("kubeproto.kind", "scope: Cluster")], "m")
            .unwrap();
        let kind = KindAnnotation::from_annotations(&a, "m").unwrap().unwrap();
        assert_eq!(kind.scope, Scope::Cluster);
    }

    #[test]
    fn test_kind_invalid_scope() {
        let a = Annotations::parse(&[aggregate_option("kubeproto.kind", "scope: Galaxy")], "m")
            .unwrap();
        assert!(matches!(
            KindAnnotation::from_annotations(&a, "m"),
            Err(CoreError::InvalidAnnotation { .. })
        ));
    }

    #[test]
    fn test_field_annotation_booleans() {
        let a = Annotations::parse(
            &[aggregate_option(
                "kubeproto.field",
                "inline: true, sub_resource: false; api_field_name: 'typeMeta'",
            )],
            "f",
        )
        .unwrap();
        let field = FieldAnnotation::from_annotations(&a);
        assert!(field.inline);
        assert!(!field.sub_resource);
        assert_eq!(field.api_field_name.as_deref(), Some("typeMeta"));
    }

    #[test]
    fn test_unrelated_extensions_ignored() {
        let a = Annotations::parse(&[aggregate_option("other.ext", "x: 1")], "f").unwrap();
        assert_eq!(a, Annotations::default());
    }

    #[test]
    fn test_nested_aggregate_rejected() {
        let result = Annotations::parse(
            &[aggregate_option("kubeproto.k8s", "domain: { x: 1 }")],
            "file",
        );
        assert!(matches!(result, Err(CoreError::InvalidAnnotation { .. })));
    }
}
