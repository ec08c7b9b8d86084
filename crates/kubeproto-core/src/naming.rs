//! Identifier case conversion and Kubernetes naming rules
//!
//! Shared by the lister (enum symbol derivation, nested type names), the
//! backends (Rust identifiers, CRD names) and the extractor.

/// Rust keywords that cannot be used as plain identifiers
const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Convert to snake_case
///
/// Acronym runs stay together: `HTTPServer` becomes `http_server`.
pub fn snake_case(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut result = String::with_capacity(value.len() + value.len() / 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else if c == '-' || c == ' ' || c == '.' {
            if !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert to SCREAMING_SNAKE_CASE
pub fn screaming_snake_case(value: &str) -> String {
    snake_case(value).to_uppercase()
}

/// Convert to PascalCase
///
/// Separators (`_`, `-`, `.`, space) start a new word; an all-caps word
/// is title-cased (`RUNNING` becomes `Running`) while mixed-case words keep
/// their inner capitals.
pub fn pascal_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for word in value.split(['_', '-', '.', ' ']).filter(|w| !w.is_empty()) {
        let all_upper = word.chars().all(|c| !c.is_lowercase());
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            if all_upper {
                result.extend(chars.flat_map(char::to_lowercase));
            } else {
                result.extend(chars);
            }
        }
    }
    result
}

/// Convert a proto field name to its default JSON name (lowerCamelCase)
///
/// Mirrors protoc's `json_name` derivation: underscores are dropped and the
/// following letter is upper-cased.
pub fn lower_camel_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut upper_next = false;
    for c in value.chars() {
        if c == '_' {
            upper_next = !result.is_empty();
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Make an identifier safe for use in Rust source
pub fn rust_ident(value: &str) -> String {
    match value {
        "self" | "Self" | "super" | "crate" => format!("{}_", value),
        v if RUST_KEYWORDS.contains(&v) => format!("r#{}", v),
        v => v.to_string(),
    }
}

/// Pluralize a Kind name the way CRD resource names are formed
///
/// The result is lower-cased: `Certificate` -> `certificates`,
/// `Policy` -> `policies`, `Ingress` -> `ingresses`.
pub fn pluralize(kind: &str) -> String {
    let lower = kind.to_lowercase();
    if lower.is_empty() {
        return lower;
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{}es", lower);
    }
    if let Some(stem) = lower.strip_suffix('y') {
        let vowel_before = stem
            .chars()
            .last()
            .is_some_and(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));
        if !vowel_before {
            return format!("{}ies", stem);
        }
    }
    format!("{}s", lower)
}

/// Derive symbolic enum value names from raw proto value names
///
/// A prefix shared by every value is stripped (preferring the enum's own
/// SCREAMING_SNAKE name followed by `_`), and the rest is PascalCased:
/// `PHASE_RUNNING` in enum `Phase` becomes `Running`.
pub fn enum_symbols(enum_name: &str, values: &[&str]) -> Vec<String> {
    let prefix = shared_value_prefix(enum_name, values);
    values
        .iter()
        .map(|v| {
            let stripped = v.strip_prefix(prefix.as_str()).unwrap_or(v);
            let stripped = if stripped.is_empty() { v } else { stripped };
            pascal_case(stripped)
        })
        .collect()
}

fn shared_value_prefix(enum_name: &str, values: &[&str]) -> String {
    let own = format!("{}_", screaming_snake_case(enum_name));
    if !values.is_empty() && values.iter().all(|v| v.starts_with(&own) && v.len() > own.len()) {
        return own;
    }
    if values.len() < 2 {
        return String::new();
    }

    let first = values[0];
    let mut end = first.len();
    for v in &values[1..] {
        end = end.min(
            first
                .bytes()
                .zip(v.bytes())
                .take_while(|(a, b)| a == b)
                .count(),
        );
    }
    // Only cut on an underscore boundary
    match first[..end].rfind('_') {
        Some(pos) => first[..=pos].to_string(),
        None => String::new(),
    }
}
