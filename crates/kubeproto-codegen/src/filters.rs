//! Template filters for emitting Rust source

use kubeproto_core::naming;
use minijinja::Value;

/// Usage: {{ kind.name | snakecase }}
pub fn snakecase(value: String) -> String {
    naming::snake_case(&value)
}

/// Lowercase plural, as used in resource paths
///
/// Usage: {{ kind.name | plural }}
pub fn plural(value: String) -> String {
    naming::pluralize(&value)
}

/// Rust string literal
///
/// Usage: {{ name | quote }}
#[must_use]
pub fn quote(value: Value) -> String {
    let s = if let Some(str_val) = value.as_str() {
        str_val.to_string()
    } else {
        value.to_string()
    };
    format!("{:?}", s)
}
