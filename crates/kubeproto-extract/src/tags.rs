//! Doc-comment annotations
//!
//! ```text
//! /// +kubeproto              force-include
//! /// +kubeproto:skip         force-exclude
//! /// +kubeproto:from=Other   reuse the field list of `Other`
//! ```

use syn::{Attribute, Expr, Lit, Meta};

const TAG_PREFIX: &str = "+kubeproto";

/// Tags found on one declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    pub include: bool,
    pub skip: bool,
    pub from: Option<String>,
    /// Tags that start with `+kubeproto` but are not understood
    pub unknown: Vec<String>,
}

impl Tags {
    /// Explicitly requested, either directly or through `from=`
    pub fn selected(&self) -> bool {
        !self.skip && (self.include || self.from.is_some())
    }

    fn add(&mut self, tag: &str) {
        match tag.strip_prefix(TAG_PREFIX) {
            Some("") => self.include = true,
            Some(":skip") => self.skip = true,
            Some(rest) => match rest.strip_prefix(":from=") {
                Some(source) if !source.trim().is_empty() => {
                    self.from = Some(source.trim().to_string())
                }
                _ => self.unknown.push(tag.to_string()),
            },
            None => {}
        }
    }
}

/// Doc comment lines, split into prose and tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub lines: Vec<String>,
    pub tags: Tags,
}

impl DocComment {
    pub fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut doc = Self::default();
        for text in attrs.iter().filter_map(doc_text) {
            for line in text.lines() {
                let line = line.trim();
                if line.starts_with(TAG_PREFIX) {
                    doc.tags.add(line);
                } else if !line.is_empty() {
                    doc.lines.push(line.to_string());
                }
            }
        }
        doc
    }
}

fn doc_text(attr: &Attribute) -> Option<String> {
    if !attr.path().is_ident("doc") {
        return None;
    }
    let Meta::NameValue(meta) = &attr.meta else {
        return None;
    };
    match &meta.value {
        Expr::Lit(expr) => match &expr.lit {
            Lit::Str(s) => Some(s.value()),
            _ => None,
        },
        _ => None,
    }
}
