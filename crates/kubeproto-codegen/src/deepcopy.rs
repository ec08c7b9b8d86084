//! Deep-Copy backend
//!
//! Emits `impl DeepCopy for T` for every message of a module. Each field is
//! copied by a strategy picked from its holding and kind, so that nothing
//! the destination owns aliases the source afterwards.

use std::fmt::Write as _;

use kubeproto_core::{Field, FieldKind, GeneratorConfig, MessageId, Schema};
use tracing::debug;

use crate::error::Result;
use crate::format::format_source;
use crate::generator::{GeneratedFile, Generator, Target};
use crate::rust::{Holding, PackageUnit, field_ident, holding, package_units};

pub const DEEPCOPY_FILE: &str = "deepcopy.rs";

const INDENT: &str = "    ";

/// Copy statement kinds, one per field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// `out.f = self.f;`
    Assign,
    /// `out.f.clone_from(&self.f);`
    CloneFrom,
    /// `self.f.deep_copy_into(&mut out.f);`
    Recurse,
    /// `out.f = self.f.clone();`
    CloneSequence,
    /// `out.f = self.f.iter().map(DeepCopy::deep_copy).collect();`
    CopyElements,
    /// `out.f = self.f.as_ref().map(DeepCopy::deep_copy);`, boxed or not
    CopyOptional,
    /// `out.f = self.f.iter().map(|(k, v)| (k.clone(), v.deep_copy())).collect();`
    CopyValues,
}

/// Line-oriented writer with an indentation level
#[derive(Debug, Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn finish(self) -> String {
        self.out
    }
}

pub struct DeepCopyGenerator {
    runtime: String,
}

impl DeepCopyGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            runtime: config.runtime_crate.clone(),
        }
    }

    fn render_unit(&self, schema: &Schema, unit: &PackageUnit) -> Result<GeneratedFile> {
        let mut p = Printer::default();
        p.line("// Code generated by kubeproto. DO NOT EDIT.");
        p.line("");
        p.line("use super::types::*;");
        p.line(&format!("use {}::DeepCopy;", self.runtime));

        for &id in &unit.messages {
            let message = schema.message(id);
            p.line("");
            p.open(&format!("impl DeepCopy for {} {{", message.short_name));
            if message.fields.is_empty() {
                p.line("fn deep_copy_into(&self, _out: &mut Self) {}");
            } else {
                p.open("fn deep_copy_into(&self, out: &mut Self) {");
                for field in &message.fields {
                    p.line(&copy_statement(field, strategy(schema, id, field)));
                }
                p.close();
            }
            p.close();
        }

        let path = unit.file_path(DEEPCOPY_FILE);
        let content = format_source(&path.to_string_lossy(), &p.finish())?;
        debug!(path = %path.display(), "rendered deep copies");
        Ok(GeneratedFile::new(path, content))
    }
}

impl Generator for DeepCopyGenerator {
    fn target(&self) -> Target {
        Target::DeepCopy
    }

    fn generate(&self, schema: &Schema) -> Result<Vec<GeneratedFile>> {
        package_units(schema)?
            .iter()
            .filter(|unit| !unit.messages.is_empty())
            .map(|unit| self.render_unit(schema, unit))
            .collect()
    }
}

/// Whether values of this kind need a recursive copy at all
fn owns(schema: &Schema, kind: &FieldKind) -> bool {
    match kind {
        FieldKind::Message(id) => !schema.is_plain(*id),
        FieldKind::Map { .. } => true,
        FieldKind::String
        | FieldKind::Bool
        | FieldKind::Int32
        | FieldKind::Int64
        | FieldKind::Float
        | FieldKind::Double
        | FieldKind::Bytes
        | FieldKind::Enum(_) => false,
    }
}

fn strategy(schema: &Schema, owner: MessageId, field: &Field) -> Strategy {
    match holding(schema, owner, field) {
        Holding::Map => match &field.kind {
            FieldKind::Map { value, .. } if owns(schema, value) => Strategy::CopyValues,
            _ => Strategy::CloneSequence,
        },
        Holding::Repeated => {
            if owns(schema, &field.kind) {
                Strategy::CopyElements
            } else {
                Strategy::CloneSequence
            }
        }
        Holding::Optional { .. } => {
            if owns(schema, &field.kind) {
                Strategy::CopyOptional
            } else {
                Strategy::CloneFrom
            }
        }
        Holding::Value => match &field.kind {
            FieldKind::Message(id) if schema.owns_references(*id) => Strategy::Recurse,
            FieldKind::Message(_)
            | FieldKind::String
            | FieldKind::Bytes
            | FieldKind::Enum(_)
            | FieldKind::Map { .. } => Strategy::CloneFrom,
            FieldKind::Bool
            | FieldKind::Int32
            | FieldKind::Int64
            | FieldKind::Float
            | FieldKind::Double => Strategy::Assign,
        },
    }
}

fn copy_statement(field: &Field, strategy: Strategy) -> String {
    let f = field_ident(field);
    let mut s = String::new();
    // Writing to a String cannot fail
    let _ = match strategy {
        Strategy::Assign => write!(s, "out.{f} = self.{f};"),
        Strategy::CloneFrom => write!(s, "out.{f}.clone_from(&self.{f});"),
        Strategy::Recurse => write!(s, "self.{f}.deep_copy_into(&mut out.{f});"),
        Strategy::CloneSequence => write!(s, "out.{f} = self.{f}.clone();"),
        Strategy::CopyElements => {
            write!(s, "out.{f} = self.{f}.iter().map(DeepCopy::deep_copy).collect();")
        }
        Strategy::CopyOptional => write!(s, "out.{f} = self.{f}.as_ref().map(DeepCopy::deep_copy);"),
        Strategy::CopyValues => write!(
            s,
            "out.{f} = self.{f}.iter().map(|(k, v)| (k.clone(), v.deep_copy())).collect();"
        ),
    };
    s
}
