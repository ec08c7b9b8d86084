//! proto3 text for extracted declarations

use std::collections::BTreeSet;

use crate::shape::{Label, Shape};

/// Import path of the Kubernetes meta messages
pub const METAV1_PROTO: &str = "k8s.io/apimachinery/pkg/apis/meta/v1/generated.proto";

const INDENT: &str = "  ";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtoFile {
    pub package: String,
    pub imports: BTreeSet<String>,
    pub group: Option<GroupOption>,
    pub messages: Vec<ProtoMessage>,
    pub enums: Vec<ProtoEnum>,
}

/// File-level `kubeproto.k8s` option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOption {
    pub domain: String,
    pub sub_group: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtoMessage {
    pub name: String,
    pub doc: Vec<String>,
    pub kind: bool,
    pub fields: Vec<ProtoField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtoField {
    pub name: String,
    pub number: usize,
    pub shape: Shape,
    pub options: Vec<FieldOption>,
    pub doc: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOption {
    ApiName(String),
    Inline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtoEnum {
    pub name: String,
    pub doc: Vec<String>,
    pub values: Vec<ProtoEnumValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtoEnumValue {
    pub name: String,
    pub number: usize,
    /// Only set when it differs from the symbol derived from `name`
    pub symbol: Option<String>,
    pub doc: Vec<String>,
}

impl ProtoFile {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("// Code generated by kubeproto extract. Review before compiling.\n");
        out.push_str("syntax = \"proto3\";\n\n");
        out.push_str(&format!("package {};\n", self.package));

        if !self.imports.is_empty() {
            out.push('\n');
            for import in &self.imports {
                out.push_str(&format!("import {};\n", quote(import)));
            }
        }

        if let Some(group) = &self.group {
            out.push('\n');
            let mut keys = vec![format!("domain: {}", quote(&group.domain))];
            if let Some(sub_group) = &group.sub_group {
                keys.push(format!("sub_group: {}", quote(sub_group)));
            }
            keys.push(format!("version: {}", quote(&group.version)));
            out.push_str(&format!("option (kubeproto.k8s) = {{ {} }};\n", keys.join(" ")));
        }

        for message in &self.messages {
            out.push('\n');
            render_message(&mut out, message);
        }
        for enumeration in &self.enums {
            out.push('\n');
            render_enum(&mut out, enumeration);
        }
        out
    }
}

fn render_message(out: &mut String, message: &ProtoMessage) {
    render_doc(out, &message.doc, "");
    out.push_str(&format!("message {} {{\n", message.name));
    if message.kind {
        out.push_str(&format!("{}option (kubeproto.kind) = {{}};\n", INDENT));
        if !message.fields.is_empty() {
            out.push('\n');
        }
    }
    for field in &message.fields {
        render_doc(out, &field.doc, INDENT);
        let declaration = match &field.shape {
            Shape::Field { label, target } => {
                let label = match label {
                    Label::Singular => "",
                    Label::Optional => "optional ",
                    Label::Repeated => "repeated ",
                };
                format!("{}{}", label, target.proto_name())
            }
            Shape::Map { key, value } => format!("map<{}, {}>", key, value.proto_name()),
        };
        out.push_str(&format!(
            "{}{} {} = {}{};\n",
            INDENT,
            declaration,
            field.name,
            field.number,
            render_field_options(&field.options)
        ));
    }
    out.push_str("}\n");
}

fn render_field_options(options: &[FieldOption]) -> String {
    if options.is_empty() {
        return String::new();
    }
    let options: Vec<String> = options
        .iter()
        .map(|option| match option {
            FieldOption::ApiName(name) => format!("(kubeproto.field).api_field_name = {}", quote(name)),
            FieldOption::Inline => "(kubeproto.field).inline = true".to_string(),
        })
        .collect();
    format!(" [{}]", options.join(", "))
}

fn render_enum(out: &mut String, enumeration: &ProtoEnum) {
    render_doc(out, &enumeration.doc, "");
    out.push_str(&format!("enum {} {{\n", enumeration.name));
    for value in &enumeration.values {
        render_doc(out, &value.doc, INDENT);
        let option = value
            .symbol
            .as_ref()
            .map(|symbol| format!(" [(kubeproto.value).value = {}]", quote(symbol)))
            .unwrap_or_default();
        out.push_str(&format!("{}{} = {}{};\n", INDENT, value.name, value.number, option));
    }
    out.push_str("}\n");
}

fn render_doc(out: &mut String, doc: &[String], indent: &str) {
    for line in doc {
        out.push_str(&format!("{}// {}\n", indent, line));
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
