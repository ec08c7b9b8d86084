//! Declaration collection
//!
//! Pass one walks every item of every file: structs with named fields become
//! records, unit-only enums become enums, string type aliases and typed
//! string constants are remembered separately. Constants are often declared
//! before (or in another file than) the alias that types them, so pass two
//! groups them by type and keeps only the groups whose type turned out to be
//! a string alias.

use proc_macro2::Span;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use syn::{Attribute, Expr, Fields, Item, Lit, LitStr, Token, Type, Visibility};
use tracing::debug;

use crate::error::{ExtractError, ExtractWarning, Result};
use crate::tags::DocComment;

/// Where a declaration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub file: PathBuf,
    pub line: usize,
}

impl Origin {
    fn new(file: &Path, span: Span) -> Self {
        Self {
            file: file.to_path_buf(),
            line: span.start().line,
        }
    }

    pub fn warning(&self, declaration: impl Into<String>, message: impl Into<String>) -> ExtractWarning {
        ExtractWarning::new(self.file.clone(), declaration, message).at_line(self.line)
    }
}

#[derive(Debug, Clone)]
pub struct Record {
    pub name: String,
    pub origin: Origin,
    pub public: bool,
    pub doc: DocComment,
    pub fields: Vec<RecordField>,
}

#[derive(Debug, Clone)]
pub struct RecordField {
    pub name: String,
    pub ty: Type,
    pub rename: Option<String>,
    pub flatten: bool,
    pub doc: DocComment,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub origin: Origin,
    pub public: bool,
    pub doc: DocComment,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Variant or constant identifier
    pub ident: String,
    /// Wire value
    pub symbol: String,
    pub doc: Vec<String>,
}

#[derive(Debug, Clone)]
struct AliasDecl {
    origin: Origin,
    public: bool,
    doc: DocComment,
}

/// Everything pass one found
#[derive(Debug, Default)]
pub struct Collector {
    records: BTreeMap<String, Record>,
    enums: BTreeMap<String, EnumDecl>,
    aliases: BTreeMap<String, AliasDecl>,
    constants: BTreeMap<String, Vec<EnumValue>>,
    warnings: Vec<ExtractWarning>,
}

/// Result of both passes
#[derive(Debug, Default)]
pub struct Declarations {
    pub records: BTreeMap<String, Record>,
    pub enums: BTreeMap<String, EnumDecl>,
    /// String aliases that never gained constants; fields of these types are plain strings
    pub strings: Vec<String>,
    pub warnings: Vec<ExtractWarning>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one file and collect its declarations
    pub fn add_file(&mut self, path: &Path, source: &str) -> Result<()> {
        let file = syn::parse_file(source).map_err(|e| ExtractError::Parse {
            path: path.to_path_buf(),
            line: e.span().start().line,
            message: e.to_string(),
        })?;
        self.add_items(path, &file.items)
    }

    fn add_items(&mut self, path: &Path, items: &[Item]) -> Result<()> {
        for item in items {
            match item {
                Item::Struct(item) => self.add_struct(path, item)?,
                Item::Enum(item) => self.add_enum(path, item)?,
                Item::Type(item) => self.add_alias(path, item),
                Item::Const(item) => self.add_const(item),
                Item::Mod(module) => {
                    if let Some((_, items)) = &module.content {
                        self.add_items(path, items)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn add_struct(&mut self, path: &Path, item: &syn::ItemStruct) -> Result<()> {
        let name = item.ident.to_string();
        let origin = Origin::new(path, item.ident.span());
        let doc = DocComment::from_attrs(&item.attrs);

        let Fields::Named(named) = &item.fields else {
            if doc.tags.selected() {
                self.warnings
                    .push(origin.warning(&name, "only structs with named fields can become messages"));
            }
            return Ok(());
        };

        let fields = named
            .named
            .iter()
            .filter_map(|field| {
                let ident = field.ident.as_ref()?;
                let serde = SerdeOptions::from_attrs(&field.attrs);
                if serde.skip {
                    return None;
                }
                Some(RecordField {
                    name: ident.to_string().trim_start_matches("r#").to_string(),
                    ty: field.ty.clone(),
                    rename: serde.rename,
                    flatten: serde.flatten,
                    doc: DocComment::from_attrs(&field.attrs),
                    line: ident.span().start().line,
                })
            })
            .collect();

        self.check_unique(&name, &origin)?;
        debug!(record = %name, file = %path.display(), "collected struct");
        self.records.insert(
            name.clone(),
            Record {
                name,
                origin,
                public: is_public(&item.vis),
                doc,
                fields,
            },
        );
        Ok(())
    }

    fn add_enum(&mut self, path: &Path, item: &syn::ItemEnum) -> Result<()> {
        let name = item.ident.to_string();
        let origin = Origin::new(path, item.ident.span());
        let doc = DocComment::from_attrs(&item.attrs);

        if item.variants.iter().any(|v| !matches!(v.fields, Fields::Unit)) {
            if doc.tags.selected() {
                self.warnings
                    .push(origin.warning(&name, "only enums with unit variants can become proto enums"));
            }
            return Ok(());
        }

        let values = item
            .variants
            .iter()
            .map(|variant| {
                let ident = variant.ident.to_string();
                let variant_doc = DocComment::from_attrs(&variant.attrs);
                EnumValue {
                    symbol: SerdeOptions::from_attrs(&variant.attrs)
                        .rename
                        .unwrap_or_else(|| ident.clone()),
                    ident,
                    doc: variant_doc.lines,
                }
            })
            .collect();

        self.check_unique(&name, &origin)?;
        debug!(name = %name, file = %path.display(), "collected enum");
        self.enums.insert(
            name.clone(),
            EnumDecl {
                name,
                origin,
                public: is_public(&item.vis),
                doc,
                values,
            },
        );
        Ok(())
    }

    /// `type Phase = &'static str;` or `type Phase = String;`
    fn add_alias(&mut self, path: &Path, item: &syn::ItemType) {
        if !is_string_type(&item.ty) {
            return;
        }
        self.aliases.insert(
            item.ident.to_string(),
            AliasDecl {
                origin: Origin::new(path, item.ident.span()),
                public: is_public(&item.vis),
                doc: DocComment::from_attrs(&item.attrs),
            },
        );
    }

    /// `const PHASE_READY: Phase = "Ready";`
    fn add_const(&mut self, item: &syn::ItemConst) {
        let Type::Path(ty) = &*item.ty else {
            return;
        };
        let Some(type_name) = ty.path.get_ident().map(ToString::to_string) else {
            return;
        };
        let Expr::Lit(expr) = &*item.expr else {
            return;
        };
        let Lit::Str(value) = &expr.lit else {
            return;
        };

        self.constants.entry(type_name).or_default().push(EnumValue {
            ident: item.ident.to_string(),
            symbol: value.value(),
            doc: DocComment::from_attrs(&item.attrs).lines,
        });
    }

    fn check_unique(&self, name: &str, origin: &Origin) -> Result<()> {
        let first = self
            .records
            .get(name)
            .map(|r| &r.origin)
            .or_else(|| self.enums.get(name).map(|e| &e.origin));
        match first {
            Some(first) => Err(ExtractError::DuplicateDeclaration {
                name: name.to_string(),
                first: first.file.clone(),
                second: origin.file.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Pass two: turn constant groups typed by a string alias into enums
    pub fn finish(mut self) -> Result<Declarations> {
        let mut strings = Vec::new();

        for (name, alias) in std::mem::take(&mut self.aliases) {
            match self.constants.remove(&name) {
                Some(constants) => {
                    self.check_unique(&name, &alias.origin)?;
                    debug!(name = %name, values = constants.len(), "string alias became enum");
                    self.enums.insert(
                        name.clone(),
                        EnumDecl {
                            name,
                            origin: alias.origin,
                            public: alias.public,
                            doc: alias.doc,
                            values: constants,
                        },
                    );
                }
                None => strings.push(name),
            }
        }

        for (type_name, constants) in &self.constants {
            debug!(name = %type_name, constants = constants.len(), "pruned constants of a non-enum type");
        }

        Ok(Declarations {
            records: self.records,
            enums: self.enums,
            strings,
            warnings: self.warnings,
        })
    }
}

#[derive(Debug, Default)]
struct SerdeOptions {
    rename: Option<String>,
    flatten: bool,
    skip: bool,
}

impl SerdeOptions {
    fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut options = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            let parsed = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    options.rename = Some(value.value());
                } else if meta.path.is_ident("flatten") {
                    options.flatten = true;
                } else if meta.path.is_ident("skip") {
                    options.skip = true;
                } else if meta.input.peek(Token![=]) {
                    meta.value()?.parse::<Expr>()?;
                } else if meta.input.peek(syn::token::Paren) {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    content.parse::<proc_macro2::TokenStream>()?;
                }
                Ok(())
            });
            if let Err(err) = parsed {
                debug!(error = %err, "unreadable serde attribute");
            }
        }
        options
    }
}

fn is_public(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}

fn is_string_type(ty: &Type) -> bool {
    match ty {
        Type::Reference(reference) => is_string_type(&reference.elem),
        Type::Path(path) => path.path.is_ident("str") || path.path.is_ident("String"),
        _ => false,
    }
}
