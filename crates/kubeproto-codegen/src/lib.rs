//! kubeproto Codegen - backends over the kubeproto schema IR
//!
//! Each backend consumes a finished [`Schema`](kubeproto_core::Schema) and
//! returns named output blobs:
//! - `types`: Rust structs, enum newtypes, `Object` impls, `add_to_scheme`
//! - `deepcopy`: `DeepCopy` impls
//! - `crd`: CustomResourceDefinition YAML
//! - `client`: typed client, informers and listers
//! - `fake`: the client over the in-memory fake backend
//!
//! Rust output is validated and normalized by [`format_source`] before it
//! is returned.

pub mod client;
pub mod crd;
pub mod deepcopy;
pub mod engine;
pub mod error;
pub mod fake;
pub mod filters;
pub mod format;
pub mod generator;
pub mod rust;
pub mod types;

pub use engine::TemplateEngine;
pub use error::{CodegenError, FormatError, Result, TemplateError};
pub use format::format_source;
pub use generator::{GeneratedFile, Generator, Target, generate};
