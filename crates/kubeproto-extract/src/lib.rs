//! kubeproto Extract - Rust API types to a `.proto` starting point
//!
//! Walks a directory of Rust sources and infers the proto schema the
//! generator would need to reproduce them:
//!
//! | Rust                                   | proto                          |
//! |----------------------------------------|--------------------------------|
//! | `struct` with named fields             | `message`                      |
//! | unit-only `enum`                       | `enum`                         |
//! | `type Phase = &str;` + `const`s        | `enum`                         |
//! | `Vec<T>` / `Option<T>` / `BTreeMap`    | `repeated` / `optional` / `map`|
//! | `#[serde(flatten)] TypeMeta`           | `option (kubeproto.kind)`      |
//!
//! Declarations are selected with doc-comment tags (`+kubeproto`,
//! `+kubeproto:skip`, `+kubeproto:from=Other`) or, with
//! [`ExtractOptions::all`], every public declaration. Whatever a selected
//! struct refers to is pulled in as well.
//!
//! The output is text for a human to review and compile with `protoc`, not
//! input for the backends directly.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use kubeproto_extract::{ExtractOptions, extract};
//!
//! let extraction = extract(
//!     Path::new("./src/api"),
//!     ExtractOptions {
//!         package: "storage.v1".to_string(),
//!         all: true,
//!         ..Default::default()
//!     },
//! )
//! .unwrap();
//!
//! for warning in &extraction.warnings {
//!     eprintln!("{}", warning);
//! }
//! println!("{}", extraction.render());
//! ```

pub mod collect;
pub mod error;
pub mod extractor;
pub mod render;
pub mod shape;
pub mod tags;

pub use error::{ExtractError, ExtractWarning, Result};
pub use extractor::{ExtractOptions, Extraction, Extractor, extract};
pub use render::ProtoFile;
