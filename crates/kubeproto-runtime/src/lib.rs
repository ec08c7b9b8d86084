//! kubeproto Runtime - support library for kubeproto generated code
//!
//! This crate provides:
//! - **Object contracts**: `Object` / `ObjectList` implemented by every generated Kind
//! - **Deep copy**: `DeepCopy`, implemented field by field by `kubeproto deepcopy`
//! - **Scheme**: explicit group/version/kind registry filled by `add_to_scheme`
//! - **Backends**: `RestBackend` over `kube::Client`, `FakeBackend` over an in-memory tracker
//! - **Informers**: `SharedInformerFactory` with one list-then-watch cache per type
//! - **Label selectors**: the `kubectl -l` syntax

pub mod backend;
pub mod deepcopy;
pub mod error;
pub mod fake;
pub mod informer;
pub mod labels;
pub mod lister;
pub mod object;
pub mod rest;
pub mod scheme;

pub use backend::{Backend, ListOptions, WatchEvent, WatchStream};
pub use deepcopy::DeepCopy;
pub use error::{Result, RuntimeError};
pub use fake::{Action, FakeBackend, ObjectTracker, Verb};
pub use informer::{
    Indexer, Informer, SharedInformerFactory, StopHandle, StopSignal, stop_channel,
};
pub use labels::{LabelSelector, Requirement};
pub use lister::Lister;
pub use object::{Object, ObjectList, ResourceInfo};
pub use rest::RestBackend;
pub use scheme::Scheme;

/// Re-exports used by generated code
pub mod reexports {
    pub use k8s_openapi;
    pub use kube;
    pub use serde;
}
