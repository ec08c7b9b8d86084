//! Read-only views over an informer's indexer

use std::sync::Arc;

use crate::informer::Indexer;
use crate::labels::LabelSelector;
use crate::object::Object;

/// Name lookup and label-filtered listing for one object type
///
/// Every result is a deep copy; callers may mutate freely.
#[derive(Debug)]
pub struct Lister<T> {
    indexer: Arc<Indexer<T>>,
}

impl<T> Clone for Lister<T> {
    fn clone(&self) -> Self {
        Self {
            indexer: self.indexer.clone(),
        }
    }
}

impl<T: Object> Lister<T> {
    pub fn new(indexer: Arc<Indexer<T>>) -> Self {
        Self { indexer }
    }

    /// Look up by name; `namespace` is ignored for cluster-scoped types
    pub fn get(&self, namespace: Option<&str>, name: &str) -> Option<T> {
        let namespace = if T::RESOURCE.namespaced {
            namespace.unwrap_or_default()
        } else {
            ""
        };
        self.indexer.get(namespace, name)
    }

    /// Every cached object matching `selector`
    pub fn list(&self, selector: &LabelSelector) -> Vec<T> {
        self.indexer.list_by(|o| selector.matches(o.labels()))
    }

    /// Cached objects of one namespace matching `selector`
    pub fn list_namespace(&self, namespace: &str, selector: &LabelSelector) -> Vec<T> {
        self.indexer
            .list_by(|o| o.namespace().unwrap_or_default() == namespace && selector.matches(o.labels()))
    }
}
