//! Backend contract shared by the REST client and the fake
//!
//! Generated clients are generic over a `Backend`, so the same typed client
//! runs against a cluster or against the in-memory tracker.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::object::Object;

/// A change observed by a watch
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent<T> {
    Added(T),
    Modified(T),
    Deleted(T),
}

impl<T> WatchEvent<T> {
    pub fn object(&self) -> &T {
        match self {
            Self::Added(o) | Self::Modified(o) | Self::Deleted(o) => o,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WatchEvent<U> {
        match self {
            Self::Added(o) => WatchEvent::Added(f(o)),
            Self::Modified(o) => WatchEvent::Modified(f(o)),
            Self::Deleted(o) => WatchEvent::Deleted(f(o)),
        }
    }
}

pub type WatchStream<T> = BoxStream<'static, Result<WatchEvent<T>>>;

/// List/watch filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
    pub limit: Option<u32>,
}

impl ListOptions {
    pub fn labels(mut self, selector: impl Into<String>) -> Self {
        self.label_selector = Some(selector.into());
        self
    }
}

/// Storage operations for any [`Object`]
///
/// `namespace` is ignored for cluster-scoped resources; `None` on a
/// namespaced `list`/`watch` spans all namespaces.
#[async_trait]
pub trait Backend: Clone + Send + Sync + 'static {
    async fn get<T: Object>(&self, namespace: Option<&str>, name: &str) -> Result<T>;

    async fn create<T: Object>(&self, namespace: Option<&str>, object: &T) -> Result<T>;

    async fn update<T: Object>(&self, namespace: Option<&str>, object: &T) -> Result<T>;

    async fn delete<T: Object>(&self, namespace: Option<&str>, name: &str) -> Result<()>;

    async fn list<T: Object>(&self, namespace: Option<&str>, options: &ListOptions) -> Result<Vec<T>>;

    async fn watch<T: Object>(
        &self,
        namespace: Option<&str>,
        options: &ListOptions,
    ) -> Result<WatchStream<T>>;
}
