//! Backend talking to a Kubernetes API server
//!
//! Objects travel as `DynamicObject` through an `ApiResource` built from the
//! type's [`ResourceInfo`](crate::ResourceInfo), so no discovery round-trip
//! is needed.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use kube::Client;
use kube::api::{Api, DeleteParams, DynamicObject, ListParams, PostParams, WatchParams};
use kube::core::WatchEvent as KubeWatchEvent;
use tracing::debug;

use crate::backend::{Backend, ListOptions, WatchEvent, WatchStream};
use crate::error::{Result, RuntimeError};
use crate::object::Object;

#[derive(Clone)]
pub struct RestBackend {
    client: Client,
}

impl RestBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect with the default kubeconfig / in-cluster configuration
    pub async fn try_default() -> Result<Self> {
        Ok(Self::new(Client::try_default().await?))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn api<T: Object>(&self, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = T::RESOURCE.api_resource();
        match namespace {
            Some(ns) if T::RESOURCE.namespaced => {
                Api::namespaced_with(self.client.clone(), ns, &resource)
            }
            _ => Api::all_with(self.client.clone(), &resource),
        }
    }
}

fn to_dynamic<T: Object>(object: &T) -> Result<DynamicObject> {
    let object = object.clone().with_type_meta();
    Ok(serde_json::from_value(serde_json::to_value(&object)?)?)
}

fn from_dynamic<T: Object>(object: DynamicObject) -> Result<T> {
    Ok(serde_json::from_value(serde_json::to_value(&object)?)?)
}

fn name_of<T: Object>(object: &T) -> Result<&str> {
    match object.name() {
        "" => Err(RuntimeError::MissingName {
            kind: T::RESOURCE.kind.to_string(),
        }),
        name => Ok(name),
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn get<T: Object>(&self, namespace: Option<&str>, name: &str) -> Result<T> {
        debug!(kind = T::RESOURCE.kind, name, "get");
        from_dynamic(self.api::<T>(namespace).get(name).await?)
    }

    async fn create<T: Object>(&self, namespace: Option<&str>, object: &T) -> Result<T> {
        let namespace = namespace.or(object.namespace());
        let created = self
            .api::<T>(namespace)
            .create(&PostParams::default(), &to_dynamic(object)?)
            .await?;
        from_dynamic(created)
    }

    async fn update<T: Object>(&self, namespace: Option<&str>, object: &T) -> Result<T> {
        let namespace = namespace.or(object.namespace());
        let name = name_of(object)?;
        let replaced = self
            .api::<T>(namespace)
            .replace(name, &PostParams::default(), &to_dynamic(object)?)
            .await?;
        from_dynamic(replaced)
    }

    async fn delete<T: Object>(&self, namespace: Option<&str>, name: &str) -> Result<()> {
        self.api::<T>(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }

    async fn list<T: Object>(&self, namespace: Option<&str>, options: &ListOptions) -> Result<Vec<T>> {
        let mut params = ListParams::default();
        params.label_selector = options.label_selector.clone();
        params.field_selector = options.field_selector.clone();
        params.limit = options.limit;

        let list = self.api::<T>(namespace).list(&params).await?;
        list.items.into_iter().map(from_dynamic).collect()
    }

    async fn watch<T: Object>(
        &self,
        namespace: Option<&str>,
        options: &ListOptions,
    ) -> Result<WatchStream<T>> {
        let mut params = WatchParams::default();
        params.label_selector = options.label_selector.clone();
        params.field_selector = options.field_selector.clone();

        let stream = self.api::<T>(namespace).watch(&params, "0").await?;
        Ok(stream
            .map_err(RuntimeError::from)
            .try_filter_map(|event| async move {
                Ok(match event {
                    KubeWatchEvent::Added(o) => Some(WatchEvent::Added(from_dynamic(o)?)),
                    KubeWatchEvent::Modified(o) => Some(WatchEvent::Modified(from_dynamic(o)?)),
                    KubeWatchEvent::Deleted(o) => Some(WatchEvent::Deleted(from_dynamic(o)?)),
                    KubeWatchEvent::Bookmark(_) => None,
                    KubeWatchEvent::Error(e) => return Err(RuntimeError::Watch(e.message)),
                })
            })
            .boxed())
    }
}
