// Code generated by kubeproto. DO NOT EDIT.
// Package: storage.v1

use super::types::*;
use std::sync::Arc;

/// Typed client for storage.example.dev/v1
#[derive(Clone)]
pub struct StorageV1Client<B: kubeproto_runtime::Backend> {
    backend: B,
}

impl<B: kubeproto_runtime::Backend> StorageV1Client<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn get_bucket(&self, namespace: &str, name: &str) -> kubeproto_runtime::Result<Bucket> {
        self.backend.get::<Bucket>(Some(namespace), name).await
    }

    pub async fn create_bucket(&self, namespace: &str, object: &Bucket) -> kubeproto_runtime::Result<Bucket> {
        self.backend.create(Some(namespace), object).await
    }

    pub async fn update_bucket(&self, namespace: &str, object: &Bucket) -> kubeproto_runtime::Result<Bucket> {
        self.backend.update(Some(namespace), object).await
    }

    pub async fn delete_bucket(&self, namespace: &str, name: &str) -> kubeproto_runtime::Result<()> {
        self.backend.delete::<Bucket>(Some(namespace), name).await
    }

    pub async fn list_buckets(
        &self,
        namespace: Option<&str>,
        options: &kubeproto_runtime::ListOptions,
    ) -> kubeproto_runtime::Result<BucketList> {
        let items = self.backend.list::<Bucket>(namespace, options).await?;
        Ok(<BucketList as kubeproto_runtime::ObjectList>::from_items(items))
    }

    pub async fn watch_buckets(
        &self,
        namespace: Option<&str>,
        options: &kubeproto_runtime::ListOptions,
    ) -> kubeproto_runtime::Result<kubeproto_runtime::WatchStream<Bucket>> {
        self.backend.watch::<Bucket>(namespace, options).await
    }

    pub async fn get_tenant(&self, name: &str) -> kubeproto_runtime::Result<Tenant> {
        self.backend.get::<Tenant>(None, name).await
    }

    pub async fn create_tenant(&self, object: &Tenant) -> kubeproto_runtime::Result<Tenant> {
        self.backend.create(None, object).await
    }

    pub async fn update_tenant(&self, object: &Tenant) -> kubeproto_runtime::Result<Tenant> {
        self.backend.update(None, object).await
    }

    pub async fn delete_tenant(&self, name: &str) -> kubeproto_runtime::Result<()> {
        self.backend.delete::<Tenant>(None, name).await
    }

    pub async fn list_tenants(
        &self,
        options: &kubeproto_runtime::ListOptions,
    ) -> kubeproto_runtime::Result<TenantList> {
        let items = self.backend.list::<Tenant>(None, options).await?;
        Ok(<TenantList as kubeproto_runtime::ObjectList>::from_items(items))
    }

    pub async fn watch_tenants(
        &self,
        options: &kubeproto_runtime::ListOptions,
    ) -> kubeproto_runtime::Result<kubeproto_runtime::WatchStream<Tenant>> {
        self.backend.watch::<Tenant>(None, options).await
    }
}

impl StorageV1Client<kubeproto_runtime::RestBackend> {
    pub fn from_client(client: kube::Client) -> Self {
        Self::new(kubeproto_runtime::RestBackend::new(client))
    }

    pub async fn try_default() -> kubeproto_runtime::Result<Self> {
        Ok(Self::new(kubeproto_runtime::RestBackend::try_default().await?))
    }
}

/// Shared informer for Bucket
#[derive(Clone)]
pub struct BucketInformer {
    informer: Arc<kubeproto_runtime::Informer<Bucket>>,
}

impl BucketInformer {
    pub fn new<B: kubeproto_runtime::Backend>(factory: &kubeproto_runtime::SharedInformerFactory<B>) -> Self {
        Self {
            informer: factory.informer_for::<Bucket>(),
        }
    }

    pub fn informer(&self) -> &Arc<kubeproto_runtime::Informer<Bucket>> {
        &self.informer
    }

    pub fn lister(&self) -> BucketLister {
        BucketLister {
            lister: self.informer.lister(),
        }
    }

    pub fn has_synced(&self) -> bool {
        self.informer.has_synced()
    }
}

/// Cached reads of Bucket
#[derive(Clone)]
pub struct BucketLister {
    lister: kubeproto_runtime::Lister<Bucket>,
}

impl BucketLister {
    pub fn get(&self, namespace: &str, name: &str) -> Option<Bucket> {
        self.lister.get(Some(namespace), name)
    }

    pub fn list(&self, selector: &kubeproto_runtime::LabelSelector) -> Vec<Bucket> {
        self.lister.list(selector)
    }

    pub fn list_namespace(&self, namespace: &str, selector: &kubeproto_runtime::LabelSelector) -> Vec<Bucket> {
        self.lister.list_namespace(namespace, selector)
    }
}

/// Shared informer for Tenant
#[derive(Clone)]
pub struct TenantInformer {
    informer: Arc<kubeproto_runtime::Informer<Tenant>>,
}

impl TenantInformer {
    pub fn new<B: kubeproto_runtime::Backend>(factory: &kubeproto_runtime::SharedInformerFactory<B>) -> Self {
        Self {
            informer: factory.informer_for::<Tenant>(),
        }
    }

    pub fn informer(&self) -> &Arc<kubeproto_runtime::Informer<Tenant>> {
        &self.informer
    }

    pub fn lister(&self) -> TenantLister {
        TenantLister {
            lister: self.informer.lister(),
        }
    }

    pub fn has_synced(&self) -> bool {
        self.informer.has_synced()
    }
}

/// Cached reads of Tenant
#[derive(Clone)]
pub struct TenantLister {
    lister: kubeproto_runtime::Lister<Tenant>,
}

impl TenantLister {
    pub fn get(&self, name: &str) -> Option<Tenant> {
        self.lister.get(None, name)
    }

    pub fn list(&self, selector: &kubeproto_runtime::LabelSelector) -> Vec<Tenant> {
        self.lister.list(selector)
    }
}
