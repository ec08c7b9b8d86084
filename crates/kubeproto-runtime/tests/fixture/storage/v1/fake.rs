// Code generated by kubeproto. DO NOT EDIT.
// Package: storage.v1

use super::client::*;
use super::types::*;

pub type FakeStorageV1Client = StorageV1Client<kubeproto_runtime::FakeBackend>;

/// Any object of storage.example.dev/v1, for seeding
#[derive(Clone, Debug)]
pub enum StorageV1Object {
    Bucket(Bucket),
    Tenant(Tenant),
}

impl From<Bucket> for StorageV1Object {
    fn from(object: Bucket) -> Self {
        Self::Bucket(object)
    }
}

impl From<Tenant> for StorageV1Object {
    fn from(object: Tenant) -> Self {
        Self::Tenant(object)
    }
}

/// A client over an in-memory tracker seeded with `objects`
pub fn new_fake_storage_v1_client(
    objects: impl IntoIterator<Item = StorageV1Object>,
) -> kubeproto_runtime::Result<FakeStorageV1Client> {
    let client = StorageV1Client::new(kubeproto_runtime::FakeBackend::new());
    for object in objects {
        match object {
            StorageV1Object::Bucket(o) => client.seed_bucket(o)?,
            StorageV1Object::Tenant(o) => client.seed_tenant(o)?,
        }
    }
    Ok(client)
}

impl StorageV1Client<kubeproto_runtime::FakeBackend> {
    pub fn fake(&self) -> &kubeproto_runtime::FakeBackend {
        self.backend()
    }

    pub fn seed_bucket(&self, object: Bucket) -> kubeproto_runtime::Result<()> {
        self.backend().tracker().add(&object)
    }

    pub fn seed_tenant(&self, object: Tenant) -> kubeproto_runtime::Result<()> {
        self.backend().tracker().add(&object)
    }
}
