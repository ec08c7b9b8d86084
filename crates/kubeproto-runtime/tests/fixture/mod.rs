//! Generator output for a small storage API, as checked in
//!
//! `storage/v1/` holds what `kubeproto types|deepcopy|client|fake` emits for
//! `storage.example.dev/v1`, byte for byte. The codegen backend tests
//! regenerate it and fail when it drifts.

#![allow(dead_code)]

#[path = "storage/v1/types.rs"]
pub mod types;

#[path = "storage/v1/deepcopy.rs"]
pub mod deepcopy;

#[path = "storage/v1/client.rs"]
pub mod client;

#[path = "storage/v1/fake.rs"]
pub mod fake;

pub use client::*;
pub use fake::*;
pub use types::*;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

pub fn bucket(namespace: &str, name: &str) -> Bucket {
    Bucket {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn labeled_bucket(namespace: &str, name: &str, labels: &[(&str, &str)]) -> Bucket {
    let mut b = bucket(namespace, name);
    b.metadata.labels = Some(
        labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    );
    b
}

pub fn tenant(name: &str) -> Tenant {
    Tenant {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}
