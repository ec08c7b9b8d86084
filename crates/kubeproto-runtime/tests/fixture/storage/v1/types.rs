// Code generated by kubeproto. DO NOT EDIT.
// Package: storage.v1

use std::borrow::Cow;
use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kube::core as kubecore;
use serde::{Deserialize, Serialize};

pub const GROUP: &str = "storage.example.dev";
pub const VERSION: &str = "v1";
pub const GROUP_VERSION: &str = "storage.example.dev/v1";

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageClass(pub Cow<'static, str>);

impl StorageClass {
    pub const STANDARD: Self = Self(Cow::Borrowed("Standard"));
    pub const ARCHIVE: Self = Self(Cow::Borrowed("Archive"));

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    #[serde(flatten)]
    pub type_meta: kubecore::TypeMeta,
    #[serde(default)]
    pub metadata: metav1::ObjectMeta,
    #[serde(default)]
    pub spec: BucketSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BucketStatus>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketList {
    #[serde(flatten)]
    pub type_meta: kubecore::TypeMeta,
    #[serde(default)]
    pub metadata: metav1::ListMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Bucket>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Grant>,
    #[serde(rename = "storageClass", default)]
    pub storage_class: StorageClass,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub quotas: BTreeMap<String, Quota>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<Quota>,
    #[serde(default)]
    pub replicas: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketStatus {
    #[serde(rename = "readyReplicas", default)]
    pub ready_replicas: i32,
    #[serde(rename = "lastSync", default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<metav1::Time>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verbs: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    #[serde(rename = "maxBytes", default)]
    pub max_bytes: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    #[serde(flatten)]
    pub type_meta: kubecore::TypeMeta,
    #[serde(default)]
    pub metadata: metav1::ObjectMeta,
    #[serde(default)]
    pub owner: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantList {
    #[serde(flatten)]
    pub type_meta: kubecore::TypeMeta,
    #[serde(default)]
    pub metadata: metav1::ListMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Tenant>,
}

impl kubeproto_runtime::Object for Bucket {
    const RESOURCE: kubeproto_runtime::ResourceInfo = kubeproto_runtime::ResourceInfo {
        group: GROUP,
        version: VERSION,
        kind: "Bucket",
        plural: "buckets",
        namespaced: true,
    };

    fn type_meta(&self) -> &kubecore::TypeMeta {
        &self.type_meta
    }

    fn type_meta_mut(&mut self) -> &mut kubecore::TypeMeta {
        &mut self.type_meta
    }

    fn metadata(&self) -> &metav1::ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut metav1::ObjectMeta {
        &mut self.metadata
    }
}

impl kubeproto_runtime::ObjectList for BucketList {
    type Item = Bucket;

    fn list_meta(&self) -> &metav1::ListMeta {
        &self.metadata
    }

    fn items(&self) -> &[Bucket] {
        &self.items
    }

    fn into_items(self) -> Vec<Bucket> {
        self.items
    }

    fn from_items(items: Vec<Bucket>) -> Self {
        Self {
            type_meta: kubecore::TypeMeta {
                api_version: GROUP_VERSION.to_string(),
                kind: "BucketList".to_string(),
            },
            items,
            ..Default::default()
        }
    }
}

impl kubeproto_runtime::Object for Tenant {
    const RESOURCE: kubeproto_runtime::ResourceInfo = kubeproto_runtime::ResourceInfo {
        group: GROUP,
        version: VERSION,
        kind: "Tenant",
        plural: "tenants",
        namespaced: false,
    };

    fn type_meta(&self) -> &kubecore::TypeMeta {
        &self.type_meta
    }

    fn type_meta_mut(&mut self) -> &mut kubecore::TypeMeta {
        &mut self.type_meta
    }

    fn metadata(&self) -> &metav1::ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut metav1::ObjectMeta {
        &mut self.metadata
    }
}

impl kubeproto_runtime::ObjectList for TenantList {
    type Item = Tenant;

    fn list_meta(&self) -> &metav1::ListMeta {
        &self.metadata
    }

    fn items(&self) -> &[Tenant] {
        &self.items
    }

    fn into_items(self) -> Vec<Tenant> {
        self.items
    }

    fn from_items(items: Vec<Tenant>) -> Self {
        Self {
            type_meta: kubecore::TypeMeta {
                api_version: GROUP_VERSION.to_string(),
                kind: "TenantList".to_string(),
            },
            items,
            ..Default::default()
        }
    }
}

/// Register every Kind and List of storage.example.dev/v1
pub fn add_to_scheme(scheme: &mut kubeproto_runtime::Scheme) -> kubeproto_runtime::Result<()> {
    scheme.add_known_type::<Bucket>()?;
    scheme.add_known_list::<BucketList>()?;
    scheme.add_known_type::<Tenant>()?;
    scheme.add_known_list::<TenantList>()?;
    Ok(())
}
