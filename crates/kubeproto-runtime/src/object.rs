//! Object and list contracts implemented by generated Kinds

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ListMeta, ObjectMeta};
use kube::core::{ApiResource, GroupVersionKind, TypeMeta};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::deepcopy::DeepCopy;

/// Static identity of a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceInfo {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
    pub namespaced: bool,
}

impl ResourceInfo {
    /// `group/version`, or `version` for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Stable registry key: `group/version/Kind`
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.group, self.version, self.kind)
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(self.group, self.version, self.kind)
    }

    pub fn type_meta(&self) -> TypeMeta {
        TypeMeta {
            api_version: self.api_version(),
            kind: self.kind.to_string(),
        }
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.to_string(),
            version: self.version.to_string(),
            api_version: self.api_version(),
            kind: self.kind.to_string(),
            plural: self.plural.to_string(),
        }
    }
}

/// A top-level API object
pub trait Object:
    DeepCopy + Clone + Default + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const RESOURCE: ResourceInfo;

    fn type_meta(&self) -> &TypeMeta;
    fn type_meta_mut(&mut self) -> &mut TypeMeta;
    fn metadata(&self) -> &ObjectMeta;
    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    fn namespace(&self) -> Option<&str> {
        self.metadata().namespace.as_deref()
    }

    fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata().labels.as_ref()
    }

    /// Fill `apiVersion`/`kind` from [`Object::RESOURCE`]
    fn with_type_meta(mut self) -> Self {
        *self.type_meta_mut() = Self::RESOURCE.type_meta();
        self
    }
}

/// The List wrapper paired with a Kind
pub trait ObjectList:
    DeepCopy + Clone + Default + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Item: Object;

    fn list_meta(&self) -> &ListMeta;
    fn items(&self) -> &[Self::Item];
    fn into_items(self) -> Vec<Self::Item>;
    fn from_items(items: Vec<Self::Item>) -> Self;

    /// `{Kind}List` registry key
    fn key() -> String {
        let r = Self::Item::RESOURCE;
        format!("{}/{}/{}List", r.group, r.version, r.kind)
    }
}
