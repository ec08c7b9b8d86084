//! Well-known foreign types injected as virtual messages
//!
//! These have no local descriptor requirement: a proto file may import
//! `k8s.io/apimachinery/pkg/apis/meta/v1/generated.proto` or not, and the
//! fields still resolve.

use crate::namespace::{KUBE_CORE_MODULE, METAV1_MODULE};

/// Proto package of the apimachinery meta/v1 types
pub const METAV1_PACKAGE: &str = "k8s.io.apimachinery.pkg.apis.meta.v1";

pub const TYPE_META: &str = "k8s.io.apimachinery.pkg.apis.meta.v1.TypeMeta";
pub const OBJECT_META: &str = "k8s.io.apimachinery.pkg.apis.meta.v1.ObjectMeta";
pub const LIST_META: &str = "k8s.io.apimachinery.pkg.apis.meta.v1.ListMeta";
pub const TIME: &str = "k8s.io.apimachinery.pkg.apis.meta.v1.Time";
pub const MICRO_TIME: &str = "k8s.io.apimachinery.pkg.apis.meta.v1.MicroTime";
pub const LABEL_SELECTOR: &str = "k8s.io.apimachinery.pkg.apis.meta.v1.LabelSelector";

/// How a virtual type appears in generated schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualShape {
    /// Opaque object with its own schema upstream
    Object,
    /// RFC 3339 timestamp serialized as a string
    DateTime,
}

/// A virtual message definition
#[derive(Debug, Clone, Copy)]
pub struct WellKnownType {
    pub proto_name: &'static str,
    pub module_path: &'static str,
    pub rust_name: &'static str,
    /// Holds no owned references; a clone is already a deep copy
    pub plain: bool,
    pub shape: VirtualShape,
}

impl WellKnownType {
    pub fn short_name(&self) -> &'static str {
        self.proto_name
            .rsplit('.')
            .next()
            .unwrap_or(self.proto_name)
    }
}

pub const WELL_KNOWN_TYPES: &[WellKnownType] = &[
    WellKnownType {
        proto_name: TYPE_META,
        module_path: KUBE_CORE_MODULE,
        rust_name: "TypeMeta",
        plain: true,
        shape: VirtualShape::Object,
    },
    WellKnownType {
        proto_name: OBJECT_META,
        module_path: METAV1_MODULE,
        rust_name: "ObjectMeta",
        plain: false,
        shape: VirtualShape::Object,
    },
    WellKnownType {
        proto_name: LIST_META,
        module_path: METAV1_MODULE,
        rust_name: "ListMeta",
        plain: false,
        shape: VirtualShape::Object,
    },
    WellKnownType {
        proto_name: TIME,
        module_path: METAV1_MODULE,
        rust_name: "Time",
        plain: true,
        shape: VirtualShape::DateTime,
    },
    WellKnownType {
        proto_name: MICRO_TIME,
        module_path: METAV1_MODULE,
        rust_name: "MicroTime",
        plain: true,
        shape: VirtualShape::DateTime,
    },
    WellKnownType {
        proto_name: LABEL_SELECTOR,
        module_path: METAV1_MODULE,
        rust_name: "LabelSelector",
        plain: false,
        shape: VirtualShape::Object,
    },
];

/// Look up a virtual type by fully-qualified proto name (leading dot optional)
pub fn lookup(proto_name: &str) -> Option<&'static WellKnownType> {
    let name = proto_name.trim_start_matches('.');
    WELL_KNOWN_TYPES.iter().find(|t| t.proto_name == name)
}
