//! Structural deep copy
//!
//! Generated types implement [`DeepCopy::deep_copy_into`] field by field so
//! that no repeated, optional, map or nested value of the copy shares
//! storage with the source. The metadata types below are plain owned data,
//! so their clone already satisfies that.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    LabelSelector, ListMeta, MicroTime, ObjectMeta, Time,
};
use kube::core::TypeMeta;

pub trait DeepCopy {
    /// Overwrite `out` with a copy of `self` that shares no owned storage
    fn deep_copy_into(&self, out: &mut Self);

    /// A fresh deep copy of `self`
    fn deep_copy(&self) -> Self
    where
        Self: Default,
    {
        let mut out = Self::default();
        self.deep_copy_into(&mut out);
        out
    }
}

macro_rules! deep_copy_by_clone {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DeepCopy for $ty {
                fn deep_copy_into(&self, out: &mut Self) {
                    out.clone_from(self);
                }
            }
        )*
    };
}

deep_copy_by_clone!(TypeMeta, ObjectMeta, ListMeta, LabelSelector, Time, MicroTime);

impl<T: DeepCopy + Clone> DeepCopy for Option<T> {
    fn deep_copy_into(&self, out: &mut Self) {
        match (self, out.as_mut()) {
            (Some(source), Some(target)) => source.deep_copy_into(target),
            (Some(source), None) => {
                let mut target = source.clone();
                source.deep_copy_into(&mut target);
                *out = Some(target);
            }
            (None, _) => *out = None,
        }
    }
}

impl<T: DeepCopy> DeepCopy for Box<T> {
    fn deep_copy_into(&self, out: &mut Self) {
        (**self).deep_copy_into(&mut **out);
    }
}
