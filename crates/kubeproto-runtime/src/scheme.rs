//! Type registry
//!
//! A `Scheme` is an explicit value: generated `add_to_scheme` functions
//! populate it, consumers hold it by reference. Registration order does not
//! matter; lookups iterate in key order.

use std::any::{TypeId, type_name};
use std::collections::BTreeMap;

use crate::error::{Result, RuntimeError};
use crate::object::{Object, ObjectList};

#[derive(Debug, Clone, Copy)]
struct KnownType {
    type_id: TypeId,
    type_name: &'static str,
    list: bool,
}

/// Registry of group/version/kind -> Rust type
#[derive(Debug, Default)]
pub struct Scheme {
    types: BTreeMap<(String, String, String), KnownType>,
}

impl Scheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a Kind
    ///
    /// Registering the same type twice is a no-op; registering a different
    /// type under a taken group/version/kind is an error.
    pub fn add_known_type<T: Object>(&mut self) -> Result<()> {
        let r = T::RESOURCE;
        self.insert::<T>(r.group, r.version, r.kind.to_string(), false)
    }

    /// Register the List paired with a Kind
    pub fn add_known_list<L: ObjectList>(&mut self) -> Result<()> {
        let r = L::Item::RESOURCE;
        self.insert::<L>(r.group, r.version, format!("{}List", r.kind), true)
    }

    fn insert<T: 'static>(&mut self, group: &str, version: &str, kind: String, list: bool) -> Result<()> {
        let key = (group.to_string(), version.to_string(), kind);
        let known = KnownType {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            list,
        };
        match self.types.get(&key) {
            Some(existing) if existing.type_id == known.type_id => Ok(()),
            Some(existing) => Err(RuntimeError::SchemeConflict {
                gvk: format!("{}/{}/{}", key.0, key.1, key.2),
                registered: existing.type_name,
                attempted: known.type_name,
            }),
            None => {
                self.types.insert(key, known);
                Ok(())
            }
        }
    }

    pub fn recognizes(&self, group: &str, version: &str, kind: &str) -> bool {
        self.types
            .contains_key(&(group.to_string(), version.to_string(), kind.to_string()))
    }

    /// Rust type name registered for a group/version/kind
    pub fn type_name(&self, group: &str, version: &str, kind: &str) -> Option<&'static str> {
        self.types
            .get(&(group.to_string(), version.to_string(), kind.to_string()))
            .map(|k| k.type_name)
    }

    /// Registered Kinds (lists excluded) of one group/version, sorted
    pub fn kinds_for(&self, group: &str, version: &str) -> Vec<&str> {
        self.types
            .iter()
            .filter(|((g, v, _), known)| g == group && v == version && !known.list)
            .map(|((_, _, k), _)| k.as_str())
            .collect()
    }

    /// Registered group/versions, sorted and deduplicated
    pub fn group_versions(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = self
            .types
            .keys()
            .map(|(g, v, _)| (g.as_str(), v.as_str()))
            .collect();
        out.dedup();
        out
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
