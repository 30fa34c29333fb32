//! A library for enforcing scoped name uniqueness.
//!
//! A [`Namespace`] records which name belongs to which element handle
//! within a single naming scope. Callers consult it before accepting a
//! rename ([`Namespace::no_conflict`]) and notify it after a rename is
//! applied ([`Namespace::update`]) or a name is cleared
//! ([`Namespace::remove`]). The namespace never mutates the elements it
//! tracks; it only observes.

#![warn(missing_docs)]

use std::collections::HashMap;
use std::hash::Hash;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

/// A policy deciding which strings are legal names.
///
/// Validity is independent of uniqueness: a valid name may still
/// conflict with an existing registration, and vice versa.
pub trait NamePolicy {
    /// Returns `true` if `value` is a legal name for the given key.
    fn is_name_valid(&self, key: &str, value: &str) -> bool;
}

/// The default naming policy: every string is a legal name.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct DefaultPolicy;

impl NamePolicy for DefaultPolicy {
    #[inline]
    fn is_name_valid(&self, _key: &str, _value: &str) -> bool {
        true
    }
}

/// A registry of names within one naming scope.
///
/// Each handle of type `K` owns at most one name, and each name is
/// owned by at most one handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace<K: Hash + Eq> {
    names: HashMap<ArcStr, K>,
    assignments: HashMap<K, ArcStr>,
}

impl<K: Hash + Eq> Default for Namespace<K> {
    fn default() -> Self {
        Self {
            names: HashMap::new(),
            assignments: HashMap::new(),
        }
    }
}

impl<K: Copy + Hash + Eq> Namespace<K> {
    /// Creates a new, empty namespace.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns `false` iff `name` is already registered to a handle
    /// other than `id`.
    ///
    /// Registering a handle under its own current name is never a
    /// conflict.
    pub fn no_conflict(&self, id: K, name: &str) -> bool {
        match self.names.get(name) {
            Some(&owner) => owner == id,
            None => true,
        }
    }

    /// Registers `name → id`, releasing any name previously registered
    /// to `id`.
    ///
    /// Call this only after [`Namespace::no_conflict`] has accepted the
    /// write; updating with a name owned by a different handle steals
    /// the registration.
    pub fn update(&mut self, id: K, name: impl Into<ArcStr>) {
        let name = name.into();
        if let Some(old) = self.assignments.remove(&id) {
            self.names.remove(&old);
        }
        self.names.insert(name.clone(), id);
        self.assignments.insert(id, name);
    }

    /// Removes the registration of `id`, if any.
    pub fn remove(&mut self, id: K) {
        if let Some(old) = self.assignments.remove(&id) {
            self.names.remove(&old);
        }
    }

    /// Returns the name currently registered to `id`, if any.
    pub fn name(&self, id: K) -> Option<ArcStr> {
        self.assignments.get(&id).cloned()
    }

    /// Returns `true` if any handle is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// The number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no names are registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
