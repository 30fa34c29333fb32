//! Scoped name-uniqueness checking.
//!
//! Two complementary checkers guard the IR's naming invariants:
//!
//! - The stateless scan ([`no_name_conflicts`], [`is_compliant`]) walks
//!   one naming scope right now. It is O(children) per call and keeps
//!   no state, so it is cheap to invoke ad hoc.
//! - The stateful registries ([`NetlistNamespace`],
//!   [`LibraryNamespace`], [`DefinitionNamespace`]) intercept every
//!   name write for O(1) amortized checking over long edit sessions,
//!   where re-scanning on each mutation would be quadratic.
//!
//! The two agree: any write the registries would refuse, the scan flags
//! as a conflict if it is applied anyway.
//!
//! Registries are plain session-scoped values. Create one per editing
//! session for each scope being mutated; there is no process-wide
//! state and nothing persists across sessions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{span, Level};

pub use namespace::{DefaultPolicy, NamePolicy, Namespace};

use crate::meta::MetaKey;
use crate::{CableId, Definition, DefinitionId, InstanceId, LibraryId, Netlist, PortId};

/// A reference to one naming scope of a netlist.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// The netlist's own scope: its libraries.
    Netlist,
    /// A library's scope: its definitions.
    Library(LibraryId),
    /// A definition's three independent scopes: its ports, cables, and
    /// child instances.
    Definition(DefinitionId),
}

/// A child of a definition, for registry lookups.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DefinitionChild {
    /// A port.
    Port(PortId),
    /// A cable.
    Cable(CableId),
    /// A child instance.
    Instance(InstanceId),
}

/// Checks that no two children of the given scope share a name.
///
/// For a definition, ports, cables, and instances are each checked
/// against their own fresh set, so a port and a cable may share a name.
/// Returns `false` on the first duplicate found in any group.
///
/// # Panics
///
/// Panics if the scope's handle does not resolve.
pub fn no_name_conflicts(netlist: &Netlist, scope: Scope) -> bool {
    let _guard = span!(Level::DEBUG, "checking name conflicts", scope = ?scope).entered();
    match scope {
        Scope::Netlist => all_unique(netlist.libraries().map(|(_, lib)| lib.name().as_str())),
        Scope::Library(id) => {
            all_unique(netlist.definitions_in(id).map(|(_, def)| def.name().as_str()))
        }
        Scope::Definition(id) => {
            let def = netlist.definition(id);
            all_unique(def.ports().map(|(_, p)| p.name().as_str()))
                && all_unique(def.cables().map(|(_, c)| c.name().as_str()))
                && all_unique(def.instances().map(|(_, i)| i.name().as_str()))
        }
    }
}

/// Checks that the element's own name is legal under the given policy
/// and that its children's scopes are conflict-free.
///
/// # Panics
///
/// Panics if the scope's handle does not resolve.
pub fn is_compliant<P: NamePolicy>(policy: &P, netlist: &Netlist, scope: Scope) -> bool {
    let name_valid = match scope {
        Scope::Netlist => netlist
            .name()
            .map(|name| policy.is_name_valid(crate::meta::NAME_KEY, name))
            .unwrap_or(true),
        Scope::Library(id) => {
            policy.is_name_valid(crate::meta::NAME_KEY, netlist.library(id).name())
        }
        Scope::Definition(id) => {
            policy.is_name_valid(crate::meta::NAME_KEY, netlist.definition(id).name())
        }
    };
    name_valid && no_name_conflicts(netlist, scope)
}

fn all_unique<'a>(names: impl Iterator<Item = &'a str>) -> bool {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return false;
        }
    }
    true
}

/// The write-interception registry for a netlist's library scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetlistNamespace {
    /// Library names.
    pub libraries: Namespace<LibraryId>,
}

/// The write-interception registry for a library's definition scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryNamespace {
    /// Definition names.
    pub definitions: Namespace<DefinitionId>,
}

/// The write-interception registry for a definition's three scopes.
///
/// One table per child kind: a write only conflicts with a registrant
/// of the same kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionNamespace {
    /// Port names.
    pub ports: Namespace<PortId>,
    /// Cable names.
    pub cables: Namespace<CableId>,
    /// Child instance names.
    pub instances: Namespace<InstanceId>,
}

impl NetlistNamespace {
    /// Creates a registry seeded with the current library names of the
    /// given netlist.
    pub fn for_netlist(netlist: &Netlist) -> Self {
        let mut libraries = Namespace::new();
        for (id, lib) in netlist.libraries() {
            libraries.update(id, lib.name().clone());
        }
        Self { libraries }
    }

    /// Returns `false` iff this is a name write and the proposed value
    /// is registered to a different library.
    pub fn no_conflict(&self, library: LibraryId, key: &MetaKey, value: &str) -> bool {
        !matches!(key, MetaKey::Name) || self.libraries.no_conflict(library, value)
    }

    /// Records an accepted name write.
    pub fn update(&mut self, library: LibraryId, key: &MetaKey, value: &str) {
        if matches!(key, MetaKey::Name) {
            self.libraries.update(library, value);
        }
    }

    /// Records a name removal.
    pub fn remove(&mut self, library: LibraryId, key: &MetaKey) {
        if matches!(key, MetaKey::Name) {
            self.libraries.remove(library);
        }
    }
}

impl LibraryNamespace {
    /// Creates a registry seeded with the current definition names of
    /// the given library.
    ///
    /// # Panics
    ///
    /// Panics if no library has the given ID.
    pub fn for_library(netlist: &Netlist, library: LibraryId) -> Self {
        let mut definitions = Namespace::new();
        for (id, def) in netlist.definitions_in(library) {
            definitions.update(id, def.name().clone());
        }
        Self { definitions }
    }

    /// Returns `false` iff this is a name write and the proposed value
    /// is registered to a different definition.
    pub fn no_conflict(&self, definition: DefinitionId, key: &MetaKey, value: &str) -> bool {
        !matches!(key, MetaKey::Name) || self.definitions.no_conflict(definition, value)
    }

    /// Records an accepted name write.
    pub fn update(&mut self, definition: DefinitionId, key: &MetaKey, value: &str) {
        if matches!(key, MetaKey::Name) {
            self.definitions.update(definition, value);
        }
    }

    /// Records a name removal.
    pub fn remove(&mut self, definition: DefinitionId, key: &MetaKey) {
        if matches!(key, MetaKey::Name) {
            self.definitions.remove(definition);
        }
    }
}

impl DefinitionNamespace {
    /// Creates a registry seeded with the current port, cable, and
    /// instance names of the given definition.
    pub fn for_definition(def: &Definition) -> Self {
        let mut ns = Self::default();
        for (id, port) in def.ports() {
            ns.ports.update(id, port.name().clone());
        }
        for (id, cable) in def.cables() {
            ns.cables.update(id, cable.name().clone());
        }
        for (id, inst) in def.instances() {
            ns.instances.update(id, inst.name().clone());
        }
        ns
    }

    /// Returns `false` iff this is a name write and the proposed value
    /// is registered to a different child of the same kind.
    pub fn no_conflict(&self, child: DefinitionChild, key: &MetaKey, value: &str) -> bool {
        if !matches!(key, MetaKey::Name) {
            return true;
        }
        match child {
            DefinitionChild::Port(id) => self.ports.no_conflict(id, value),
            DefinitionChild::Cable(id) => self.cables.no_conflict(id, value),
            DefinitionChild::Instance(id) => self.instances.no_conflict(id, value),
        }
    }

    /// Records an accepted name write.
    pub fn update(&mut self, child: DefinitionChild, key: &MetaKey, value: &str) {
        if !matches!(key, MetaKey::Name) {
            return;
        }
        match child {
            DefinitionChild::Port(id) => self.ports.update(id, value),
            DefinitionChild::Cable(id) => self.cables.update(id, value),
            DefinitionChild::Instance(id) => self.instances.update(id, value),
        }
    }

    /// Records a name removal.
    pub fn remove(&mut self, child: DefinitionChild, key: &MetaKey) {
        if !matches!(key, MetaKey::Name) {
            return;
        }
        match child {
            DefinitionChild::Port(id) => self.ports.remove(id),
            DefinitionChild::Cable(id) => self.cables.remove(id),
            DefinitionChild::Instance(id) => self.instances.remove(id),
        }
    }
}
