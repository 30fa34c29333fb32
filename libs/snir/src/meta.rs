//! Typed element metadata.
//!
//! Every IR element carries an ordered string-keyed metadata map. On the
//! wire, keys are dotted strings (`.NAME`, `VERILOG.parameters.WIDTH`).
//! They are decoded once, at the boundary, into [`MetaKey`] so that the
//! rest of the workspace never does ad hoc string splitting.

use std::fmt::{self, Display, Formatter};

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The dotted form of the reserved name key.
pub const NAME_KEY: &str = ".NAME";

/// The dotted prefix under which all target-format-specific keys live.
pub const VERILOG_PREFIX: &str = "VERILOG";

/// A decoded metadata key.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum MetaKey {
    /// The reserved display-name key (`.NAME`).
    Name,
    /// Marks a definition as a primitive/black box (`VERILOG.primitive`).
    ///
    /// Primitive definitions are never emitted as module bodies.
    Primitive,
    /// An attribute annotation on an instance (`VERILOG.attribute.<name>`).
    ///
    /// Emitted as `(* name = value *)`, or `(* name *)` when the entry
    /// has no value.
    Attribute(ArcStr),
    /// A parameter binding on an instance (`VERILOG.parameters.<name>`).
    Parameter(ArcStr),
    /// A constituent of a renamed port group, tagged with its position
    /// (`VERILOG.port_rename.<position>`).
    ///
    /// The positions of a group must form a contiguous range starting
    /// at zero.
    PortRename(usize),
    /// Marks a port as belonging to some rename group
    /// (`VERILOG.port_rename_member`), excluding it from the port list.
    PortRenameMember,
    /// Requests an `assign` statement for the named net
    /// (`VERILOG.assignment.<name>`) when attached to a cable.
    ///
    /// Presence of the key alone requests the statement; a value
    /// carried by the entry is ignored.
    Assignment(ArcStr),
    /// A key this workspace attaches no meaning to.
    Other(ArcStr),
}

impl MetaKey {
    /// Decodes a dotted string key.
    ///
    /// Never fails: unrecognized keys (including malformed positions in
    /// `VERILOG.port_rename.<position>`) decode to [`MetaKey::Other`].
    pub fn parse(key: &str) -> Self {
        if key == NAME_KEY {
            return Self::Name;
        }
        if let Some(rest) = key.strip_prefix(VERILOG_PREFIX).and_then(|r| r.strip_prefix('.')) {
            match rest {
                "primitive" => return Self::Primitive,
                "port_rename_member" => return Self::PortRenameMember,
                _ => (),
            }
            if let Some(name) = rest.strip_prefix("attribute.") {
                return Self::Attribute(name.into());
            }
            if let Some(name) = rest.strip_prefix("parameters.") {
                return Self::Parameter(name.into());
            }
            if let Some(name) = rest.strip_prefix("assignment.") {
                return Self::Assignment(name.into());
            }
            if let Some(position) = rest.strip_prefix("port_rename.") {
                if let Ok(position) = position.parse() {
                    return Self::PortRename(position);
                }
            }
        }
        Self::Other(key.into())
    }
}

impl Display for MetaKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "{}", NAME_KEY),
            Self::Primitive => write!(f, "{}.primitive", VERILOG_PREFIX),
            Self::Attribute(name) => write!(f, "{}.attribute.{}", VERILOG_PREFIX, name),
            Self::Parameter(name) => write!(f, "{}.parameters.{}", VERILOG_PREFIX, name),
            Self::PortRename(position) => {
                write!(f, "{}.port_rename.{}", VERILOG_PREFIX, position)
            }
            Self::PortRenameMember => write!(f, "{}.port_rename_member", VERILOG_PREFIX),
            Self::Assignment(name) => write!(f, "{}.assignment.{}", VERILOG_PREFIX, name),
            Self::Other(key) => write!(f, "{}", key),
        }
    }
}

/// An ordered metadata map.
///
/// Entries iterate in insertion order. Values are optional: flag-like
/// keys ([`MetaKey::Primitive`], [`MetaKey::PortRenameMember`]) are
/// present-or-absent and carry no value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaMap {
    entries: IndexMap<MetaKey, Option<ArcStr>>,
}

impl MetaMap {
    /// Creates a new, empty metadata map.
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets `key` to the given value, preserving its position if the
    /// key is already present.
    pub fn set(&mut self, key: MetaKey, value: impl Into<ArcStr>) {
        self.entries.insert(key, Some(value.into()));
    }

    /// Sets `key` with no value.
    pub fn set_flag(&mut self, key: MetaKey) {
        self.entries.insert(key, None);
    }

    /// Removes `key`, returning its value if the key was present.
    pub fn remove(&mut self, key: &MetaKey) -> Option<ArcStr> {
        self.entries.shift_remove(key).flatten()
    }

    /// Returns `true` if `key` is present (with or without a value).
    #[inline]
    pub fn contains(&self, key: &MetaKey) -> bool {
        self.entries.contains_key(key)
    }

    /// The value stored under `key`, if the key is present and carries
    /// one.
    pub fn value(&self, key: &MetaKey) -> Option<&ArcStr> {
        self.entries.get(key).and_then(|v| v.as_ref())
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&MetaKey, Option<&ArcStr>)> {
        self.entries.iter().map(|(k, v)| (k, v.as_ref()))
    }

    /// The number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_dotted_form() {
        let keys = [
            MetaKey::Name,
            MetaKey::Primitive,
            MetaKey::Attribute("keep_hierarchy".into()),
            MetaKey::Parameter("WIDTH".into()),
            MetaKey::PortRename(3),
            MetaKey::PortRenameMember,
            MetaKey::Assignment("n0".into()),
            MetaKey::Other("EDIF.identifier".into()),
        ];
        for key in keys {
            assert_eq!(MetaKey::parse(&key.to_string()), key);
        }
    }

    #[test]
    fn malformed_position_decodes_to_other() {
        assert_eq!(
            MetaKey::parse("VERILOG.port_rename.first"),
            MetaKey::Other("VERILOG.port_rename.first".into())
        );
    }

    #[test]
    fn map_preserves_insertion_order() {
        let mut meta = MetaMap::new();
        meta.set(MetaKey::Parameter("B".into()), "1");
        meta.set(MetaKey::Parameter("A".into()), "2");
        meta.set_flag(MetaKey::Primitive);
        let keys: Vec<_> = meta.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            keys,
            vec![
                MetaKey::Parameter("B".into()),
                MetaKey::Parameter("A".into()),
                MetaKey::Primitive,
            ]
        );
        assert!(meta.contains(&MetaKey::Primitive));
        assert_eq!(meta.value(&MetaKey::Primitive), None);
    }
}
