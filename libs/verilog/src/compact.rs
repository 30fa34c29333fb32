//! Connectivity compaction.
//!
//! Given the pins of one port of one instance, in port-bit order,
//! rebuild the most compact textual reference to the wires they
//! connect to.

use itertools::Itertools;
use snir::{Definition, Wire};

use crate::escape_name;

/// Produces the minimal reference to the wires connected to `pins`, or
/// [`None`] if every pin is unconnected.
///
/// `pins` are one port's pins in port-bit order; `parent` is the
/// definition that owns the cables being referenced.
///
/// Connected wires are partitioned into maximal runs sharing a cable.
/// Each run becomes the bare cable name when its extent covers the
/// cable's full width (position within the cable is irrelevant, only
/// the extent), `name[i]` for a single bit, and `name[high:low]`
/// otherwise. Indices are displayed in the cable's coordinate space
/// (position plus the cable's lowest declared index), high end first
/// regardless of the cable's own index direction. Multiple runs are
/// wrapped in a brace-delimited concatenation in port-bit order; a
/// single run is emitted unwrapped.
///
/// # Panics
///
/// Panics if a wire's cable handle does not resolve in `parent`.
pub fn compact_connection(parent: &Definition, pins: &[Option<Wire>]) -> Option<String> {
    let wires: Vec<Wire> = pins.iter().copied().flatten().collect();
    if wires.is_empty() {
        return None;
    }

    let mut fragments = Vec::new();
    for (cable_id, run) in &wires.iter().group_by(|wire| wire.cable) {
        let cable = parent.cable(cable_id);
        let (low, high) = run
            .map(|wire| wire.index)
            .minmax()
            .into_option()
            .expect("run is nonempty");
        let name = escape_name(cable.name());
        fragments.push(if high - low + 1 == cable.bits() {
            name.into_owned()
        } else if low == high {
            format!("{}[{}]", name, low + cable.lower())
        } else {
            format!("{}[{}:{}]", name, high + cable.lower(), low + cable.lower())
        });
    }

    Some(if fragments.len() == 1 {
        fragments.pop().expect("one fragment")
    } else {
        format!("{{{}}}", fragments.join(","))
    })
}
