//! Structural Verilog emission for SNIR netlists.
//!
//! The [`Composer`] walks the definitions reachable from a netlist's
//! top instance breadth-first and writes one `module` block per
//! non-primitive definition. Bus connectivity is rebuilt from flat
//! pin-to-wire connections by the [`compact`] module, which produces
//! the shortest valid reference form (bare name, single index, range,
//! or concatenation) for each port binding.

#![warn(missing_docs)]

use std::borrow::Cow;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use snir::Netlist;

pub mod compact;
mod compose;

#[cfg(test)]
pub(crate) mod tests;

pub use compose::{Composer, ComposerError};

/// Escapes an identifier for emission.
///
/// Names beginning with the escape introducer `\` are emitted with a
/// single trailing space, per the escaped-identifier convention; all
/// other names are emitted verbatim.
pub fn escape_name(name: &str) -> Cow<'_, str> {
    if name.starts_with('\\') {
        Cow::Owned(format!("{} ", name))
    } else {
        Cow::Borrowed(name)
    }
}

/// Exports the given netlist to the output stream.
pub fn export_netlist<W: Write>(netlist: &Netlist, out: &mut W) -> Result<(), ComposerError> {
    Composer::new(netlist, out).export()
}

/// Exports the given netlist to a file, creating parent directories as
/// needed.
pub fn export_netlist_to_file<P: AsRef<Path>>(
    netlist: &Netlist,
    path: P,
) -> Result<(), ComposerError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut f = BufWriter::new(fs::File::create(path)?);
    export_netlist(netlist, &mut f)
}
