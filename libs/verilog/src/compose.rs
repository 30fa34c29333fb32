//! The netlist composer.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::io::{self, Write};

use arcstr::ArcStr;
use itertools::Itertools;
use snir::{Cable, Definition, DefinitionId, Instance, MetaKey, Netlist, PortId};
use thiserror::Error;
use tracing::{span, Level};

use crate::compact::compact_connection;
use crate::escape_name;

/// An error produced while composing a netlist.
#[derive(Debug, Error)]
pub enum ComposerError {
    /// The output destination could not be written.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A renamed port group is missing a member at some position.
    ///
    /// Rename positions must form a contiguous range starting at zero.
    #[error("rename group on port `{port}` of definition `{definition}` has no member at position {position}")]
    RenameGap {
        /// The definition whose port list was being written.
        definition: ArcStr,
        /// The externally named port carrying the rename group.
        port: ArcStr,
        /// The first position with no member.
        position: usize,
    },
}

/// The decoded rename groups of one definition.
///
/// `display` maps an externally named port to the substituted binding
/// text; `members` holds the internal ports that belong to some group
/// and are therefore dropped from the port list.
#[derive(Default)]
struct RenameGroups {
    display: HashMap<PortId, String>,
    members: HashSet<PortId>,
}

fn decode_renames(def: &Definition) -> Result<RenameGroups, ComposerError> {
    let mut groups = RenameGroups::default();
    for (id, port) in def.ports() {
        let mut positions: BTreeMap<usize, &ArcStr> = BTreeMap::new();
        for (key, value) in port.meta().iter() {
            match key {
                MetaKey::PortRename(position) => {
                    // Duplicate positions are unrepresentable: the
                    // metadata map is keyed by the decoded key.
                    if let Some(value) = value {
                        positions.insert(*position, value);
                    }
                }
                MetaKey::PortRenameMember => {
                    groups.members.insert(id);
                }
                _ => (),
            }
        }
        if positions.is_empty() {
            continue;
        }
        for (expect, &position) in positions.keys().enumerate() {
            if position != expect {
                return Err(ComposerError::RenameGap {
                    definition: def.name().clone(),
                    port: port.name().clone(),
                    position: expect,
                });
            }
        }
        let display = if positions.len() == 1 {
            escape_name(positions[&0]).into_owned()
        } else {
            format!(
                "{{{}}}",
                positions.values().map(|name| escape_name(name)).join(",")
            )
        };
        groups.display.insert(id, display);
    }
    Ok(groups)
}

/// Writes a netlist to an output stream as structural Verilog.
///
/// The composer only reads the IR; it performs no validation beyond
/// rename-group decoding and trusts the netlist is well-formed.
pub struct Composer<'a, W> {
    netlist: &'a Netlist,
    out: &'a mut W,
}

impl<'a, W> Composer<'a, W> {
    /// Creates a new [`Composer`].
    pub fn new(netlist: &'a Netlist, out: &'a mut W) -> Self {
        Self { netlist, out }
    }
}

impl<'a, W: Write> Composer<'a, W> {
    /// Writes the whole reachable hierarchy below the top instance.
    ///
    /// Definitions are visited breadth-first from the top instance's
    /// definition and each reachable definition is emitted exactly
    /// once, in discovery order. A netlist with no top instance
    /// produces a header-only output with a warning marker; this is not
    /// an error.
    pub fn export(mut self) -> Result<(), ComposerError> {
        let _guard = span!(Level::INFO, "composing netlist").entered();
        self.write_header()?;
        let Some(top) = self.netlist.top() else {
            tracing::warn!("netlist has no top instance; writing header-only output");
            writeln!(self.out, "// top instance is none.")?;
            self.out.flush()?;
            return Ok(());
        };
        writeln!(self.out, "(* STRUCTURAL_NETLIST = \"yes\" *)")?;

        let mut written: HashSet<DefinitionId> = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(top.definition());
        while let Some(id) = queue.pop_front() {
            if !written.insert(id) {
                continue;
            }
            let def = self.netlist.definition(id);
            for (_, inst) in def.instances() {
                if !written.contains(&inst.definition()) {
                    queue.push_back(inst.definition());
                }
            }
            self.write_definition(def)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.out, "////////////////////////////////////////")?;
        writeln!(self.out, "// Generated by the SNIR Verilog composer")?;
        if let Some(name) = self.netlist.name() {
            writeln!(self.out, "// Netlist: {}", name)?;
        }
        writeln!(self.out, "////////////////////////////////////////")
    }

    fn write_definition(&mut self, def: &Definition) -> Result<(), ComposerError> {
        if def.is_primitive() {
            tracing::debug!(definition = %def.name(), "skipping primitive definition");
            return Ok(());
        }
        let renames = decode_renames(def)?;
        self.write_port_list(def, &renames)?;
        self.write_port_declarations(def, &renames)?;
        for (_, cable) in def.cables() {
            self.write_cable(cable)?;
        }
        for (_, inst) in def.instances() {
            self.write_instantiation(def, inst)?;
        }
        for (_, cable) in def.cables() {
            self.write_assignments(cable)?;
        }
        writeln!(self.out, "endmodule")?;
        Ok(())
    }

    fn write_port_list(&mut self, def: &Definition, renames: &RenameGroups) -> io::Result<()> {
        writeln!(self.out, "module {} (", escape_name(def.name()))?;
        let mut first = true;
        for (id, port) in def.ports() {
            if renames.members.contains(&id) {
                continue;
            }
            if !first {
                writeln!(self.out, ",")?;
            }
            first = false;
            if let Some(display) = renames.display.get(&id) {
                write!(self.out, "    .{}({})", escape_name(port.name()), display)?;
            } else {
                write!(self.out, "    {}", escape_name(port.name()))?;
            }
        }
        writeln!(self.out)?;
        writeln!(self.out, ");")
    }

    fn write_port_declarations(
        &mut self,
        def: &Definition,
        renames: &RenameGroups,
    ) -> io::Result<()> {
        // Aliased ports are a naming fiction; their members carry the
        // declarations.
        for (id, port) in def.ports() {
            if renames.display.contains_key(&id) {
                continue;
            }
            write!(self.out, "{} ", port.direction())?;
            if let Some((left, right)) = port.range() {
                write!(self.out, "[{}:{}] ", left, right)?;
            }
            writeln!(self.out, "{};", escape_name(port.name()))?;
        }
        Ok(())
    }

    fn write_cable(&mut self, cable: &Cable) -> io::Result<()> {
        write!(self.out, "wire ")?;
        if let Some((left, right)) = cable.range() {
            write!(self.out, "[{}:{}] ", left, right)?;
        }
        writeln!(self.out, "{};", escape_name(cable.name()))
    }

    fn write_instantiation(&mut self, parent: &Definition, inst: &Instance) -> io::Result<()> {
        let mut parameters: Vec<(&ArcStr, &ArcStr)> = Vec::new();
        for (key, value) in inst.meta().iter() {
            match key {
                MetaKey::Attribute(name) => match value {
                    Some(value) => writeln!(self.out, "(* {} = {} *)", name, value)?,
                    None => writeln!(self.out, "(* {} *)", name)?,
                },
                MetaKey::Parameter(name) => {
                    if let Some(value) = value {
                        parameters.push((name, value));
                    }
                }
                _ => (),
            }
        }

        let reference = self.netlist.definition(inst.definition());
        write!(self.out, "{}", escape_name(reference.name()))?;
        if !parameters.is_empty() {
            writeln!(self.out, " #(")?;
            let mut first = true;
            for (name, value) in parameters {
                if !first {
                    writeln!(self.out, ",")?;
                }
                first = false;
                write!(self.out, "    .{}({})", name, value)?;
            }
            writeln!(self.out)?;
            write!(self.out, ")")?;
        }
        write!(self.out, " {} (", escape_name(inst.name()))?;

        let mut first = true;
        for (port_id, port) in reference.ports() {
            let Some(connection) = compact_connection(parent, inst.pins(port_id)) else {
                continue;
            };
            if first {
                writeln!(self.out)?;
            } else {
                writeln!(self.out, ",")?;
            }
            first = false;
            write!(self.out, "    .{}({})", escape_name(port.name()), connection)?;
        }
        if !first {
            writeln!(self.out)?;
        }
        writeln!(self.out, ");")
    }

    fn write_assignments(&mut self, cable: &Cable) -> io::Result<()> {
        for (key, _) in cable.meta().iter() {
            if let MetaKey::Assignment(name) = key {
                writeln!(self.out, "assign {} ;", escape_name(name))?;
            }
        }
        Ok(())
    }
}
