//! Structural netlist intermediate representation (SNIR).
//!
//! A hierarchical representation of hardware netlists: a [`Netlist`]
//! owns [`Library`]s, a library owns [`Definition`]s, and a definition
//! owns [`Port`]s, [`Cable`]s, and child [`Instance`]s of other
//! definitions.
//!
//! All elements live in arenas and are referenced by opaque integer
//! handles; nothing in this crate relies on pointer identity. Handles
//! scoped to one container must not be used with another container:
//! a [`PortId`] created by one definition, for example, is meaningless
//! in the context of any other definition.
//!
//! Wiring is structural: a [`Wire`] names one bit of a cable by handle
//! and position, and an instance's pins are per-port vectors of
//! optional wires, one slot per port bit, in port-bit order.
//!
//! Name uniqueness is scoped, not global: libraries are unique within a
//! netlist, definitions within a library, and ports, cables, and child
//! instances each within their own independent per-definition scope.
//! A port and a cable may share a name. See the [`namescope`] module
//! for the checking machinery.
#![warn(missing_docs)]

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

pub mod meta;
pub mod namescope;

pub use meta::{MetaKey, MetaMap};


/// An opaque library identifier.
///
/// A library ID created in the context of one netlist must *not* be
/// used in the context of another netlist.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct LibraryId(u64);

/// An opaque definition identifier.
///
/// A definition ID created in the context of one netlist must *not* be
/// used in the context of another netlist.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct DefinitionId(u64);

/// An opaque port identifier, scoped to one definition.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct PortId(u64);

/// An opaque cable identifier, scoped to one definition.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CableId(u64);

/// An opaque instance identifier, scoped to one definition.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl Display for LibraryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "lib{}", self.0)
    }
}

impl Display for DefinitionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "def{}", self.0)
    }
}

impl Display for PortId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "port{}", self.0)
    }
}

impl Display for CableId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "cable{}", self.0)
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "inst{}", self.0)
    }
}

/// One bit of a cable, addressed by cable handle and position.
///
/// The position is the wire's index within the cable's wire sequence
/// (starting at zero), not its displayed index; the displayed index is
/// `position + cable.lower()`.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    /// The owning cable.
    pub cable: CableId,
    /// The position within the cable's wire sequence.
    pub index: usize,
}

/// Port directions.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Input.
    In,
    /// Output.
    Out,
    /// Input or output.
    InOut,
    /// Direction not known.
    #[default]
    Undefined,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Self::In => write!(f, "input"),
            Self::Out => write!(f, "output"),
            Self::InOut => write!(f, "inout"),
            Self::Undefined => write!(f, "/* undefined port direction */ inout"),
        }
    }
}

/// The kinds of IR element.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// A netlist.
    Netlist,
    /// A library.
    Library,
    /// A definition.
    Definition,
    /// A port.
    Port,
    /// A cable.
    Cable,
    /// An instance.
    Instance,
}

impl ElementKind {
    /// Returns `true` for the element kinds that own a naming scope.
    ///
    /// Only netlists, libraries, and definitions contain named
    /// children; ports, cables, and instances are leaves of the naming
    /// hierarchy.
    pub fn needs_namespace(&self) -> bool {
        matches!(self, Self::Netlist | Self::Library | Self::Definition)
    }
}

/// The designated top instance of a netlist.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Top {
    /// The definition the top instance references.
    definition: DefinitionId,
    /// The name of the top instance.
    instance: ArcStr,
}

impl Top {
    /// The definition the top instance references.
    #[inline]
    pub fn definition(&self) -> DefinitionId {
        self.definition
    }

    /// The name of the top instance.
    #[inline]
    pub fn instance(&self) -> &ArcStr {
        &self.instance
    }
}

/// A hierarchical netlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Netlist {
    /// The current library ID counter.
    ///
    /// Initialized to 0 when the netlist is created.
    /// Should be incremented before assigning a new ID.
    library_id: u64,
    /// The current definition ID counter.
    definition_id: u64,

    name: Option<ArcStr>,

    libraries: HashMap<LibraryId, Library>,
    /// The order in which libraries were added.
    library_order: Vec<LibraryId>,

    /// All definitions in the netlist, across libraries.
    definitions: HashMap<DefinitionId, Definition>,

    top: Option<Top>,

    meta: MetaMap,
}

/// A named container of definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    name: ArcStr,
    /// The definitions in this library, in insertion order.
    definitions: Vec<DefinitionId>,
    meta: MetaMap,
}

/// A reusable module-like template, instanced zero or more times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Definition {
    name: ArcStr,

    /// Per-definition ID counters; see [`Netlist`] for the convention.
    port_id: u64,
    cable_id: u64,
    instance_id: u64,

    ports: HashMap<PortId, Port>,
    port_order: Vec<PortId>,
    cables: HashMap<CableId, Cable>,
    cable_order: Vec<CableId>,
    instances: HashMap<InstanceId, Instance>,
    instance_order: Vec<InstanceId>,

    meta: MetaMap,
}

/// A definition's external bit-interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    name: ArcStr,
    direction: Direction,
    /// The width of this port, if it is a vector.
    ///
    /// For scalar ports, this is [`None`].
    width: Option<usize>,
    /// The lowest declared index.
    lower: usize,
    /// Whether the displayed range descends (`[hi:lo]` declarations).
    downto: bool,
    meta: MetaMap,
}

/// A named bus owned by a definition.
///
/// Same scalar/vector/index-direction shape as [`Port`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cable {
    name: ArcStr,
    width: Option<usize>,
    lower: usize,
    downto: bool,
    meta: MetaMap,
}

/// An occurrence of a definition inside a parent definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// The referenced definition.
    definition: DefinitionId,
    /// The name of this instance.
    ///
    /// This is not necessarily the name of the referenced definition.
    name: ArcStr,
    /// Pins, one vector per connected port of the referenced
    /// definition, in port-bit order. A missing entry means every pin
    /// of that port is unconnected.
    pins: HashMap<PortId, Vec<Option<Wire>>>,
    meta: MetaMap,
}

impl Netlist {
    /// Creates a new, unnamed netlist.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a new netlist with the given name.
    pub fn named(name: impl Into<ArcStr>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// The name of the netlist, if it has one.
    #[inline]
    pub fn name(&self) -> Option<&ArcStr> {
        self.name.as_ref()
    }

    /// Sets the name of the netlist.
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = Some(name.into());
    }

    /// Adds the given library to the netlist.
    ///
    /// Returns the ID of the newly added library.
    pub fn add_library(&mut self, library: Library) -> LibraryId {
        self.library_id += 1;
        let id = LibraryId(self.library_id);
        self.libraries.insert(id, library);
        self.library_order.push(id);
        id
    }

    /// Adds the given definition to the given library.
    ///
    /// Returns the ID of the newly added definition.
    ///
    /// # Panics
    ///
    /// Panics if no library has the given ID.
    pub fn add_definition(&mut self, library: LibraryId, definition: Definition) -> DefinitionId {
        self.definition_id += 1;
        let id = DefinitionId(self.definition_id);
        self.definitions.insert(id, definition);
        self.libraries
            .get_mut(&library)
            .unwrap()
            .definitions
            .push(id);
        id
    }

    /// Designates the top instance: an occurrence of `definition` named
    /// `instance`.
    pub fn set_top(&mut self, definition: DefinitionId, instance: impl Into<ArcStr>) {
        self.top = Some(Top {
            definition,
            instance: instance.into(),
        });
    }

    /// The designated top instance, if there is one.
    #[inline]
    pub fn top(&self) -> Option<&Top> {
        self.top.as_ref()
    }

    /// Gets the library with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no library has the given ID.
    /// For a non-panicking alternative, see [`try_library`](Netlist::try_library).
    pub fn library(&self, id: LibraryId) -> &Library {
        self.libraries.get(&id).unwrap()
    }

    /// Gets the library with the given ID.
    #[inline]
    pub fn try_library(&self, id: LibraryId) -> Option<&Library> {
        self.libraries.get(&id)
    }

    /// Gets the definition with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no definition has the given ID.
    /// For a non-panicking alternative, see [`try_definition`](Netlist::try_definition).
    pub fn definition(&self, id: DefinitionId) -> &Definition {
        self.definitions.get(&id).unwrap()
    }

    /// Gets the definition with the given ID.
    #[inline]
    pub fn try_definition(&self, id: DefinitionId) -> Option<&Definition> {
        self.definitions.get(&id)
    }

    /// Gets a mutable reference to the definition with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no definition has the given ID.
    pub fn definition_mut(&mut self, id: DefinitionId) -> &mut Definition {
        self.definitions.get_mut(&id).unwrap()
    }

    /// Iterates over the `(id, library)` pairs in this netlist, in
    /// insertion order.
    pub fn libraries(&self) -> impl Iterator<Item = (LibraryId, &Library)> {
        self.library_order.iter().map(|&id| (id, self.library(id)))
    }

    /// Iterates over the `(id, definition)` pairs of the given library,
    /// in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if no library has the given ID.
    pub fn definitions_in(&self, library: LibraryId) -> impl Iterator<Item = (DefinitionId, &Definition)> {
        self.library(library)
            .definitions
            .iter()
            .map(|&id| (id, self.definition(id)))
    }

    /// Connects one pin of an instance to a wire of the parent
    /// definition.
    ///
    /// `bit` indexes the pins of `port` (a port of the *referenced*
    /// definition) in port-bit order; `wire` names a bit of a cable of
    /// the *parent* definition.
    ///
    /// # Panics
    ///
    /// Panics if any handle does not resolve, if `bit` is out of range
    /// for the port's declared width, or if the wire position is out of
    /// range for its cable.
    pub fn connect(
        &mut self,
        parent: DefinitionId,
        instance: InstanceId,
        port: PortId,
        bit: usize,
        wire: Wire,
    ) {
        let child = self.definition(parent).instance(instance).definition;
        let bits = self.definition(child).port(port).bits();
        assert!(
            bit < bits,
            "pin index {} out of range for port of width {}",
            bit,
            bits
        );
        let cable_bits = self.definition(parent).cable(wire.cable).bits();
        assert!(
            wire.index < cable_bits,
            "wire position {} out of range for cable of width {}",
            wire.index,
            cable_bits
        );
        let def = self.definitions.get_mut(&parent).unwrap();
        let pins = def
            .instances
            .get_mut(&instance)
            .unwrap()
            .pins
            .entry(port)
            .or_default();
        if pins.len() < bits {
            pins.resize(bits, None);
        }
        pins[bit] = Some(wire);
    }

    /// The metadata attached to this netlist.
    #[inline]
    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    /// Mutable access to the metadata attached to this netlist.
    #[inline]
    pub fn meta_mut(&mut self) -> &mut MetaMap {
        &mut self.meta
    }
}

impl Library {
    /// Creates a new, empty library with the given name.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            definitions: Vec::new(),
            meta: MetaMap::new(),
        }
    }

    /// The name of the library.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Renames the library.
    ///
    /// Name writes should be guarded by the session's
    /// [`NetlistNamespace`](crate::namescope::NetlistNamespace) and
    /// recorded with it afterward.
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = name.into();
    }

    /// The IDs of the definitions in this library, in insertion order.
    #[inline]
    pub fn definitions(&self) -> &[DefinitionId] {
        &self.definitions
    }

    /// The metadata attached to this library.
    #[inline]
    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    /// Mutable access to the metadata attached to this library.
    #[inline]
    pub fn meta_mut(&mut self) -> &mut MetaMap {
        &mut self.meta
    }
}

impl Definition {
    /// Creates a new, empty definition with the given name.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            port_id: 0,
            cable_id: 0,
            instance_id: 0,
            ports: HashMap::new(),
            port_order: Vec::new(),
            cables: HashMap::new(),
            cable_order: Vec::new(),
            instances: HashMap::new(),
            instance_order: Vec::new(),
            meta: MetaMap::new(),
        }
    }

    /// The name of the definition.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Renames the definition.
    ///
    /// Name writes should be guarded by the owning library's session
    /// [`LibraryNamespace`](crate::namescope::LibraryNamespace) and
    /// recorded with it afterward.
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = name.into();
    }

    /// Returns `true` if this definition is flagged as a primitive
    /// (external/black-box).
    ///
    /// Primitive definitions are never emitted as module bodies.
    pub fn is_primitive(&self) -> bool {
        self.meta.contains(&MetaKey::Primitive)
    }

    /// Flags this definition as a primitive.
    pub fn set_primitive(&mut self) {
        self.meta.set_flag(MetaKey::Primitive);
    }

    /// Adds the given port to the definition.
    ///
    /// Returns the ID of the newly added port.
    pub fn add_port(&mut self, port: Port) -> PortId {
        self.port_id += 1;
        let id = PortId(self.port_id);
        self.ports.insert(id, port);
        self.port_order.push(id);
        id
    }

    /// Adds the given cable to the definition.
    ///
    /// Returns the ID of the newly added cable.
    pub fn add_cable(&mut self, cable: Cable) -> CableId {
        self.cable_id += 1;
        let id = CableId(self.cable_id);
        self.cables.insert(id, cable);
        self.cable_order.push(id);
        id
    }

    /// Adds the given instance to the definition.
    ///
    /// Returns the ID of the newly added instance.
    pub fn add_instance(&mut self, instance: Instance) -> InstanceId {
        self.instance_id += 1;
        let id = InstanceId(self.instance_id);
        self.instances.insert(id, instance);
        self.instance_order.push(id);
        id
    }

    /// Gets the port with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no port has the given ID.
    pub fn port(&self, id: PortId) -> &Port {
        self.ports.get(&id).unwrap()
    }

    /// Gets a mutable reference to the port with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no port has the given ID.
    pub fn port_mut(&mut self, id: PortId) -> &mut Port {
        self.ports.get_mut(&id).unwrap()
    }

    /// Gets the cable with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no cable has the given ID.
    pub fn cable(&self, id: CableId) -> &Cable {
        self.cables.get(&id).unwrap()
    }

    /// Gets a mutable reference to the cable with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no cable has the given ID.
    pub fn cable_mut(&mut self, id: CableId) -> &mut Cable {
        self.cables.get_mut(&id).unwrap()
    }

    /// Gets the instance with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no instance has the given ID.
    pub fn instance(&self, id: InstanceId) -> &Instance {
        self.instances.get(&id).unwrap()
    }

    /// Gets a mutable reference to the instance with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no instance has the given ID.
    pub fn instance_mut(&mut self, id: InstanceId) -> &mut Instance {
        self.instances.get_mut(&id).unwrap()
    }

    /// Iterates over the `(id, port)` pairs of this definition, in
    /// declaration order.
    pub fn ports(&self) -> impl Iterator<Item = (PortId, &Port)> {
        self.port_order.iter().map(|&id| (id, self.port(id)))
    }

    /// Iterates over the `(id, cable)` pairs of this definition, in
    /// declaration order.
    pub fn cables(&self) -> impl Iterator<Item = (CableId, &Cable)> {
        self.cable_order.iter().map(|&id| (id, self.cable(id)))
    }

    /// Iterates over the `(id, instance)` pairs of this definition, in
    /// insertion order.
    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instance_order.iter().map(|&id| (id, self.instance(id)))
    }

    /// Returns a handle to one bit of the given cable.
    ///
    /// # Panics
    ///
    /// Panics if no cable has the given ID or if `index` is out of
    /// range for the cable's width.
    pub fn wire(&self, cable: CableId, index: usize) -> Wire {
        let bits = self.cable(cable).bits();
        assert!(
            index < bits,
            "wire position {} out of range for cable of width {}",
            index,
            bits
        );
        Wire { cable, index }
    }

    /// Iterates over the wires of the given cable, in position order.
    ///
    /// # Panics
    ///
    /// Panics if no cable has the given ID.
    pub fn wires(&self, cable: CableId) -> impl Iterator<Item = Wire> {
        (0..self.cable(cable).bits()).map(move |index| Wire { cable, index })
    }

    /// The metadata attached to this definition.
    #[inline]
    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    /// Mutable access to the metadata attached to this definition.
    #[inline]
    pub fn meta_mut(&mut self) -> &mut MetaMap {
        &mut self.meta
    }
}

impl Port {
    /// Creates a new scalar port.
    pub fn new(name: impl Into<ArcStr>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
            width: None,
            lower: 0,
            downto: true,
            meta: MetaMap::new(),
        }
    }

    /// Creates a new vector port of the given width.
    ///
    /// The range defaults to `[width-1:0]`; see [`Port::set_range`].
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub fn bus(name: impl Into<ArcStr>, direction: Direction, width: usize) -> Self {
        assert!(width > 0);
        Self {
            name: name.into(),
            direction,
            width: Some(width),
            lower: 0,
            downto: true,
            meta: MetaMap::new(),
        }
    }

    /// The name of the port.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Renames the port.
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = name.into();
    }

    /// The direction of the port.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The declared width, or [`None`] for a scalar port.
    #[inline]
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    /// The number of pins of this port. Scalar ports have one.
    #[inline]
    pub fn bits(&self) -> usize {
        self.width.unwrap_or(1)
    }

    /// The lowest declared index.
    #[inline]
    pub fn lower(&self) -> usize {
        self.lower
    }

    /// Returns `true` if the displayed range descends.
    #[inline]
    pub fn is_downto(&self) -> bool {
        self.downto
    }

    /// Sets the lowest declared index and the index direction.
    pub fn set_range(&mut self, lower: usize, downto: bool) {
        self.lower = lower;
        self.downto = downto;
    }

    /// The displayed `(left, right)` index pair, or [`None`] for a
    /// scalar port.
    ///
    /// The high index is `lower + width - 1`; the index direction
    /// determines which end is left.
    pub fn range(&self) -> Option<(usize, usize)> {
        range_of(self.width, self.lower, self.downto)
    }

    /// The metadata attached to this port.
    #[inline]
    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    /// Mutable access to the metadata attached to this port.
    #[inline]
    pub fn meta_mut(&mut self) -> &mut MetaMap {
        &mut self.meta
    }
}

impl Cable {
    /// Creates a new scalar cable.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            width: None,
            lower: 0,
            downto: true,
            meta: MetaMap::new(),
        }
    }

    /// Creates a new vector cable of the given width.
    ///
    /// The range defaults to `[width-1:0]`; see [`Cable::set_range`].
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub fn bus(name: impl Into<ArcStr>, width: usize) -> Self {
        assert!(width > 0);
        Self {
            name: name.into(),
            width: Some(width),
            lower: 0,
            downto: true,
            meta: MetaMap::new(),
        }
    }

    /// The name of the cable.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Renames the cable.
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = name.into();
    }

    /// The declared width, or [`None`] for a scalar cable.
    #[inline]
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    /// The number of wires of this cable. Scalar cables have one.
    #[inline]
    pub fn bits(&self) -> usize {
        self.width.unwrap_or(1)
    }

    /// The lowest declared index.
    #[inline]
    pub fn lower(&self) -> usize {
        self.lower
    }

    /// Returns `true` if the displayed range descends.
    #[inline]
    pub fn is_downto(&self) -> bool {
        self.downto
    }

    /// Sets the lowest declared index and the index direction.
    pub fn set_range(&mut self, lower: usize, downto: bool) {
        self.lower = lower;
        self.downto = downto;
    }

    /// The displayed `(left, right)` index pair, or [`None`] for a
    /// scalar cable.
    pub fn range(&self) -> Option<(usize, usize)> {
        range_of(self.width, self.lower, self.downto)
    }

    /// The metadata attached to this cable.
    #[inline]
    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    /// Mutable access to the metadata attached to this cable.
    #[inline]
    pub fn meta_mut(&mut self) -> &mut MetaMap {
        &mut self.meta
    }
}

fn range_of(width: Option<usize>, lower: usize, downto: bool) -> Option<(usize, usize)> {
    let width = width?;
    let high = lower + width - 1;
    Some(if downto { (high, lower) } else { (lower, high) })
}

impl Instance {
    /// Creates an instance of the given definition with the given name.
    pub fn new(name: impl Into<ArcStr>, definition: DefinitionId) -> Self {
        Self {
            definition,
            name: name.into(),
            pins: HashMap::new(),
            meta: MetaMap::new(),
        }
    }

    /// The ID of the referenced definition.
    #[inline]
    pub fn definition(&self) -> DefinitionId {
        self.definition
    }

    /// The name of this instance.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Renames the instance.
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = name.into();
    }

    /// The pins of the given port, in port-bit order.
    ///
    /// Returns an empty slice if no pin of the port has ever been
    /// connected.
    pub fn pins(&self, port: PortId) -> &[Option<Wire>] {
        self.pins.get(&port).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The metadata attached to this instance.
    #[inline]
    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    /// Mutable access to the metadata attached to this instance.
    #[inline]
    pub fn meta_mut(&mut self) -> &mut MetaMap {
        &mut self.meta
    }
}
