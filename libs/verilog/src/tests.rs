use test_log::test;

use snir::{Cable, Definition, Direction, Instance, Library, MetaKey, Netlist, Port, Wire};

use crate::compact::compact_connection;
use crate::{export_netlist, ComposerError};

fn compose(netlist: &Netlist) -> String {
    let mut out = Vec::new();
    export_netlist(netlist, &mut out).expect("compose should succeed");
    String::from_utf8(out).expect("output should be UTF-8")
}

fn compose_err(netlist: &Netlist) -> ComposerError {
    let mut out = Vec::new();
    export_netlist(netlist, &mut out).expect_err("compose should fail")
}

mod compact {
    use test_log::test;

    use super::*;

    #[test]
    fn unconnected_port_has_no_reference() {
        let def = Definition::new("top");
        assert_eq!(compact_connection(&def, &[]), None);
        assert_eq!(compact_connection(&def, &[None, None]), None);
    }

    #[test]
    fn full_width_run_elides_indices() {
        let mut def = Definition::new("top");
        let data = def.add_cable(Cable::bus("data", 4));
        let pins: Vec<_> = def.wires(data).map(Some).collect();
        assert_eq!(compact_connection(&def, &pins).as_deref(), Some("data"));

        // The cable's own index direction is irrelevant.
        def.cable_mut(data).set_range(0, false);
        assert_eq!(compact_connection(&def, &pins).as_deref(), Some("data"));
    }

    #[test]
    fn extent_equal_to_width_elides_even_when_sparse() {
        let mut def = Definition::new("top");
        let data = def.add_cable(Cable::bus("data", 4));
        // Only the end bits are connected, but the extent covers the
        // whole cable.
        let pins = vec![Some(def.wire(data, 0)), Some(def.wire(data, 3))];
        assert_eq!(compact_connection(&def, &pins).as_deref(), Some("data"));
    }

    #[test]
    fn single_bit_uses_cable_coordinates() {
        let mut def = Definition::new("top");
        let bus = def.add_cable(Cable::bus("bus", 8));
        def.cable_mut(bus).set_range(4, true);
        let pins = vec![Some(def.wire(bus, 2))];
        assert_eq!(compact_connection(&def, &pins).as_deref(), Some("bus[6]"));
    }

    #[test]
    fn interior_run_displays_high_then_low() {
        let mut def = Definition::new("top");
        let bus = def.add_cable(Cable::bus("bus", 8));
        let pins: Vec<_> = (1..=3).map(|i| Some(def.wire(bus, i))).collect();
        assert_eq!(compact_connection(&def, &pins).as_deref(), Some("bus[3:1]"));

        // A nonzero lower index offsets the displayed range.
        def.cable_mut(bus).set_range(2, true);
        assert_eq!(compact_connection(&def, &pins).as_deref(), Some("bus[5:3]"));
    }

    #[test]
    fn runs_across_cables_concatenate_in_bit_order() {
        let mut def = Definition::new("top");
        let a = def.add_cable(Cable::bus("a", 2));
        let b = def.add_cable(Cable::bus("b", 4));
        let pins = vec![
            Some(def.wire(a, 0)),
            Some(def.wire(a, 1)),
            Some(def.wire(b, 2)),
        ];
        assert_eq!(
            compact_connection(&def, &pins).as_deref(),
            Some("{a,b[2]}")
        );
    }

    #[test]
    fn revisiting_a_cable_starts_a_new_run() {
        let mut def = Definition::new("top");
        let a = def.add_cable(Cable::bus("a", 4));
        let b = def.add_cable(Cable::new("b"));
        let pins = vec![
            Some(def.wire(a, 0)),
            Some(def.wire(b, 0)),
            Some(def.wire(a, 3)),
        ];
        assert_eq!(
            compact_connection(&def, &pins).as_deref(),
            Some("{a[0],b,a[3]}")
        );
    }

    #[test]
    fn unconnected_pins_between_runs_are_skipped() {
        let mut def = Definition::new("top");
        let a = def.add_cable(Cable::bus("a", 4));
        let pins = vec![Some(def.wire(a, 1)), None, Some(def.wire(a, 2))];
        assert_eq!(compact_connection(&def, &pins).as_deref(), Some("a[2:1]"));
    }
}

/// A netlist with a `top` module instantiating one primitive `AND2`.
fn and2_netlist() -> Netlist {
    let mut netlist = Netlist::named("and2_demo");
    let lib = netlist.add_library(Library::new("work"));

    let mut and2 = Definition::new("AND2");
    and2.set_primitive();
    let a = and2.add_port(Port::new("A", Direction::In));
    let b = and2.add_port(Port::new("B", Direction::In));
    let y = and2.add_port(Port::new("Y", Direction::Out));
    let and2 = netlist.add_definition(lib, and2);

    let mut top = Definition::new("top");
    top.add_port(Port::new("x", Direction::In));
    top.add_port(Port::new("y", Direction::In));
    top.add_port(Port::new("z", Direction::Out));
    let na = top.add_cable(Cable::new("na"));
    let nb = top.add_cable(Cable::new("nb"));
    let nz = top.add_cable(Cable::new("nz"));
    let g0 = top.add_instance(Instance::new("g0", and2));
    let top = netlist.add_definition(lib, top);

    netlist.connect(top, g0, a, 0, Wire { cable: na, index: 0 });
    netlist.connect(top, g0, b, 0, Wire { cable: nb, index: 0 });
    netlist.connect(top, g0, y, 0, Wire { cable: nz, index: 0 });

    netlist.set_top(top, "top");
    netlist
}

#[test]
fn primitive_definitions_are_instantiated_but_not_emitted() {
    let out = compose(&and2_netlist());
    assert!(out.contains("module top ("));
    assert!(!out.contains("module AND2"));
    assert!(out.contains("AND2 g0 ("));
    assert!(out.contains(".A(na)"));
    assert!(out.contains(".B(nb)"));
    assert!(out.contains(".Y(nz)"));
    assert!(out.contains("(* STRUCTURAL_NETLIST = \"yes\" *)"));
    assert!(out.contains("// Netlist: and2_demo"));
}

#[test]
fn missing_top_degrades_to_header_only_output() {
    let out = compose(&Netlist::new());
    assert!(out.contains("// top instance is none."));
    assert!(!out.contains("module"));
    assert!(!out.contains("STRUCTURAL_NETLIST"));
}

#[test]
fn shared_definitions_are_emitted_once_in_bfs_order() {
    let mut netlist = Netlist::new();
    let lib = netlist.add_library(Library::new("work"));

    let leaf = netlist.add_definition(lib, Definition::new("leaf"));

    let mut mid_a = Definition::new("mid_a");
    mid_a.add_instance(Instance::new("u_leaf", leaf));
    let mid_a = netlist.add_definition(lib, mid_a);

    let mut mid_b = Definition::new("mid_b");
    mid_b.add_instance(Instance::new("u_leaf", leaf));
    let mid_b = netlist.add_definition(lib, mid_b);

    let mut top = Definition::new("top");
    top.add_instance(Instance::new("u_a", mid_a));
    top.add_instance(Instance::new("u_b", mid_b));
    let top = netlist.add_definition(lib, top);
    netlist.set_top(top, "top");

    let out = compose(&netlist);
    assert_eq!(out.matches("module leaf (").count(), 1);

    let order: Vec<_> = ["module top (", "module mid_a (", "module mid_b (", "module leaf ("]
        .iter()
        .map(|m| out.find(m).unwrap())
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn port_declarations_and_wires() {
    let mut netlist = Netlist::new();
    let lib = netlist.add_library(Library::new("work"));
    let mut def = Definition::new("regs");
    def.add_port(Port::new("clk", Direction::In));
    let mut data = Port::bus("data", Direction::Out, 8);
    data.set_range(0, false);
    def.add_port(data);
    def.add_port(Port::new("io", Direction::Undefined));
    def.add_cable(Cable::bus("state", 4));
    let def = netlist.add_definition(lib, def);
    netlist.set_top(def, "regs");

    let out = compose(&netlist);
    assert!(out.contains("input clk;"));
    assert!(out.contains("output [0:7] data;"));
    assert!(out.contains("/* undefined port direction */ inout io;"));
    assert!(out.contains("wire [3:0] state;"));
}

#[test]
fn single_member_rename_substitutes_the_alias() {
    let mut netlist = Netlist::new();
    let lib = netlist.add_library(Library::new("work"));
    let mut def = Definition::new("top");
    let mut ext = Port::new("S", Direction::In);
    ext.meta_mut().set(MetaKey::PortRename(0), "inner");
    def.add_port(ext);
    let mut inner = Port::new("inner", Direction::In);
    inner.meta_mut().set_flag(MetaKey::PortRenameMember);
    def.add_port(inner);
    let def = netlist.add_definition(lib, def);
    netlist.set_top(def, "top");

    let out = compose(&netlist);
    assert!(out.contains(".S(inner)"));
    // The member is dropped from the port list but keeps its
    // declaration; the alias gets no declaration of its own.
    assert!(!out.contains("    inner"));
    assert!(out.contains("input inner;"));
    assert!(!out.contains("input S;"));
}

#[test]
fn multi_member_rename_concatenates_in_position_order() {
    let mut netlist = Netlist::new();
    let lib = netlist.add_library(Library::new("work"));
    let mut def = Definition::new("top");
    let mut ext = Port::bus("EXT", Direction::In, 2);
    ext.meta_mut().set(MetaKey::PortRename(1), "lo");
    ext.meta_mut().set(MetaKey::PortRename(0), "hi");
    def.add_port(ext);
    for name in ["hi", "lo"] {
        let mut member = Port::new(name, Direction::In);
        member.meta_mut().set_flag(MetaKey::PortRenameMember);
        def.add_port(member);
    }
    let def = netlist.add_definition(lib, def);
    netlist.set_top(def, "top");

    let out = compose(&netlist);
    assert!(out.contains(".EXT({hi,lo})"));
}

#[test]
fn rename_position_gap_is_an_error() {
    let mut netlist = Netlist::new();
    let lib = netlist.add_library(Library::new("work"));
    let mut def = Definition::new("top");
    let mut ext = Port::bus("EXT", Direction::In, 3);
    ext.meta_mut().set(MetaKey::PortRename(0), "a");
    ext.meta_mut().set(MetaKey::PortRename(2), "c");
    def.add_port(ext);
    let def = netlist.add_definition(lib, def);
    netlist.set_top(def, "top");

    match compose_err(&netlist) {
        ComposerError::RenameGap {
            definition,
            port,
            position,
        } => {
            assert_eq!(definition, "top");
            assert_eq!(port, "EXT");
            assert_eq!(position, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn attributes_and_parameters_emit_in_metadata_order() {
    let mut netlist = Netlist::new();
    let lib = netlist.add_library(Library::new("work"));
    let ram = netlist.add_definition(lib, {
        let mut d = Definition::new("RAMB36");
        d.set_primitive();
        d
    });
    let mut top = Definition::new("top");
    let mut mem = Instance::new("mem0", ram);
    mem.meta_mut().set(MetaKey::Attribute("LOC".into()), "RAMB36_X0Y0");
    mem.meta_mut().set_flag(MetaKey::Attribute("keep".into()));
    mem.meta_mut().set(MetaKey::Parameter("WIDTH".into()), "8");
    mem.meta_mut().set(MetaKey::Parameter("DEPTH".into()), "2048");
    top.add_instance(mem);
    let top = netlist.add_definition(lib, top);
    netlist.set_top(top, "top");

    let out = compose(&netlist);
    assert!(out.contains("(* LOC = RAMB36_X0Y0 *)"));
    assert!(out.contains("(* keep *)"));
    let width = out.find(".WIDTH(8)").unwrap();
    let depth = out.find(".DEPTH(2048)").unwrap();
    assert!(width < depth);
    assert!(out.contains("RAMB36 #("));
    assert!(out.contains(") mem0 ("));
}

#[test]
fn assignment_metadata_emits_assign_statements() {
    let mut netlist = Netlist::new();
    let lib = netlist.add_library(Library::new("work"));
    let mut def = Definition::new("top");
    let mut net = Cable::new("n0");
    net.meta_mut().set_flag(MetaKey::Assignment("n0".into()));
    def.add_cable(net);
    // Presence of the key requests the statement; a carried value is
    // ignored.
    let mut net = Cable::new("n1");
    net.meta_mut().set(MetaKey::Assignment("n1".into()), "true");
    def.add_cable(net);
    let def = netlist.add_definition(lib, def);
    netlist.set_top(def, "top");

    let out = compose(&netlist);
    assert!(out.contains("assign n0 ;"));
    assert!(out.contains("assign n1 ;"));
}

#[test]
fn escaped_identifiers_get_a_trailing_space() {
    let mut netlist = Netlist::new();
    let lib = netlist.add_library(Library::new("work"));
    let leaf = netlist.add_definition(lib, {
        let mut d = Definition::new("\\weird.name");
        d.set_primitive();
        d
    });
    let mut top = Definition::new("top");
    top.add_cable(Cable::new("\\n.0"));
    top.add_instance(Instance::new("\\u.0", leaf));
    let top = netlist.add_definition(lib, top);
    netlist.set_top(top, "top");

    let out = compose(&netlist);
    assert!(out.contains("wire \\n.0 ;"));
    assert!(out.contains("\\weird.name  \\u.0  ("));
}

#[test]
fn unconnected_ports_are_omitted_from_bindings() {
    let mut netlist = Netlist::new();
    let lib = netlist.add_library(Library::new("work"));

    let mut leaf = Definition::new("buf3");
    leaf.set_primitive();
    let p0 = leaf.add_port(Port::new("p0", Direction::In));
    let _p1 = leaf.add_port(Port::new("p1", Direction::In));
    let p2 = leaf.add_port(Port::new("p2", Direction::Out));
    let leaf = netlist.add_definition(lib, leaf);

    let mut top = Definition::new("top");
    let a = top.add_cable(Cable::new("a"));
    let b = top.add_cable(Cable::new("b"));
    let u0 = top.add_instance(Instance::new("u0", leaf));
    let top = netlist.add_definition(lib, top);
    netlist.connect(top, u0, p0, 0, Wire { cable: a, index: 0 });
    netlist.connect(top, u0, p2, 0, Wire { cable: b, index: 0 });
    netlist.set_top(top, "top");

    let out = compose(&netlist);
    assert!(!out.contains(".p1("));
    assert!(out.contains(".p0(a),\n    .p2(b)\n);"));
}

#[test]
fn end_to_end_module_shape() {
    let out = compose(&and2_netlist());
    let expected = "\
////////////////////////////////////////
// Generated by the SNIR Verilog composer
// Netlist: and2_demo
////////////////////////////////////////
(* STRUCTURAL_NETLIST = \"yes\" *)
module top (
    x,
    y,
    z
);
input x;
input y;
output z;
wire na;
wire nb;
wire nz;
AND2 g0 (
    .A(na),
    .B(nb),
    .Y(nz)
);
endmodule
";
    assert_eq!(out, expected);
}
