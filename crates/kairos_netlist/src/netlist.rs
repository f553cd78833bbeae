//! The flattened design: instances, wires and their connections.

use crate::cell::{CellInstance, FaninEdge, FanoutEdge, InstanceKind};
use crate::error::ConnectError;
use crate::ids::{CellId, WireId};
use crate::wire::Wire;
use kairos_common::{Arena, Ident};
use std::collections::HashMap;

/// A single flattened module.
///
/// Instances and wires live in arenas and refer to each other by
/// [`CellId`]/[`WireId`]. Constant sources stay in the arena but are hidden
/// from [`cells`](Self::cells).
#[derive(Debug, Default)]
pub struct Netlist {
    /// Module name.
    pub module_name: String,
    cells: Arena<CellId, CellInstance>,
    wires: Arena<WireId, Wire>,
    cell_index: HashMap<Ident, CellId>,
    wire_index: HashMap<Ident, WireId>,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            ..Self::default()
        }
    }

    /// Adds an instance. A later instance with the same name shadows the
    /// earlier one in [`find_cell`](Self::find_cell).
    pub fn add_cell(&mut self, cell: CellInstance) -> CellId {
        let name = cell.name;
        let id = self.cells.alloc(cell);
        self.cell_index.insert(name, id);
        id
    }

    /// Adds a wire.
    pub fn add_wire(&mut self, wire: Wire) -> WireId {
        let name = wire.name;
        let id = self.wires.alloc(wire);
        self.wire_index.insert(name, id);
        id
    }

    /// Returns an instance.
    pub fn cell(&self, id: CellId) -> &CellInstance {
        self.cells.get(id)
    }

    /// Returns an instance mutably.
    pub fn cell_mut(&mut self, id: CellId) -> &mut CellInstance {
        self.cells.get_mut(id)
    }

    /// Returns a wire.
    pub fn wire(&self, id: WireId) -> &Wire {
        self.wires.get(id)
    }

    /// Returns a wire mutably.
    pub fn wire_mut(&mut self, id: WireId) -> &mut Wire {
        self.wires.get_mut(id)
    }

    /// Looks up an instance by name.
    pub fn find_cell(&self, name: Ident) -> Option<CellId> {
        self.cell_index.get(&name).copied()
    }

    /// Looks up a wire by name.
    pub fn find_wire(&self, name: Ident) -> Option<WireId> {
        self.wire_index.get(&name).copied()
    }

    /// Iterates instances in creation order, skipping constant sources.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &CellInstance)> {
        self.cells
            .iter()
            .filter(|(_, c)| c.kind != InstanceKind::Constant)
    }

    /// Iterates every instance, constant sources included.
    pub fn all_cells(&self) -> impl Iterator<Item = (CellId, &CellInstance)> {
        self.cells.iter()
    }

    /// Iterates wires in creation order.
    pub fn wires(&self) -> impl Iterator<Item = (WireId, &Wire)> {
        self.wires.iter()
    }

    /// Number of instances returned by [`cells`](Self::cells).
    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }

    /// Number of instances, constant sources included.
    pub fn arena_len(&self) -> usize {
        self.cells.len()
    }

    /// Number of wires.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Connects the output of `source` to input `port` of `target` over
    /// `wire`.
    ///
    /// Each input port accepts one edge. Parallel wires between the same
    /// pair of instances are distinct edges as long as they land on
    /// different ports.
    pub fn connect(
        &mut self,
        source: CellId,
        target: CellId,
        port: &str,
        wire: WireId,
        net_capacitance: f64,
    ) -> Result<(), ConnectError> {
        let receiver = self.cells.get(target);
        if !receiver.has_input(port) {
            return Err(ConnectError::NotAnInput);
        }
        if receiver.driver_of(port).is_some() {
            return Err(ConnectError::AlreadyConnected);
        }
        self.cells.get_mut(target).fanin.push(FaninEdge {
            source,
            port: port.to_string(),
            wire,
        });
        self.cells.get_mut(source).fanout.push(FanoutEdge {
            target,
            port: port.to_string(),
            wire,
            net_capacitance,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireDirection;
    use kairos_common::Interner;
    use kairos_diagnostics::DiagnosticSink;
    use kairos_liberty::{parse_library, Library};
    use kairos_source::{FileId, Span};

    const LIB: &str = r#"
library(t) {
  cell(NAND2X1) {
    pin(A) { direction : input; }
    pin(B) { direction : input; }
    pin(Y) { direction : output; function : "!(A&B)"; }
  }
}
"#;

    fn setup() -> (Library, Interner, Netlist, CellId, CellId, WireId, WireId) {
        let sink = DiagnosticSink::new();
        let lib = parse_library(LIB, FileId::from_raw(0), &sink).unwrap();
        let interner = Interner::new();
        let mut netlist = Netlist::new("top");
        let nand = lib.cell("NAND2X1").unwrap();
        let g1 = netlist.add_cell(CellInstance::new(
            interner.get_or_intern("g1"),
            nand,
            InstanceKind::Gate,
            Span::DUMMY,
        ));
        let g2 = netlist.add_cell(CellInstance::new(
            interner.get_or_intern("g2"),
            nand,
            InstanceKind::Gate,
            Span::DUMMY,
        ));
        let n1 = netlist.add_wire(Wire::new(
            interner.get_or_intern("n1"),
            WireDirection::Internal,
            Span::DUMMY,
        ));
        let n2 = netlist.add_wire(Wire::new(
            interner.get_or_intern("n2"),
            WireDirection::Internal,
            Span::DUMMY,
        ));
        (lib, interner, netlist, g1, g2, n1, n2)
    }

    #[test]
    fn connect_records_both_directions() {
        let (_lib, _i, mut netlist, g1, g2, n1, _n2) = setup();
        netlist.connect(g1, g2, "A", n1, 0.003).unwrap();
        assert_eq!(netlist.cell(g1).fanout.len(), 1);
        assert_eq!(netlist.cell(g1).fanout[0].net_capacitance, 0.003);
        assert_eq!(netlist.cell(g2).fanin[0].source, g1);
        assert_eq!(netlist.cell(g2).driver_of("A").unwrap().wire, n1);
    }

    #[test]
    fn connect_rejects_duplicates() {
        let (_lib, _i, mut netlist, g1, g2, n1, _n2) = setup();
        netlist.connect(g1, g2, "A", n1, 0.0).unwrap();
        let err = netlist.connect(g1, g2, "A", n1, 0.0).unwrap_err();
        assert_eq!(err, ConnectError::AlreadyConnected);
        assert_eq!(err.to_string(), "Connection already exists");
        assert_eq!(netlist.cell(g1).fanout.len(), 1);
    }

    #[test]
    fn connect_rejects_non_inputs() {
        let (_lib, _i, mut netlist, g1, g2, n1, _n2) = setup();
        let err = netlist.connect(g1, g2, "Y", n1, 0.0).unwrap_err();
        assert_eq!(err, ConnectError::NotAnInput);
        assert_eq!(err.to_string(), "Port not defined as input");
        assert!(netlist.connect(g1, g2, "Z", n1, 0.0).is_err());
    }

    #[test]
    fn parallel_wires_to_different_ports_are_distinct_edges() {
        let (_lib, _i, mut netlist, g1, g2, n1, n2) = setup();
        netlist.connect(g1, g2, "A", n1, 0.0).unwrap();
        netlist.connect(g1, g2, "B", n2, 0.0).unwrap();
        assert_eq!(netlist.cell(g1).fanout.len(), 2);
        assert_eq!(netlist.cell(g2).fanin.len(), 2);
    }

    #[test]
    fn self_loop_is_allowed() {
        let (_lib, _i, mut netlist, g1, _g2, n1, _n2) = setup();
        netlist.connect(g1, g1, "A", n1, 0.0).unwrap();
        assert_eq!(netlist.cell(g1).fanin.len(), 1);
        assert_eq!(netlist.cell(g1).fanout.len(), 1);
    }

    #[test]
    fn lookup_by_name() {
        let (_lib, interner, netlist, g1, _g2, n1, _n2) = setup();
        assert_eq!(netlist.find_cell(interner.get_or_intern("g1")), Some(g1));
        assert_eq!(netlist.find_wire(interner.get_or_intern("n1")), Some(n1));
        assert_eq!(netlist.find_cell(interner.get_or_intern("nope")), None);
        assert_eq!(netlist.cell_count(), 2);
        assert_eq!(netlist.wire_count(), 2);
    }
}
