//! Timing graph built over a parsed netlist.
//!
//! The [`TimingGraph`] has one node per timing-relevant instance plus a
//! single origin node that fans out to every path start point. Flip-flops
//! are split in two: a [`Launch`](NodeRole::Launch) node whose output starts
//! register-to-register paths, and a [`Capture`](NodeRole::Capture) node
//! where paths ending at a data pin terminate. Edges into clock pins are
//! never created, so sequential feedback does not form cycles.
//!
//! Only nodes reachable from the origin receive edges. Instances that no
//! path reaches keep their seed timing values.

use crate::ids::{EdgeId, NodeId};
use kairos_common::{Arena, InternalError, KairosResult, MinMax};
use kairos_liberty::pseudo::PSEUDO_INPUT_PIN;
use kairos_liberty::{CellDefinition, Library};
use kairos_netlist::{CellId, CellInstance, InstanceKind, Netlist};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::trace;

/// Returns the library cell `cell` is bound to.
///
/// The netlist parser only instantiates library cells, so a miss means the
/// netlist was built against a different library.
pub(crate) fn definition_of<'l>(
    cell: &CellInstance,
    library: &'l Library,
) -> KairosResult<&'l CellDefinition> {
    cell.definition(library).ok_or_else(|| {
        InternalError::new(format!("instance bound to unknown cell `{}`", cell.cell_type))
    })
}

/// How the analyzer treats a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The virtual source feeding every start point.
    Origin,
    /// A primary input pseudo-instance.
    PrimaryInput,
    /// A combinational gate.
    Combinational,
    /// A primary output pseudo-instance.
    PrimaryOutput,
    /// The clock-to-output side of a flip-flop.
    Launch,
    /// The data-input side of a flip-flop.
    Capture,
}

impl NodeRole {
    /// Returns `true` for nodes where timing paths end.
    pub fn is_endpoint(self) -> bool {
        matches!(self, NodeRole::PrimaryOutput | NodeRole::Capture)
    }
}

/// A node of the timing graph.
#[derive(Debug, Clone, Serialize)]
pub struct TimingNode {
    /// Role of the node.
    pub role: NodeRole,
    /// Instance the node stands for; `None` only for the origin.
    pub cell: Option<CellId>,
    /// Edges arriving at this node, in creation order.
    pub incoming: Vec<EdgeId>,
    /// Edges leaving this node, in creation order.
    pub outgoing: Vec<EdgeId>,
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, Serialize)]
pub struct TimingEdge {
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Input port of the target instance the edge lands on.
    pub port: String,
    /// Propagation delay from the source's arrival to the target's output.
    ///
    /// Filled in by the forward pass.
    pub delay: MinMax,
}

/// Result of ordering the graph topologically.
#[derive(Debug, Clone, Default)]
pub struct Ordering {
    /// Reachable nodes, each after all of its predecessors.
    pub order: Vec<NodeId>,
    /// Reachable nodes that could not be ordered because they sit on or
    /// behind a combinational loop.
    pub stuck: Vec<NodeId>,
}

/// Directed graph of timing nodes and delay edges.
#[derive(Debug, Clone, Default)]
pub struct TimingGraph {
    nodes: Arena<NodeId, TimingNode>,
    edges: Arena<EdgeId, TimingEdge>,
    primary: HashMap<CellId, NodeId>,
    capture: HashMap<CellId, NodeId>,
}

impl TimingGraph {
    /// Builds the graph for `netlist`.
    ///
    /// `clock` is the instance driving the flip-flop clock pins, if any. It
    /// is excluded from the graph: its arrival is pinned by the analyzer.
    ///
    /// Fails if an instance refers to a cell missing from `library`.
    pub fn build(netlist: &Netlist, library: &Library, clock: Option<CellId>) -> KairosResult<Self> {
        let mut graph = TimingGraph::default();
        let origin = graph.add_node(NodeRole::Origin, None);

        let mut clock_pins: HashMap<CellId, String> = HashMap::new();
        for (id, cell) in netlist.cells() {
            let role = match cell.kind {
                InstanceKind::PrimaryInput => NodeRole::PrimaryInput,
                InstanceKind::PrimaryOutput => NodeRole::PrimaryOutput,
                InstanceKind::Constant => continue,
                InstanceKind::Gate if cell.is_ff => NodeRole::Launch,
                InstanceKind::Gate => NodeRole::Combinational,
            };
            let node = graph.add_node(role, Some(id));
            graph.primary.insert(id, node);
            if cell.is_ff {
                if let Some(pin) = definition_of(cell, library)?.clock_pin() {
                    clock_pins.insert(id, pin.name.clone());
                }
                let capture = graph.add_node(NodeRole::Capture, Some(id));
                graph.capture.insert(id, capture);
            }
        }

        // Start points hang off the origin in instance order.
        let mut stack = Vec::new();
        for (id, cell) in netlist.cells() {
            let (node, port) = match cell.kind {
                InstanceKind::PrimaryInput if Some(id) != clock => {
                    (graph.primary[&id], PSEUDO_INPUT_PIN.to_string())
                }
                InstanceKind::Gate if cell.is_ff => (
                    graph.primary[&id],
                    clock_pins.get(&id).cloned().unwrap_or_default(),
                ),
                _ => continue,
            };
            graph.add_edge(origin, node, port);
            stack.push(node);
        }

        let mut visited: HashSet<NodeId> = stack.iter().copied().collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            let (role, cell) = (graph.node(node).role, graph.node(node).cell);
            let Some(cell) = cell else { continue };
            if role.is_endpoint() {
                continue;
            }
            for edge in &netlist.cell(cell).fanout {
                let target = netlist.cell(edge.target);
                if target.kind == InstanceKind::Constant || Some(edge.target) == clock {
                    continue;
                }
                let to = if target.is_ff {
                    if clock_pins.get(&edge.target) == Some(&edge.port) {
                        continue;
                    }
                    graph.capture[&edge.target]
                } else {
                    graph.primary[&edge.target]
                };
                graph.add_edge(node, to, edge.port.clone());
                if visited.insert(to) {
                    stack.push(to);
                }
            }
        }
        trace!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built timing graph"
        );
        Ok(graph)
    }

    fn add_node(&mut self, role: NodeRole, cell: Option<CellId>) -> NodeId {
        self.nodes.alloc(TimingNode {
            role,
            cell,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        })
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId, port: String) -> EdgeId {
        let id = self.edges.alloc(TimingEdge {
            from,
            to,
            port,
            delay: MinMax::ZERO,
        });
        self.nodes[from].outgoing.push(id);
        self.nodes[to].incoming.push(id);
        id
    }

    /// The origin node.
    pub fn origin(&self) -> NodeId {
        NodeId::from_raw(0)
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: NodeId) -> &TimingNode {
        &self.nodes[id]
    }

    /// Returns the edge with the given ID.
    pub fn edge(&self, id: EdgeId) -> &TimingEdge {
        &self.edges[id]
    }

    /// Returns the edge with the given ID for updating.
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut TimingEdge {
        &mut self.edges[id]
    }

    /// Iterates over all nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TimingNode)> {
        self.nodes.iter()
    }

    /// Returns the node standing for `cell`; the launch node for a flip-flop.
    pub fn node_of(&self, cell: CellId) -> Option<NodeId> {
        self.primary.get(&cell).copied()
    }

    /// Returns the capture node of flip-flop `cell`.
    pub fn capture_of(&self, cell: CellId) -> Option<NodeId> {
        self.capture.get(&cell).copied()
    }

    /// Total number of nodes, including the origin.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Orders reachable nodes with Kahn's algorithm starting at the origin.
    pub fn topological_order(&self) -> Ordering {
        let mut pending: Vec<usize> = self.nodes.iter().map(|(_, n)| n.incoming.len()).collect();
        let mut queue = VecDeque::from([self.origin()]);
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &edge in &self.nodes[node].outgoing {
                let to = self.edges[edge].to;
                let count = &mut pending[to.as_raw() as usize];
                *count -= 1;
                if *count == 0 {
                    queue.push_back(to);
                }
            }
        }

        // Every node with an incoming edge is reachable, so whatever still
        // waits on a predecessor is on or behind a loop.
        let stuck = self
            .nodes
            .ids()
            .filter(|id| pending[id.as_raw() as usize] > 0)
            .collect();
        Ordering { order, stuck }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Design;

    fn roles(graph: &TimingGraph, order: &[NodeId]) -> Vec<NodeRole> {
        order.iter().map(|&n| graph.node(n).role).collect()
    }

    #[test]
    fn combinational_chain() {
        let d = Design::new(
            "module top(a, y); input a; output y; wire n;
               BUFX1 g0(.A(a), .Y(n));
               BUFX1 g1(.A(n), .Y(y));
             endmodule",
        );
        let graph = TimingGraph::build(&d.netlist, &d.library, None).unwrap();
        // origin, ___input_a, ___output_y, g0, g1
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);

        let ordering = graph.topological_order();
        assert!(ordering.stuck.is_empty());
        assert_eq!(
            roles(&graph, &ordering.order),
            vec![
                NodeRole::Origin,
                NodeRole::PrimaryInput,
                NodeRole::Combinational,
                NodeRole::Combinational,
                NodeRole::PrimaryOutput,
            ]
        );
    }

    #[test]
    fn flip_flop_splits_into_launch_and_capture() {
        let d = Design::new(
            "module top(clk, d, q); input clk, d; output q;
               DFFX1 r(.D(d), .CK(clk), .Q(q));
             endmodule",
        );
        let clock = d.cell("___input_clk");
        let graph = TimingGraph::build(&d.netlist, &d.library, Some(clock)).unwrap();
        let r = d.cell("r");
        let launch = graph.node_of(r).unwrap();
        let capture = graph.capture_of(r).unwrap();
        assert_eq!(graph.node(launch).role, NodeRole::Launch);
        assert_eq!(graph.node(capture).role, NodeRole::Capture);

        let into_launch = graph.node(launch).incoming[0];
        assert_eq!(graph.edge(into_launch).from, graph.origin());
        assert_eq!(graph.edge(into_launch).port, "CK");

        let into_capture = &graph.node(capture).incoming;
        assert_eq!(into_capture.len(), 1);
        assert_eq!(graph.edge(into_capture[0]).port, "D");

        // The clock input gets no edges at all.
        let clock_node = graph.node_of(clock).unwrap();
        assert!(graph.node(clock_node).incoming.is_empty());
        assert!(graph.node(clock_node).outgoing.is_empty());
    }

    #[test]
    fn register_feedback_is_acyclic() {
        let d = Design::new(
            "module top(clk, q); input clk; output q; wire nq;
               DFFX1 r(.D(nq), .CK(clk), .Q(q));
               BUFX1 g(.A(q), .Y(nq));
             endmodule",
        );
        let clock = d.cell("___input_clk");
        let graph = TimingGraph::build(&d.netlist, &d.library, Some(clock)).unwrap();
        let ordering = graph.topological_order();
        assert!(ordering.stuck.is_empty());
        let capture = graph.capture_of(d.cell("r")).unwrap();
        assert!(ordering.order.contains(&capture));
        let g = graph.node_of(d.cell("g")).unwrap();
        let position = |n| ordering.order.iter().position(|&m| m == n);
        assert!(position(g) < position(capture));
    }

    #[test]
    fn combinational_loop_is_stuck() {
        let d = Design::new(
            "module top(a, y); input a; output y; wire l;
               NAND2X1 g0(.A(a), .B(l), .Y(y));
               BUFX1 g1(.A(y), .Y(l));
             endmodule",
        );
        let graph = TimingGraph::build(&d.netlist, &d.library, None).unwrap();
        let ordering = graph.topological_order();
        let stuck: HashSet<CellId> = ordering
            .stuck
            .iter()
            .filter_map(|&n| graph.node(n).cell)
            .collect();
        assert!(stuck.contains(&d.cell("g0")));
        assert!(stuck.contains(&d.cell("g1")));
        assert!(stuck.contains(&d.cell("___output_y")));
    }

    #[test]
    fn unreachable_gate_has_no_edges() {
        let d = Design::new(
            "module top(a, y); input a; output y; wire dangling;
               BUFX1 g0(.A(a), .Y(y));
               BUFX1 g1(.A(dangling), .Y());
             endmodule",
        );
        let graph = TimingGraph::build(&d.netlist, &d.library, None).unwrap();
        let g1 = graph.node_of(d.cell("g1")).unwrap();
        assert!(graph.node(g1).incoming.is_empty());
        assert!(!graph.topological_order().order.contains(&g1));
    }
}
