//! Start-to-end path enumeration.

use crate::graph::{NodeRole, TimingGraph};
use crate::ids::{EdgeId, NodeId};
use kairos_common::MinMax;
use kairos_netlist::{CellId, Netlist};
use std::collections::HashSet;

/// One step of an enumerated path: the node entered and how.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    /// Instance of the node.
    pub cell: CellId,
    /// Role of the node; distinguishes launch from capture on flip-flops.
    pub role: NodeRole,
    /// Input port the path enters by.
    pub port: String,
    /// Delay of the edge entering the node.
    pub delay: MinMax,
}

/// A path from an origin child to an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratedPath {
    /// Steps in path order.
    pub steps: Vec<PathStep>,
    /// Setup slack at the endpoint.
    pub slack: f64,
}

/// Enumerated paths plus whether the search stopped early.
#[derive(Debug, Clone, Default)]
pub struct PathEnumeration {
    /// Paths in depth-first order.
    pub paths: Vec<EnumeratedPath>,
    /// `true` if `limit` paths were found before the search finished.
    pub truncated: bool,
}

/// Walks every path from the origin to the first endpoint on each branch.
///
/// Stops after `limit` paths. Nodes already on the current path are not
/// re-entered, so loops do not make the walk diverge. Must run after slack
/// computation, since endpoint slack is read from the netlist.
pub fn enumerate_paths(graph: &TimingGraph, netlist: &Netlist, limit: usize) -> PathEnumeration {
    let origin = graph.origin();
    let mut result = PathEnumeration::default();
    // (node, index of the next outgoing edge to try)
    let mut stack: Vec<(NodeId, usize)> = vec![(origin, 0)];
    let mut trail: Vec<EdgeId> = Vec::new();
    let mut on_trail: HashSet<NodeId> = HashSet::from([origin]);

    while let Some(top) = stack.last_mut() {
        let (node, next) = *top;
        let outgoing = &graph.node(node).outgoing;
        if next == outgoing.len() {
            stack.pop();
            on_trail.remove(&node);
            trail.pop();
            continue;
        }
        top.1 += 1;

        let edge = outgoing[next];
        let child = graph.edge(edge).to;
        if on_trail.contains(&child) {
            continue;
        }
        trail.push(edge);
        if graph.node(child).role.is_endpoint() {
            if result.paths.len() == limit {
                result.truncated = true;
                break;
            }
            result.paths.push(materialize(graph, netlist, &trail));
            trail.pop();
        } else {
            on_trail.insert(child);
            stack.push((child, 0));
        }
    }
    result
}

fn materialize(graph: &TimingGraph, netlist: &Netlist, trail: &[EdgeId]) -> EnumeratedPath {
    let steps: Vec<PathStep> = trail
        .iter()
        .filter_map(|&id| {
            let edge = graph.edge(id);
            let node = graph.node(edge.to);
            Some(PathStep {
                cell: node.cell?,
                role: node.role,
                port: edge.port.clone(),
                delay: edge.delay,
            })
        })
        .collect();
    let slack = steps
        .last()
        .map_or(f64::INFINITY, |end| netlist.cell(end.cell).timing.slack);
    EnumeratedPath { steps, slack }
}

/// Keeps the `count` paths with the smallest endpoint slack, worst first.
///
/// Paths with equal slack keep their enumeration order.
pub fn worst_paths(mut paths: Vec<EnumeratedPath>, count: usize) -> Vec<EnumeratedPath> {
    paths.sort_by(|a, b| a.slack.total_cmp(&b.slack));
    paths.truncate(count);
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Design;

    fn ports(path: &EnumeratedPath) -> Vec<&str> {
        path.steps.iter().map(|s| s.port.as_str()).collect()
    }

    #[test]
    fn reconvergent_fanout_yields_one_path_per_branch() {
        let d = Design::new(
            "module top(a, y); input a; output y; wire n;
               BUFX1 g0(.A(a), .Y(n));
               NAND2X1 g1(.A(n), .B(n), .Y(y));
             endmodule",
        );
        let graph = TimingGraph::build(&d.netlist, &d.library, None).unwrap();
        let found = enumerate_paths(&graph, &d.netlist, 100);
        assert!(!found.truncated);
        assert_eq!(found.paths.len(), 2);
        assert_eq!(ports(&found.paths[0]), vec!["A", "A", "A", "A"]);
        assert_eq!(ports(&found.paths[1]), vec!["A", "A", "B", "A"]);
        assert_eq!(found.paths[0].steps[0].role, NodeRole::PrimaryInput);
        assert_eq!(found.paths[0].steps[3].role, NodeRole::PrimaryOutput);
    }

    #[test]
    fn register_paths_end_at_capture() {
        let d = Design::new(
            "module top(clk, q); input clk; output q; wire nq;
               DFFX1 r(.D(nq), .CK(clk), .Q(q));
               BUFX1 g(.A(q), .Y(nq));
             endmodule",
        );
        let clock = d.cell("___input_clk");
        let graph = TimingGraph::build(&d.netlist, &d.library, Some(clock)).unwrap();
        let found = enumerate_paths(&graph, &d.netlist, 100);
        let roles: Vec<Vec<NodeRole>> = found
            .paths
            .iter()
            .map(|p| p.steps.iter().map(|s| s.role).collect())
            .collect();
        assert!(roles.contains(&vec![
            NodeRole::Launch,
            NodeRole::Combinational,
            NodeRole::Capture
        ]));
        assert!(roles.contains(&vec![NodeRole::Launch, NodeRole::PrimaryOutput]));
    }

    #[test]
    fn limit_truncates() {
        let d = Design::new(
            "module top(a, b, y, z); input a, b; output y, z;
               BUFX1 g0(.A(a), .Y(y));
               BUFX1 g1(.A(b), .Y(z));
             endmodule",
        );
        let graph = TimingGraph::build(&d.netlist, &d.library, None).unwrap();
        let found = enumerate_paths(&graph, &d.netlist, 1);
        assert!(found.truncated);
        assert_eq!(found.paths.len(), 1);
        assert!(!enumerate_paths(&graph, &d.netlist, 2).truncated);
    }

    #[test]
    fn worst_paths_sort_stably() {
        let path = |slack: f64, port: &str| EnumeratedPath {
            steps: vec![PathStep {
                cell: CellId::from_raw(0),
                role: NodeRole::PrimaryOutput,
                port: port.to_string(),
                delay: MinMax::ZERO,
            }],
            slack,
        };
        let sorted = worst_paths(
            vec![path(2.0, "a"), path(-1.0, "b"), path(2.0, "c"), path(0.5, "d")],
            3,
        );
        let order: Vec<&str> = sorted.iter().map(|p| p.steps[0].port.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a"]);
    }
}
