//! Serializable report records.
//!
//! Every record owns its data, so a report outlives the netlist and graph
//! it was built from. Records are emitted in arena order, which makes the
//! output deterministic for a given input.

use crate::graph::NodeRole;
use crate::paths::EnumeratedPath;
use kairos_common::{Interner, MinMax};
use kairos_liberty::{CellDefinition, Library};
use kairos_netlist::{CellId, CellInstance, InstanceKind, Netlist};
use serde::Serialize;

/// Design-level outcome of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingSummary {
    /// Module name.
    pub design: String,
    /// Clock period the design was analyzed against.
    pub clock_period: f64,
    /// Smallest setup slack over all reached endpoints.
    pub worst_slack: Option<f64>,
    /// Smallest hold slack over all capture points with hold data.
    pub worst_hold_slack: Option<f64>,
    /// Endpoints with negative setup slack.
    pub setup_violations: usize,
    /// Capture points with negative hold slack.
    pub hold_violations: usize,
    /// Number of reached endpoints.
    pub endpoints: usize,
    /// `true` when there are no setup or hold violations.
    pub met: bool,
}

/// Per-gate timing record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateTiming {
    /// Instance name.
    pub name: String,
    /// Instance name with brackets and whitespace removed.
    pub sanitized_id: String,
    /// Library cell the instance is bound to.
    pub module: String,
    /// Role of the instance.
    pub kind: InstanceKind,
    /// `false` if no path from a start point reaches the instance.
    pub reachable: bool,
    /// Slew range at the inputs.
    pub input_slew: MinMax,
    /// Slew range at the output.
    pub output_slew: MinMax,
    /// Load on the output.
    pub capacitance_load: f64,
    /// Gate delay range over all inputs.
    pub delay: MinMax,
    /// Arrival time at the output (data arrival for a flip-flop).
    pub aat: MinMax,
    /// Required time.
    pub rat: f64,
    /// Setup slack.
    pub slack: f64,
    /// Launch and capture data for flip-flops.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_flop: Option<FlipFlopTiming>,
}

/// Flip-flop specific values of a [`GateTiming`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlipFlopTiming {
    /// Arrival at Q.
    pub aat_ff_start: MinMax,
    /// Required time at Q.
    pub rat_ff_start: f64,
    /// Slack at Q.
    pub slack_ff_start: f64,
    /// Setup requirement.
    pub setup: MinMax,
    /// Hold requirement, negated.
    pub hold: MinMax,
    /// Hold slack at the data pin.
    pub hold_slack: Option<f64>,
    /// Clock arrival offset.
    pub clock_skew: f64,
}

/// Summary plus per-gate records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingReport {
    /// Design-level outcome.
    pub summary: TimingSummary,
    /// One record per instance, constants excluded.
    pub gates: Vec<GateTiming>,
}

/// The gate half of a [`PathElement`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathGate {
    /// Instance name.
    pub name: String,
    /// Instance name with brackets and whitespace removed.
    pub sanitized_id: String,
    /// Delay through the gate via the path's input port.
    pub delay: MinMax,
    /// Arrival time at the gate output.
    pub aat: MinMax,
    /// Library cell the instance is bound to.
    pub module: String,
    /// Required time at the gate output.
    pub rat: f64,
}

/// One step of a timing path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathElement {
    /// The gate passed through.
    pub gate: PathGate,
    /// Input port the path enters the gate by.
    pub port: String,
}

/// A start-to-end timing path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingPath {
    /// Setup slack at the path's endpoint.
    pub slack: f64,
    /// Steps from start point to endpoint.
    pub elements: Vec<PathElement>,
}

/// Worst paths of an analysis, worst first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathsReport {
    /// Reported paths.
    pub paths: Vec<TimingPath>,
}

/// A connection as seen from one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortConnection {
    /// Port on the instance being summarized.
    pub port: String,
    /// Instance on the other end.
    pub instance: String,
}

/// Structural summary of one placed gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSummary {
    /// Instance name.
    pub name: String,
    /// Library cell the instance is bound to.
    pub module: String,
    /// Cell family.
    pub basename_x: String,
    /// Drive strength.
    pub size: u32,
    /// Sizes the family offers.
    pub available_sizes: Vec<u32>,
    /// Cell area.
    pub area: f64,
    /// Leakage power.
    pub leakage_power: f64,
    /// Whether the cell is a flip-flop.
    pub is_ff: bool,
    /// Drivers of each input.
    pub fanin: Vec<PortConnection>,
    /// Sinks of the output.
    pub fanout: Vec<PortConnection>,
}

/// Summary of one library cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryCellSummary {
    /// Cell name.
    pub name: String,
    /// Name without the size suffix.
    pub basename: String,
    /// Cell family.
    pub basename_x: String,
    /// Drive strength.
    pub size: u32,
    /// Sizes the family offers.
    pub available_sizes: Vec<u32>,
    /// Cell area.
    pub area: f64,
    /// Leakage power.
    pub leakage_power: f64,
    /// Whether the cell is a flip-flop.
    pub is_ff: bool,
    /// Input pin names.
    pub inputs: Vec<String>,
    /// Functional output pin.
    pub output: Option<String>,
}

/// Strips brackets and whitespace from an instance name.
pub fn sanitize_id(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']') && !c.is_whitespace())
        .collect()
}

/// Formats enumerated paths.
pub fn format_paths(
    paths: &[EnumeratedPath],
    netlist: &Netlist,
    interner: &Interner,
) -> Vec<TimingPath> {
    paths
        .iter()
        .map(|path| TimingPath {
            slack: path.slack,
            elements: path
                .steps
                .iter()
                .map(|step| {
                    let cell = netlist.cell(step.cell);
                    let name = interner.resolve(cell.name);
                    let (aat, rat) = match step.role {
                        NodeRole::Launch => (cell.timing.aat_ff_start, cell.timing.rat_ff_start),
                        _ => (cell.timing.aat, cell.timing.rat),
                    };
                    PathElement {
                        gate: PathGate {
                            name: name.to_string(),
                            sanitized_id: sanitize_id(name),
                            delay: step.delay,
                            aat,
                            module: cell.cell_type.clone(),
                            rat,
                        },
                        port: step.port.clone(),
                    }
                })
                .collect(),
        })
        .collect()
}

/// Formats per-gate timing for every non-constant instance.
pub fn format_timing(netlist: &Netlist, summary: TimingSummary, interner: &Interner) -> TimingReport {
    let gates = netlist
        .cells()
        .map(|(_, cell)| {
            let name = interner.resolve(cell.name);
            let t = &cell.timing;
            GateTiming {
                name: name.to_string(),
                sanitized_id: sanitize_id(name),
                module: cell.cell_type.clone(),
                kind: cell.kind,
                reachable: t.aat.min.is_finite() || t.aat_ff_start.min.is_finite(),
                input_slew: t.input_slew,
                output_slew: t.output_slew,
                capacitance_load: t.capacitance_load,
                delay: t.delay,
                aat: t.aat,
                rat: t.rat,
                slack: t.slack,
                flip_flop: cell.is_ff.then(|| FlipFlopTiming {
                    aat_ff_start: t.aat_ff_start,
                    rat_ff_start: t.rat_ff_start,
                    slack_ff_start: t.slack_ff_start,
                    setup: t.setup,
                    hold: t.hold,
                    hold_slack: t.hold_slack,
                    clock_skew: t.clock_skew,
                }),
            }
        })
        .collect();
    TimingReport { summary, gates }
}

/// Summarizes every gate instance; boundary and constant pseudo-instances
/// are left out.
pub fn format_cells(netlist: &Netlist, library: &Library, interner: &Interner) -> Vec<CellSummary> {
    let name_of = |id: CellId| interner.resolve(netlist.cell(id).name).to_string();
    netlist
        .cells()
        .filter(|(_, cell)| cell.kind == InstanceKind::Gate)
        .map(|(_, cell)| {
            let def = cell.definition(library);
            CellSummary {
                name: interner.resolve(cell.name).to_string(),
                module: cell.cell_type.clone(),
                basename_x: def.map(|d| d.basename_x.clone()).unwrap_or_default(),
                size: def.map_or(1, |d| d.size),
                available_sizes: def.map(|d| d.available_sizes.clone()).unwrap_or_default(),
                area: def.map_or(0.0, |d| d.area),
                leakage_power: def.map_or(0.0, |d| d.leakage_power),
                is_ff: cell.is_ff,
                fanin: cell
                    .fanin
                    .iter()
                    .map(|e| PortConnection {
                        port: e.port.clone(),
                        instance: name_of(e.source),
                    })
                    .collect(),
                fanout: fanout_of(cell, &name_of),
            }
        })
        .collect()
}

fn fanout_of(cell: &CellInstance, name_of: &dyn Fn(CellId) -> String) -> Vec<PortConnection> {
    let port = cell.output_port().unwrap_or_default();
    cell.fanout
        .iter()
        .map(|e| PortConnection {
            port: port.to_string(),
            instance: name_of(e.target),
        })
        .collect()
}

/// Summarizes every real (non-pseudo) library cell.
pub fn format_library_cells(library: &Library) -> Vec<LibraryCellSummary> {
    library.real_cells().map(summarize_definition).collect()
}

fn summarize_definition(def: &CellDefinition) -> LibraryCellSummary {
    LibraryCellSummary {
        name: def.name.clone(),
        basename: def.basename.clone(),
        basename_x: def.basename_x.clone(),
        size: def.size,
        available_sizes: def.available_sizes.clone(),
        area: def.area,
        leakage_power: def.leakage_power,
        is_ff: def.is_ff(),
        inputs: def.input_pins().map(|p| p.name.clone()).collect(),
        output: def.output_pin().map(|p| p.name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Design;

    const TWO_GATES: &str = "module top(a, y); input a; output y; wire n;
        BUFX1 u0(.A(a), .Y(n));
        BUFX2 u1(.A(n), .Y(y));
      endmodule";

    #[test]
    fn sanitized_ids() {
        assert_eq!(sanitize_id("u_reg[3]"), "u_reg3");
        assert_eq!(sanitize_id("a b\t[0]"), "ab0");
        assert_eq!(sanitize_id("plain"), "plain");
    }

    #[test]
    fn cells_skip_boundary_instances() {
        let d = Design::new(TWO_GATES);
        let cells = format_cells(&d.netlist, &d.library, &d.interner);
        let names: Vec<&str> = cells.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["u0", "u1"]);

        let u1 = &cells[1];
        assert_eq!(u1.basename_x, "BUFX");
        assert_eq!(u1.size, 2);
        assert_eq!(u1.available_sizes, vec![1, 2]);
        assert_eq!(u1.area, 2.0);
        assert_eq!(
            u1.fanin,
            vec![PortConnection {
                port: "A".to_string(),
                instance: "u0".to_string()
            }]
        );
        assert_eq!(u1.fanout[0].instance, "___output_y");
        assert_eq!(u1.fanout[0].port, "Y");
    }

    #[test]
    fn library_cells_exclude_pseudo_cells() {
        let d = Design::new(TWO_GATES);
        let cells = format_library_cells(&d.library);
        let names: Vec<&str> = cells.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"NAND2X1"));
        assert!(!names.contains(&"input"));
        assert!(!names.contains(&"vdd"));

        let dff = cells.iter().find(|c| c.name == "DFFX1").unwrap();
        assert!(dff.is_ff);
        assert_eq!(dff.inputs, vec!["D", "CK"]);
        assert_eq!(dff.output.as_deref(), Some("Q"));
    }

    #[test]
    fn unanalyzed_gates_are_unreachable_and_serialize_infinities_as_null() {
        let d = Design::new(TWO_GATES);
        let summary = TimingSummary {
            design: "top".to_string(),
            clock_period: 1.0,
            worst_slack: None,
            worst_hold_slack: None,
            setup_violations: 0,
            hold_violations: 0,
            endpoints: 0,
            met: true,
        };
        let report = format_timing(&d.netlist, summary, &d.interner);
        assert!(report.gates.iter().all(|g| !g.reachable));
        assert!(report.gates.iter().all(|g| g.flip_flop.is_none()));

        let json = serde_json::to_value(&report).unwrap();
        let gate = &json["gates"][0];
        assert!(gate["rat"].is_null());
        assert!(gate["aat"]["min"].is_null());
        assert_eq!(gate["aat"]["max"], 0.0);
        assert!(gate.get("flip_flop").is_none());
    }
}
