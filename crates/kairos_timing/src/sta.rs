//! Static timing analysis.
//!
//! [`analyze_timing`] runs on a parsed netlist in five steps:
//!
//! 1. Identify the clock: the instance driving the flip-flop clock pins.
//! 2. Build the [`TimingGraph`] and order it topologically.
//! 3. Forward pass: arrival times, slews and gate delays from the origin.
//! 4. Backward pass: required times from the endpoints.
//! 5. Slack, summary and the worst paths.
//!
//! Results are written into each instance's
//! [`InstanceTiming`](kairos_netlist::InstanceTiming) and returned as
//! report records. Unreachable instances keep their seed values; loops are
//! reported and left unanalyzed.

use crate::codes;
use crate::constraints::TimingConstraints;
use crate::graph::{definition_of, NodeRole, TimingGraph};
use crate::ids::NodeId;
use crate::paths::{enumerate_paths, worst_paths};
use crate::report::{format_paths, format_timing, PathsReport, TimingReport, TimingSummary};
use kairos_common::{Interner, KairosResult, MinMax};
use kairos_diagnostics::{Diagnostic, DiagnosticSink};
use kairos_liberty::Library;
use kairos_netlist::parser::{INPUT_PREFIX, OUTPUT_PREFIX};
use kairos_netlist::{CellId, InstanceKind, InstanceTiming, Netlist, WireId};
use kairos_source::Span;
use serde::Serialize;
use tracing::{debug, trace};

/// Number of paths after which enumeration gives up.
pub const PATH_ENUMERATION_LIMIT: usize = 100_000;

/// Knobs for [`analyze_timing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Number of worst paths to report.
    pub max_paths: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { max_paths: 10 }
    }
}

/// Everything an analysis produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingAnalysis {
    /// Summary and per-gate timing.
    pub timing_report: TimingReport,
    /// The worst paths.
    pub paths_report: PathsReport,
}

/// The instance driving the flip-flop clock pins and the wire it drives.
#[derive(Debug, Clone, Copy)]
struct Clock {
    cell: CellId,
    wire: WireId,
}

/// Runs static timing analysis on `netlist`.
///
/// Timing state from a previous run is discarded first (clock skew
/// annotations are kept), so the analysis can be repeated after resizing.
/// Problems with the design are reported to `sink`; an `Err` means the
/// netlist and library disagree about which cells exist.
pub fn analyze_timing(
    netlist: &mut Netlist,
    library: &Library,
    constraints: &TimingConstraints,
    options: AnalysisOptions,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> KairosResult<TimingAnalysis> {
    constraints.check_ports(netlist, interner, sink);
    reset_timing(netlist);

    let clock = find_clock(netlist, library, interner, sink)?;
    let mut graph = TimingGraph::build(netlist, library, clock.map(|c| c.cell))?;
    let ordering = graph.topological_order();
    if !ordering.stuck.is_empty() {
        report_loop(&graph, &ordering.stuck, netlist, interner, sink);
    }

    {
        let mut analyzer = Analyzer {
            netlist: &mut *netlist,
            library,
            constraints,
            interner,
        };
        if let Some(clock) = clock {
            analyzer.pin_clock(clock);
        }
        for &node in &ordering.order {
            analyzer.forward(&mut graph, node)?;
        }
        for &node in ordering.order.iter().rev() {
            analyzer.backward(&graph, node);
        }
        for &node in &ordering.order {
            analyzer.slack(&graph, node);
        }
    }

    let summary = summarize(&graph, &ordering.order, netlist, constraints, interner, sink);
    debug!(
        design = %summary.design,
        endpoints = summary.endpoints,
        worst_slack = ?summary.worst_slack,
        met = summary.met,
        "timing analysis complete"
    );

    let enumeration = enumerate_paths(&graph, netlist, PATH_ENUMERATION_LIMIT);
    if enumeration.truncated {
        sink.emit(
            Diagnostic::warning(
                codes::PATH_LIMIT,
                format!("path enumeration stopped after {PATH_ENUMERATION_LIMIT} paths"),
                Span::DUMMY,
            )
            .with_note("the reported paths are the worst of those enumerated"),
        );
    }
    let paths = worst_paths(enumeration.paths, options.max_paths);

    Ok(TimingAnalysis {
        paths_report: PathsReport {
            paths: format_paths(&paths, netlist, interner),
        },
        timing_report: format_timing(netlist, summary, interner),
    })
}

fn reset_timing(netlist: &mut Netlist) {
    let ids: Vec<CellId> = netlist.all_cells().map(|(id, _)| id).collect();
    for id in ids {
        let timing = &mut netlist.cell_mut(id).timing;
        *timing = InstanceTiming {
            clock_skew: timing.clock_skew,
            ..InstanceTiming::default()
        };
    }
}

fn find_clock(
    netlist: &Netlist,
    library: &Library,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> KairosResult<Option<Clock>> {
    let mut sources: Vec<Clock> = Vec::new();
    let mut has_ff = false;
    for (_, cell) in netlist.cells().filter(|(_, c)| c.is_ff) {
        has_ff = true;
        let Some(pin) = definition_of(cell, library)?.clock_pin() else {
            continue;
        };
        if let Some(edge) = cell.driver_of(&pin.name) {
            if sources.iter().all(|c| c.cell != edge.source) {
                sources.push(Clock {
                    cell: edge.source,
                    wire: edge.wire,
                });
            }
        }
    }

    let name = |id: CellId| interner.resolve(netlist.cell(id).name);
    match sources.as_slice() {
        [] => {
            if has_ff {
                sink.emit(Diagnostic::warning(
                    codes::NO_CLOCK,
                    "no flip-flop has a driven clock pin",
                    Span::DUMMY,
                ));
            }
            Ok(None)
        }
        [clock, rest @ ..] => {
            if !rest.is_empty() {
                let others: Vec<String> = rest.iter().map(|c| format!("`{}`", name(c.cell))).collect();
                sink.emit(
                    Diagnostic::warning(
                        codes::MULTIPLE_CLOCKS,
                        format!(
                            "flip-flops are clocked from {} different sources",
                            sources.len()
                        ),
                        netlist.cell(rest[0].cell).span,
                    )
                    .with_note(format!(
                        "`{}` is used as the clock; also found {}",
                        name(clock.cell),
                        others.join(", ")
                    )),
                );
            }
            debug!(clock = name(clock.cell), "identified clock source");
            Ok(Some(*clock))
        }
    }
}

fn report_loop(
    graph: &TimingGraph,
    stuck: &[NodeId],
    netlist: &Netlist,
    interner: &Interner,
    sink: &DiagnosticSink,
) {
    let names: Vec<&str> = stuck
        .iter()
        .filter_map(|&n| graph.node(n).cell)
        .map(|c| interner.resolve(netlist.cell(c).name))
        .collect();
    let shown: Vec<String> = names.iter().take(5).map(|n| format!("`{n}`")).collect();
    let mut note = format!("involved: {}", shown.join(", "));
    if names.len() > shown.len() {
        note.push_str(&format!(" and {} more", names.len() - shown.len()));
    }
    let span = stuck
        .iter()
        .filter_map(|&n| graph.node(n).cell)
        .map(|c| netlist.cell(c).span)
        .next()
        .unwrap_or(Span::DUMMY);
    sink.emit(
        Diagnostic::warning(
            codes::COMBINATIONAL_LOOP,
            format!(
                "combinational loop: {} instances are left unanalyzed",
                names.len()
            ),
            span,
        )
        .with_note(note),
    );
}

/// Late and early slew to evaluate tables at.
fn slew_bounds(slew: MinMax) -> (f64, f64) {
    let late = if slew.is_set() { slew.max } else { 0.0 };
    let early = if slew.min.is_finite() { slew.min } else { late };
    (late, early)
}

/// `{max, min}` of a `(rise, fall)` pair.
fn spread((rise, fall): (f64, f64)) -> MinMax {
    MinMax::new(rise.max(fall), rise.min(fall))
}

/// Folds a late and an early `(rise, fall)` lookup into one range.
fn late_early(late: Option<(f64, f64)>, early: Option<(f64, f64)>) -> Option<MinMax> {
    let (late_rise, late_fall) = late?;
    let (early_rise, early_fall) = early?;
    Some(MinMax::new(
        late_rise.max(late_fall),
        early_rise.min(early_fall),
    ))
}

/// Arrival at the output of a node.
struct Arrival {
    aat: MinMax,
    slew: MinMax,
}

struct Analyzer<'a> {
    netlist: &'a mut Netlist,
    library: &'a Library,
    constraints: &'a TimingConstraints,
    interner: &'a Interner,
}

impl Analyzer<'_> {
    /// Module port name of a boundary pseudo-instance.
    fn port_name(&self, id: CellId) -> &str {
        let name = self.interner.resolve(self.netlist.cell(id).name);
        name.strip_prefix(INPUT_PREFIX)
            .or_else(|| name.strip_prefix(OUTPUT_PREFIX))
            .unwrap_or(name)
    }

    fn wire_slew(&self, wire: WireId) -> f64 {
        let name = self.interner.resolve(self.netlist.wire(wire).name);
        self.constraints.input_slew(name)
    }

    /// Slew on the clock pin of flip-flop `id`.
    fn clock_slew(&self, id: CellId) -> KairosResult<f64> {
        let cell = self.netlist.cell(id);
        let slew = definition_of(cell, self.library)?
            .clock_pin()
            .and_then(|pin| cell.driver_of(&pin.name))
            .map_or(0.0, |edge| self.wire_slew(edge.wire));
        Ok(slew)
    }

    fn pin_clock(&mut self, clock: Clock) {
        let slew = MinMax::splat(self.wire_slew(clock.wire));
        let timing = &mut self.netlist.cell_mut(clock.cell).timing;
        timing.aat = MinMax::ZERO;
        timing.delay = MinMax::ZERO;
        timing.input_slew = slew;
        timing.output_slew = slew;
        trace!(slew = slew.max, "pinned clock source");
    }

    /// Output load of `id`, computed once per analysis.
    fn load(&mut self, id: CellId) -> KairosResult<f64> {
        let cell = self.netlist.cell(id);
        if cell.timing.load_computed {
            return Ok(cell.timing.capacitance_load);
        }
        let mut load = 0.0;
        for edge in &cell.fanout {
            let target = self.netlist.cell(edge.target);
            let pin = match target.kind {
                InstanceKind::PrimaryOutput => {
                    self.constraints.output_load(self.port_name(edge.target))
                }
                _ => definition_of(target, self.library)?
                    .pin(&edge.port)
                    .map_or(0.0, |p| p.capacitance),
            };
            load += edge.net_capacitance + pin;
        }
        let timing = &mut self.netlist.cell_mut(id).timing;
        timing.capacitance_load = load;
        timing.load_computed = true;
        Ok(load)
    }

    fn arrival_at(&self, graph: &TimingGraph, node: NodeId) -> Arrival {
        let node = graph.node(node);
        let Some(cell) = node.cell else {
            return Arrival {
                aat: MinMax::ZERO,
                slew: MinMax::ZERO,
            };
        };
        let timing = &self.netlist.cell(cell).timing;
        Arrival {
            aat: match node.role {
                NodeRole::Launch => timing.aat_ff_start,
                _ => timing.aat,
            },
            slew: timing.output_slew,
        }
    }

    fn required_at(&self, graph: &TimingGraph, node: NodeId) -> f64 {
        let node = graph.node(node);
        node.cell.map_or(f64::INFINITY, |cell| {
            let timing = &self.netlist.cell(cell).timing;
            match node.role {
                NodeRole::Launch => timing.rat_ff_start,
                _ => timing.rat,
            }
        })
    }

    fn forward(&mut self, graph: &mut TimingGraph, node: NodeId) -> KairosResult<()> {
        let (role, cell) = (graph.node(node).role, graph.node(node).cell);
        let Some(id) = cell else {
            return Ok(());
        };
        match role {
            NodeRole::Origin => {}
            NodeRole::PrimaryInput => self.primary_input(id),
            NodeRole::Launch => self.launch(graph, node, id)?,
            NodeRole::Capture => self.capture(graph, node, id)?,
            NodeRole::Combinational | NodeRole::PrimaryOutput => {
                self.propagate(graph, node, id)?
            }
        }
        Ok(())
    }

    fn primary_input(&mut self, id: CellId) {
        let port = self.port_name(id);
        let arrival = MinMax::splat(self.constraints.input_delay(port));
        let slew = MinMax::splat(self.constraints.input_slew(port));
        let timing = &mut self.netlist.cell_mut(id).timing;
        timing.aat = arrival;
        timing.delay = MinMax::ZERO;
        timing.input_slew = slew;
        timing.output_slew = slew;
    }

    fn launch(&mut self, graph: &mut TimingGraph, node: NodeId, id: CellId) -> KairosResult<()> {
        let clock_slew = self.clock_slew(id)?;
        let load = self.load(id)?;
        let arc = definition_of(self.netlist.cell(id), self.library)?.clock_to_q_arc();
        let delay = arc
            .and_then(|a| a.delay(clock_slew, load))
            .map_or(MinMax::ZERO, spread);
        let output_slew = arc
            .and_then(|a| a.transition(clock_slew, load))
            .map_or(MinMax::splat(clock_slew), spread);

        for edge in graph.node(node).incoming.clone() {
            graph.edge_mut(edge).delay = delay;
        }
        let timing = &mut self.netlist.cell_mut(id).timing;
        timing.delay = delay;
        timing.input_slew = MinMax::splat(clock_slew);
        timing.output_slew = output_slew;
        timing.aat_ff_start = MinMax::splat(timing.clock_skew).offset(delay);
        Ok(())
    }

    fn propagate(&mut self, graph: &mut TimingGraph, node: NodeId, id: CellId) -> KairosResult<()> {
        let def = match self.netlist.cell(id).kind {
            InstanceKind::PrimaryOutput => None,
            _ => Some(definition_of(self.netlist.cell(id), self.library)?),
        };
        let load = match def {
            Some(_) => self.load(id)?,
            None => 0.0,
        };

        let mut aat = MinMax::empty();
        let mut delay = MinMax::empty();
        let mut input_slew = MinMax::empty();
        let mut output_slew = MinMax::empty();
        for edge in graph.node(node).incoming.clone() {
            let from = graph.edge(edge).from;
            let parent = self.arrival_at(graph, from);
            let (late, early) = slew_bounds(parent.slew);
            let arc = def.and_then(|d| d.delay_arc(&graph.edge(edge).port));
            let edge_delay = arc
                .and_then(|a| late_early(a.delay(late, load), a.delay(early, load)))
                .unwrap_or(MinMax::ZERO);
            let edge_slew = arc
                .and_then(|a| late_early(a.transition(late, load), a.transition(early, load)))
                .unwrap_or(parent.slew);
            graph.edge_mut(edge).delay = edge_delay;

            aat.widen(parent.aat.offset(edge_delay));
            delay.widen(edge_delay);
            input_slew.widen(parent.slew);
            output_slew.widen(edge_slew);
        }

        let timing = &mut self.netlist.cell_mut(id).timing;
        timing.aat = aat;
        timing.delay = delay;
        timing.input_slew = input_slew;
        timing.output_slew = output_slew;
        Ok(())
    }

    fn capture(&mut self, graph: &mut TimingGraph, node: NodeId, id: CellId) -> KairosResult<()> {
        let clock_slew = self.clock_slew(id)?;
        let def = definition_of(self.netlist.cell(id), self.library)?;

        let mut aat = MinMax::empty();
        let mut setup: Option<MinMax> = None;
        let mut hold: Option<MinMax> = None;
        for edge in graph.node(node).incoming.clone() {
            let parent = self.arrival_at(graph, graph.edge(edge).from);
            let port = &graph.edge(edge).port;
            let (late, early) = slew_bounds(parent.slew);
            if let Some((rise, fall)) = def.setup_arc(port).and_then(|a| a.constraint(clock_slew, late)) {
                setup
                    .get_or_insert_with(MinMax::empty)
                    .widen(spread((rise, fall)));
            }
            if let Some((rise, fall)) = def.hold_arc(port).and_then(|a| a.constraint(clock_slew, early)) {
                hold.get_or_insert_with(MinMax::empty)
                    .widen(MinMax::new(-rise.min(fall), -rise.max(fall)));
            }
            graph.edge_mut(edge).delay = MinMax::ZERO;
            aat.widen(parent.aat);
        }

        // input_slew stays the clock slew written by the launch side.
        let timing = &mut self.netlist.cell_mut(id).timing;
        timing.aat = aat;
        if let Some(setup) = setup {
            timing.setup = setup;
        }
        if let Some(hold) = hold {
            timing.hold = hold;
        }
        Ok(())
    }

    fn backward(&mut self, graph: &TimingGraph, node: NodeId) {
        let node_ref = graph.node(node);
        let Some(id) = node_ref.cell else {
            return;
        };
        let period = self.constraints.clock_period;
        match node_ref.role {
            NodeRole::Origin => {}
            NodeRole::PrimaryOutput => {
                let rat = period - self.constraints.output_delay(self.port_name(id));
                self.netlist.cell_mut(id).timing.rat = rat;
            }
            NodeRole::Capture => {
                let timing = &mut self.netlist.cell_mut(id).timing;
                timing.rat = period + timing.clock_skew;
            }
            role => {
                let rat = node_ref
                    .outgoing
                    .iter()
                    .map(|&e| {
                        let edge = graph.edge(e);
                        self.required_at(graph, edge.to) - edge.delay.max
                    })
                    .fold(f64::INFINITY, f64::min);
                let timing = &mut self.netlist.cell_mut(id).timing;
                if role == NodeRole::Launch {
                    timing.rat_ff_start = rat;
                } else {
                    timing.rat = rat;
                }
            }
        }
    }

    fn slack(&mut self, graph: &TimingGraph, node: NodeId) {
        let node = graph.node(node);
        let Some(id) = node.cell else {
            return;
        };
        let timing = &mut self.netlist.cell_mut(id).timing;
        match node.role {
            NodeRole::Origin => {}
            NodeRole::Launch => {
                timing.slack_ff_start = timing.rat_ff_start - timing.aat_ff_start.max;
            }
            NodeRole::Capture => {
                timing.slack = timing.rat - timing.aat.max;
                let hold_slack = timing.aat.min + timing.hold.max - timing.clock_skew;
                timing.hold_slack = timing.hold.min.is_finite().then_some(hold_slack);
            }
            _ => timing.slack = timing.rat - timing.aat.max,
        }
    }
}

fn summarize(
    graph: &TimingGraph,
    order: &[NodeId],
    netlist: &Netlist,
    constraints: &TimingConstraints,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> TimingSummary {
    let mut worst: Option<(f64, CellId)> = None;
    let mut worst_hold: Option<(f64, CellId)> = None;
    let mut endpoints = 0;
    let mut setup_violations = 0;
    let mut hold_violations = 0;
    for &node in order {
        let node = graph.node(node);
        let Some(id) = node.cell.filter(|_| node.role.is_endpoint()) else {
            continue;
        };
        endpoints += 1;
        let timing = &netlist.cell(id).timing;
        if timing.slack < 0.0 {
            setup_violations += 1;
        }
        if worst.map_or(true, |(s, _)| timing.slack < s) {
            worst = Some((timing.slack, id));
        }
        if let Some(hold) = timing.hold_slack {
            if hold < 0.0 {
                hold_violations += 1;
            }
            if worst_hold.map_or(true, |(s, _)| hold < s) {
                worst_hold = Some((hold, id));
            }
        }
    }

    let name = |id: CellId| interner.resolve(netlist.cell(id).name);
    if let Some((slack, id)) = worst.filter(|_| setup_violations > 0) {
        sink.emit(Diagnostic::warning(
            codes::SETUP_VIOLATION,
            format!(
                "setup timing not met: worst slack {slack:.4} at `{}` ({setup_violations} failing endpoints)",
                name(id)
            ),
            Span::DUMMY,
        ));
    }
    if let Some((slack, id)) = worst_hold.filter(|_| hold_violations > 0) {
        sink.emit(Diagnostic::warning(
            codes::HOLD_VIOLATION,
            format!(
                "hold timing not met: worst slack {slack:.4} at `{}` ({hold_violations} failing endpoints)",
                name(id)
            ),
            Span::DUMMY,
        ));
    }

    TimingSummary {
        design: netlist.module_name.clone(),
        clock_period: constraints.clock_period,
        worst_slack: worst.map(|(s, _)| s),
        worst_hold_slack: worst_hold.map(|(s, _)| s),
        setup_violations,
        hold_violations,
        endpoints,
        met: setup_violations == 0 && hold_violations == 0,
    }
}
