//! Cell instances, their connectivity and per-instance timing state.

use crate::error::ResizeError;
use crate::ids::{CellId, WireId};
use kairos_common::{Ident, MinMax};
use kairos_liberty::{CellDefinition, Library, PinDirection};
use kairos_source::Span;
use serde::Serialize;

/// What an instance stands for.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    /// A library cell from the netlist.
    Gate,
    /// `___input_<wire>`: drives a module input.
    PrimaryInput,
    /// `___output_<wire>`: observes a module output.
    PrimaryOutput,
    /// `___vdd` / `___gnd`: drives a constant wire.
    Constant,
}

/// An incoming connection.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct FaninEdge {
    /// Driving instance.
    pub source: CellId,
    /// Input port on this instance.
    pub port: String,
    /// Wire carrying the signal.
    pub wire: WireId,
}

/// An outgoing connection.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct FanoutEdge {
    /// Receiving instance.
    pub target: CellId,
    /// Input port on the target.
    pub port: String,
    /// Wire carrying the signal.
    pub wire: WireId,
    /// Wire capacitance seen at the target.
    pub net_capacitance: f64,
}

/// Timing values computed by the analyzer.
///
/// Flip-flops carry two roles: the capture side uses `aat`, `rat`, `slack`,
/// `setup` and `hold`; the launch side uses the `*_ff_start` fields.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct InstanceTiming {
    /// Arrival time at the output (capture side for flip-flops).
    pub aat: MinMax,
    /// Required time.
    pub rat: f64,
    /// Setup slack, `rat - aat.max`.
    pub slack: f64,
    /// Arrival time at the flip-flop output.
    pub aat_ff_start: MinMax,
    /// Required time at the flip-flop output.
    pub rat_ff_start: f64,
    /// Slack at the flip-flop output.
    pub slack_ff_start: f64,
    /// Hold slack at a capturing flip-flop, when hold data exists.
    pub hold_slack: Option<f64>,
    /// Setup requirement from the constraint tables.
    pub setup: MinMax,
    /// Hold requirement, stored negated.
    pub hold: MinMax,
    /// Clock arrival offset at a flip-flop.
    pub clock_skew: f64,
    /// Slew arriving at the inputs.
    pub input_slew: MinMax,
    /// Slew leaving the output.
    pub output_slew: MinMax,
    /// Total load on the output.
    pub capacitance_load: f64,
    /// `true` once `capacitance_load` has been computed.
    pub load_computed: bool,
    /// Delay through the cell, over all inputs.
    pub delay: MinMax,
}

impl Default for InstanceTiming {
    fn default() -> Self {
        let unreached = MinMax::new(0.0, f64::INFINITY);
        Self {
            aat: unreached,
            rat: f64::INFINITY,
            slack: 0.0,
            aat_ff_start: unreached,
            rat_ff_start: f64::INFINITY,
            slack_ff_start: 0.0,
            hold_slack: None,
            setup: MinMax::unset(),
            hold: MinMax::unset(),
            clock_skew: 0.0,
            input_slew: MinMax::unset(),
            output_slew: MinMax::unset(),
            capacitance_load: 0.0,
            load_computed: false,
            delay: unreached,
        }
    }
}

/// One instance of a library cell.
#[derive(Clone, Debug, Serialize)]
pub struct CellInstance {
    /// Instance name.
    pub name: Ident,
    /// Name of the bound [`CellDefinition`].
    pub cell_type: String,
    /// Role in the design.
    pub kind: InstanceKind,
    /// `true` if the cell is a flip-flop.
    pub is_ff: bool,
    /// Input pin names.
    pub inputs: Vec<String>,
    /// Output pin names.
    pub outputs: Vec<String>,
    /// Pins whose direction is neither input nor output.
    pub unknown: Vec<String>,
    /// Incoming edges.
    pub fanin: Vec<FaninEdge>,
    /// Outgoing edges.
    pub fanout: Vec<FanoutEdge>,
    /// Analyzer results.
    pub timing: InstanceTiming,
    /// Where the instance was written.
    pub span: Span,
}

impl CellInstance {
    /// Creates an unconnected instance of `def` with seeded timing values.
    pub fn new(name: Ident, def: &CellDefinition, kind: InstanceKind, span: Span) -> Self {
        let mut instance = Self {
            name,
            cell_type: String::new(),
            kind,
            is_ff: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
            unknown: Vec::new(),
            fanin: Vec::new(),
            fanout: Vec::new(),
            timing: InstanceTiming::default(),
            span,
        };
        instance.bind(def);
        instance
    }

    fn bind(&mut self, def: &CellDefinition) {
        self.cell_type = def.name.clone();
        self.is_ff = def.is_ff();
        self.inputs.clear();
        self.outputs.clear();
        self.unknown.clear();
        for pin in &def.pins {
            let list = match pin.direction {
                PinDirection::Input => &mut self.inputs,
                PinDirection::Output => &mut self.outputs,
                _ => &mut self.unknown,
            };
            list.push(pin.name.clone());
        }
    }

    /// Returns the bound cell definition.
    pub fn definition<'l>(&self, library: &'l Library) -> Option<&'l CellDefinition> {
        library.cell(&self.cell_type)
    }

    /// Returns `true` for the boundary and constant pseudo-instances.
    pub fn is_pseudo(&self) -> bool {
        self.kind != InstanceKind::Gate
    }

    /// Returns `true` if `port` is an input pin.
    pub fn has_input(&self, port: &str) -> bool {
        self.inputs.iter().any(|p| p == port)
    }

    /// The single functional output port.
    pub fn output_port(&self) -> Option<&str> {
        self.outputs.first().map(String::as_str)
    }

    /// Returns the driver of input `port`.
    pub fn driver_of(&self, port: &str) -> Option<&FaninEdge> {
        self.fanin.iter().find(|e| e.port == port)
    }

    /// Rebinds to the family member of exactly `size`.
    pub fn resize_to(&mut self, library: &Library, size: u32) -> Result<(), ResizeError> {
        self.resize_with(library, &format!("size {size}"), |current, sizes| {
            sizes.iter().copied().find(|&s| s == size && s != current)
        })
    }

    /// Rebinds to the largest smaller family member.
    pub fn resize_below(&mut self, library: &Library) -> Result<(), ResizeError> {
        self.resize_with(library, "a smaller size", |current, sizes| {
            sizes.iter().copied().filter(|&s| s < current).max()
        })
    }

    /// Rebinds to the smallest larger family member.
    pub fn resize_above(&mut self, library: &Library) -> Result<(), ResizeError> {
        self.resize_with(library, "a larger size", |current, sizes| {
            sizes.iter().copied().filter(|&s| s > current).min()
        })
    }

    /// Rebinds to the member strictly between `low` and `high` closest to
    /// the current size.
    pub fn resize_between(&mut self, library: &Library, low: u32, high: u32) -> Result<(), ResizeError> {
        self.resize_with(library, &format!("a size in ({low}, {high})"), |current, sizes| {
            closest(current, sizes.iter().copied().filter(|&s| s > low && s < high))
        })
    }

    /// Rebinds to the member in `[low, high]` closest to the current size.
    pub fn resize_between_inclusive(
        &mut self,
        library: &Library,
        low: u32,
        high: u32,
    ) -> Result<(), ResizeError> {
        self.resize_with(library, &format!("a size in [{low}, {high}]"), |current, sizes| {
            closest(current, sizes.iter().copied().filter(|&s| s >= low && s <= high))
        })
    }

    fn resize_with(
        &mut self,
        library: &Library,
        request: &str,
        pick: impl FnOnce(u32, &[u32]) -> Option<u32>,
    ) -> Result<(), ResizeError> {
        let current = self
            .definition(library)
            .ok_or_else(|| ResizeError::UnknownCell(self.cell_type.clone()))?;
        let family = current.basename_x.clone();
        let sizes = library.sizes_of(&family);
        let target = pick(current.size, &sizes)
            .and_then(|size| library.sized_cell(&family, size))
            .ok_or_else(|| ResizeError::NoCandidate {
                family: family.clone(),
                request: request.to_string(),
            })?;
        self.bind(target);
        Ok(())
    }
}

/// Picks the size nearest `current`, excluding `current`; ties go to the
/// smaller size.
fn closest(current: u32, candidates: impl Iterator<Item = u32>) -> Option<u32> {
    candidates
        .filter(|&s| s != current)
        .min_by_key(|&s| (s.abs_diff(current), s))
}
