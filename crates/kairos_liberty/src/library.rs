//! The parsed cell library.

use crate::group::AttributeValue;
use crate::table::{LookupTable, TableQuery, TableTemplate};
use serde::Serialize;
use std::collections::BTreeMap;

/// A parsed cell library. Immutable once [`parse_library`](crate::parse_library)
/// returns.
#[derive(Clone, Debug, Serialize)]
pub struct Library {
    /// Library name from `library(name)`.
    pub name: String,
    /// `capacitive_load_unit(value, unit)`, if declared.
    pub capacitive_load_unit: Option<CapacitiveLoadUnit>,
    /// Named operating conditions.
    pub operating_conditions: BTreeMap<String, OperatingConditions>,
    /// Lookup table templates by name.
    pub templates: BTreeMap<String, TableTemplate>,
    /// Cells by name, including the pseudo-cells.
    pub cells: BTreeMap<String, CellDefinition>,
    /// `basenameX -> size -> cell name` for every sized family.
    pub sizing: BTreeMap<String, BTreeMap<u32, String>>,
    /// Remaining library-level simple attributes.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Library {
    /// Returns the cell called `name`.
    pub fn cell(&self, name: &str) -> Option<&CellDefinition> {
        self.cells.get(name)
    }

    /// Returns `true` if a cell called `name` exists.
    pub fn has_cell(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    /// Iterates real (non-pseudo) cells in name order.
    pub fn real_cells(&self) -> impl Iterator<Item = &CellDefinition> {
        self.cells.values().filter(|c| !c.is_pseudo)
    }

    /// Returns the family member of `basename_x` with exactly `size`.
    pub fn sized_cell(&self, basename_x: &str, size: u32) -> Option<&CellDefinition> {
        self.sizing
            .get(basename_x)
            .and_then(|sizes| sizes.get(&size))
            .and_then(|name| self.cells.get(name))
    }

    /// Returns all sizes available for `basename_x`, ascending.
    pub fn sizes_of(&self, basename_x: &str) -> Vec<u32> {
        self.sizing
            .get(basename_x)
            .map(|sizes| sizes.keys().copied().collect())
            .unwrap_or_default()
    }
}

/// `capacitive_load_unit(value, unit)`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CapacitiveLoadUnit {
    /// Multiplier.
    pub value: f64,
    /// Unit name, e.g. `pf` or `ff`.
    pub unit: String,
}

/// An `operating_conditions(name)` group.
#[derive(Clone, Debug, Serialize)]
pub struct OperatingConditions {
    /// Name of the corner.
    pub name: String,
    /// Process scaling factor.
    pub process: Option<f64>,
    /// Temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Supply voltage.
    pub voltage: Option<f64>,
    /// Any other attributes.
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// Direction of a cell pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinDirection {
    /// Signal into the cell.
    Input,
    /// Signal out of the cell.
    Output,
    /// Bidirectional.
    Inout,
    /// Internal node.
    Internal,
    /// Missing or unrecognized `direction`.
    Unknown,
}

impl PinDirection {
    /// Parses a `direction` attribute value.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "input" => Self::Input,
            "output" => Self::Output,
            "inout" => Self::Inout,
            "internal" => Self::Internal,
            _ => Self::Unknown,
        }
    }
}

/// Sequential element kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequentialKind {
    /// Edge-triggered flip-flop (`ff` group).
    Ff,
    /// Level-sensitive latch (`latch` group).
    Latch,
}

/// An `ff(IQ, IQN) {...}` or `latch(...) {...}` group.
#[derive(Clone, Debug, Serialize)]
pub struct SequentialElement {
    /// Flip-flop or latch.
    pub kind: SequentialKind,
    /// State variable names from the group header.
    pub variables: Vec<String>,
    /// `clocked_on`, `next_state`, `enable`, `data_in`, ...
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl SequentialElement {
    /// Returns the pin named by `clocked_on` (or `enable` for latches),
    /// stripped of quotes and inversion.
    pub fn clock_pin_name(&self) -> Option<String> {
        let key = match self.kind {
            SequentialKind::Ff => "clocked_on",
            SequentialKind::Latch => "enable",
        };
        let expr = self.attributes.get(key)?.to_text();
        let name: String = expr
            .trim()
            .trim_start_matches(['!', '('])
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '[' || *c == ']')
            .collect();
        (!name.is_empty()).then_some(name)
    }
}

/// A timing arc from `related_pin` to the pin that owns it.
#[derive(Clone, Debug, Serialize)]
pub struct TimingArc {
    /// Source pin of the arc (`any` if not given).
    pub related_pin: String,
    /// `timing_type`, e.g. `combinational`, `rising_edge`, `setup_rising`.
    pub timing_type: Option<String>,
    /// `timing_sense`, e.g. `negative_unate`.
    pub timing_sense: Option<String>,
    /// Output rise delay.
    pub cell_rise: Option<LookupTable>,
    /// Output fall delay.
    pub cell_fall: Option<LookupTable>,
    /// Output rise slew.
    pub rise_transition: Option<LookupTable>,
    /// Output fall slew.
    pub fall_transition: Option<LookupTable>,
    /// Setup/hold requirement for a rising data edge.
    pub rise_constraint: Option<LookupTable>,
    /// Setup/hold requirement for a falling data edge.
    pub fall_constraint: Option<LookupTable>,
}

impl TimingArc {
    /// An arc with no tables.
    pub fn new(related_pin: impl Into<String>) -> Self {
        Self {
            related_pin: related_pin.into(),
            timing_type: None,
            timing_sense: None,
            cell_rise: None,
            cell_fall: None,
            rise_transition: None,
            fall_transition: None,
            rise_constraint: None,
            fall_constraint: None,
        }
    }

    /// Returns `true` for `setup_*` arcs.
    pub fn is_setup(&self) -> bool {
        self.timing_type
            .as_deref()
            .is_some_and(|t| t.starts_with("setup"))
    }

    /// Returns `true` for `hold_*` arcs.
    pub fn is_hold(&self) -> bool {
        self.timing_type
            .as_deref()
            .is_some_and(|t| t.starts_with("hold"))
    }

    /// Returns `true` if the arc is a constraint rather than a delay arc.
    pub fn is_constraint(&self) -> bool {
        self.is_setup() || self.is_hold()
    }

    /// Evaluates `(rise, fall)` of a table pair, skipping missing tables.
    ///
    /// Returns `None` if neither table exists.
    fn pair(
        rise: Option<&LookupTable>,
        fall: Option<&LookupTable>,
        query: &TableQuery,
    ) -> Option<(f64, f64)> {
        match (rise, fall) {
            (None, None) => None,
            (Some(r), None) => {
                let v = r.lookup(query);
                Some((v, v))
            }
            (None, Some(f)) => {
                let v = f.lookup(query);
                Some((v, v))
            }
            (Some(r), Some(f)) => Some((r.lookup(query), f.lookup(query))),
        }
    }

    /// Cell delay `(rise, fall)` at `(slew, load)`.
    pub fn delay(&self, slew: f64, load: f64) -> Option<(f64, f64)> {
        Self::pair(
            self.cell_rise.as_ref(),
            self.cell_fall.as_ref(),
            &TableQuery::delay(slew, load),
        )
    }

    /// Output transition `(rise, fall)` at `(slew, load)`.
    pub fn transition(&self, slew: f64, load: f64) -> Option<(f64, f64)> {
        Self::pair(
            self.rise_transition.as_ref(),
            self.fall_transition.as_ref(),
            &TableQuery::delay(slew, load),
        )
    }

    /// Constraint `(rise, fall)` at `(clock slew, data slew)`.
    pub fn constraint(&self, clock_slew: f64, data_slew: f64) -> Option<(f64, f64)> {
        Self::pair(
            self.rise_constraint.as_ref(),
            self.fall_constraint.as_ref(),
            &TableQuery::constraint(clock_slew, data_slew),
        )
    }
}

/// Internal power tables keyed by related pin.
#[derive(Clone, Debug, Serialize)]
pub struct PowerArc {
    /// Related pin (`any` if not given).
    pub related_pin: String,
    /// Energy of a rising output transition.
    pub rise_power: Option<LookupTable>,
    /// Energy of a falling output transition.
    pub fall_power: Option<LookupTable>,
}

/// A `pin(name)` group.
#[derive(Clone, Debug, Serialize)]
pub struct PinDefinition {
    /// Pin name.
    pub name: String,
    /// Direction.
    pub direction: PinDirection,
    /// Input capacitance; falls back to the larger of rise/fall capacitance.
    pub capacitance: f64,
    /// `max_capacitance`, if declared.
    pub max_capacitance: Option<f64>,
    /// Boolean `function`, if declared.
    pub function: Option<String>,
    /// `clock : true`.
    pub is_clock: bool,
    /// Timing arcs ending at this pin.
    pub timing: Vec<TimingArc>,
    /// Internal power arcs.
    pub internal_power: Vec<PowerArc>,
    /// Remaining simple attributes.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl PinDefinition {
    /// A pin with no timing data.
    pub fn new(name: impl Into<String>, direction: PinDirection) -> Self {
        Self {
            name: name.into(),
            direction,
            capacitance: 0.0,
            max_capacitance: None,
            function: None,
            is_clock: false,
            timing: Vec::new(),
            internal_power: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Returns the delay arc whose related pin is `from`.
    ///
    /// Falls back to an `any` arc, then to the only delay arc if there is
    /// exactly one.
    pub fn arc_from(&self, from: &str) -> Option<&TimingArc> {
        let delay_arcs = || self.timing.iter().filter(|a| !a.is_constraint());
        delay_arcs()
            .find(|a| a.related_pin == from)
            .or_else(|| delay_arcs().find(|a| a.related_pin == "any"))
            .or_else(|| {
                let mut it = delay_arcs();
                match (it.next(), it.next()) {
                    (Some(only), None) => Some(only),
                    _ => None,
                }
            })
    }

    /// Returns the first setup arc on this pin.
    pub fn setup_arc(&self) -> Option<&TimingArc> {
        self.timing.iter().find(|a| a.is_setup())
    }

    /// Returns the first hold arc on this pin.
    pub fn hold_arc(&self) -> Option<&TimingArc> {
        self.timing.iter().find(|a| a.is_hold())
    }
}

/// A `cell(name)` group.
#[derive(Clone, Debug, Serialize)]
pub struct CellDefinition {
    /// Cell name.
    pub name: String,
    /// Family name without drive suffix, e.g. `NAND2` for `NAND2X4`.
    pub basename: String,
    /// Family name with the drive letter, e.g. `NAND2X`.
    pub basename_x: String,
    /// Drive strength, e.g. `4` for `NAND2X4`; 1 if the name has none.
    pub size: u32,
    /// Cell area.
    pub area: f64,
    /// `cell_leakage_power`.
    pub leakage_power: f64,
    /// Pins in declaration order.
    pub pins: Vec<PinDefinition>,
    /// Flip-flop or latch description.
    pub sequential: Option<SequentialElement>,
    /// Sizes available in this cell's family, ascending.
    pub available_sizes: Vec<u32>,
    /// `true` for cells synthesized by the parser.
    pub is_pseudo: bool,
    /// Remaining simple attributes.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl CellDefinition {
    /// Returns `true` if the cell contains an `ff` group.
    pub fn is_ff(&self) -> bool {
        self.sequential
            .as_ref()
            .is_some_and(|s| s.kind == SequentialKind::Ff)
    }

    /// Returns `true` if the cell contains a `latch` group.
    pub fn is_latch(&self) -> bool {
        self.sequential
            .as_ref()
            .is_some_and(|s| s.kind == SequentialKind::Latch)
    }

    /// Returns the pin called `name`.
    pub fn pin(&self, name: &str) -> Option<&PinDefinition> {
        self.pins.iter().find(|p| p.name == name)
    }

    /// Returns the direction of pin `name`, or `Unknown` if absent.
    pub fn pin_direction(&self, name: &str) -> PinDirection {
        self.pin(name)
            .map_or(PinDirection::Unknown, |p| p.direction)
    }

    /// Iterates input pins in declaration order.
    pub fn input_pins(&self) -> impl Iterator<Item = &PinDefinition> {
        self.pins
            .iter()
            .filter(|p| p.direction == PinDirection::Input)
    }

    /// Returns the functional output pin.
    ///
    /// Cells are assumed to have one; the first `output` pin is used.
    pub fn output_pin(&self) -> Option<&PinDefinition> {
        self.pins
            .iter()
            .find(|p| p.direction == PinDirection::Output)
    }

    /// Returns the clock input of a sequential cell.
    ///
    /// Prefers an input flagged `clock : true`, then the pin named by the
    /// sequential group's `clocked_on`/`enable`.
    pub fn clock_pin(&self) -> Option<&PinDefinition> {
        self.input_pins().find(|p| p.is_clock).or_else(|| {
            let name = self.sequential.as_ref()?.clock_pin_name()?;
            self.pin(&name)
        })
    }

    /// Returns the delay arc from input pin `from` to the output pin.
    pub fn delay_arc(&self, from: &str) -> Option<&TimingArc> {
        self.output_pin()?.arc_from(from)
    }

    /// Returns the clock-to-output arc of a sequential cell.
    pub fn clock_to_q_arc(&self) -> Option<&TimingArc> {
        let clock = self.clock_pin()?;
        self.delay_arc(&clock.name)
    }

    /// Returns the setup arc on data pin `data`.
    pub fn setup_arc(&self, data: &str) -> Option<&TimingArc> {
        self.pin(data)?.setup_arc()
    }

    /// Returns the hold arc on data pin `data`.
    pub fn hold_arc(&self, data: &str) -> Option<&TimingArc> {
        self.pin(data)?.hold_arc()
    }
}
