//! Timing constraints for a single-clock design.
//!
//! Read from a JSON document:
//!
//! ```json
//! {
//!   "clock": 10.0,
//!   "input_delays": { "a": 0.5 },
//!   "input_slew": { "a": 0.05, "clk": 0.02 },
//!   "output_delays": { "y": 1.0 },
//!   "output_capacitance_load": { "y": 0.01 }
//! }
//! ```
//!
//! Per-port maps are keyed by module port name; bus bits are written
//! `x[3]`. Ports missing from a map get 0.

use kairos_common::Interner;
use kairos_diagnostics::{Diagnostic, DiagnosticSink};
use kairos_netlist::Netlist;
use kairos_source::Span;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::codes;

/// Errors that make a constraint document unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    /// The document has no `clock` entry.
    #[error("timing constraints must define `clock`")]
    MissingClock,

    /// The clock period is zero, negative or not finite.
    #[error("clock period must be a positive number, got {0}")]
    InvalidClock(f64),

    /// The document is not valid JSON of the expected shape.
    #[error("malformed timing constraints: {0}")]
    Json(#[from] serde_json::Error),
}

/// Clock period plus optional per-port boundary conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingConstraints {
    /// Clock period.
    pub clock_period: f64,
    /// External arrival time at each input port.
    pub input_delays: BTreeMap<String, f64>,
    /// External required-time margin at each output port.
    pub output_delays: BTreeMap<String, f64>,
    /// Transition time at each input port, including the clock.
    pub input_slew: BTreeMap<String, f64>,
    /// Load driven by each output port.
    pub output_capacitance_load: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
struct RawConstraints {
    clock: Option<f64>,
    #[serde(default)]
    input_delays: BTreeMap<String, f64>,
    #[serde(default)]
    output_delays: BTreeMap<String, f64>,
    #[serde(default)]
    input_slew: BTreeMap<String, f64>,
    #[serde(default)]
    output_capacitance_load: BTreeMap<String, f64>,
}

impl TimingConstraints {
    /// Creates constraints with only a clock period.
    pub fn new(clock_period: f64) -> Result<Self, ConstraintError> {
        if !(clock_period.is_finite() && clock_period > 0.0) {
            return Err(ConstraintError::InvalidClock(clock_period));
        }
        Ok(Self {
            clock_period,
            input_delays: BTreeMap::new(),
            output_delays: BTreeMap::new(),
            input_slew: BTreeMap::new(),
            output_capacitance_load: BTreeMap::new(),
        })
    }

    /// Parses and validates a constraint document.
    pub fn from_json(text: &str) -> Result<Self, ConstraintError> {
        let raw: RawConstraints = serde_json::from_str(text)?;
        let clock = raw.clock.ok_or(ConstraintError::MissingClock)?;
        Ok(Self {
            input_delays: raw.input_delays,
            output_delays: raw.output_delays,
            input_slew: raw.input_slew,
            output_capacitance_load: raw.output_capacitance_load,
            ..Self::new(clock)?
        })
    }

    /// External arrival time at input `port`.
    pub fn input_delay(&self, port: &str) -> f64 {
        self.input_delays.get(port).copied().unwrap_or(0.0)
    }

    /// Transition time at input `port`.
    pub fn input_slew(&self, port: &str) -> f64 {
        self.input_slew.get(port).copied().unwrap_or(0.0)
    }

    /// Required-time margin at output `port`.
    pub fn output_delay(&self, port: &str) -> f64 {
        self.output_delays.get(port).copied().unwrap_or(0.0)
    }

    /// Load on output `port`.
    pub fn output_load(&self, port: &str) -> f64 {
        self.output_capacitance_load.get(port).copied().unwrap_or(0.0)
    }

    /// Warns about map entries naming ports the design does not have.
    pub fn check_ports(&self, netlist: &Netlist, interner: &Interner, sink: &DiagnosticSink) {
        let direction_of = |port: &str| {
            let wire = netlist.find_wire(interner.get(port)?)?;
            Some(netlist.wire(wire).direction)
        };
        let inputs = [("input_delays", &self.input_delays), ("input_slew", &self.input_slew)];
        let outputs = [
            ("output_delays", &self.output_delays),
            ("output_capacitance_load", &self.output_capacitance_load),
        ];
        for (section, map) in inputs {
            for port in map.keys() {
                if !direction_of(port).is_some_and(|d| d.is_input()) {
                    sink.emit(Diagnostic::warning(
                        codes::UNKNOWN_PORT,
                        format!("`{section}` names `{port}`, which is not an input port"),
                        Span::DUMMY,
                    ));
                }
            }
        }
        for (section, map) in outputs {
            for port in map.keys() {
                if !direction_of(port).is_some_and(|d| d.is_output()) {
                    sink.emit(Diagnostic::warning(
                        codes::UNKNOWN_PORT,
                        format!("`{section}` names `{port}`, which is not an output port"),
                        Span::DUMMY,
                    ));
                }
            }
        }
    }
}
