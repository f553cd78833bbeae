//! Wires and their endpoints.

use crate::ids::CellId;
use kairos_common::Ident;
use kairos_source::Span;
use serde::Serialize;

/// Port direction of a wire at the module boundary.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireDirection {
    /// Declared with `wire`/`reg`, or implicitly.
    Internal,
    /// Module input.
    Input,
    /// Module output.
    Output,
    /// Both, from `inout` or an alias joining an input and an output.
    InOut,
}

impl WireDirection {
    /// Combines two declarations of the same wire.
    pub fn merge(self, other: WireDirection) -> WireDirection {
        use WireDirection::*;
        match (self, other) {
            (Internal, d) | (d, Internal) => d,
            (a, b) if a == b => a,
            _ => InOut,
        }
    }

    /// Returns `true` if the wire is driven from outside the module.
    pub fn is_input(self) -> bool {
        matches!(self, WireDirection::Input | WireDirection::InOut)
    }

    /// Returns `true` if the wire is observed outside the module.
    pub fn is_output(self) -> bool {
        matches!(self, WireDirection::Output | WireDirection::InOut)
    }
}

/// One end of a wire: an instance and one of its ports.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct PinRef {
    /// The instance.
    pub cell: CellId,
    /// Port name on the instance's cell.
    pub port: String,
}

/// A single-bit net.
#[derive(Clone, Debug, Serialize)]
pub struct Wire {
    /// Wire name; bus bits are named `x[3]`.
    pub name: Ident,
    /// Boundary direction.
    pub direction: WireDirection,
    /// The driving output pin, if any.
    pub driver: Option<PinRef>,
    /// Input pins reading the wire.
    pub sinks: Vec<PinRef>,
    /// `true` for the synthesized constant wires.
    pub is_dummy: bool,
    /// Where the wire was declared.
    pub span: Span,
}

impl Wire {
    /// Creates an unconnected wire.
    pub fn new(name: Ident, direction: WireDirection, span: Span) -> Self {
        Self {
            name,
            direction,
            driver: None,
            sinks: Vec::new(),
            is_dummy: false,
            span,
        }
    }

    /// Creates a constant wire (`vdd_wire`/`gnd_wire`).
    pub fn dummy(name: Ident) -> Self {
        Self {
            is_dummy: true,
            ..Self::new(name, WireDirection::Internal, Span::DUMMY)
        }
    }

    /// Returns `true` if a real wire lacks a driver or has no sinks.
    pub fn is_flying(&self) -> bool {
        !self.is_dummy && (self.driver.is_none() || self.sinks.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_merge() {
        use WireDirection::*;
        assert_eq!(Internal.merge(Output), Output);
        assert_eq!(Input.merge(Internal), Input);
        assert_eq!(Input.merge(Input), Input);
        assert_eq!(Input.merge(Output), InOut);
        assert_eq!(InOut.merge(Input), InOut);
        assert!(InOut.is_input() && InOut.is_output());
        assert!(!Internal.is_input());
    }

    #[test]
    fn flying_detection() {
        let mut w = Wire::new(Ident::from_raw(0), WireDirection::Internal, Span::DUMMY);
        assert!(w.is_flying());
        w.driver = Some(PinRef {
            cell: CellId::from_raw(0),
            port: "Y".to_string(),
        });
        assert!(w.is_flying());
        w.sinks.push(PinRef {
            cell: CellId::from_raw(1),
            port: "A".to_string(),
        });
        assert!(!w.is_flying());
        assert!(!Wire::dummy(Ident::from_raw(1)).is_flying());
    }
}
