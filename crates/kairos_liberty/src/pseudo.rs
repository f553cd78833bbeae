//! Cells the parser adds to every library.
//!
//! Netlist boundary ports and tie-offs become instances of these so the
//! timing graph needs no special cases for them.

use crate::library::{CellDefinition, PinDefinition, PinDirection};
use std::collections::BTreeMap;

/// Pass-through cell driving a primary input wire.
pub const INPUT_CELL: &str = "input";
/// Pass-through cell sinking a primary output wire.
pub const OUTPUT_CELL: &str = "output";
/// Constant-one source.
pub const VDD_CELL: &str = "vdd";
/// Constant-zero source.
pub const GND_CELL: &str = "gnd";
/// Input port of the pass-through pseudo-cells.
pub const PSEUDO_INPUT_PIN: &str = "A";
/// Output port of every pseudo-cell.
pub const PSEUDO_OUTPUT_PIN: &str = "Y";

fn pseudo(name: &str, pins: Vec<PinDefinition>) -> CellDefinition {
    CellDefinition {
        name: name.to_string(),
        basename: name.to_string(),
        basename_x: name.to_string(),
        size: 1,
        area: 0.0,
        leakage_power: 0.0,
        pins,
        sequential: None,
        available_sizes: Vec::new(),
        is_pseudo: true,
        attributes: BTreeMap::new(),
    }
}

/// Returns `input`, `output`, `vdd` and `gnd`.
pub fn pseudo_cells() -> Vec<CellDefinition> {
    let pass_through = || {
        vec![
            PinDefinition::new(PSEUDO_INPUT_PIN, PinDirection::Input),
            PinDefinition::new(PSEUDO_OUTPUT_PIN, PinDirection::Output),
        ]
    };
    let source = || vec![PinDefinition::new(PSEUDO_OUTPUT_PIN, PinDirection::Output)];
    vec![
        pseudo(INPUT_CELL, pass_through()),
        pseudo(OUTPUT_CELL, pass_through()),
        pseudo(VDD_CELL, source()),
        pseudo(GND_CELL, source()),
    ]
}
