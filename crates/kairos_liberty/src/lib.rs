//! Liberty-style cell library parsing and table interpolation.
//!
//! [`parse_library`] reads library text into an immutable [`Library`]:
//! cells with direction-tagged pins, timing and power arcs, flip-flop
//! descriptions, lookup tables, and a sizing index grouping cells into
//! drive-strength families. Four pseudo-cells (`input`, `output`, `vdd`,
//! `gnd`) are always added.
//!
//! Lookup tables are evaluated through [`LookupTable::lookup`], which
//! returns stored samples exactly and otherwise evaluates a thin-plate
//! spline fitted once per table.

#![warn(missing_docs)]

pub mod codes;
pub mod error;
pub mod group;
pub mod interp;
pub mod library;
pub mod naming;
pub mod parser;
pub mod pseudo;
pub mod table;

pub use error::LibraryError;
pub use group::AttributeValue;
pub use interp::ThinPlateSpline;
pub use library::{
    CapacitiveLoadUnit, CellDefinition, Library, OperatingConditions, PinDefinition,
    PinDirection, PowerArc, SequentialElement, SequentialKind, TimingArc,
};
pub use naming::{split_cell_name, CellName};
pub use parser::parse_library;
pub use table::{LookupTable, TableQuery, TableTemplate, TableVariable};
