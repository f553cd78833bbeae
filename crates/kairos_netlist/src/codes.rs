//! Diagnostic codes emitted while reading a netlist.

use kairos_diagnostics::{Category, DiagnosticCode};

/// A connection references a wire that was never declared.
pub const UNDECLARED_WIRE: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 1);
/// A wire, bus or instance is declared twice.
pub const REDECLARED: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 2);
/// A wire has no driver or no sinks.
pub const FLYING_WIRE: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 3);
/// An instantiation names a cell the library does not define.
pub const UNKNOWN_CELL: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 4);
/// A connected port is missing from the cell or has no usable direction.
pub const UNRESOLVED_PIN: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 5);
/// Wiring a driver to a sink was rejected.
pub const CONNECT_REJECTED: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 6);
/// A construct outside the flattened structural subset.
pub const UNSUPPORTED: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 7);
/// `assign` statements form a cycle.
pub const ALIAS_CYCLE: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 8);
/// A clock skew annotation names a missing or non-flip-flop instance.
pub const SKEW_TARGET: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 9);
/// A wire has more than one driver.
pub const MULTIPLE_DRIVERS: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 10);
/// A bus declaration is wider than the parser will expand.
pub const BUS_TOO_WIDE: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 11);
