//! Diagnostic codes emitted by constraint checking and timing analysis.

use kairos_diagnostics::{Category, DiagnosticCode};

/// A constraint names a port the design does not have.
pub const UNKNOWN_PORT: DiagnosticCode = DiagnosticCode::new(Category::Constraint, 1);

/// Flip-flops exist but none has a driven clock pin.
pub const NO_CLOCK: DiagnosticCode = DiagnosticCode::new(Category::Timing, 1);
/// Flip-flop clock pins are driven by more than one instance.
pub const MULTIPLE_CLOCKS: DiagnosticCode = DiagnosticCode::new(Category::Timing, 2);
/// The combinational logic contains a loop.
pub const COMBINATIONAL_LOOP: DiagnosticCode = DiagnosticCode::new(Category::Timing, 3);
/// Setup timing is violated.
pub const SETUP_VIOLATION: DiagnosticCode = DiagnosticCode::new(Category::Timing, 4);
/// Hold timing is violated.
pub const HOLD_VIOLATION: DiagnosticCode = DiagnosticCode::new(Category::Timing, 5);
/// Path enumeration hit its limit.
pub const PATH_LIMIT: DiagnosticCode = DiagnosticCode::new(Category::Timing, 6);
