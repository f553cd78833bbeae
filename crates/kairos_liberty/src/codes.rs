//! Diagnostic codes emitted while reading a library.

use kairos_diagnostics::{Category, DiagnosticCode};

/// A group was never closed, or a `}` has no matching `{`.
pub const UNBALANCED_GROUP: DiagnosticCode = DiagnosticCode::new(Category::Library, 1);
/// A statement is neither `name : value;`, `name(args);` nor a group.
pub const MALFORMED_ATTRIBUTE: DiagnosticCode = DiagnosticCode::new(Category::Library, 2);
/// A `values`/`index_N` row holds something that is not a number.
pub const BAD_NUMBER: DiagnosticCode = DiagnosticCode::new(Category::Library, 3);
/// Table values do not match the axis lengths, or a third axis is declared.
pub const TABLE_SHAPE: DiagnosticCode = DiagnosticCode::new(Category::Library, 4);
/// A table references a template that was never declared.
pub const UNKNOWN_TEMPLATE: DiagnosticCode = DiagnosticCode::new(Category::Library, 5);
/// A cell name is declared twice.
pub const DUPLICATE_CELL: DiagnosticCode = DiagnosticCode::new(Category::Library, 6);
/// A `bus`/`bundle` group was skipped.
pub const UNSUPPORTED_GROUP: DiagnosticCode = DiagnosticCode::new(Category::Library, 7);
/// A library cell uses a name reserved for the built-in pseudo-cells.
pub const RESERVED_CELL_NAME: DiagnosticCode = DiagnosticCode::new(Category::Library, 8);
