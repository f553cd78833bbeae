//! Structured diagnostics for the library parser, netlist parser and
//! timing analyzer.
//!
//! Non-fatal problems never abort a run. They are pushed as [`Diagnostic`]s
//! into a shared [`DiagnosticSink`] and rendered at the end, either
//! rustc-style through [`TerminalRenderer`] or embedded in JSON output.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use label::{Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
