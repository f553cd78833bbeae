//! Flattened gate-level netlist parsing and the instance/wire model.
//!
//! [`parse_netlist`] reads a single structural module against a
//! [`Library`](kairos_liberty::Library) and returns a [`Netlist`]: an arena
//! of [`CellInstance`]s and [`Wire`]s connected through
//! [`Netlist::connect`]. Module ports become `___input_<wire>` and
//! `___output_<wire>` pseudo-instances; constant connections are driven by
//! hidden `___vdd`/`___gnd` sources.
//!
//! Problems short of a missing module are reported as warnings to the
//! [`DiagnosticSink`](kairos_diagnostics::DiagnosticSink) and the netlist
//! is built from whatever could be understood.

#![warn(missing_docs)]

pub mod annotations;
pub mod cell;
pub mod codes;
pub mod error;
pub mod ids;
pub mod lexer;
pub mod netlist;
pub mod parser;
pub mod syntax;
pub mod wire;

pub use annotations::Annotations;
pub use cell::{CellInstance, FaninEdge, FanoutEdge, InstanceKind, InstanceTiming};
pub use error::{ConnectError, NetlistError, ResizeError};
pub use ids::{CellId, WireId};
pub use netlist::Netlist;
pub use parser::parse_netlist;
pub use wire::{PinRef, Wire, WireDirection};
