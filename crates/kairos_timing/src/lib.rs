//! Static timing analysis for Kairos gate-level netlists.
//!
//! This crate reads timing constraints, builds a timing graph over a parsed
//! [`Netlist`](kairos_netlist::Netlist), propagates arrival and required
//! times with slews and load-dependent gate delays from the cell library,
//! and reports slack per gate together with the worst timing paths.
//!
//! # Usage
//!
//! ```ignore
//! use kairos_timing::{analyze_timing, AnalysisOptions, TimingConstraints};
//!
//! let constraints = TimingConstraints::from_json(&constraints_json)?;
//! let analysis = analyze_timing(
//!     &mut netlist,
//!     &library,
//!     &constraints,
//!     AnalysisOptions::default(),
//!     &interner,
//!     &sink,
//! )?;
//! let summary = &analysis.timing_report.summary;
//! println!("met: {}, worst slack: {:?}", summary.met, summary.worst_slack);
//! ```
//!
//! # Architecture
//!
//! - [`constraints`]: clock period and per-port boundary conditions
//! - [`graph`]: origin/launch/capture timing graph over netlist instances
//! - [`sta`]: forward and backward propagation, slack, summary
//! - [`paths`]: start-to-end path enumeration
//! - [`report`]: serializable report records

#![warn(missing_docs)]

pub mod codes;
pub mod constraints;
pub mod graph;
pub mod ids;
pub mod paths;
pub mod report;
pub mod sta;

#[cfg(test)]
mod testing;

pub use constraints::{ConstraintError, TimingConstraints};
pub use graph::{NodeRole, TimingEdge, TimingGraph, TimingNode};
pub use ids::{EdgeId, NodeId};
pub use paths::{EnumeratedPath, PathStep};
pub use report::{
    format_cells, format_library_cells, format_paths, format_timing, CellSummary, GateTiming,
    LibraryCellSummary, PathElement, PathsReport, TimingPath, TimingReport, TimingSummary,
};
pub use sta::{analyze_timing, AnalysisOptions, TimingAnalysis};
