//! Netlist error types.

/// Errors that prevent a netlist from being built at all.
#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    /// The text is not a single `module ... endmodule`.
    #[error("invalid netlist: {0}")]
    InvalidInput(String),

    /// A net capacitance or clock skew document is malformed.
    #[error("invalid annotations: {0}")]
    InvalidAnnotations(String),
}

/// Why [`Netlist::connect`](crate::Netlist::connect) refused an edge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// The source already drives this port of the target.
    #[error("Connection already exists")]
    AlreadyConnected,

    /// The target port is not an input of the target's cell.
    #[error("Port not defined as input")]
    NotAnInput,
}

/// Why a resize request could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResizeError {
    /// The instance's cell is not in the library.
    #[error("cell `{0}` is not in the library")]
    UnknownCell(String),

    /// No family member satisfies the request.
    #[error("no size of `{family}` satisfies {request}")]
    NoCandidate {
        /// The `basenameX` family key.
        family: String,
        /// Human-readable description of the request.
        request: String,
    },
}
