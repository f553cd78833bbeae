//! Arena handles for netlist entities.

use kairos_common::define_id;

define_id!(
    /// Handle of a [`CellInstance`](crate::CellInstance) in a [`Netlist`](crate::Netlist).
    CellId
);

define_id!(
    /// Handle of a [`Wire`](crate::Wire) in a [`Netlist`](crate::Netlist).
    WireId
);
