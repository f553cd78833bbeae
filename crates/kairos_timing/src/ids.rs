//! Opaque handles for timing graph entities.

use kairos_common::define_id;

define_id!(
    /// Handle of a node in the [`TimingGraph`](crate::TimingGraph).
    NodeId
);

define_id!(
    /// Handle of an edge in the [`TimingGraph`](crate::TimingGraph).
    EdgeId
);
