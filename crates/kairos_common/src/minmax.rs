//! Early/late value pairs.
//!
//! Every timing quantity that differs between the slowest and the fastest
//! path through a pin (arrival time, slew, gate delay, setup/hold) is stored
//! as a `{max, min}` pair.

use serde::{Deserialize, Serialize};

/// A late (`max`) and early (`min`) value pair.
///
/// Non-finite values serialize as `null` through `serde_json`, which is how
/// unreachable pins show up in reports.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct MinMax {
    /// Late (worst-case setup) value.
    pub max: f64,
    /// Early (worst-case hold) value.
    pub min: f64,
}

impl MinMax {
    /// A pair with both values zero.
    pub const ZERO: MinMax = MinMax { max: 0.0, min: 0.0 };

    /// Creates a pair.
    pub fn new(max: f64, min: f64) -> Self {
        Self { max, min }
    }

    /// Creates a pair with the same value on both sides.
    pub fn splat(value: f64) -> Self {
        Self {
            max: value,
            min: value,
        }
    }

    /// The identity for [`widen`](Self::widen): `max = -∞`, `min = +∞`.
    pub fn empty() -> Self {
        Self {
            max: f64::NEG_INFINITY,
            min: f64::INFINITY,
        }
    }

    /// Seed value for quantities that have not been computed yet.
    ///
    /// `max = -1` marks "unset" for non-negative quantities such as slews
    /// and setup/hold times.
    pub fn unset() -> Self {
        Self {
            max: -1.0,
            min: f64::INFINITY,
        }
    }

    /// Grows the pair to cover `other`.
    pub fn widen(&mut self, other: MinMax) {
        self.max = self.max.max(other.max);
        self.min = self.min.min(other.min);
    }

    /// Adds `other` component-wise (`max + max`, `min + min`).
    pub fn offset(self, other: MinMax) -> MinMax {
        MinMax {
            max: self.max + other.max,
            min: self.min + other.min,
        }
    }

    /// Returns `true` if `max` has been set to a real, non-negative value.
    pub fn is_set(&self) -> bool {
        self.max >= 0.0 && self.max.is_finite()
    }

    /// Returns `true` if the pair was never widened.
    pub fn is_empty(&self) -> bool {
        self.max == f64::NEG_INFINITY && self.min == f64::INFINITY
    }
}

impl Default for MinMax {
    fn default() -> Self {
        Self::ZERO
    }
}
