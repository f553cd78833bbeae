//! Lookup tables and their templates.

use crate::interp::ThinPlateSpline;
use serde::Serialize;
use std::sync::OnceLock;

/// The quantity an axis of a lookup table is indexed by.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableVariable {
    /// Slew at the cell input.
    InputNetTransition,
    /// Load seen by the cell output.
    TotalOutputNetCapacitance,
    /// Slew at the related (clock) pin of a constraint arc.
    RelatedPinTransition,
    /// Slew at the constrained (data) pin of a constraint arc.
    ConstrainedPinTransition,
    /// Any other variable name.
    Other(String),
}

impl TableVariable {
    /// Maps a `variable_N` attribute value to a variable.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "input_net_transition" | "input_transition_time" => Self::InputNetTransition,
            "total_output_net_capacitance" => Self::TotalOutputNetCapacitance,
            "related_pin_transition" => Self::RelatedPinTransition,
            "constrained_pin_transition" => Self::ConstrainedPinTransition,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Operating point at which a table is evaluated.
///
/// Delay and transition tables read `slew`/`load`; constraint tables read
/// `related_slew`/`constrained_slew`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TableQuery {
    /// Input transition of the arc.
    pub slew: f64,
    /// Output load of the arc.
    pub load: f64,
    /// Transition at the related (clock) pin.
    pub related_slew: f64,
    /// Transition at the constrained (data) pin.
    pub constrained_slew: f64,
}

impl TableQuery {
    /// Query for delay and transition tables.
    pub fn delay(slew: f64, load: f64) -> Self {
        Self {
            slew,
            load,
            ..Self::default()
        }
    }

    /// Query for setup/hold constraint tables.
    pub fn constraint(related_slew: f64, constrained_slew: f64) -> Self {
        Self {
            related_slew,
            constrained_slew,
            ..Self::default()
        }
    }

    fn coordinate(&self, variable: &TableVariable) -> f64 {
        match variable {
            TableVariable::InputNetTransition => self.slew,
            TableVariable::TotalOutputNetCapacitance => self.load,
            TableVariable::RelatedPinTransition => self.related_slew,
            TableVariable::ConstrainedPinTransition => self.constrained_slew,
            TableVariable::Other(_) => 0.0,
        }
    }
}

/// An axis-only table shell from `lu_table_template` or `power_lut_template`.
#[derive(Clone, Debug, Serialize)]
pub struct TableTemplate {
    /// Template name.
    pub name: String,
    /// One variable per axis.
    pub variables: Vec<TableVariable>,
    /// Default index values per axis; an axis may be empty.
    pub axes: Vec<Vec<f64>>,
}

/// A 0-, 1- or 2-dimensional table of samples.
///
/// `values` is row-major: for two axes, `values[i * axes[1].len() + j]` is
/// the sample at `(axes[0][i], axes[1][j])`.
#[derive(Clone, Debug, Serialize)]
pub struct LookupTable {
    /// Name of the template the table was built from (`scalar` for constants).
    pub template: String,
    /// One variable per axis.
    pub variables: Vec<TableVariable>,
    /// Index values per axis.
    pub axes: Vec<Vec<f64>>,
    /// Sample values.
    pub values: Vec<f64>,
    #[serde(skip)]
    fit: OnceLock<Fitted>,
}

#[derive(Clone, Debug)]
struct Fitted {
    /// Axes with more than one index value.
    active: Vec<usize>,
    /// Per active axis: `(min, span)` used to scale coordinates to `[0, 1]`.
    scale: Vec<(f64, f64)>,
    spline: ThinPlateSpline,
}

impl LookupTable {
    /// Creates a table. The caller guarantees `values.len()` equals the
    /// product of the axis lengths (1 for a constant).
    pub fn new(
        template: impl Into<String>,
        variables: Vec<TableVariable>,
        axes: Vec<Vec<f64>>,
        values: Vec<f64>,
    ) -> Self {
        Self {
            template: template.into(),
            variables,
            axes,
            values,
            fit: OnceLock::new(),
        }
    }

    /// Creates a constant table.
    pub fn scalar(value: f64) -> Self {
        Self::new("scalar", Vec::new(), Vec::new(), vec![value])
    }

    /// Returns `true` if the table holds a single value.
    pub fn is_scalar(&self) -> bool {
        self.values.len() == 1
    }

    /// Evaluates the table at `query`.
    pub fn lookup(&self, query: &TableQuery) -> f64 {
        let coords: Vec<f64> = self
            .variables
            .iter()
            .map(|v| query.coordinate(v))
            .collect();
        self.lookup_at(&coords)
    }

    /// Evaluates the table at explicit per-axis coordinates.
    ///
    /// Coordinates for single-valued axes are ignored. A point on the sample
    /// grid returns the stored value exactly.
    pub fn lookup_at(&self, coords: &[f64]) -> f64 {
        match self.values.as_slice() {
            [] => return 0.0,
            [only] => return *only,
            _ => {}
        }
        if let Some(index) = self.grid_index(coords) {
            return self.values[index];
        }
        let fitted = self.fit.get_or_init(|| self.fit_spline());
        let query: Vec<f64> = fitted
            .active
            .iter()
            .zip(&fitted.scale)
            .map(|(&axis, &(min, span))| (coords.get(axis).copied().unwrap_or(0.0) - min) / span)
            .collect();
        fitted.spline.evaluate(&query)
    }

    /// Returns `true` once the spline fit has been computed.
    pub fn is_fitted(&self) -> bool {
        self.fit.get().is_some()
    }

    fn grid_index(&self, coords: &[f64]) -> Option<usize> {
        let mut index = 0;
        for (axis, values) in self.axes.iter().enumerate() {
            let position = if values.len() == 1 {
                0
            } else {
                let c = *coords.get(axis)?;
                values.iter().position(|&v| v == c)?
            };
            index = index * values.len() + position;
        }
        Some(index)
    }

    fn fit_spline(&self) -> Fitted {
        let active: Vec<usize> = (0..self.axes.len())
            .filter(|&a| self.axes[a].len() > 1)
            .collect();
        let scale: Vec<(f64, f64)> = active
            .iter()
            .map(|&a| {
                let min = self.axes[a].iter().copied().fold(f64::INFINITY, f64::min);
                let max = self.axes[a].iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let span = if max > min { max - min } else { 1.0 };
                (min, span)
            })
            .collect();

        let mut points = Vec::with_capacity(self.values.len());
        for flat in 0..self.values.len() {
            let mut rem = flat;
            let mut full = vec![0.0; self.axes.len()];
            for axis in (0..self.axes.len()).rev() {
                let len = self.axes[axis].len().max(1);
                full[axis] = self.axes[axis].get(rem % len).copied().unwrap_or(0.0);
                rem /= len;
            }
            points.push(
                active
                    .iter()
                    .zip(&scale)
                    .map(|(&a, &(min, span))| (full[a] - min) / span)
                    .collect(),
            );
        }
        let spline = ThinPlateSpline::fit(active.len(), points, self.values.clone());
        Fitted {
            active,
            scale,
            spline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay_table() -> LookupTable {
        LookupTable::new(
            "delay_2x2",
            vec![
                TableVariable::InputNetTransition,
                TableVariable::TotalOutputNetCapacitance,
            ],
            vec![vec![0.1, 0.5], vec![0.01, 0.1]],
            vec![0.10, 0.20, 0.30, 0.40],
        )
    }

    #[test]
    fn variable_names() {
        assert_eq!(
            TableVariable::from_name("input_net_transition"),
            TableVariable::InputNetTransition
        );
        assert_eq!(
            TableVariable::from_name("constrained_pin_transition"),
            TableVariable::ConstrainedPinTransition
        );
        assert_eq!(
            TableVariable::from_name("total_output_net_capacitance"),
            TableVariable::TotalOutputNetCapacitance
        );
        assert_eq!(
            TableVariable::from_name("rise_time"),
            TableVariable::Other("rise_time".to_string())
        );
    }

    #[test]
    fn exact_point_returns_stored_value_without_fit() {
        let t = delay_table();
        assert_eq!(t.lookup(&TableQuery::delay(0.5, 0.01)), 0.30);
        assert_eq!(t.lookup(&TableQuery::delay(0.1, 0.1)), 0.20);
        assert!(!t.is_fitted());
    }

    #[test]
    fn interior_point_is_interpolated_and_memoized() {
        let t = delay_table();
        let v = t.lookup(&TableQuery::delay(0.3, 0.055));
        assert!(t.is_fitted());
        assert!(v > 0.10 && v < 0.40, "got {v}");
        assert_eq!(v.to_bits(), t.lookup(&TableQuery::delay(0.3, 0.055)).to_bits());
    }

    #[test]
    fn variables_are_matched_by_name_not_position() {
        let swapped = LookupTable::new(
            "delay_2x2",
            vec![
                TableVariable::TotalOutputNetCapacitance,
                TableVariable::InputNetTransition,
            ],
            vec![vec![0.01, 0.1], vec![0.1, 0.5]],
            vec![0.10, 0.30, 0.20, 0.40],
        );
        assert_eq!(swapped.lookup(&TableQuery::delay(0.5, 0.01)), 0.30);
    }

    #[test]
    fn single_value_axis_is_dropped() {
        let t = LookupTable::new(
            "t",
            vec![
                TableVariable::InputNetTransition,
                TableVariable::TotalOutputNetCapacitance,
            ],
            vec![vec![0.2], vec![0.0, 1.0]],
            vec![1.0, 3.0],
        );
        // The slew coordinate is off-grid but the slew axis has one value.
        assert_eq!(t.lookup(&TableQuery::delay(9.0, 1.0)), 3.0);
        let mid = t.lookup(&TableQuery::delay(9.0, 0.5));
        assert!((mid - 2.0).abs() < 1e-9);
    }

    #[test]
    fn constraint_query_uses_transition_variables() {
        let t = LookupTable::new(
            "setup_1x2",
            vec![
                TableVariable::RelatedPinTransition,
                TableVariable::ConstrainedPinTransition,
            ],
            vec![vec![0.1], vec![0.1, 0.4]],
            vec![0.05, 0.08],
        );
        assert_eq!(t.lookup(&TableQuery::constraint(0.1, 0.4)), 0.08);
    }

    #[test]
    fn scalar_table() {
        let t = LookupTable::scalar(0.25);
        assert!(t.is_scalar());
        assert_eq!(t.lookup(&TableQuery::delay(3.0, 4.0)), 0.25);
    }

    #[test]
    fn shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LookupTable>();
        assert_send_sync::<crate::Library>();
    }

    #[test]
    fn serializes_without_fit_cache() {
        let t = delay_table();
        t.lookup(&TableQuery::delay(0.2, 0.02));
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["template"], "delay_2x2");
        assert_eq!(json["variables"][0], "input_net_transition");
        assert!(json.get("fit").is_none());
    }
}
