//! Thin-plate spline interpolation over sparse table samples.
//!
//! The surface is `f(x) = a0 + a·x + Σ wᵢ φ(|x − cᵢ|)` with the radial
//! kernel `φ(r) = r² ln r` (zero at `r = 0`). The weights solve
//!
//! ```text
//! [ K  P ] [w]   [v]
//! [ Pᵀ 0 ] [a] = [0]
//! ```
//!
//! where `K[i][j] = φ(|cᵢ − cⱼ|)` and `P[i] = [1, cᵢ]`. The fit passes
//! through every sample and reproduces affine data exactly.

/// A fitted interpolant over 1 or 2 dimensions.
#[derive(Clone, Debug)]
pub struct ThinPlateSpline {
    dims: usize,
    centers: Vec<Vec<f64>>,
    values: Vec<f64>,
    model: Model,
}

#[derive(Clone, Debug)]
enum Model {
    /// Zero samples or zero dimensions: a single constant.
    Constant(f64),
    /// Radial weights (one per center) followed by affine coefficients.
    Spline { weights: Vec<f64>, affine: Vec<f64> },
    /// The system was singular; answer with the nearest sample.
    Nearest,
}

const PIVOT_EPSILON: f64 = 1e-12;

/// The thin-plate radial kernel.
pub fn kernel(r: f64) -> f64 {
    if r <= 0.0 {
        0.0
    } else {
        r * r * r.ln()
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

impl ThinPlateSpline {
    /// Fits a spline through `points` (each of length `dims`) and `values`.
    ///
    /// # Panics
    ///
    /// Panics if `points` and `values` differ in length or a point does not
    /// have `dims` coordinates.
    pub fn fit(dims: usize, points: Vec<Vec<f64>>, values: Vec<f64>) -> Self {
        assert_eq!(points.len(), values.len(), "one value per sample point");
        assert!(
            points.iter().all(|p| p.len() == dims),
            "sample point dimension mismatch"
        );

        let model = match (dims, values.as_slice()) {
            (_, []) => Model::Constant(0.0),
            (0, [first, ..]) | (_, [first]) => Model::Constant(*first),
            _ => match solve_system(dims, &points, &values) {
                Some(mut solution) => {
                    let affine = solution.split_off(points.len());
                    Model::Spline {
                        weights: solution,
                        affine,
                    }
                }
                None => Model::Nearest,
            },
        };
        Self {
            dims,
            centers: points,
            values,
            model,
        }
    }

    /// Evaluates the surface at `query`.
    ///
    /// A query equal to a sample point returns that sample's value exactly.
    pub fn evaluate(&self, query: &[f64]) -> f64 {
        debug_assert_eq!(query.len(), self.dims);
        if let Some(i) = self.centers.iter().position(|c| c.as_slice() == query) {
            return self.values[i];
        }
        match &self.model {
            Model::Constant(v) => *v,
            Model::Spline { weights, affine } => {
                let radial: f64 = self
                    .centers
                    .iter()
                    .zip(weights)
                    .map(|(c, w)| w * kernel(distance(c, query)))
                    .sum();
                let linear: f64 = affine[0]
                    + affine[1..]
                        .iter()
                        .zip(query)
                        .map(|(a, x)| a * x)
                        .sum::<f64>();
                radial + linear
            }
            Model::Nearest => self.nearest(query),
        }
    }

    fn nearest(&self, query: &[f64]) -> f64 {
        let mut best = (f64::INFINITY, 0.0);
        for (c, v) in self.centers.iter().zip(&self.values) {
            let d = distance(c, query);
            if d < best.0 {
                best = (d, *v);
            }
        }
        best.1
    }
}

fn solve_system(dims: usize, points: &[Vec<f64>], values: &[f64]) -> Option<Vec<f64>> {
    let n = points.len();
    let size = n + dims + 1;
    let mut a = vec![vec![0.0; size]; size];
    let mut b = vec![0.0; size];

    for i in 0..n {
        for j in 0..n {
            a[i][j] = kernel(distance(&points[i], &points[j]));
        }
        a[i][n] = 1.0;
        a[n][i] = 1.0;
        for d in 0..dims {
            a[i][n + 1 + d] = points[i][d];
            a[n + 1 + d][i] = points[i][d];
        }
        b[i] = values[i];
    }
    gaussian_elimination(a, b)
}

/// Solves `a · x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` if a pivot falls below a tolerance relative to the
/// largest matrix entry.
pub fn gaussian_elimination(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |m, v| m.max(v.abs()))
        .max(1.0);

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))?;
        if a[pivot_row][col].abs() < PIVOT_EPSILON * scale {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}
