use ndarray::{Array1, Array2, ArrayView1, Zip};

use super::{check_line_query, checked_chord, ConvexBody};
use crate::error::{Result, WalkError};

/**
A polytope `pol(A, b)` is the set of points satisfying a collection of linear inequalities.
Given an `m x d` matrix `A` and an `m`-dimensional vector `b`, it contains every `x` with

```text
A[i] . x <= b[i]   for all 0 <= i < m
```

# Examples

```rust
use bodywalk::geometry::{ConvexBody, Polytope};
use ndarray::arr1;

// The triangle with vertices (0, 0), (1, 0) and (0, 1).
let triangle = Polytope::from_rows(
    &[vec![-1.0, 0.0], vec![0.0, -1.0], vec![1.0, 1.0]],
    &[0.0, 0.0, 1.0],
)
.unwrap();
assert_eq!(triangle.dim(), 2);
assert!(triangle.is_inside(&arr1(&[0.2, 0.5])));
assert!(!triangle.is_inside(&arr1(&[0.6, 0.6])));
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct Polytope {
    a: Array2<f64>,
    b: Array1<f64>,
}

impl Polytope {
    pub fn new(a: Array2<f64>, b: Array1<f64>) -> Result<Self> {
        if a.nrows() != b.len() {
            return Err(WalkError::DimensionMismatch {
                what: "constraint vector `b`",
                expected: a.nrows(),
                found: b.len(),
            });
        }
        if a.nrows() == 0 || a.ncols() == 0 {
            return Err(WalkError::InvalidParameter {
                name: "a",
                reason: format!(
                    "constraint matrix must be non-empty, but has shape {:?}",
                    a.shape()
                ),
            });
        }
        Ok(Self { a, b })
    }

    /// Builds a polytope from the rows of `A`. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>], b: &[f64]) -> Result<Self> {
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != ncols) {
            return Err(WalkError::DimensionMismatch {
                what: "constraint matrix row",
                expected: ncols,
                found: row.len(),
            });
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let a = Array2::from_shape_vec((rows.len(), ncols), flat)?;
        Self::new(a, Array1::from(b.to_vec()))
    }

    pub fn a(&self) -> &Array2<f64> {
        &self.a
    }

    pub fn b(&self) -> &Array1<f64> {
        &self.b
    }

    /// Calls `f(row, slack_i, rate_i)` for every constraint, where `slack = b - A x` and
    /// `rate = A v`. The signed threshold of a row is `slack / rate`; rows with a zero
    /// rate are parallel to the line and are never passed to `f`, so no division by
    /// zero ever happens.
    fn for_each_crossing<F>(&self, x: &Array1<f64>, v: &Array1<f64>, mut f: F)
    where
        F: FnMut(usize, f64, f64),
    {
        let slack = &self.b - &self.a.dot(x);
        let rate = self.a.dot(v);
        Zip::indexed(&slack).and(&rate).for_each(|i, &s, &r| {
            if r != 0.0 {
                f(i, s, r);
            }
        });
    }

    fn inward_normal(row: ArrayView1<f64>) -> Array1<f64> {
        let norm = row.dot(&row).sqrt();
        row.mapv(|c| -c / norm)
    }
}

impl ConvexBody for Polytope {
    fn dim(&self) -> usize {
        self.a.ncols()
    }

    fn is_inside(&self, x: &Array1<f64>) -> bool {
        if x.len() != self.dim() {
            return false;
        }
        Zip::from(&self.a.dot(x))
            .and(&self.b)
            .all(|&ax, &b| ax <= b)
    }

    fn compute_intersection_extremes(
        &self,
        x: &Array1<f64>,
        v: &Array1<f64>,
    ) -> Result<(f64, f64)> {
        check_line_query(self.dim(), x, v)?;
        let mut lower = f64::NEG_INFINITY;
        let mut upper = f64::INFINITY;

        self.for_each_crossing(x, v, |_, slack, rate| {
            let threshold = slack / rate;
            if rate < 0.0 && threshold < 0.0 {
                lower = lower.max(threshold);
            } else if rate > 0.0 && threshold > 0.0 {
                upper = upper.min(threshold);
            }
        });

        checked_chord(lower, upper)
    }

    fn compute_boundary_reflection(
        &self,
        x: &Array1<f64>,
        v: &Array1<f64>,
    ) -> Result<(Array1<f64>, f64)> {
        check_line_query(self.dim(), x, v)?;
        let mut closest: Option<(usize, f64)> = None;

        // Only walls ahead of the ray count. Rounding can leave a reflected point marginally
        // past its wall; clamping the slack makes that wall reflect again at distance 0
        // instead of letting the ray leave the body.
        self.for_each_crossing(x, v, |i, slack, rate| {
            if rate > 0.0 {
                let threshold = slack.max(0.0) / rate;
                if closest.map_or(true, |(_, best)| threshold < best) {
                    closest = Some((i, threshold));
                }
            }
        });

        let (row, distance) = closest.ok_or(WalkError::NoBoundaryHit)?;
        Ok((Self::inward_normal(self.a.row(row)), distance))
    }
}
