/*!
# Convex Bodies

A convex body is exposed to the walks only through the [`ConvexBody`] trait: its ambient
dimension, a membership test, and two line queries. Bodies only need to implement the
queries used by the walks they are sampled with; the remaining ones report
[`WalkError::UnsupportedCapability`] when invoked.

| walk          | queries used                          |
|---------------|---------------------------------------|
| Ball Walk     | `is_inside`                           |
| Hit-and-Run   | `compute_intersection_extremes`       |
| Billiard Walk | `compute_boundary_reflection`         |

## Example

```rust
use bodywalk::geometry::{Ball, ConvexBody, Polytope};
use ndarray::{arr1, arr2};

let disk = Ball::new(arr1(&[0.0, 0.0]), 1.0).unwrap();
let (lower, upper) = disk
    .compute_intersection_extremes(&arr1(&[0.0, 0.0]), &arr1(&[0.0, 2.0]))
    .unwrap();
assert_eq!((lower, upper), (-0.5, 0.5));

let square = Polytope::new(
    arr2(&[[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0]]),
    arr1(&[0.5, 0.5, 0.5, 0.5]),
)
.unwrap();
assert!(square.is_inside(&arr1(&[0.25, -0.5])));
```
*/

pub mod ball;
pub mod polytope;

pub use ball::Ball;
pub use polytope::Polytope;

use ndarray::Array1;

use crate::error::{Result, WalkError};

/// A closed, bounded convex subset of `R^dim`.
///
/// Query points passed to the line queries are guaranteed by the walks to be members of
/// the body. Implementations must never silently repair a degenerate answer; they report
/// it as an error instead.
pub trait ConvexBody {
    /// Ambient dimension of the body.
    fn dim(&self) -> usize;

    /// Returns `true` if `x` belongs to the body (boundary included).
    fn is_inside(&self, x: &Array1<f64>) -> bool;

    /// Computes the extremes `(lower, upper)` of the chord through `x` along `v`, so that
    /// `x + t * v` is inside the body if, and only if, `lower <= t <= upper`.
    ///
    /// `v` does not need to be normalized. `lower < upper` must hold; anything else is
    /// reported as [`WalkError::InvalidChord`].
    fn compute_intersection_extremes(
        &self,
        _x: &Array1<f64>,
        _v: &Array1<f64>,
    ) -> Result<(f64, f64)> {
        Err(WalkError::UnsupportedCapability(
            "compute_intersection_extremes",
        ))
    }

    /// Finds the first boundary point hit by the ray `x + t * v`, `t > 0`, where `v` is a
    /// unit vector. Returns the unit inward normal at that point and its distance `t`.
    fn compute_boundary_reflection(
        &self,
        _x: &Array1<f64>,
        _v: &Array1<f64>,
    ) -> Result<(Array1<f64>, f64)> {
        Err(WalkError::UnsupportedCapability(
            "compute_boundary_reflection",
        ))
    }
}

impl<B: ConvexBody + ?Sized> ConvexBody for &B {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn is_inside(&self, x: &Array1<f64>) -> bool {
        (**self).is_inside(x)
    }

    fn compute_intersection_extremes(
        &self,
        x: &Array1<f64>,
        v: &Array1<f64>,
    ) -> Result<(f64, f64)> {
        (**self).compute_intersection_extremes(x, v)
    }

    fn compute_boundary_reflection(
        &self,
        x: &Array1<f64>,
        v: &Array1<f64>,
    ) -> Result<(Array1<f64>, f64)> {
        (**self).compute_boundary_reflection(x, v)
    }
}

/// Checks that the point and direction of a line query have the body's dimension.
pub(crate) fn check_line_query(dim: usize, x: &Array1<f64>, v: &Array1<f64>) -> Result<()> {
    for (what, found) in [("query point", x.len()), ("query direction", v.len())] {
        if found != dim {
            return Err(WalkError::DimensionMismatch {
                what,
                expected: dim,
                found,
            });
        }
    }
    Ok(())
}

/// Checks the `lower < upper` contract of an intersection query. NaN extremes fail too.
pub(crate) fn checked_chord(lower: f64, upper: f64) -> Result<(f64, f64)> {
    if lower < upper {
        Ok((lower, upper))
    } else {
        Err(WalkError::InvalidChord { lower, upper })
    }
}
