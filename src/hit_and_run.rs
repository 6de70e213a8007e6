/*!
# Hit-and-Run

Each step draws a random direction, intersects the line through the current sample with
the body, and moves to a point drawn uniformly from the resulting chord. Every proposal is
accepted.

For elongated bodies an optional rounding matrix `T` can be supplied: directions are then
drawn from `T * N(0, I)`. Computing a good rounding matrix is left to the caller.

## References

- C. J. P. Bélisle, H. E. Romeijn, R. L. Smith. *Hit-and-Run Algorithms for Generating
  Multivariate Distributions*. Mathematics of Operations Research, 18(2), 1993.
- L. Lovász, S. Vempala. *Hit-and-Run is Fast and Fun*. Technical report, 2003.
*/

use ndarray::{Array1, Array2};

use crate::core::{MarkovChain, Walk};
use crate::error::{Result, WalkError};
use crate::geometry::ConvexBody;
use crate::rng::{RandomSource, RandomState};

/// Hit-and-Run with an optional rounding matrix applied to the sampled directions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HitAndRun {
    rounding_matrix: Option<Array2<f64>>,
}

impl HitAndRun {
    pub fn new(rounding_matrix: Option<Array2<f64>>) -> Self {
        Self { rounding_matrix }
    }

    pub fn rounding_matrix(&self) -> Option<&Array2<f64>> {
        self.rounding_matrix.as_ref()
    }

    fn direction<R>(&self, dim: usize, rng: &mut R) -> Array1<f64>
    where
        R: RandomSource + ?Sized,
    {
        let direction = rng.standard_normal(dim);
        match &self.rounding_matrix {
            Some(rounding) => rounding.dot(&direction),
            None => direction,
        }
    }
}

impl Walk for HitAndRun {
    fn step<B, R>(&self, body: &B, current: &Array1<f64>, rng: &mut R) -> Result<Array1<f64>>
    where
        B: ConvexBody + ?Sized,
        R: RandomSource + ?Sized,
    {
        let direction = self.direction(current.len(), rng);

        let (lower, upper) = body.compute_intersection_extremes(current, &direction)?;
        // Reversed, empty, NaN and unbounded chords all end up here.
        if !(lower < upper) || !lower.is_finite() || !upper.is_finite() {
            return Err(WalkError::InvalidChord { lower, upper });
        }

        let t = rng.uniform_range(lower, upper);
        Ok(current + &(direction * t))
    }

    fn check_body<B: ConvexBody + ?Sized>(&self, body: &B) -> Result<()> {
        if let Some(rounding) = &self.rounding_matrix {
            let dim = body.dim();
            for found in [rounding.nrows(), rounding.ncols()] {
                if found != dim {
                    return Err(WalkError::DimensionMismatch {
                        what: "rounding matrix",
                        expected: dim,
                        found,
                    });
                }
            }
        }
        Ok(())
    }
}

/**
Builds a Hit-and-Run chain over `body` starting at `initial_point`.

# Errors

[`WalkError::DimensionMismatch`] if the rounding matrix is not `dim × dim`, or if
`initial_point` does not match the body's dimension.

# Examples

```rust
use bodywalk::geometry::{ConvexBody, Polytope};
use bodywalk::hit_and_run::hit_and_run;
use ndarray::{arr1, arr2};

// A long, thin box: rounding stretches directions along its long side.
let slab = Polytope::new(
    arr2(&[[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0]]),
    arr1(&[10.0, 10.0, 0.1, 0.1]),
)
.unwrap();
let rounding = arr2(&[[10.0, 0.0], [0.0, 0.1]]);

let mut chain = hit_and_run(&slab, &[0.0, 0.0], 3_u64, Some(rounding)).unwrap();
let samples = chain.sample(200, 10, 1).unwrap();
assert!(samples.rows().into_iter().all(|x| slab.is_inside(&x.to_owned())));
```
*/
pub fn hit_and_run<'a, 'r, B, R>(
    body: &'a B,
    initial_point: &[f64],
    rng: impl Into<RandomState<'r, R>>,
    rounding_matrix: Option<Array2<f64>>,
) -> Result<MarkovChain<'a, 'r, B, HitAndRun, R>>
where
    B: ConvexBody + ?Sized,
    R: RandomSource,
{
    MarkovChain::new(body, initial_point, rng, HitAndRun::new(rounding_matrix))
}
