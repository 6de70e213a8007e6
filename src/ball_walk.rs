/*!
# Ball Walk

At every step the Ball Walk proposes a point drawn uniformly from the ball of radius
`delta` around the current sample, and moves there if the proposal lies inside the body.
Otherwise the chain stays put. Exactly one proposal is made per step.

The proposal is built from a standard normal vector, normalized to unit length, and a
uniform scalar `u`: the offset `delta * u^(1/d) * direction` is uniformly distributed in
the `d`-dimensional ball.

## Example

```rust
use bodywalk::ball_walk::ball_walk;
use bodywalk::geometry::{Ball, ConvexBody};
use ndarray::arr1;

let disk = Ball::new(arr1(&[0.0, 0.0]), 1.0).unwrap();
let mut chain = ball_walk(&disk, &[0.0, 0.0], 1_u64, 0.5).unwrap();

for sample in chain.by_ref().take(100) {
    assert!(disk.is_inside(&sample.unwrap()));
}
```
*/

use ndarray::Array1;

use crate::core::{MarkovChain, Walk};
use crate::error::{ensure_positive, Result};
use crate::geometry::ConvexBody;
use crate::rng::{RandomSource, RandomState};

/// Ball Walk with step radius `delta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallWalk {
    delta: f64,
}

impl BallWalk {
    /// Fails with [`crate::error::WalkError::InvalidParameter`] unless `delta > 0`.
    pub fn new(delta: f64) -> Result<Self> {
        ensure_positive("delta", delta)?;
        Ok(Self { delta })
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }
}

impl Walk for BallWalk {
    fn step<B, R>(&self, body: &B, current: &Array1<f64>, rng: &mut R) -> Result<Array1<f64>>
    where
        B: ConvexBody + ?Sized,
        R: RandomSource + ?Sized,
    {
        let candidate = current + &uniform_ball_offset(current.len(), self.delta, rng);

        if body.is_inside(&candidate) {
            Ok(candidate)
        } else {
            Ok(current.clone())
        }
    }
}

/// Draws a point uniformly from the `dim`-dimensional ball of the given radius around the
/// origin. Consumes one normal vector, then one uniform scalar.
pub fn uniform_ball_offset<R>(dim: usize, radius: f64, rng: &mut R) -> Array1<f64>
where
    R: RandomSource + ?Sized,
{
    let direction = rng.standard_normal(dim);
    let exp = 1.0 / dim as f64;
    let norm = radius / direction.dot(&direction).sqrt() * rng.uniform().powf(exp);
    direction * norm
}

/// Builds a Ball Walk chain over `body` starting at `initial_point`.
pub fn ball_walk<'a, 'r, B, R>(
    body: &'a B,
    initial_point: &[f64],
    rng: impl Into<RandomState<'r, R>>,
    delta: f64,
) -> Result<MarkovChain<'a, 'r, B, BallWalk, R>>
where
    B: ConvexBody + ?Sized,
    R: RandomSource,
{
    MarkovChain::new(body, initial_point, rng, BallWalk::new(delta)?)
}
