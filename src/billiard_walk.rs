/*!
# Billiard Walk

The Billiard Walk moves a particle in a straight line from the current sample, reflecting
specularly off the boundary of the body, for a random trajectory length drawn from an
exponential distribution with mean `tau`. The end point of the trajectory is the next
sample.

A trajectory is abandoned when it needs more than `max_reflections` reflections; a fresh
direction and length are then drawn. By default there is no limit on the number of
abandoned trajectories per step; [`BilliardWalk::with_max_retries`] sets one.

## References

- B. Polyak, E. Gryazina. *Billiard walk - a new sampling algorithm for control and
  optimization*. IFAC Proceedings Volumes, 47(3), 2014. <https://arxiv.org/abs/1211.3932>
*/

use ndarray::Array1;
use tracing::trace;

use crate::core::{MarkovChain, Walk};
use crate::error::{ensure_nonzero, ensure_positive, Result, WalkError};
use crate::geometry::ConvexBody;
use crate::rng::{RandomSource, RandomState};

/// Billiard Walk with mean trajectory length `tau`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilliardWalk {
    tau: f64,
    max_reflections: Option<usize>,
    max_retries: Option<usize>,
}

impl BilliardWalk {
    /**
    Creates a Billiard Walk.

    # Arguments

    * `tau` - Mean length of a trajectory. Must be positive.
    * `max_reflections` - Reflections allowed per trajectory. `None` uses `10 * dim`.

    # Errors

    [`WalkError::InvalidParameter`] if `tau <= 0` or `max_reflections == Some(0)`.
    */
    pub fn new(tau: f64, max_reflections: Option<usize>) -> Result<Self> {
        ensure_positive("tau", tau)?;
        if let Some(max_reflections) = max_reflections {
            ensure_nonzero("max_reflections", max_reflections)?;
        }
        Ok(Self {
            tau,
            max_reflections,
            max_retries: None,
        })
    }

    /// Gives up with [`WalkError::RetriesExhausted`] once `max_retries` trajectories of a
    /// single step have hit the reflection limit.
    pub fn with_max_retries(mut self, max_retries: usize) -> Result<Self> {
        ensure_nonzero("max_retries", max_retries)?;
        self.max_retries = Some(max_retries);
        Ok(self)
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Reflection limit for a body of dimension `dim`.
    pub fn max_reflections(&self, dim: usize) -> usize {
        self.max_reflections.unwrap_or(10 * dim)
    }
}

impl Walk for BilliardWalk {
    fn step<B, R>(&self, body: &B, current: &Array1<f64>, rng: &mut R) -> Result<Array1<f64>>
    where
        B: ConvexBody + ?Sized,
        R: RandomSource + ?Sized,
    {
        let max_reflections = self.max_reflections(current.len());
        let mut attempts = 0;

        loop {
            let trajectory_length = -self.tau * rng.uniform().ln();

            let mut direction = rng.standard_normal(current.len());
            let norm = direction.dot(&direction).sqrt();
            direction /= norm;

            if let Some(end_point) = run_billiard_trajectory(
                body,
                current,
                direction,
                trajectory_length,
                max_reflections,
            )? {
                return Ok(end_point);
            }

            attempts += 1;
            trace!(attempts, max_reflections, "billiard trajectory hit the reflection limit");
            if self.max_retries.is_some_and(|max| attempts >= max) {
                return Err(WalkError::RetriesExhausted { attempts });
            }
        }
    }
}

/**
Follows a billiard trajectory of the given length from `start` along the unit vector
`direction`, reflecting off the boundary of `body`.

Returns the end point, or `None` if the trajectory still had length left after
`max_reflections` reflections. Every boundary query counts as a reflection, including the
last one, which only shortens the final segment.
*/
pub fn run_billiard_trajectory<B>(
    body: &B,
    start: &Array1<f64>,
    mut direction: Array1<f64>,
    trajectory_length: f64,
    max_reflections: usize,
) -> Result<Option<Array1<f64>>>
where
    B: ConvexBody + ?Sized,
{
    let mut position = start.clone();
    let mut remaining = trajectory_length;
    let mut reflections = 0;

    while reflections < max_reflections && remaining > 0.0 {
        let (internal_normal, distance) = body.compute_boundary_reflection(&position, &direction)?;
        let travel = distance.min(remaining);

        position.scaled_add(travel, &direction);
        let projection = internal_normal.dot(&direction);
        direction.scaled_add(-2.0 * projection, &internal_normal);

        reflections += 1;
        remaining -= travel;
    }

    if remaining > 0.0 {
        Ok(None)
    } else {
        Ok(Some(position))
    }
}

/// Builds a Billiard Walk chain over `body` starting at `initial_point`.
///
/// # Examples
///
/// ```rust
/// use bodywalk::billiard_walk::billiard_walk;
/// use bodywalk::geometry::{Ball, ConvexBody};
/// use ndarray::arr1;
///
/// let ball = Ball::new(arr1(&[0.0, 0.0, 0.0]), 1.0).unwrap();
/// let mut chain = billiard_walk(&ball, &[0.0, 0.0, 0.0], 5_u64, 1.0, None).unwrap();
/// let samples = chain.sample(50, 5, 1).unwrap();
/// assert!(samples.rows().into_iter().all(|x| ball.is_inside(&x.to_owned())));
/// ```
pub fn billiard_walk<'a, 'r, B, R>(
    body: &'a B,
    initial_point: &[f64],
    rng: impl Into<RandomState<'r, R>>,
    tau: f64,
    max_reflections: Option<usize>,
) -> Result<MarkovChain<'a, 'r, B, BilliardWalk, R>>
where
    B: ConvexBody + ?Sized,
    R: RandomSource,
{
    MarkovChain::new(
        body,
        initial_point,
        rng,
        BilliardWalk::new(tau, max_reflections)?,
    )
}
