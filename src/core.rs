/*!
# Markov Chain Driver

A [`MarkovChain`] couples a convex body, a random walk ([`Walk`]) and a random generator.
It owns a private copy of the initial point and replaces its current sample after every
step; the caller's buffers are never aliased.

Chains can be consumed in two ways:

- as an infinite [`Iterator`] over every raw step, starting from the current sample;
- through [`MarkovChain::sample`], which restarts from the initial point, discards a
  warm-up prefix and keeps every `thin`-th sample afterwards.

After [`MarkovChain::sample`] the current sample is the last retained one, so iterating
continues from there. Call [`MarkovChain::reset`] first to iterate from the initial point.

Several independent chains over the same body are run in parallel by [`MultiChain`],
one `rayon` worker per chain.

## Example

```rust
use bodywalk::ball_walk::ball_walk;
use bodywalk::geometry::{ConvexBody, Polytope};
use ndarray::{arr1, arr2};

let square = Polytope::new(
    arr2(&[[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0]]),
    arr1(&[0.5, 0.5, 0.5, 0.5]),
)
.unwrap();

let mut chain = ball_walk(&square, &[0.0, 0.0], 42_u64, 0.25).unwrap();
let samples = chain.sample(100, 10, 2).unwrap();

assert_eq!(samples.shape(), &[100, 2]);
assert!(samples.rows().into_iter().all(|x| square.is_inside(&x.to_owned())));
```
*/

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use ndarray::{stack, Array1, Array2, Array3, ArrayView2, Axis};
use rand::rngs::SmallRng;
use rand::{thread_rng, Rng};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{ensure_nonzero, Result, WalkError};
use crate::geometry::ConvexBody;
use crate::rng::{RandomSource, RandomState};

/// One transition kernel of a random walk over a convex body.
pub trait Walk {
    /// Produces the sample following `current`. Implementations draw from `rng` in a fixed
    /// order that depends only on the algorithm, never on the call history.
    fn step<B, R>(&self, body: &B, current: &Array1<f64>, rng: &mut R) -> Result<Array1<f64>>
    where
        B: ConvexBody + ?Sized,
        R: RandomSource + ?Sized;

    /// Validates the walk's parameters against a concrete body. Called once when a chain
    /// is built, so that malformed configurations fail before the first step.
    fn check_body<B: ConvexBody + ?Sized>(&self, _body: &B) -> Result<()> {
        Ok(())
    }
}

/// A single Markov chain over a convex body.
///
/// # Type Parameters
/// - `B`: the convex body, possibly unsized (`dyn ConvexBody`).
/// - `W`: the random walk driving the chain.
/// - `R`: the random generator, owned or borrowed through [`RandomState`].
#[derive(Debug)]
pub struct MarkovChain<'a, 'r, B: ?Sized, W, R = SmallRng> {
    body: &'a B,
    walk: W,
    initial_state: Array1<f64>,
    current_state: Array1<f64>,
    rng: RandomState<'r, R>,
}

impl<'a, 'r, B, W, R> MarkovChain<'a, 'r, B, W, R>
where
    B: ConvexBody + ?Sized,
    W: Walk,
    R: RandomSource,
{
    /**
    Creates a new chain starting at `initial_point`.

    # Arguments

    * `body` - The convex body to sample from.
    * `initial_point` - The starting point. It should be inside `body`; it is copied.
    * `rng` - A seed, `None` for an unspecified seed, or a borrowed generator.
    * `walk` - The random walk performing each step.

    # Errors

    Returns [`WalkError::DimensionMismatch`] if `initial_point` and `body` have different
    dimensions, or any error reported by [`Walk::check_body`].
    */
    pub fn new(
        body: &'a B,
        initial_point: &[f64],
        rng: impl Into<RandomState<'r, R>>,
        walk: W,
    ) -> Result<Self> {
        if initial_point.len() != body.dim() {
            return Err(WalkError::DimensionMismatch {
                what: "initial point",
                expected: body.dim(),
                found: initial_point.len(),
            });
        }
        walk.check_body(body)?;

        let initial_state = Array1::from(initial_point.to_vec());
        debug!(dim = body.dim(), "created markov chain");

        Ok(Self {
            body,
            walk,
            current_state: initial_state.clone(),
            initial_state,
            rng: rng.into(),
        })
    }

    pub fn dim(&self) -> usize {
        self.body.dim()
    }

    pub fn body(&self) -> &'a B {
        self.body
    }

    pub fn walk(&self) -> &W {
        &self.walk
    }

    pub fn initial_state(&self) -> &Array1<f64> {
        &self.initial_state
    }

    pub fn current_state(&self) -> &Array1<f64> {
        &self.current_state
    }

    /// Moves the chain back to its initial point. The generator keeps its state.
    pub fn reset(&mut self) {
        self.current_state.assign(&self.initial_state);
    }

    /// Performs one step of the walk and returns the new current sample.
    pub fn step(&mut self) -> Result<&Array1<f64>> {
        self.current_state = self
            .walk
            .step(self.body, &self.current_state, &mut self.rng)?;
        Ok(&self.current_state)
    }

    /// Performs `k` consecutive steps and returns the resulting sample.
    pub fn advance(&mut self, k: usize) -> Result<&Array1<f64>> {
        for _ in 0..k {
            self.step()?;
        }
        Ok(&self.current_state)
    }

    /**
    Draws `n` samples, restarting from the initial point.

    The first sample is the state after `warmup` steps; each following sample is taken
    `thin` steps after the previous one. Intermediate states are discarded. The random
    generator is not reset, so repeated calls continue its stream.

    # Errors

    [`WalkError::InvalidParameter`] if `n` or `thin` is zero; otherwise any error raised
    by a step of the walk.
    */
    pub fn sample(&mut self, n: usize, warmup: usize, thin: usize) -> Result<Array2<f64>> {
        self.sample_with(n, warmup, thin, || {})
    }

    /// Like [`MarkovChain::sample`], reporting progress on `pb` after every retained sample.
    pub fn sample_progress(
        &mut self,
        n: usize,
        warmup: usize,
        thin: usize,
        pb: &ProgressBar,
    ) -> Result<Array2<f64>> {
        pb.set_length(n as u64);
        self.sample_with(n, warmup, thin, || pb.inc(1))
    }

    fn sample_with<F: FnMut()>(
        &mut self,
        n: usize,
        warmup: usize,
        thin: usize,
        mut on_sample: F,
    ) -> Result<Array2<f64>> {
        ensure_nonzero("n", n)?;
        ensure_nonzero("thin", thin)?;
        debug!(n, warmup, thin, "sampling markov chain");

        let mut samples = Array2::<f64>::zeros((n, self.dim()));
        self.reset();

        self.advance(warmup)?;
        samples.row_mut(0).assign(&self.current_state);
        on_sample();

        for i in 1..n {
            self.advance(thin)?;
            samples.row_mut(i).assign(&self.current_state);
            on_sample();
        }

        Ok(samples)
    }
}

impl<'a, 'r, B, W> MarkovChain<'a, 'r, B, W, SmallRng>
where
    B: ConvexBody + ?Sized,
    W: Walk,
{
    /// Replaces the generator with a fresh one seeded with `seed`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bodywalk::hit_and_run::hit_and_run;
    /// use bodywalk::geometry::Ball;
    /// use ndarray::arr1;
    ///
    /// let ball = Ball::new(arr1(&[0.0, 0.0]), 1.0).unwrap();
    /// let a = hit_and_run(&ball, &[0.0, 0.0], None, None).unwrap().set_seed(3);
    /// let b = hit_and_run(&ball, &[0.0, 0.0], None, None).unwrap().set_seed(3);
    /// let xs: Vec<_> = a.take(5).collect::<Result<_, _>>().unwrap();
    /// let ys: Vec<_> = b.take(5).collect::<Result<_, _>>().unwrap();
    /// assert_eq!(xs, ys);
    /// ```
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.rng = RandomState::seeded(seed);
        self
    }
}

impl<B, W, R> Iterator for MarkovChain<'_, '_, B, W, R>
where
    B: ConvexBody + ?Sized,
    W: Walk,
    R: RandomSource,
{
    type Item = Result<Array1<f64>>;

    /// Every raw step of the chain. The sequence never ends.
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.step().cloned())
    }
}

/**
Several independent chains over the same body, started from the same point.

Chain `i` is seeded with `seed + i`, so a run is reproducible from a single global seed.

# Examples

```rust
use bodywalk::billiard_walk::BilliardWalk;
use bodywalk::core::MultiChain;
use bodywalk::geometry::Ball;
use ndarray::arr1;

let ball = Ball::new(arr1(&[0.0, 0.0, 0.0]), 1.0).unwrap();
let walk = BilliardWalk::new(0.5, None).unwrap();
let mut chains = MultiChain::new(&ball, &[0.0, 0.0, 0.0], walk, 4)
    .unwrap()
    .set_seed(42);

let samples = chains.run(50, 10, 1).unwrap();
assert_eq!(samples.shape(), &[4, 50, 3]);
```
*/
#[derive(Debug)]
pub struct MultiChain<'a, B: ?Sized, W> {
    /// The independent chains.
    pub chains: Vec<MarkovChain<'a, 'static, B, W, SmallRng>>,
    /// The global random seed.
    pub seed: u64,
}

impl<'a, B, W> MultiChain<'a, B, W>
where
    B: ConvexBody + Sync + ?Sized,
    W: Walk + Clone + Send,
{
    pub fn new(body: &'a B, initial_point: &[f64], walk: W, n_chains: usize) -> Result<Self> {
        ensure_nonzero("n_chains", n_chains)?;
        let seed = thread_rng().gen::<u64>();
        let chains = (0..n_chains)
            .map(|i| {
                MarkovChain::new(
                    body,
                    initial_point,
                    RandomState::seeded(seed.wrapping_add(i as u64)),
                    walk.clone(),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { chains, seed })
    }

    /// Sets a new global seed; chain `i` is reseeded with `seed + i`.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.chains = self
            .chains
            .into_iter()
            .enumerate()
            .map(|(i, chain)| chain.set_seed(seed.wrapping_add(i as u64)))
            .collect();
        self
    }

    /// Runs every chain in parallel. Returns an array of shape `chains × n × dim`.
    pub fn run(&mut self, n: usize, warmup: usize, thin: usize) -> Result<Array3<f64>> {
        let results = self
            .chains
            .par_iter_mut()
            .map(|chain| chain.sample(n, warmup, thin))
            .collect::<Result<Vec<_>>>()?;
        stack_chains(&results)
    }

    /// Like [`MultiChain::run`], drawing one progress bar per chain.
    pub fn run_progress(&mut self, n: usize, warmup: usize, thin: usize) -> Result<Array3<f64>> {
        let multi = MultiProgress::new();
        let pb_style = ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");

        let results = self
            .chains
            .par_iter_mut()
            .enumerate()
            .map(|(i, chain)| {
                let pb = multi.add(ProgressBar::new(n as u64));
                pb.set_prefix(format!("Chain {i}"));
                pb.set_style(pb_style.clone());

                let samples = chain.sample_progress(n, warmup, thin, &pb);
                pb.finish_with_message("Done!");
                samples
            })
            .collect::<Result<Vec<_>>>()?;
        stack_chains(&results)
    }
}

fn stack_chains(results: &[Array2<f64>]) -> Result<Array3<f64>> {
    let views: Vec<ArrayView2<f64>> = results.iter().map(|s| s.view()).collect();
    Ok(stack(Axis(0), &views)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball_walk::BallWalk;
    use crate::geometry::{Ball, Polytope};
    use crate::hit_and_run::HitAndRun;
    use ndarray::{arr1, arr2, s};

    fn square() -> Polytope {
        Polytope::new(
            arr2(&[[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0]]),
            arr1(&[0.5, 0.5, 0.5, 0.5]),
        )
        .unwrap()
    }

    /// A walk that moves every coordinate by +1, ignoring the body and the generator.
    #[derive(Clone, Debug)]
    struct Shift;

    impl Walk for Shift {
        fn step<B, R>(&self, _: &B, current: &Array1<f64>, _: &mut R) -> Result<Array1<f64>>
        where
            B: ConvexBody + ?Sized,
            R: RandomSource + ?Sized,
        {
            Ok(current + 1.0)
        }
    }

    #[test]
    fn initial_point_dimension_must_match_body() {
        let body = square();
        let err = MarkovChain::new(&body, &[0.0, 0.0, 0.0], 0_u64, Shift).unwrap_err();
        assert_eq!(
            err,
            WalkError::DimensionMismatch {
                what: "initial point",
                expected: 2,
                found: 3,
            }
        );
    }

    #[test]
    fn advance_threads_the_running_sample() {
        let body = square();
        let mut chain = MarkovChain::new(&body, &[0.0, 0.0], 0_u64, Shift).unwrap();
        assert_eq!(chain.advance(3).unwrap(), &arr1(&[3.0, 3.0]));
        assert_eq!(chain.advance(0).unwrap(), &arr1(&[3.0, 3.0]));
        assert_eq!(chain.initial_state(), &arr1(&[0.0, 0.0]));
    }

    #[test]
    fn sample_applies_warmup_and_thin() {
        let body = square();
        let mut chain = MarkovChain::new(&body, &[0.0, 0.0], 0_u64, Shift).unwrap();
        let samples = chain.sample(3, 5, 4).unwrap();
        assert_eq!(samples.column(0).to_vec(), vec![5.0, 9.0, 13.0]);

        // A second call restarts from the initial point.
        let again = chain.sample(2, 0, 1).unwrap();
        assert_eq!(again.column(1).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn iteration_continues_after_sample_until_reset() {
        let body = square();
        let mut chain = MarkovChain::new(&body, &[0.0, 0.0], 0_u64, Shift).unwrap();
        chain.sample(2, 3, 1).unwrap();
        assert_eq!(chain.next().unwrap().unwrap(), arr1(&[5.0, 5.0]));

        chain.reset();
        assert_eq!(chain.current_state(), &arr1(&[0.0, 0.0]));
        assert_eq!(chain.next().unwrap().unwrap(), arr1(&[1.0, 1.0]));
    }

    #[test]
    fn sample_validates_its_arguments() {
        let body = square();
        let mut chain = MarkovChain::new(&body, &[0.0, 0.0], 0_u64, Shift).unwrap();
        assert!(matches!(
            chain.sample(0, 1, 1),
            Err(WalkError::InvalidParameter { name: "n", .. })
        ));
        assert!(matches!(
            chain.sample(1, 1, 0),
            Err(WalkError::InvalidParameter { name: "thin", .. })
        ));
    }

    #[test]
    fn thinned_samples_match_the_raw_sequence() {
        let body = square();
        let walk = HitAndRun::new(None);
        let raw: Vec<Array1<f64>> = MarkovChain::new(&body, &[0.0, 0.0], 7_u64, walk.clone())
            .unwrap()
            .take(20)
            .collect::<Result<_>>()
            .unwrap();

        let mut chain = MarkovChain::new(&body, &[0.0, 0.0], 7_u64, walk).unwrap();
        let thinned = chain.sample(3, 5, 4).unwrap();
        for (row, step) in thinned.rows().into_iter().zip([5, 9, 13]) {
            assert_eq!(row, raw[step - 1]);
        }
    }

    #[test]
    fn borrowed_generator_is_shared_with_the_caller() {
        let body = Ball::new(arr1(&[0.0, 0.0]), 1.0).unwrap();
        let walk = BallWalk::new(0.5).unwrap();

        let mut rng = RandomState::seeded(9);
        let from_borrowed = {
            let mut chain = MarkovChain::new(&body, &[0.0, 0.0], rng.get_mut(), walk).unwrap();
            chain.advance(4).unwrap().clone()
        };
        let mut owned = MarkovChain::new(&body, &[0.0, 0.0], 9_u64, walk).unwrap();
        assert_eq!(&from_borrowed, owned.advance(4).unwrap());

        // The caller's generator moved on: a chain borrowing it now diverges.
        let mut chain = MarkovChain::new(&body, &[0.0, 0.0], rng.get_mut(), walk).unwrap();
        let mut fresh = MarkovChain::new(&body, &[0.0, 0.0], 9_u64, walk).unwrap();
        assert_ne!(chain.advance(4).unwrap(), fresh.advance(4).unwrap());
    }

    #[test]
    fn chains_work_with_trait_objects() {
        let body: Box<dyn ConvexBody + Sync> = Box::new(square());
        let mut chain =
            MarkovChain::new(body.as_ref(), &[0.0, 0.0], 1_u64, HitAndRun::new(None)).unwrap();
        let samples = chain.sample(10, 1, 1).unwrap();
        assert!(samples.rows().into_iter().all(|x| body.is_inside(&x.to_owned())));
    }

    #[test]
    fn multi_chain_seeds_are_offset_per_chain() {
        let body = square();
        let walk = HitAndRun::new(None);
        let mut chains = MultiChain::new(&body, &[0.0, 0.0], walk.clone(), 3)
            .unwrap()
            .set_seed(100);
        assert_eq!(chains.seed, 100);
        let samples = chains.run(8, 2, 3).unwrap();
        assert_eq!(samples.shape(), &[3, 8, 2]);

        for i in 0..3 {
            let mut single = MarkovChain::new(&body, &[0.0, 0.0], 100 + i as u64, walk.clone())
                .unwrap();
            let expected = single.sample(8, 2, 3).unwrap();
            assert_eq!(samples.slice(s![i, .., ..]), expected);
        }
    }

    #[test]
    fn multi_chain_progress_matches_plain_run() {
        let body = square();
        let walk = BallWalk::new(0.3).unwrap();
        let plain = MultiChain::new(&body, &[0.0, 0.0], walk, 2)
            .unwrap()
            .set_seed(5)
            .run(20, 3, 1)
            .unwrap();
        let progress = MultiChain::new(&body, &[0.0, 0.0], walk, 2)
            .unwrap()
            .set_seed(5)
            .run_progress(20, 3, 1)
            .unwrap();
        assert_eq!(plain, progress);
    }

    #[test]
    fn multi_chain_requires_at_least_one_chain() {
        let body = square();
        assert!(matches!(
            MultiChain::new(&body, &[0.0, 0.0], Shift, 0),
            Err(WalkError::InvalidParameter {
                name: "n_chains",
                ..
            })
        ));
    }
}
