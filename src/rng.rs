/*!
Random sources driving the walks.

Every walk consumes randomness through the small [`RandomSource`] interface: a uniform
scalar in `[0, 1)`, a uniform scalar in `[low, high)` and a vector of i.i.d. standard
normal components. Any [`rand::Rng`] is a [`RandomSource`], so the usual generators plug
in directly; tests can provide scripted sources instead.

[`RandomState`] models the three ways a caller may hand a generator to a chain:

```rust
use bodywalk::rng::RandomState;
use rand::rngs::SmallRng;
use rand::SeedableRng;

// Unspecified seed.
let _fresh = RandomState::from_entropy();
// Deterministic seed.
let _seeded: RandomState = 42_u64.into();
// Borrow a generator the caller keeps ownership of.
let mut rng = SmallRng::seed_from_u64(7);
let _borrowed = RandomState::from(&mut rng);
```
*/

use ndarray::Array1;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Source of the three kinds of random draws the walks need.
pub trait RandomSource {
    /// Draws a scalar uniformly from `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Draws a scalar uniformly from `[low, high)`. Requires `low < high`.
    fn uniform_range(&mut self, low: f64, high: f64) -> f64;

    /// Draws a vector of `dim` i.i.d. standard normal components.
    fn standard_normal(&mut self, dim: usize) -> Array1<f64>;
}

impl<G: Rng + ?Sized> RandomSource for G {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    // Interpolating keeps chords wider than `f64::MAX` finite, where `gen_range` panics.
    fn uniform_range(&mut self, low: f64, high: f64) -> f64 {
        let u = self.gen::<f64>();
        low * (1.0 - u) + high * u
    }

    fn standard_normal(&mut self, dim: usize) -> Array1<f64> {
        (0..dim)
            .map(|_| self.sample::<f64, _>(StandardNormal))
            .collect()
    }
}

/// A generator that is either owned by the chain or borrowed from the caller.
#[derive(Debug)]
pub enum RandomState<'r, R = SmallRng> {
    Owned(R),
    Borrowed(&'r mut R),
}

impl RandomState<'static, SmallRng> {
    /// Creates a new generator with an unspecified seed.
    pub fn from_entropy() -> Self {
        RandomState::Owned(SmallRng::from_entropy())
    }

    /// Creates a new generator deterministically seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        RandomState::Owned(SmallRng::seed_from_u64(seed))
    }
}

impl<'r, R> RandomState<'r, R> {
    /// Wraps a generator the chain takes ownership of.
    pub fn owned(rng: R) -> Self {
        RandomState::Owned(rng)
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, RandomState::Borrowed(_))
    }

    pub fn get_mut(&mut self) -> &mut R {
        match self {
            RandomState::Owned(rng) => rng,
            RandomState::Borrowed(rng) => rng,
        }
    }
}

impl From<u64> for RandomState<'static, SmallRng> {
    fn from(seed: u64) -> Self {
        RandomState::seeded(seed)
    }
}

impl From<Option<u64>> for RandomState<'static, SmallRng> {
    fn from(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => RandomState::seeded(seed),
            None => RandomState::from_entropy(),
        }
    }
}

impl<'r, R> From<&'r mut R> for RandomState<'r, R> {
    fn from(rng: &'r mut R) -> Self {
        RandomState::Borrowed(rng)
    }
}

impl<R: RandomSource> RandomSource for RandomState<'_, R> {
    fn uniform(&mut self) -> f64 {
        self.get_mut().uniform()
    }

    fn uniform_range(&mut self, low: f64, high: f64) -> f64 {
        self.get_mut().uniform_range(low, high)
    }

    fn standard_normal(&mut self, dim: usize) -> Array1<f64> {
        self.get_mut().standard_normal(dim)
    }
}
