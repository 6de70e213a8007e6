//! Uniform sampling from convex bodies with geometric random walks.
//!
//! A [`geometry::ConvexBody`] answers membership, chord and reflection queries. The walks
//! ([`ball_walk`], [`hit_and_run`] and [`billiard_walk`]) turn those queries into Markov
//! chains whose stationary distribution is uniform on the body, driven by
//! [`core::MarkovChain`] or, for several independent chains, [`core::MultiChain`].
//!
//! ```rust
//! use bodywalk::geometry::{ConvexBody, Polytope};
//! use bodywalk::hit_and_run::hit_and_run;
//!
//! let square = Polytope::from_rows(
//!     &[vec![1.0, 0.0], vec![-1.0, 0.0], vec![0.0, 1.0], vec![0.0, -1.0]],
//!     &[0.5, 0.5, 0.5, 0.5],
//! )
//! .unwrap();
//! let samples = hit_and_run(&square, &[0.0, 0.0], 42_u64, None)
//!     .unwrap()
//!     .sample(1000, 10, 2)
//!     .unwrap();
//! assert_eq!(samples.shape(), &[1000, 2]);
//! ```

pub mod ball_walk;
pub mod billiard_walk;
pub mod core;
pub mod error;
pub mod geometry;
pub mod hit_and_run;
pub mod io;
pub mod rng;
pub mod stats;

pub use error::{Result, WalkError};
