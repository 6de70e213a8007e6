use ndarray::Array1;

use super::{check_line_query, checked_chord, ConvexBody};
use crate::error::{ensure_positive, Result, WalkError};

/// Euclidean ball `{x : |x - center| <= radius}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    center: Array1<f64>,
    radius: f64,
}

impl Ball {
    /// Creates a ball from its center and a strictly positive radius.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bodywalk::geometry::{Ball, ConvexBody};
    /// use ndarray::arr1;
    ///
    /// let ball = Ball::new(arr1(&[1.0, 2.0]), 3.0).unwrap();
    /// assert_eq!(ball.dim(), 2);
    /// assert!(Ball::new(arr1(&[0.0]), 0.0).is_err());
    /// ```
    pub fn new(center: Array1<f64>, radius: f64) -> Result<Self> {
        ensure_positive("radius", radius)?;
        if center.is_empty() {
            return Err(WalkError::DimensionMismatch {
                what: "ball center",
                expected: 1,
                found: 0,
            });
        }
        Ok(Self { center, radius })
    }

    pub fn center(&self) -> &Array1<f64> {
        &self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Roots of `a t^2 + 2 b t + c = 0`, smaller root first.
    fn solve_quadratic(a: f64, b: f64, c: f64) -> (f64, f64) {
        let sq_delta = (b * b - a * c).sqrt();
        ((b - sq_delta) / a, (b + sq_delta) / a)
    }
}

impl ConvexBody for Ball {
    fn dim(&self) -> usize {
        self.center.len()
    }

    fn is_inside(&self, x: &Array1<f64>) -> bool {
        if x.len() != self.dim() {
            return false;
        }
        let diff = x - &self.center;
        diff.dot(&diff) <= self.radius * self.radius
    }

    fn compute_intersection_extremes(
        &self,
        x: &Array1<f64>,
        v: &Array1<f64>,
    ) -> Result<(f64, f64)> {
        check_line_query(self.dim(), x, v)?;
        let disp = &self.center - x;

        let a = v.dot(v);
        let b = v.dot(&disp);
        let c = disp.dot(&disp) - self.radius * self.radius;

        let (lower, upper) = Self::solve_quadratic(a, b, c);
        checked_chord(lower, upper)
    }

    fn compute_boundary_reflection(
        &self,
        x: &Array1<f64>,
        v: &Array1<f64>,
    ) -> Result<(Array1<f64>, f64)> {
        let (_, distance) = self.compute_intersection_extremes(x, v)?;
        if distance <= 0.0 {
            return Err(WalkError::NoBoundaryHit);
        }

        let hit = x + &(v * distance);
        let internal_normal = (&self.center - &hit) / self.radius;

        Ok((internal_normal, distance))
    }
}
