//! Piecewise-linear interpolation with linear extrapolation
//!
//! Built once from a strictly increasing domain and evaluated many times.
//! Outside the known domain the nearest boundary segment is continued, so
//! evaluation never fails and never flat-lines.

use crate::constants::calibration::MIN_INTERPOLATION_POINTS;
use crate::error::{Result, SpectroscopeError};

/// 1-D piecewise-linear interpolant with linear extrapolation
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolator {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearInterpolator {
    /// Create an interpolant through the given `(x[i], y[i])` points
    ///
    /// # Errors
    ///
    /// Returns `SpectroscopeError::InvalidInput` if the slices differ in length,
    /// hold fewer than two points, contain non-finite values, or if `x` is
    /// not strictly increasing.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(SpectroscopeError::invalid_input(
                "interpolator",
                format!("domain has {} points but range has {}", x.len(), y.len()),
            ));
        }
        if x.len() < MIN_INTERPOLATION_POINTS {
            return Err(SpectroscopeError::invalid_input(
                "interpolator",
                format!(
                    "at least {} points are required, got {}",
                    MIN_INTERPOLATION_POINTS,
                    x.len()
                ),
            ));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(SpectroscopeError::invalid_input(
                "interpolator",
                "points must be finite",
            ));
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SpectroscopeError::invalid_input(
                "interpolator",
                "domain must be strictly increasing",
            ));
        }

        Ok(Self { x, y })
    }

    /// Evaluate at `x`, extrapolating linearly outside the domain
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.x.len();
        let i = match self.x.partition_point(|&v| v <= x) {
            0 => 0,
            p if p >= n => n - 2,
            p => p - 1,
        };

        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }

    /// Evaluate at every value of `xs`
    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// Known domain bounds `(min, max)`
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Number of known points
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the interpolant holds no points
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Interpolant mapping range values back onto the domain
    ///
    /// The inverse continues the inverted boundary segments, so outside the
    /// known range it is the exact inverse of [`evaluate`](Self::evaluate).
    ///
    /// # Errors
    ///
    /// Returns `SpectroscopeError::InvalidInput` if the range is not strictly
    /// monotonic.
    pub fn inverse(&self) -> Result<Self> {
        if self.y.windows(2).all(|w| w[1] < w[0]) {
            let x = self.y.iter().rev().copied().collect();
            let y = self.x.iter().rev().copied().collect();
            return Self::new(x, y);
        }
        Self::new(self.y.clone(), self.x.clone())
    }
}
