//! Intensity profile extraction along a line through an RGB image
//!
//! The sampler walks evenly spaced parametric points between two endpoints
//! (both inclusive) and bilinearly interpolates every channel of the image
//! grid at each point. Coordinates outside the image are clamped to the
//! nearest valid pixel coordinate, so sampling never indexes out of range.

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpectroscopeError};

/// Number of channels in images and profiles (R, G, B)
pub const CHANNELS: usize = 3;

/// Decoded floating-point RGB image, shape `(height, width, 3)`
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    data: Array3<f64>,
}

impl Image {
    /// Wrap an already decoded `(height, width, channels)` array
    ///
    /// # Errors
    ///
    /// Returns `SpectroscopeError::InvalidInput` if the channel count is not 3.
    pub fn new(data: Array3<f64>) -> Result<Self> {
        let channels = data.dim().2;
        if channels != CHANNELS {
            return Err(SpectroscopeError::invalid_input(
                "image",
                format!("expected {} channels, got {}", CHANNELS, channels),
            ));
        }
        Ok(Self { data })
    }

    pub(crate) fn from_array(data: Array3<f64>) -> Self {
        debug_assert_eq!(data.dim().2, CHANNELS);
        Self { data }
    }

    /// Build an image by evaluating `f(row, column)` for every pixel
    pub fn from_fn<F>(height: usize, width: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> [f64; CHANNELS],
    {
        let data = Array3::from_shape_fn((height, width, CHANNELS), |(y, x, c)| f(y, x)[c]);
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    /// Underlying `(height, width, 3)` array
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// RGB value of the pixel at `(row, column)`
    pub fn pixel(&self, row: usize, column: usize) -> Option<[f64; CHANNELS]> {
        if row >= self.height() || column >= self.width() {
            return None;
        }
        Some([
            self.data[[row, column, 0]],
            self.data[[row, column, 1]],
            self.data[[row, column, 2]],
        ])
    }

    /// Bilinear sample of one channel at sub-pixel `(x, y)`, edge clamped
    ///
    /// `None` for an empty image or a channel index past the last channel.
    pub fn bilinear(&self, x: f64, y: f64, channel: usize) -> Option<f64> {
        let (height, width, channels) = self.data.dim();
        if height == 0 || width == 0 || channel >= channels {
            return None;
        }
        Some(self.bilinear_clamped(x, y, channel))
    }

    fn bilinear_clamped(&self, x: f64, y: f64, channel: usize) -> f64 {
        let (height, width, _) = self.data.dim();
        let x = x.clamp(0.0, (width - 1) as f64);
        let y = y.clamp(0.0, (height - 1) as f64);

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(width - 1);
        let y1 = (y0 + 1).min(height - 1);
        let fx = x - x0 as f64;
        let fy = y - y0 as f64;

        let p00 = self.data[[y0, x0, channel]];
        let p10 = self.data[[y0, x1, channel]];
        let p01 = self.data[[y1, x0, channel]];
        let p11 = self.data[[y1, x1, channel]];

        (1.0 - fx) * (1.0 - fy) * p00
            + fx * (1.0 - fy) * p10
            + (1.0 - fx) * fy * p01
            + fx * fy * p11
    }
}

/// Line segment in image index coordinates (x rightward, y downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl LineSegment {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Segment spanning the first row of an image `width` pixels wide
    pub fn top_row(width: usize) -> Self {
        Self::new(0.0, 0.0, width.saturating_sub(1) as f64, 0.0)
    }

    /// Both endpoints coincide
    pub fn is_degenerate(&self) -> bool {
        self.x0 == self.x1 && self.y0 == self.y1
    }

    pub fn length(&self) -> f64 {
        (self.x1 - self.x0).hypot(self.y1 - self.y0)
    }

    fn is_finite(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1].iter().all(|v| v.is_finite())
    }
}

impl From<[f64; 4]> for LineSegment {
    fn from([x0, y0, x1, y1]: [f64; 4]) -> Self {
        Self::new(x0, y0, x1, y1)
    }
}

/// Per-channel intensities sampled along a line, shape `(1, N, 3)`
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    samples: Array2<f64>,
}

impl Profile {
    /// Wrap an `(N, 3)` array of samples
    ///
    /// # Errors
    ///
    /// Returns `SpectroscopeError::InvalidInput` if the column count is not 3.
    pub fn from_samples(samples: Array2<f64>) -> Result<Self> {
        let channels = samples.ncols();
        if channels != CHANNELS {
            return Err(SpectroscopeError::invalid_input(
                "profile",
                format!("expected {} channels, got {}", CHANNELS, channels),
            ));
        }
        Ok(Self { samples })
    }

    /// Build a profile from RGB triples
    pub fn from_rgb(values: &[[f64; CHANNELS]]) -> Self {
        let samples = Array2::from_shape_fn((values.len(), CHANNELS), |(i, c)| values[i][c]);
        Self { samples }
    }

    /// Number of samples along the line
    pub fn len(&self) -> usize {
        self.samples.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// RGB triple at sample `index`
    pub fn sample(&self, index: usize) -> Option<[f64; CHANNELS]> {
        (index < self.len()).then(|| {
            [
                self.samples[[index, 0]],
                self.samples[[index, 1]],
                self.samples[[index, 2]],
            ]
        })
    }

    /// Samples of a single channel
    pub fn channel(&self, channel: usize) -> ArrayView1<'_, f64> {
        self.samples.column(channel)
    }

    /// View with the `(1, N, 3)` layout
    pub fn as_array(&self) -> ArrayView3<'_, f64> {
        self.samples.view().insert_axis(Axis(0))
    }
}

/// Sample an intensity profile along `line`
///
/// Generates `samples` evenly spaced points from `(x0, y0)` to `(x1, y1)`
/// inclusive, defaulting to the image width, and bilinearly interpolates each
/// channel independently at those points.
///
/// # Errors
///
/// Returns `SpectroscopeError::InvalidInput` if the image has zero width or
/// height, if the line endpoints coincide or are not finite, or if
/// `samples` is zero.
pub fn sample_profile(image: &Image, line: &LineSegment, samples: Option<usize>) -> Result<Profile> {
    if image.width() == 0 || image.height() == 0 {
        return Err(SpectroscopeError::invalid_input(
            "image",
            format!("image is {}x{}", image.width(), image.height()),
        ));
    }
    if !line.is_finite() {
        return Err(SpectroscopeError::invalid_input("line", "coordinates must be finite"));
    }
    if line.is_degenerate() {
        return Err(SpectroscopeError::invalid_input("line", "endpoints coincide"));
    }
    let samples = samples.unwrap_or_else(|| image.width());
    if samples == 0 {
        return Err(SpectroscopeError::invalid_input("samples", "must be positive"));
    }

    tracing::debug!(
        samples,
        width = image.width(),
        height = image.height(),
        length = line.length(),
        "sampling image profile"
    );

    let xs = Array1::linspace(line.x0, line.x1, samples);
    let ys = Array1::linspace(line.y0, line.y1, samples);
    let values = Array2::from_shape_fn((samples, CHANNELS), |(i, c)| {
        image.bilinear_clamped(xs[i], ys[i], c)
    });

    Ok(Profile { samples: values })
}
