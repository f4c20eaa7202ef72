//! Wavelength-indexed signals produced by calibration
//!
//! A [`CalibratedSpectrum`] is an immutable ordered mapping from wavelength
//! (nm, strictly increasing) to an RGB triple. A [`LuminanceDistribution`]
//! shares the same axis with one scalar per wavelength.

use serde::{Deserialize, Serialize};

use crate::calibration::LinearInterpolator;
use crate::error::{Result, SpectroscopeError};
use crate::profile::CHANNELS;

/// Colour channel of a spectrum sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    R,
    G,
    B,
}

impl Channel {
    pub const ALL: [Channel; CHANNELS] = [Channel::R, Channel::G, Channel::B];

    /// Position of the channel in an RGB triple
    pub fn index(self) -> usize {
        match self {
            Channel::R => 0,
            Channel::G => 1,
            Channel::B => 2,
        }
    }
}

/// Wire form of a spectrum, validated on deserialization
#[derive(Deserialize)]
struct SpectrumData {
    wavelengths: Vec<f64>,
    values: Vec<[f64; CHANNELS]>,
}

impl TryFrom<SpectrumData> for CalibratedSpectrum {
    type Error = SpectroscopeError;

    fn try_from(data: SpectrumData) -> Result<Self> {
        CalibratedSpectrum::new(data.wavelengths, data.values)
    }
}

/// RGB spectrum indexed by wavelength in nanometers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpectrumData")]
pub struct CalibratedSpectrum {
    wavelengths: Vec<f64>,
    values: Vec<[f64; CHANNELS]>,
}

impl CalibratedSpectrum {
    /// Create a spectrum from a wavelength axis and matching RGB values
    ///
    /// # Errors
    ///
    /// Returns `SpectroscopeError::InvalidInput` if the lengths differ or the
    /// wavelengths are not finite and strictly increasing.
    pub fn new(wavelengths: Vec<f64>, values: Vec<[f64; CHANNELS]>) -> Result<Self> {
        validate_axis(&wavelengths, values.len())?;
        Ok(Self { wavelengths, values })
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// Wavelength axis in nanometers, strictly increasing
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// RGB values, one per wavelength
    pub fn values(&self) -> &[[f64; CHANNELS]] {
        &self.values
    }

    /// `(min, max)` wavelength, `None` for an empty spectrum
    pub fn range(&self) -> Option<(f64, f64)> {
        Some((*self.wavelengths.first()?, *self.wavelengths.last()?))
    }

    /// Iterate `(wavelength, rgb)` pairs in ascending wavelength order
    pub fn iter(&self) -> impl Iterator<Item = (f64, [f64; CHANNELS])> + '_ {
        self.wavelengths.iter().copied().zip(self.values.iter().copied())
    }

    /// Largest channel value over the whole spectrum
    pub fn max_value(&self) -> Option<f64> {
        self.values
            .iter()
            .flat_map(|rgb| rgb.iter().copied())
            .reduce(f64::max)
    }

    /// Per-channel interpolants over the wavelength axis
    ///
    /// Build once and evaluate as often as needed.
    ///
    /// # Errors
    ///
    /// Returns `SpectroscopeError::InvalidInput` if the spectrum has fewer
    /// than two samples.
    pub fn interpolants(&self) -> Result<SpectrumInterpolants> {
        let [r, g, b] = Channel::ALL.map(|channel| {
            LinearInterpolator::new(self.wavelengths.clone(), extract_channel(self, channel))
        });
        Ok(SpectrumInterpolants { channels: [r?, g?, b?] })
    }
}

/// RGB lookup at arbitrary wavelengths
///
/// Interpolates linearly between samples and extrapolates linearly beyond
/// the axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumInterpolants {
    channels: [LinearInterpolator; CHANNELS],
}

impl SpectrumInterpolants {
    /// RGB value at `wavelength`
    pub fn evaluate(&self, wavelength: f64) -> [f64; CHANNELS] {
        [
            self.channels[0].evaluate(wavelength),
            self.channels[1].evaluate(wavelength),
            self.channels[2].evaluate(wavelength),
        ]
    }

    /// Interpolant of one channel
    pub fn channel(&self, channel: Channel) -> &LinearInterpolator {
        &self.channels[channel.index()]
    }
}

/// Values of one channel across the spectrum, in wavelength order
pub fn extract_channel(spectrum: &CalibratedSpectrum, channel: Channel) -> Vec<f64> {
    spectrum.values.iter().map(|rgb| rgb[channel.index()]).collect()
}

/// Scale a spectrum so its largest channel value becomes `factor`
///
/// The same multiplier is applied to every channel and wavelength, keeping
/// channel ratios intact. A spectrum whose maximum is not positive is
/// returned unchanged.
pub fn normalise(spectrum: &CalibratedSpectrum, factor: f64) -> CalibratedSpectrum {
    let max = match spectrum.max_value() {
        Some(max) if max > 0.0 && max.is_finite() => max,
        other => {
            tracing::trace!(max = ?other, "spectrum maximum is not positive, skipping normalisation");
            return spectrum.clone();
        }
    };

    let scale = factor / max;
    CalibratedSpectrum {
        wavelengths: spectrum.wavelengths.clone(),
        values: spectrum
            .values
            .iter()
            .map(|rgb| rgb.map(|v| v * scale))
            .collect(),
    }
}

/// Single-channel signal sharing the axis of its source spectrum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LuminanceDistribution {
    wavelengths: Vec<f64>,
    values: Vec<f64>,
}

impl LuminanceDistribution {
    /// Create a distribution from a wavelength axis and matching values
    ///
    /// # Errors
    ///
    /// Returns `SpectroscopeError::InvalidInput` if the lengths differ or the
    /// wavelengths are not finite and strictly increasing.
    pub fn new(wavelengths: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        validate_axis(&wavelengths, values.len())?;
        Ok(Self { wavelengths, values })
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.wavelengths.iter().copied().zip(self.values.iter().copied())
    }

    /// Largest value, `None` when empty
    pub fn max_value(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }
}

fn validate_axis(wavelengths: &[f64], values: usize) -> Result<()> {
    if wavelengths.len() != values {
        return Err(SpectroscopeError::invalid_input(
            "spectrum",
            format!("{} wavelengths but {} values", wavelengths.len(), values),
        ));
    }
    if wavelengths.iter().any(|w| !w.is_finite()) {
        return Err(SpectroscopeError::invalid_input("spectrum", "wavelengths must be finite"));
    }
    if wavelengths.windows(2).any(|w| w[1] <= w[0]) {
        return Err(SpectroscopeError::invalid_input(
            "spectrum",
            "wavelengths must be strictly increasing",
        ));
    }
    Ok(())
}
