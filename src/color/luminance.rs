//! Luminance reduction of calibrated RGB spectra
//!
//! Luminance is the Y row of the normalised primary matrix of an RGB
//! colourspace, derived from its primary and whitepoint chromaticities.
//! For sRGB this gives the familiar `0.2126 R + 0.7152 G + 0.0722 B`.

use nalgebra::{Matrix3, Vector3};

use crate::constants::{d65, primaries};
use crate::error::{Result, SpectroscopeError};
use crate::spectrum::{normalise, CalibratedSpectrum, LuminanceDistribution};

/// RGB colourspace described by its chromaticities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColourspace {
    pub name: &'static str,
    /// Red, green and blue primaries as CIE xy chromaticities
    pub primaries: [[f64; 2]; 3],
    /// Whitepoint as CIE xy chromaticity
    pub whitepoint: [f64; 2],
}

impl RgbColourspace {
    pub const SRGB: RgbColourspace = RgbColourspace {
        name: "sRGB",
        primaries: primaries::SRGB,
        whitepoint: d65::CHROMATICITY,
    };

    pub const ADOBE_RGB_1998: RgbColourspace = RgbColourspace {
        name: "Adobe RGB (1998)",
        primaries: primaries::ADOBE_RGB_1998,
        whitepoint: d65::CHROMATICITY,
    };

    pub const ITU_R_BT_2020: RgbColourspace = RgbColourspace {
        name: "ITU-R BT.2020",
        primaries: primaries::ITU_R_BT_2020,
        whitepoint: d65::CHROMATICITY,
    };

    pub const ALL: [RgbColourspace; 3] = [Self::SRGB, Self::ADOBE_RGB_1998, Self::ITU_R_BT_2020];

    /// Look a colourspace up by name, ignoring case
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|cs| cs.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Luminance weights of the R, G and B channels
    pub fn luminance_coefficients(&self) -> Result<[f64; 3]> {
        luminance_coefficients(&self.primaries, &self.whitepoint)
    }
}

const SINGULAR_TOLERANCE: f64 = 1e-12;

fn xy_to_xyz(xy: &[f64; 2], parameter: &str) -> Result<Vector3<f64>> {
    let [x, y] = *xy;
    if !x.is_finite() || !y.is_finite() || y <= 0.0 {
        return Err(SpectroscopeError::invalid_input(
            parameter,
            format!("invalid chromaticity ({}, {})", x, y),
        ));
    }
    Ok(Vector3::new(x / y, 1.0, (1.0 - x - y) / y))
}

/// Y row of the normalised primary matrix for the given chromaticities
///
/// # Errors
///
/// Returns `SpectroscopeError::InvalidInput` if a chromaticity has a
/// non-positive y or the primaries are collinear.
pub fn luminance_coefficients(primaries: &[[f64; 2]; 3], whitepoint: &[f64; 2]) -> Result<[f64; 3]> {
    let p = Matrix3::from_columns(&[
        xy_to_xyz(&primaries[0], "primaries")?,
        xy_to_xyz(&primaries[1], "primaries")?,
        xy_to_xyz(&primaries[2], "primaries")?,
    ]);
    let w = xy_to_xyz(whitepoint, "whitepoint")?;

    let collinear = || SpectroscopeError::invalid_input("primaries", "primaries are collinear");

    // Relative test, exact zero is rare in floating point
    let det = p.determinant();
    if !det.is_finite() || det.abs() <= SINGULAR_TOLERANCE * p.norm().powi(3) {
        return Err(collinear());
    }
    let inverse = p.try_inverse().ok_or_else(collinear)?;
    // Every primary column has Y = 1, so the Y row of P * diag(S) is S.
    let s = inverse * w;
    if !s.iter().all(|v| v.is_finite()) {
        return Err(collinear());
    }
    Ok([s[0], s[1], s[2]])
}

/// Luminance of one RGB triple
pub fn rgb_luminance(rgb: [f64; 3], primaries: &[[f64; 2]; 3], whitepoint: &[f64; 2]) -> Result<f64> {
    let k = luminance_coefficients(primaries, whitepoint)?;
    Ok(dot(&k, &rgb))
}

fn dot(k: &[f64; 3], rgb: &[f64; 3]) -> f64 {
    k[0] * rgb[0] + k[1] * rgb[1] + k[2] * rgb[2]
}

/// Luminance distribution of a calibrated spectrum
///
/// The spectrum is first scaled so its brightest channel sample equals
/// `normalize_to`, then reduced per wavelength with the colourspace
/// luminance weights. The wavelength axis is carried over unchanged.
///
/// # Errors
///
/// Returns `SpectroscopeError::InvalidInput` if `normalize_to` is not a
/// positive finite number or the chromaticities are unusable.
pub fn luminance(
    spectrum: &CalibratedSpectrum,
    primaries: &[[f64; 2]; 3],
    whitepoint: &[f64; 2],
    normalize_to: f64,
) -> Result<LuminanceDistribution> {
    if !normalize_to.is_finite() || normalize_to <= 0.0 {
        return Err(SpectroscopeError::invalid_input(
            "normalize_to",
            format!("must be a positive number, got {}", normalize_to),
        ));
    }
    let k = luminance_coefficients(primaries, whitepoint)?;

    let scaled = normalise(spectrum, normalize_to);
    let values = scaled.values().iter().map(|rgb| dot(&k, rgb)).collect();

    tracing::trace!(samples = spectrum.len(), coefficients = ?k, "reduced spectrum to luminance");

    LuminanceDistribution::new(scaled.wavelengths().to_vec(), values)
}
