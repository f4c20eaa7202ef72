//! Pixel-position to wavelength calibration of intensity profiles
//!
//! Known reference wavelengths of identifiable absorption lines are paired
//! with the pixel positions where those lines were located in the profile.
//! The pairs define a piecewise-linear correspondence between pixel and
//! wavelength space that is used to resample the profile onto a uniform
//! wavelength axis, extrapolating linearly past the outermost lines.

use std::collections::BTreeMap;

use ndarray::Array1;

use crate::calibration::LinearInterpolator;
use crate::constants::calibration::{MIN_CALIBRATION_LINES, MIN_INTERPOLATION_POINTS};
use crate::error::{Result, SpectroscopeError};
use crate::profile::{sample_profile, Image, LineSegment, Profile, CHANNELS};
use crate::spectrum::CalibratedSpectrum;

/// Line name to value (wavelength in nm, or pixel position) lookup table
pub type LineTable = BTreeMap<String, f64>;

/// A line present in both the reference and the measured tables
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationLine {
    pub name: String,
    /// Reference wavelength in nanometers
    pub reference: f64,
    /// Measured pixel position along the profile
    pub measured: f64,
}

/// Validated pixel/wavelength correspondence
///
/// Lines are kept in ascending measured order. Measured positions are
/// strictly increasing in that order and reference wavelengths strictly
/// monotonic, decreasing for a mirrored spectrum.
#[derive(Debug, Clone)]
pub struct Calibration {
    lines: Vec<CalibrationLine>,
    pixel_to_wavelength: LinearInterpolator,
    wavelength_to_pixel: LinearInterpolator,
    uniform_remap: LinearInterpolator,
}

impl Calibration {
    /// Build the calibration from the lines shared by `reference` and `measured`
    ///
    /// `grid_points` is the resolution of the uniform position to wavelength
    /// remap grid; values below two are raised to two.
    ///
    /// # Errors
    ///
    /// Returns `SpectroscopeError::InsufficientCalibrationData` if fewer than
    /// two lines are shared, if any shared value is not finite, if two lines
    /// share a measured position or a reference wavelength, or if the
    /// reference wavelengths are not monotonic in measured order.
    pub fn new(reference: &LineTable, measured: &LineTable, grid_points: usize) -> Result<Self> {
        let mut lines: Vec<CalibrationLine> = measured
            .iter()
            .filter_map(|(name, &position)| {
                reference.get(name).map(|&wavelength| CalibrationLine {
                    name: name.clone(),
                    reference: wavelength,
                    measured: position,
                })
            })
            .collect();

        if lines.len() < MIN_CALIBRATION_LINES {
            return Err(SpectroscopeError::insufficient_calibration(format!(
                "{} line(s) shared by reference and measured tables, at least {} required",
                lines.len(),
                MIN_CALIBRATION_LINES
            )));
        }
        if let Some(line) = lines
            .iter()
            .find(|l| !l.reference.is_finite() || !l.measured.is_finite())
        {
            return Err(SpectroscopeError::insufficient_calibration(format!(
                "line '{}' has a non-finite value",
                line.name
            )));
        }

        lines.sort_by(|a, b| a.measured.total_cmp(&b.measured));

        for pair in lines.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.measured == b.measured {
                return Err(SpectroscopeError::insufficient_calibration(format!(
                    "lines '{}' and '{}' share measured position {}",
                    a.name, b.name, a.measured
                )));
            }
            if a.reference == b.reference {
                return Err(SpectroscopeError::insufficient_calibration(format!(
                    "lines '{}' and '{}' share reference wavelength {}",
                    a.name, b.name, a.reference
                )));
            }
        }
        // Mirrored spectra run from red to blue
        let rising = lines[1].reference > lines[0].reference;
        if let Some(pair) = lines
            .windows(2)
            .find(|pair| (pair[1].reference > pair[0].reference) != rising)
        {
            return Err(SpectroscopeError::insufficient_calibration(format!(
                "reference wavelengths change direction between '{}' ({} nm) and '{}' ({} nm)",
                pair[0].name, pair[0].reference, pair[1].name, pair[1].reference
            )));
        }

        let measured_positions: Vec<f64> = lines.iter().map(|l| l.measured).collect();
        let reference_wavelengths: Vec<f64> = lines.iter().map(|l| l.reference).collect();

        let pixel_to_wavelength =
            LinearInterpolator::new(measured_positions, reference_wavelengths)?;
        let wavelength_to_pixel = pixel_to_wavelength.inverse()?;

        // Outermost lines; the remap keeps their orientation
        let (first, last) = (&lines[0], &lines[lines.len() - 1]);
        let grid_points = grid_points.max(MIN_INTERPOLATION_POINTS);
        let uniform_remap = LinearInterpolator::new(
            Array1::linspace(first.measured, last.measured, grid_points).to_vec(),
            Array1::linspace(first.reference, last.reference, grid_points).to_vec(),
        )?;

        let names: Vec<&str> = lines.iter().map(|l| l.name.as_str()).collect();
        tracing::debug!(
            lines = ?names,
            pixel_range = ?(first.measured, last.measured),
            wavelength_range = ?(first.reference, last.reference),
            mirrored = !rising,
            "built wavelength calibration"
        );

        Ok(Self {
            lines,
            pixel_to_wavelength,
            wavelength_to_pixel,
            uniform_remap,
        })
    }

    /// Shared lines in ascending measured order
    pub fn lines(&self) -> &[CalibrationLine] {
        &self.lines
    }

    /// Wavelength at a pixel position through the line correspondence
    pub fn pixel_to_wavelength(&self, pixel: f64) -> f64 {
        self.pixel_to_wavelength.evaluate(pixel)
    }

    /// Pixel position of a wavelength through the line correspondence
    pub fn wavelength_to_pixel(&self, wavelength: f64) -> f64 {
        self.wavelength_to_pixel.evaluate(wavelength)
    }

    /// Wavelength of a pixel position on the uniform (affine) remap grid
    pub fn uniform_wavelength(&self, pixel: f64) -> f64 {
        self.uniform_remap.evaluate(pixel)
    }
}

/// Calibrate a profile against reference and measured line positions
///
/// The output axis holds `samples` evenly spaced wavelengths (default: the
/// profile length) spanning the uniform remap of pixel `0` to pixel `N`,
/// in ascending order even when the spectrum is mirrored.
/// Each wavelength is mapped back to a pixel position through the line
/// correspondence, where the profile channels are interpolated. All
/// interpolants extrapolate linearly, so wavelengths past the outermost
/// calibration lines still yield values.
///
/// # Errors
///
/// Returns `SpectroscopeError::InvalidInput` if `samples` is zero or the
/// profile has fewer than two samples, and
/// `SpectroscopeError::InsufficientCalibrationData` when the line tables
/// cannot define a calibration (see [`Calibration::new`]).
pub fn calibrate(
    profile: &Profile,
    reference: &LineTable,
    measured: &LineTable,
    samples: Option<usize>,
) -> Result<CalibratedSpectrum> {
    let width = profile.len();
    let samples = samples.unwrap_or(width);
    if samples == 0 {
        return Err(SpectroscopeError::invalid_input("samples", "must be positive"));
    }
    if width < MIN_INTERPOLATION_POINTS {
        return Err(SpectroscopeError::invalid_input(
            "profile",
            format!(
                "at least {} samples are required, got {}",
                MIN_INTERPOLATION_POINTS, width
            ),
        ));
    }

    let calibration = Calibration::new(reference, measured, samples)?;

    let pixels: Vec<f64> = (0..width).map(|i| i as f64).collect();
    let channels = (0..CHANNELS)
        .map(|c| LinearInterpolator::new(pixels.clone(), profile.channel(c).to_vec()))
        .collect::<Result<Vec<_>>>()?;

    let at_origin = calibration.uniform_wavelength(0.0);
    let at_width = calibration.uniform_wavelength(width as f64);
    let (start, end) = (at_origin.min(at_width), at_origin.max(at_width));
    let wavelengths = Array1::linspace(start, end, samples).to_vec();

    let values = wavelengths
        .iter()
        .map(|&wavelength| {
            let pixel = calibration.wavelength_to_pixel(wavelength);
            let mut rgb = [0.0; CHANNELS];
            for (value, channel) in rgb.iter_mut().zip(&channels) {
                *value = channel.evaluate(pixel);
            }
            rgb
        })
        .collect();

    tracing::debug!(samples, start, end, "calibrated spectrum profile");

    CalibratedSpectrum::new(wavelengths, values)
}

/// Calibrated RGB spectrum of an image whose dispersion axis is horizontal
///
/// Samples the first image row, `[0, 0, width - 1, 0]`, at `samples`
/// points (default: image width) and calibrates the resulting profile.
pub fn calibrated_rgb_spectrum(
    image: &Image,
    reference: &LineTable,
    measured: &LineTable,
    samples: Option<usize>,
) -> Result<CalibratedSpectrum> {
    let samples = samples.unwrap_or_else(|| image.width());
    let profile = sample_profile(image, &LineSegment::top_row(image.width()), Some(samples))?;
    calibrate(&profile, reference, measured, Some(samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, f64)]) -> LineTable {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn constant_profile(width: usize, value: f64) -> Profile {
        Profile::from_rgb(&vec![[value; CHANNELS]; width])
    }

    fn ramp_profile(width: usize) -> Profile {
        let values: Vec<[f64; CHANNELS]> = (0..width)
            .map(|i| [i as f64, 2.0 * i as f64, 1.0])
            .collect();
        Profile::from_rgb(&values)
    }

    #[test]
    fn test_two_lines_constant_profile() {
        let reference = table(&[("A", 600.0), ("B", 500.0)]);
        let measured = table(&[("A", 100.0), ("B", 10.0)]);
        let spectrum = calibrate(&constant_profile(200, 0.5), &reference, &measured, None).unwrap();

        assert_eq!(spectrum.len(), 200);
        for rgb in spectrum.values() {
            for v in rgb {
                assert!((v - 0.5).abs() < 1e-9);
            }
        }

        // 100 nm over 90 px, extrapolated to pixels 0 and 200
        let (start, end) = spectrum.range().unwrap();
        assert!((start - (500.0 - 10.0 * 100.0 / 90.0)).abs() < 1e-9);
        assert!((end - (500.0 + 190.0 * 100.0 / 90.0)).abs() < 1e-9);
    }

    #[test]
    fn test_two_lines_are_affine() {
        let slope = (656.281 - 486.134) / (1095.0 - 371.0);
        let intercept = 486.134 - slope * 371.0;
        let at = |pixel: f64| slope * pixel + intercept;

        let reference = table(&[("C", 656.281), ("F", 486.134), ("X", 1.0)]);
        let measured = table(&[("C", 1095.0), ("F", 371.0), ("Y", 5.0)]);
        let first = Calibration::new(&reference, &measured, 64).unwrap();
        assert_eq!(first.lines().len(), 2);

        // Another pair of lines on the same dispersion
        let reference = table(&[("G", at(134.0)), ("D1", at(810.0))]);
        let measured = table(&[("G", 134.0), ("D1", 810.0)]);
        let second = Calibration::new(&reference, &measured, 64).unwrap();

        for pixel in [-50.0, 0.0, 200.0, 371.0, 800.0, 1095.0, 1500.0] {
            let expected = at(pixel);
            for calibration in [&first, &second] {
                assert!((calibration.pixel_to_wavelength(pixel) - expected).abs() < 1e-9);
                assert!((calibration.uniform_wavelength(pixel) - expected).abs() < 1e-9);
            }
            let back = first.wavelength_to_pixel(expected) - second.wavelength_to_pixel(expected);
            assert!(back.abs() < 1e-6);
        }

        let profile = ramp_profile(1200);
        let a = calibrate(
            &profile,
            &table(&[("C", 656.281), ("F", 486.134)]),
            &table(&[("C", 1095.0), ("F", 371.0)]),
            None,
        )
        .unwrap();
        let b = calibrate(&profile, &reference, &measured, None).unwrap();
        for ((wa, va), (wb, vb)) in a.iter().zip(b.iter()) {
            assert!((wa - wb).abs() < 1e-9);
            for c in 0..CHANNELS {
                assert!((va[c] - vb[c]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_mirrored_two_lines() {
        let reference = table(&[("A", 600.0), ("B", 500.0)]);
        let measured = table(&[("A", 10.0), ("B", 100.0)]);
        let spectrum = calibrate(&ramp_profile(200), &reference, &measured, None).unwrap();

        assert_eq!(spectrum.len(), 200);
        assert!(spectrum.wavelengths().windows(2).all(|w| w[1] > w[0]));

        // -100 nm over 90 px: pixel 200 is the blue end, pixel 0 the red end
        let (start, end) = spectrum.range().unwrap();
        assert!((start - (600.0 - 190.0 * 100.0 / 90.0)).abs() < 1e-9);
        assert!((end - (600.0 + 10.0 * 100.0 / 90.0)).abs() < 1e-9);

        let values = spectrum.values();
        assert!((values[0][0] - 200.0).abs() < 1e-6);
        assert!(values[199][0].abs() < 1e-6);
        assert!(values.windows(2).all(|w| w[1][0] < w[0][0]));

        let calibration = Calibration::new(&reference, &measured, 200).unwrap();
        assert!((calibration.wavelength_to_pixel(550.0) - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_three_lines_warp_profile() {
        let reference = table(&[("a", 400.0), ("b", 500.0), ("c", 700.0)]);
        let measured = table(&[("a", 0.0), ("b", 50.0), ("c", 100.0)]);
        let profile = ramp_profile(101);
        let spectrum = calibrate(&profile, &reference, &measured, Some(301)).unwrap();
        let calibration = Calibration::new(&reference, &measured, 301).unwrap();

        assert!((calibration.wavelength_to_pixel(500.0) - 50.0).abs() < 1e-9);
        assert!((calibration.wavelength_to_pixel(450.0) - 25.0).abs() < 1e-9);
        assert!((calibration.wavelength_to_pixel(600.0) - 75.0).abs() < 1e-9);

        for (wavelength, [r, g, b]) in spectrum.iter() {
            let pixel = calibration.wavelength_to_pixel(wavelength);
            assert!((r - pixel).abs() < 1e-6);
            assert!((g - 2.0 * pixel).abs() < 1e-6);
            assert!((b - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_wavelength_axis_strictly_increasing() {
        let reference = table(&[("G", 430.790), ("F", 486.134), ("D1", 589.592), ("C", 656.281)]);
        let measured = table(&[("G", 134.0), ("F", 371.0), ("D1", 810.0), ("C", 1095.0)]);
        let spectrum = calibrate(&ramp_profile(1200), &reference, &measured, Some(500)).unwrap();
        assert_eq!(spectrum.len(), 500);
        assert!(spectrum.wavelengths().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_calibrate_is_deterministic() {
        let reference = table(&[("A", 600.0), ("B", 500.0), ("C", 550.0)]);
        let measured = table(&[("A", 180.0), ("B", 20.0), ("C", 90.0)]);
        let profile = ramp_profile(200);
        let first = calibrate(&profile, &reference, &measured, None).unwrap();
        let second = calibrate(&profile, &reference, &measured, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_output_resolution_keeps_span() {
        let reference = table(&[("A", 600.0), ("B", 500.0)]);
        let measured = table(&[("A", 100.0), ("B", 10.0)]);
        let profile = constant_profile(200, 0.25);
        let coarse = calibrate(&profile, &reference, &measured, Some(20)).unwrap();
        let full = calibrate(&profile, &reference, &measured, None).unwrap();

        assert_eq!(coarse.len(), 20);
        let (a0, a1) = coarse.range().unwrap();
        let (b0, b1) = full.range().unwrap();
        assert!((a0 - b0).abs() < 1e-9 && (a1 - b1).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_measured_positions_rejected() {
        let reference = table(&[("A", 600.0), ("B", 500.0)]);
        let measured = table(&[("A", 50.0), ("B", 50.0)]);
        let result = calibrate(&constant_profile(100, 1.0), &reference, &measured, None);
        assert!(matches!(
            result,
            Err(SpectroscopeError::InsufficientCalibrationData { .. })
        ));
    }

    #[test]
    fn test_duplicate_reference_wavelengths_rejected() {
        let reference = table(&[("A", 500.0), ("B", 500.0)]);
        let measured = table(&[("A", 10.0), ("B", 50.0)]);
        assert!(matches!(
            Calibration::new(&reference, &measured, 10),
            Err(SpectroscopeError::InsufficientCalibrationData { .. })
        ));
    }

    #[test]
    fn test_too_few_shared_lines_rejected() {
        let reference = table(&[("A", 600.0), ("B", 500.0)]);
        let measured = table(&[("A", 100.0), ("Z", 10.0)]);
        assert!(matches!(
            Calibration::new(&reference, &measured, 10),
            Err(SpectroscopeError::InsufficientCalibrationData { .. })
        ));
        assert!(matches!(
            Calibration::new(&LineTable::new(), &LineTable::new(), 10),
            Err(SpectroscopeError::InsufficientCalibrationData { .. })
        ));
    }

    #[test]
    fn test_reference_must_be_monotonic() {
        let measured = table(&[("a", 0.0), ("b", 50.0), ("c", 100.0)]);

        let folded = table(&[("a", 400.0), ("b", 700.0), ("c", 500.0)]);
        assert!(matches!(
            Calibration::new(&folded, &measured, 10),
            Err(SpectroscopeError::InsufficientCalibrationData { .. })
        ));

        let mirrored = table(&[("a", 700.0), ("b", 500.0), ("c", 400.0)]);
        let calibration = Calibration::new(&mirrored, &measured, 10).unwrap();
        assert!((calibration.wavelength_to_pixel(450.0) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_sizes_rejected_before_calibration() {
        let empty = LineTable::new();
        assert!(matches!(
            calibrate(&constant_profile(10, 1.0), &empty, &empty, Some(0)),
            Err(SpectroscopeError::InvalidInput { .. })
        ));
        assert!(matches!(
            calibrate(&constant_profile(1, 1.0), &empty, &empty, None),
            Err(SpectroscopeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_calibrated_rgb_spectrum_uses_top_row() {
        let image = Image::from_fn(3, 50, |y, _| if y == 0 { [0.2, 0.4, 0.6] } else { [1.0; 3] });
        let reference = table(&[("A", 600.0), ("B", 500.0)]);
        let measured = table(&[("A", 40.0), ("B", 10.0)]);
        let spectrum = calibrated_rgb_spectrum(&image, &reference, &measured, None).unwrap();

        assert_eq!(spectrum.len(), 50);
        for [r, g, b] in spectrum.values() {
            assert!((r - 0.2).abs() < 1e-9);
            assert!((g - 0.4).abs() < 1e-9);
            assert!((b - 0.6).abs() < 1e-9);
        }
    }
}
