//! # Spectroscope
//!
//! A Rust crate for turning photographs of dispersed light into
//! wavelength-calibrated color spectra.
//!
//! This library provides:
//! - Sub-pixel intensity profiles sampled along any line through an image
//! - Wavelength calibration from known absorption lines located in the profile
//! - Luminance reduction of calibrated RGB spectra
//! - Fraunhofer line tables and labelled line markers for plotting
//!
//! ## Example
//!
//! ```rust,no_run
//! use spectroscope::{analyze_spectrum, SpectroscopeConfig};
//!
//! let config = SpectroscopeConfig::default_fraunhofer("sun.png");
//! let analysis = analyze_spectrum(&config)?;
//! println!("{} samples over {:?} nm", analysis.spectrum.len(), analysis.spectrum.range());
//! # Ok::<(), spectroscope::SpectroscopeError>(())
//! ```

use serde::Serialize;

pub mod calibration;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod fraunhofer;
pub mod image_loader;
pub mod profile;
pub mod spectrum;

pub use calibration::{calibrate, calibrated_rgb_spectrum, Calibration, LineTable, LinearInterpolator};
pub use color::{luminance, RgbColourspace, TransferFunction};
pub use config::SpectroscopeConfig;
pub use error::{Result, SpectroscopeError};
pub use fraunhofer::{line_markers, LineMarker, LineTables};
pub use profile::{sample_profile, Image, LineSegment, Profile};
pub use spectrum::{CalibratedSpectrum, Channel, LuminanceDistribution, SpectrumInterpolants};

/// Calibrated spectrum of a photograph together with its luminance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumAnalysis {
    pub spectrum: CalibratedSpectrum,
    pub luminance: LuminanceDistribution,
}

/// Analyze a spectrum photograph described by `config`
///
/// Loads and decodes the image, samples the profile along the configured
/// line (default: the first row), calibrates it against the reference and
/// measured lines and reduces the result to luminance.
///
/// # Errors
///
/// Returns `SpectroscopeError` if:
/// - The configuration is invalid
/// - The image cannot be loaded or decoded
/// - The line or sample count is unusable for this image
/// - The calibration lines do not define a calibration
pub fn analyze_spectrum(config: &SpectroscopeConfig) -> Result<SpectrumAnalysis> {
    config.validate()?;
    let colourspace = config.rgb_colourspace()?;

    let image = image_loader::load_image(&config.image_path, config.transfer_function)?;
    let samples = config.samples.unwrap_or_else(|| image.width());
    let line = config
        .line
        .unwrap_or_else(|| LineSegment::top_row(image.width()));

    let profile = sample_profile(&image, &line, Some(samples))?;
    let spectrum = calibrate(&profile, &config.reference, &config.measured, Some(samples))?;
    let luminance = luminance(
        &spectrum,
        &colourspace.primaries,
        &colourspace.whitepoint,
        config.normalize_to,
    )?;

    tracing::info!(
        path = %config.image_path.display(),
        samples,
        range = ?spectrum.range(),
        "analyzed spectrum"
    );

    Ok(SpectrumAnalysis { spectrum, luminance })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_serialization() {
        let spectrum =
            CalibratedSpectrum::new(vec![500.0, 600.0], vec![[0.2, 0.4, 0.8], [0.1, 0.1, 0.1]])
                .unwrap();
        let cs = RgbColourspace::SRGB;
        let luminance = luminance(&spectrum, &cs.primaries, &cs.whitepoint, 100.0).unwrap();
        let analysis = SpectrumAnalysis { spectrum, luminance };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["spectrum"]["wavelengths"][1], 600.0);
        assert_eq!(json["luminance"]["values"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_analyze_spectrum_missing_image() {
        let config = SpectroscopeConfig::default_fraunhofer("nonexistent_file.png");
        assert!(matches!(
            analyze_spectrum(&config),
            Err(SpectroscopeError::ImageLoadError { .. })
        ));
    }
}
