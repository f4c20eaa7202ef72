//! Wavelength calibration module
//!
//! Turns pixel-indexed profiles into wavelength-indexed spectra using
//! reference/measured absorption line pairs.

pub mod interpolator;
pub mod wavelength;

pub use interpolator::LinearInterpolator;
pub use wavelength::{calibrate, calibrated_rgb_spectrum, Calibration, CalibrationLine, LineTable};
