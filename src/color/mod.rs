//! Color science helpers
//!
//! This module handles transfer-function decoding of loaded images and
//! the luminance reduction of calibrated spectra.

pub mod luminance;
pub mod transfer;

pub use luminance::{luminance, luminance_coefficients, rgb_luminance, RgbColourspace};
pub use transfer::TransferFunction;
