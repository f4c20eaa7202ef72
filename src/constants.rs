//! Reference values for wavelength calibration and luminance reduction
//!
//! Compile-time constants only. Colourspace definitions built from these
//! live in [`crate::color::luminance`].

/// D65 Standard Illuminant Reference
///
/// CIE Standard Illuminant D65 represents average daylight with a correlated
/// color temperature of 6504K. It is the whitepoint of every RGB colourspace
/// shipped with this crate.
pub mod d65 {
    /// D65 chromaticity coordinates (CIE 1931 2° observer)
    pub const CHROMATICITY: [f64; 2] = [0.3127, 0.3290];
}

/// Primary chromaticities (x, y) of the supported RGB colourspaces, R G B order
pub mod primaries {
    /// IEC 61966-2-1 sRGB (shared with ITU-R BT.709)
    pub const SRGB: [[f64; 2]; 3] = [[0.64, 0.33], [0.30, 0.60], [0.15, 0.06]];

    /// Adobe RGB (1998)
    pub const ADOBE_RGB_1998: [[f64; 2]; 3] = [[0.64, 0.33], [0.21, 0.71], [0.15, 0.06]];

    /// ITU-R BT.2020
    pub const ITU_R_BT_2020: [[f64; 2]; 3] = [[0.708, 0.292], [0.170, 0.797], [0.131, 0.046]];
}

/// Calibration defaults
pub mod calibration {
    /// Value the brightest channel sample is mapped to before luminance reduction
    pub const DEFAULT_NORMALIZE_TO: f64 = 100.0;

    /// Minimum number of shared reference/measured lines
    pub const MIN_CALIBRATION_LINES: usize = 2;

    /// Minimum points for a piecewise-linear interpolant with linear extrapolation
    pub const MIN_INTERPOLATION_POINTS: usize = 2;
}

/// Fraction of the marker strip height used by the luminance trace when plotting
pub const MARKER_LUMINANCE_HEADROOM: f64 = 0.9;
