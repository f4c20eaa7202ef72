//! Electro-optical transfer functions applied when loading images

use palette::{LinSrgb, Srgb};
use serde::{Deserialize, Serialize};

/// Encoding of the stored pixel values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransferFunction {
    /// Values are already linear and used as-is
    Linear,
    /// Values are sRGB encoded and are decoded to linear light
    #[default]
    Srgb,
}

impl TransferFunction {
    /// Decode an encoded RGB triple to linear light
    pub fn decode(self, rgb: [f64; 3]) -> [f64; 3] {
        match self {
            TransferFunction::Linear => rgb,
            TransferFunction::Srgb => {
                let linear: LinSrgb<f64> = Srgb::new(rgb[0], rgb[1], rgb[2]).into_linear();
                [linear.red, linear.green, linear.blue]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_is_identity() {
        assert_eq!(TransferFunction::Linear.decode([0.1, 0.5, 0.9]), [0.1, 0.5, 0.9]);
    }

    #[test]
    fn test_srgb_decoding() {
        let [black, mid, white] = TransferFunction::Srgb.decode([0.0, 0.5, 1.0]);
        assert!(black.abs() < 1e-9);
        assert!((mid - 0.2140).abs() < 1e-3);
        assert!((white - 1.0).abs() < 1e-9);
    }
}
