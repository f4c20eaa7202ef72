//! Image loading into floating-point RGB arrays
//!
//! This module provides a single entry point for turning an image file into
//! an [`Image`] ready for profile sampling.
//!
//! ## Supported Formats
//!
//! Decoded via the `image` crate:
//! - JPEG, PNG, GIF, WebP, TIFF, BMP, TGA, EXR, PNM, QOI, HDR
//!
//! ## Design
//!
//! Every format is converted to 32-bit float RGB in `[0, 1]` and then
//! passed through the requested [`TransferFunction`]. Alpha is discarded.

use std::path::Path;

use image::{DynamicImage, ImageReader};
use ndarray::Array3;

use crate::color::TransferFunction;
use crate::error::{Result, SpectroscopeError};
use crate::profile::{Image, CHANNELS};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    /// GIF image (first frame only)
    Gif,
    WebP,
    Tiff,
    Bmp,
    Tga,
    /// OpenEXR image
    Exr,
    /// PNM image (PBM, PGM, PPM)
    Pnm,
    Qoi,
    Hdr,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            "tga" => Some(ImageFormat::Tga),
            "exr" => Some(ImageFormat::Exr),
            "pbm" | "pgm" | "ppm" | "pnm" => Some(ImageFormat::Pnm),
            "qoi" => Some(ImageFormat::Qoi),
            "hdr" => Some(ImageFormat::Hdr),
            _ => None,
        }
    }

    /// Whether stored values are linear light rather than display encoded
    pub fn is_scene_linear(&self) -> bool {
        matches!(self, ImageFormat::Exr | ImageFormat::Hdr)
    }

    /// Transfer function to apply when loading this format
    ///
    /// Scene-linear formats are never decoded a second time, whatever was
    /// requested.
    pub fn effective_transfer(&self, requested: TransferFunction) -> TransferFunction {
        if self.is_scene_linear() && requested != TransferFunction::Linear {
            tracing::warn!(
                format = ?self,
                ?requested,
                "format stores linear light, loading without transfer decoding"
            );
            TransferFunction::Linear
        } else {
            requested
        }
    }
}

/// Load an image file and decode it to linear or encoded float RGB
///
/// # Errors
///
/// Returns `SpectroscopeError::ImageLoadError` if the extension is not
/// supported, or the file cannot be opened or decoded.
///
/// # Example
///
/// ```rust,no_run
/// use spectroscope::color::TransferFunction;
/// use spectroscope::image_loader::load_image;
/// use std::path::Path;
///
/// let image = load_image(Path::new("sun.png"), TransferFunction::Srgb)?;
/// println!("Loaded image: {}x{}", image.width(), image.height());
/// # Ok::<(), spectroscope::SpectroscopeError>(())
/// ```
pub fn load_image(path: &Path, transfer: TransferFunction) -> Result<Image> {
    let format = ImageFormat::from_extension(path).ok_or_else(|| SpectroscopeError::ImageLoadError {
        message: format!("Unknown image format for file: {}", path.display()),
        source: None,
    })?;

    let reader = ImageReader::open(path).map_err(|e| {
        SpectroscopeError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;
    let decoded = reader.decode().map_err(|e| {
        SpectroscopeError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    let transfer = format.effective_transfer(transfer);
    tracing::debug!(
        path = %path.display(),
        ?format,
        ?transfer,
        width = decoded.width(),
        height = decoded.height(),
        "loaded image"
    );

    Ok(image_from_dynamic(&decoded, transfer))
}

/// Convert a decoded image to an [`Image`], applying `transfer` per pixel
pub fn image_from_dynamic(decoded: &DynamicImage, transfer: TransferFunction) -> Image {
    let rgb = decoded.to_rgb32f();
    let (width, height) = rgb.dimensions();

    let mut data = Array3::zeros((height as usize, width as usize, CHANNELS));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let values = transfer.decode([r as f64, g as f64, b as f64]);
        for (c, value) in values.into_iter().enumerate() {
            data[[y as usize, x as usize, c]] = value;
        }
    }

    Image::from_array(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgb32FImage, RgbImage};

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ImageFormat::from_extension(Path::new("sun.jpg")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_extension(Path::new("sun.PNG")),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_extension(Path::new("sun.exr")),
            Some(ImageFormat::Exr)
        );
        assert_eq!(ImageFormat::from_extension(Path::new("sun.heic")), None);
        assert_eq!(ImageFormat::from_extension(Path::new("sun")), None);
    }

    #[test]
    fn test_scene_linear_formats_skip_decoding() {
        assert!(ImageFormat::Hdr.is_scene_linear());
        assert!(!ImageFormat::Png.is_scene_linear());
        assert_eq!(
            ImageFormat::Exr.effective_transfer(TransferFunction::Srgb),
            TransferFunction::Linear
        );
        assert_eq!(
            ImageFormat::Png.effective_transfer(TransferFunction::Srgb),
            TransferFunction::Srgb
        );
        assert_eq!(
            ImageFormat::Jpeg.effective_transfer(TransferFunction::Linear),
            TransferFunction::Linear
        );
    }

    #[test]
    fn test_load_exr_keeps_linear_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strip.exr");
        Rgb32FImage::from_pixel(4, 2, Rgb([0.5, 0.25, 0.75])).save(&path).unwrap();

        let image = load_image(&path, TransferFunction::Srgb).unwrap();
        let pixel = image.pixel(1, 3).unwrap();
        assert!((pixel[0] - 0.5).abs() < 1e-6);
        assert!((pixel[1] - 0.25).abs() < 1e-6);
        assert!((pixel[2] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_image_from_dynamic_layout() {
        let rgb = RgbImage::from_fn(3, 2, |x, y| Rgb([(x * 100) as u8, (y * 255) as u8, 255]));
        let image = image_from_dynamic(&DynamicImage::ImageRgb8(rgb), TransferFunction::Linear);

        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        let pixel = image.pixel(1, 2).unwrap();
        assert!((pixel[0] - 200.0 / 255.0).abs() < 1e-6);
        assert!((pixel[1] - 1.0).abs() < 1e-6);
        assert!((pixel[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_png_with_srgb_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strip.png");
        RgbImage::from_pixel(4, 2, Rgb([128, 255, 0])).save(&path).unwrap();

        let image = load_image(&path, TransferFunction::Srgb).unwrap();
        let pixel = image.pixel(0, 0).unwrap();
        assert!((pixel[0] - 0.2158).abs() < 1e-3);
        assert!((pixel[1] - 1.0).abs() < 1e-6);
        assert!(pixel[2].abs() < 1e-9);
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            load_image(Path::new("spectrum.xyz"), TransferFunction::Linear),
            Err(SpectroscopeError::ImageLoadError { .. })
        ));
        assert!(matches!(
            load_image(Path::new("does_not_exist.png"), TransferFunction::Linear),
            Err(SpectroscopeError::ImageLoadError { .. })
        ));
    }
}
