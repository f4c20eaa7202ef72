//! Configuration for the end-to-end spectrum analysis.
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use spectroscope::SpectroscopeConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = SpectroscopeConfig::from_json_file(Path::new("sun.json"))?;
//!
//! // Or start from the bundled Fraunhofer calibration
//! let config = SpectroscopeConfig::default_fraunhofer("sun.png");
//! # Ok::<(), spectroscope::SpectroscopeError>(())
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calibration::LineTable;
use crate::color::{RgbColourspace, TransferFunction};
use crate::constants::calibration::DEFAULT_NORMALIZE_TO;
use crate::error::{Result, SpectroscopeError};
use crate::fraunhofer::{measured_sample_lines, published_lines};
use crate::profile::LineSegment;

/// Complete configuration of a spectrum analysis run.
///
/// Can be serialized to/from JSON for reproducible calibrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectroscopeConfig {
    /// Spectrum photograph to analyze
    pub image_path: PathBuf,

    /// Encoding of the stored pixel values
    #[serde(default)]
    pub transfer_function: TransferFunction,

    /// Line to sample the profile along, default is the first image row
    #[serde(default)]
    pub line: Option<LineSegment>,

    /// Profile and spectrum resolution, default is the image width
    #[serde(default)]
    pub samples: Option<usize>,

    /// Reference wavelengths in nm, default is the published Fraunhofer table
    #[serde(default = "published_lines")]
    pub reference: LineTable,

    /// Measured line positions in profile pixels
    pub measured: LineTable,

    /// RGB colourspace used for luminance
    #[serde(default = "default_colourspace")]
    pub colourspace: String,

    /// Value the brightest channel is scaled to before luminance reduction
    #[serde(default = "default_normalize_to")]
    pub normalize_to: f64,
}

fn default_colourspace() -> String {
    RgbColourspace::SRGB.name.to_string()
}

fn default_normalize_to() -> f64 {
    DEFAULT_NORMALIZE_TO
}

impl SpectroscopeConfig {
    /// Configuration using the published table and the sample measured positions
    pub fn default_fraunhofer(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            transfer_function: TransferFunction::Srgb,
            line: None,
            samples: None,
            reference: published_lines(),
            measured: measured_sample_lines(),
            colourspace: default_colourspace(),
            normalize_to: DEFAULT_NORMALIZE_TO,
        }
    }

    /// Resolve the configured colourspace name
    pub fn rgb_colourspace(&self) -> Result<RgbColourspace> {
        RgbColourspace::by_name(&self.colourspace).ok_or_else(|| {
            SpectroscopeError::invalid_input(
                "colourspace",
                format!("unknown colourspace '{}'", self.colourspace),
            )
        })
    }

    /// Check the values that can be checked without loading the image
    pub fn validate(&self) -> Result<()> {
        self.rgb_colourspace()?;
        if self.samples == Some(0) {
            return Err(SpectroscopeError::invalid_input("samples", "must be positive"));
        }
        if !self.normalize_to.is_finite() || self.normalize_to <= 0.0 {
            return Err(SpectroscopeError::invalid_input(
                "normalize_to",
                format!("must be a positive number, got {}", self.normalize_to),
            ));
        }
        if let Some(line) = &self.line {
            if line.is_degenerate() {
                return Err(SpectroscopeError::invalid_input("line", "endpoints coincide"));
            }
        }
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SpectroscopeError::config(format!("Failed to read {}", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            SpectroscopeError::config(format!("Failed to parse {}", path.display()), e)
        })?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SpectroscopeError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            SpectroscopeError::config(format!("Failed to write {}", path.display()), e)
        })?;
        Ok(())
    }
}
