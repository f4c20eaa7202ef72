//! Error types for the spectroscope library

use thiserror::Error;

/// Result type alias for spectroscope operations
pub type Result<T> = std::result::Result<T, SpectroscopeError>;

/// Error types for profile sampling, calibration and their surroundings
#[derive(Error, Debug)]
pub enum SpectroscopeError {
    /// Malformed geometric or sizing input (degenerate line, empty image, bad sample count)
    #[error("Invalid input: {parameter}: {reason}")]
    InvalidInput { parameter: String, reason: String },

    /// Not enough usable reference/measured line pairs to build the calibration
    #[error("Insufficient calibration data: {reason}")]
    InsufficientCalibrationData { reason: String },

    /// Image file could not be loaded or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration file could not be read, parsed or written
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SpectroscopeError {
    /// Create an invalid input error for the named parameter
    pub fn invalid_input(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create an insufficient calibration data error
    pub fn insufficient_calibration(reason: impl Into<String>) -> Self {
        Self::InsufficientCalibrationData {
            reason: reason.into(),
        }
    }

    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error indicates a recoverable condition
    ///
    /// Every operation is deterministic, so retrying with the same input
    /// reproduces the failure. Only I/O failures may succeed on a later attempt.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SpectroscopeError::ImageLoadError { .. })
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            SpectroscopeError::InvalidInput { parameter, .. } => {
                format!("The value given for '{}' cannot be used. Please check it and try again.", parameter)
            }
            SpectroscopeError::InsufficientCalibrationData { .. } => {
                "At least two calibration lines with distinct positions and wavelengths are required."
                    .to_string()
            }
            SpectroscopeError::ImageLoadError { .. } => {
                "Could not load the image. Please check the file format and try again.".to_string()
            }
            SpectroscopeError::ConfigError { .. } => {
                "Could not read the configuration. Please check the JSON file.".to_string()
            }
        }
    }
}
