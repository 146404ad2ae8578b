//! Watermark error types.

use std::fmt;

/// Errors that can occur while building or compositing a watermark layer.
///
/// A missing overlay asset is deliberately not an error: the compositor
/// no-ops for that file and the rest of the pipeline continues.
#[derive(Debug)]
pub enum WatermarkError {
    /// Failed to decode the overlay image
    DecodeError(String),

    /// Failed to render the text overlay
    RenderError(String),

    /// Invalid watermark configuration
    ConfigError(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecodeError(msg) => write!(f, "Failed to decode watermark image: {}", msg),
            Self::RenderError(msg) => write!(f, "Failed to render text watermark: {}", msg),
            Self::ConfigError(msg) => write!(f, "Watermark configuration error: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}
