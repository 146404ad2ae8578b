// Error types module

use std::fmt;

use crate::watermark::WatermarkError;

/// File-scoped pipeline error.
///
/// Every variant is terminal for exactly one input file: the batch loop
/// catches it at the per-file boundary, counts it, and moves on. Only
/// `FatalError` (input directory unreadable) aborts a whole run, and that
/// one never goes through this type.
#[derive(Debug)]
pub enum PipelineError {
    /// Source file unreadable or not a valid image for its extension
    DecodeFailed { message: String },

    /// Resize operation failed
    ResizeFailed { message: String },

    /// Target format rejected the pixel data or options
    EncodeFailed { format: String, message: String },

    /// Watermark layer could not be built or composited
    Watermark(WatermarkError),

    /// Reading the source or writing the destination failed
    Io { message: String },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::DecodeFailed { message } => {
                write!(f, "Failed to decode image: {}", message)
            }
            PipelineError::ResizeFailed { message } => {
                write!(f, "Resize failed: {}", message)
            }
            PipelineError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
            PipelineError::Watermark(err) => write!(f, "{}", err),
            PipelineError::Io { message } => write!(f, "I/O error: {}", message),
        }
    }
}

impl std::error::Error for PipelineError {}

impl PipelineError {
    pub fn decode_failed(message: impl Into<String>) -> Self {
        PipelineError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        PipelineError::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        PipelineError::Io {
            message: message.into(),
        }
    }
}

impl From<WatermarkError> for PipelineError {
    fn from(err: WatermarkError) -> Self {
        PipelineError::Watermark(err)
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::io(err.to_string())
    }
}

/// Run-aborting setup failure: the input directory itself cannot be listed.
#[derive(Debug)]
pub struct FatalError {
    pub message: String,
}

impl FatalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fatal setup failure: {}", self.message)
    }
}

impl std::error::Error for FatalError {}
