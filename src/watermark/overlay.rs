//! Image-file overlays scaled relative to the base image.

use std::path::PathBuf;

use tracing::warn;

use super::compositor::{apply_opacity, OverlayLayer};
use super::error::WatermarkError;
use super::position::{overlay_position, Anchor};

/// Anything that can produce a composite-ready layer for a given base image.
///
/// Returning `Ok(None)` means the overlay is unavailable (for example a
/// missing watermark file) and the base image should pass through untouched.
pub trait Overlay {
    fn build(&self, base_width: u32, base_height: u32)
        -> Result<Option<OverlayLayer>, WatermarkError>;
}

/// A raster watermark loaded from disk, scaled to a fraction of the base
/// image's width with its own aspect ratio preserved.
pub struct ImageOverlay {
    pub path: PathBuf,
    pub size_ratio: f32,
    pub anchor: Anchor,
    pub margin: u32,
    pub opacity: f32,
}

impl Overlay for ImageOverlay {
    fn build(
        &self,
        base_width: u32,
        base_height: u32,
    ) -> Result<Option<OverlayLayer>, WatermarkError> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Watermark image not readable, skipping watermark"
                );
                return Ok(None);
            }
        };

        let decoded = image::load_from_memory(&data)
            .map_err(|e| WatermarkError::DecodeError(e.to_string()))?;

        let ratio = self.size_ratio.clamp(0.01, 1.0);
        let target_w = ((base_width as f32 * ratio).round() as u32).max(1);
        let aspect = decoded.height() as f32 / decoded.width() as f32;
        let target_h = ((target_w as f32 * aspect).round() as u32).max(1);

        let scaled = if target_w == decoded.width() && target_h == decoded.height() {
            decoded
        } else {
            crate::resize::resample(&decoded, target_w, target_h)
                .map_err(|e| WatermarkError::RenderError(e.to_string()))?
        };

        let mut rgba = scaled.to_rgba8();
        apply_opacity(&mut rgba, self.opacity);

        let (x, y) = overlay_position(
            self.anchor,
            base_width,
            base_height,
            rgba.width(),
            rgba.height(),
            self.margin,
        );

        Ok(Some(OverlayLayer { image: rgba, x, y }))
    }
}
