//! Watermark compositing: image overlays and SVG-rendered text overlays.

mod compositor;
mod error;
mod overlay;
mod position;
mod text;

pub use compositor::{apply_opacity, blend_layer, blend_pixels, OverlayLayer};
pub use error::WatermarkError;
pub use overlay::{ImageOverlay, Overlay};
pub use position::{edge_offsets, overlay_position, Anchor, AxisClass, EdgeOffsets};
pub use text::{escape_markup, parse_hex_color, rasterize_svg_data, Color, TextOverlay};

use std::path::PathBuf;

use image::DynamicImage;
use tracing::warn;

use crate::config::WatermarkConfig;

/// A configured watermark, ready to stamp onto processed images.
pub struct Watermark {
    overlay: Box<dyn Overlay + Send + Sync>,
}

impl Watermark {
    /// Build a watermark from configuration.
    ///
    /// Returns `None` when watermarking is disabled or the configuration is
    /// incomplete for its kind; incomplete configs are logged and treated as
    /// disabled rather than aborting the run.
    pub fn from_config(config: &WatermarkConfig) -> Option<Watermark> {
        if !config.enabled {
            return None;
        }

        let anchor = Anchor::parse(&config.position);
        let opacity = config.opacity.clamp(0.0, 1.0);

        match config.kind.as_str() {
            "image" => {
                let path = match &config.image_path {
                    Some(p) if !p.is_empty() => PathBuf::from(p),
                    _ => {
                        warn!("Image watermark enabled without imagePath, disabling watermark");
                        return None;
                    }
                };
                Some(Watermark {
                    overlay: Box::new(ImageOverlay {
                        path,
                        size_ratio: config.size_ratio,
                        anchor,
                        margin: config.margin,
                        opacity,
                    }),
                })
            }
            "text" => {
                let text = match &config.text {
                    Some(t) if !t.is_empty() => t.clone(),
                    _ => {
                        warn!("Text watermark enabled without text, disabling watermark");
                        return None;
                    }
                };
                let color = parse_hex_color(&config.color).unwrap_or_else(|| {
                    warn!(color = %config.color, "Unparseable watermark color, using white");
                    Color {
                        r: 255,
                        g: 255,
                        b: 255,
                    }
                });
                Some(Watermark {
                    overlay: Box::new(TextOverlay {
                        text,
                        font_family: config.font_family.clone(),
                        font_size: config.font_size,
                        color,
                        anchor,
                        margin: config.margin,
                        opacity,
                        rotation: config.rotation,
                    }),
                })
            }
            other => {
                warn!(kind = other, "Unknown watermark type, disabling watermark");
                None
            }
        }
    }

    /// Composite the watermark onto an image.
    ///
    /// The boolean reports whether a mark was actually applied; an overlay
    /// that could not be built (missing file) passes the image through.
    pub fn apply(&self, img: DynamicImage) -> Result<(DynamicImage, bool), WatermarkError> {
        let layer = match self.overlay.build(img.width(), img.height())? {
            Some(layer) => layer,
            None => return Ok((img, false)),
        };

        let mut base = img.to_rgba8();
        blend_layer(&mut base, &layer);
        Ok((DynamicImage::ImageRgba8(base), true))
    }
}
