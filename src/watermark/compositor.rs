//! Alpha compositing of overlay layers onto base images.

use image::{Rgba, RgbaImage};

/// A built overlay ready for compositing: raster pixels plus the top-left
/// placement on the base image. Coordinates may be negative; compositing
/// clips to the visible region.
pub struct OverlayLayer {
    pub image: RgbaImage,
    pub x: i64,
    pub y: i64,
}

impl std::fmt::Debug for OverlayLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayLayer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("position", &(self.x, self.y))
            .finish()
    }
}

/// Multiply the alpha channel by an opacity factor, channel-wise.
///
/// Pre-existing transparency in the overlay is respected multiplicatively;
/// this is not a blanket reduction of the composite.
pub fn apply_opacity(image: &mut RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    for pixel in image.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * opacity).round().clamp(0.0, 255.0) as u8;
    }
}

/// Blend an overlay layer onto the base image, clipped to the base bounds.
pub fn blend_layer(target: &mut RgbaImage, layer: &OverlayLayer) {
    let target_width = target.width() as i64;
    let target_height = target.height() as i64;

    let ov_width = layer.image.width() as i64;
    let ov_height = layer.image.height() as i64;

    let x_start = layer.x.max(0);
    let y_start = layer.y.max(0);
    let x_end = (layer.x + ov_width).min(target_width);
    let y_end = (layer.y + ov_height).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let ox = (tx - layer.x) as u32;
            let oy = (ty - layer.y) as u32;

            let ov_pixel = layer.image.get_pixel(ox, oy);
            let base_pixel = target.get_pixel(tx as u32, ty as u32);

            let blended = blend_pixels(*base_pixel, *ov_pixel);
            target.put_pixel(tx as u32, ty as u32, blended);
        }
    }
}

/// Blend two pixels with the Porter-Duff "over" operator:
/// result = foreground + background * (1 - foreground.alpha)
pub fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0) as u8,
    ])
}
