//! Text watermarks rendered through SVG.
//!
//! The text is synthesized as an SVG `<text>` element covering the full base
//! canvas and rasterized with `resvg`, which handles font selection, glyph
//! shaping and rotation in one place.

use std::sync::{Arc, OnceLock};

use image::RgbaImage;

use super::compositor::OverlayLayer;
use super::error::WatermarkError;
use super::overlay::Overlay;
use super::position::{AxisClass, Anchor};

/// An RGB color used for text fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Parse a `#RGB` or `#RRGGBB` hex color string.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.strip_prefix('#')?;
    match s.len() {
        3 => {
            let r = u8::from_str_radix(&s[0..1], 16).ok()?;
            let g = u8::from_str_radix(&s[1..2], 16).ok()?;
            let b = u8::from_str_radix(&s[2..3], 16).ok()?;
            Some(Color {
                r: r * 17,
                g: g * 17,
                b: b * 17,
            })
        }
        6 => {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color { r, g, b })
        }
        _ => None,
    }
}

/// Escape text for embedding in SVG markup.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn shared_fontdb() -> Arc<usvg::fontdb::Database> {
    static FONTDB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTDB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}

/// Parse SVG bytes and rasterize them at the document's declared size.
///
/// Returns straight (non-premultiplied) RGBA pixels. Also used for SVG
/// source files entering the pipeline.
pub fn rasterize_svg_data(data: &[u8]) -> Result<RgbaImage, WatermarkError> {
    let mut opts = usvg::Options::default();
    opts.fontdb = shared_fontdb();

    let tree = usvg::Tree::from_data(data, &opts)
        .map_err(|e| WatermarkError::RenderError(format!("SVG parse failed: {e}")))?;

    let size = tree.size();
    let width = (size.width().ceil() as u32).max(1);
    let height = (size.height().ceil() as u32).max(1);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| WatermarkError::RenderError("Failed to allocate SVG pixmap".into()))?;

    resvg::render(&tree, resvg::tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    // The pixmap is premultiplied RGBA8; convert back to straight alpha
    // before compositing.
    let mut rgba = RgbaImage::new(width, height);
    for (pixel, out) in pixmap.pixels().iter().zip(rgba.pixels_mut()) {
        let c = pixel.demultiply();
        *out = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }

    Ok(rgba)
}

/// A text watermark anchored within the base image.
pub struct TextOverlay {
    pub text: String,
    pub font_family: String,
    pub font_size: Option<u32>,
    pub color: Color,
    pub anchor: Anchor,
    pub margin: u32,
    pub opacity: f32,
    pub rotation: f32,
}

impl TextOverlay {
    /// Font size in pixels: explicit if configured, otherwise 2% of the base
    /// width with a floor of 16px so small images stay legible.
    fn effective_font_size(&self, base_width: u32) -> u32 {
        self.font_size
            .unwrap_or_else(|| ((base_width as f32 * 0.02).round() as u32).max(16))
    }

    /// Build the full-canvas SVG document holding the positioned text.
    pub(crate) fn svg_markup(&self, base_width: u32, base_height: u32) -> String {
        let font_size = self.effective_font_size(base_width);
        let (h_class, v_class) = self.anchor.classes();

        let (x, text_anchor) = match h_class {
            AxisClass::Start => (self.margin as f32, "start"),
            AxisClass::Center => (base_width as f32 / 2.0, "middle"),
            AxisClass::End => ((base_width - self.margin.min(base_width)) as f32, "end"),
        };
        let (y, baseline) = match v_class {
            AxisClass::Start => ((self.margin + font_size) as f32, "hanging"),
            AxisClass::Center => (base_height as f32 / 2.0, "middle"),
            AxisClass::End => ((base_height - self.margin.min(base_height)) as f32, "alphabetic"),
        };

        let transform = if self.rotation.abs() > f32::EPSILON {
            format!(" transform=\"rotate({} {} {})\"", self.rotation, x, y)
        } else {
            String::new()
        };

        format!(
            concat!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\">",
                "<text x=\"{x}\" y=\"{y}\" font-family=\"{family}\" font-size=\"{size}\" ",
                "fill=\"rgb({r},{g},{b})\" fill-opacity=\"{opacity}\" ",
                "text-anchor=\"{anchor}\" dominant-baseline=\"{baseline}\"{transform}>",
                "{text}</text></svg>"
            ),
            w = base_width,
            h = base_height,
            x = x,
            y = y,
            family = escape_markup(&self.font_family),
            size = font_size,
            r = self.color.r,
            g = self.color.g,
            b = self.color.b,
            opacity = self.opacity.clamp(0.0, 1.0),
            anchor = text_anchor,
            baseline = baseline,
            transform = transform,
            text = escape_markup(&self.text),
        )
    }
}

impl Overlay for TextOverlay {
    fn build(
        &self,
        base_width: u32,
        base_height: u32,
    ) -> Result<Option<OverlayLayer>, WatermarkError> {
        if self.text.is_empty() {
            return Ok(None);
        }

        let markup = self.svg_markup(base_width, base_height);
        // fill-opacity in the markup already carries the configured opacity;
        // running apply_opacity here would square it.
        let rgba = rasterize_svg_data(markup.as_bytes())?;

        Ok(Some(OverlayLayer {
            image: rgba,
            x: 0,
            y: 0,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(text: &str) -> TextOverlay {
        TextOverlay {
            text: text.to_string(),
            font_family: "sans-serif".to_string(),
            font_size: Some(24),
            color: Color { r: 255, g: 255, b: 255 },
            anchor: Anchor::BottomRight,
            margin: 20,
            opacity: 0.5,
            rotation: 0.0,
        }
    }

    #[test]
    fn test_parse_hex_color_six_digits() {
        assert_eq!(
            parse_hex_color("#ff8000"),
            Some(Color { r: 255, g: 128, b: 0 })
        );
    }

    #[test]
    fn test_parse_hex_color_three_digits() {
        assert_eq!(
            parse_hex_color("#fff"),
            Some(Color { r: 255, g: 255, b: 255 })
        );
        assert_eq!(parse_hex_color("#f00"), Some(Color { r: 255, g: 0, b: 0 }));
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert_eq!(parse_hex_color("fff"), None);
        assert_eq!(parse_hex_color("#ffff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape_markup("<Foo & \"Bar\">'s"),
            "&lt;Foo &amp; &quot;Bar&quot;&gt;&apos;s"
        );
        assert_eq!(escape_markup("plain"), "plain");
    }

    #[test]
    fn test_svg_markup_escapes_text() {
        let ov = overlay("a < b & c");
        let svg = ov.svg_markup(800, 600);
        assert!(svg.contains("a &lt; b &amp; c"));
        assert!(!svg.contains("a < b"));
    }

    #[test]
    fn test_svg_markup_bottom_right_anchor() {
        let ov = overlay("hi");
        let svg = ov.svg_markup(800, 600);
        assert!(svg.contains("text-anchor=\"end\""));
        assert!(svg.contains("x=\"780\""));
        assert!(svg.contains("y=\"580\""));
        assert!(!svg.contains("transform="));
    }

    #[test]
    fn test_svg_markup_center_anchor() {
        let mut ov = overlay("hi");
        ov.anchor = Anchor::Center;
        let svg = ov.svg_markup(800, 600);
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("x=\"400\""));
        assert!(svg.contains("y=\"300\""));
    }

    #[test]
    fn test_svg_markup_rotation() {
        let mut ov = overlay("hi");
        ov.rotation = -30.0;
        let svg = ov.svg_markup(800, 600);
        assert!(svg.contains("rotate(-30 780 580)"));
    }

    #[test]
    fn test_default_font_size_scales_with_width() {
        let mut ov = overlay("hi");
        ov.font_size = None;
        assert_eq!(ov.effective_font_size(2000), 40);
        // Small images floor at 16px
        assert_eq!(ov.effective_font_size(100), 16);
    }

    #[test]
    fn test_empty_text_builds_nothing() {
        let ov = overlay("");
        assert!(ov.build(800, 600).unwrap().is_none());
    }

    #[test]
    fn test_rasterize_rejects_invalid_svg() {
        assert!(rasterize_svg_data(b"not svg at all").is_err());
    }

    #[test]
    fn test_rasterize_simple_rect() {
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\" height=\"10\">\
                    <rect width=\"10\" height=\"10\" fill=\"#ff0000\"/></svg>";
        let img = rasterize_svg_data(svg).unwrap();
        assert_eq!((img.width(), img.height()), (10, 10));
        let px = img.get_pixel(5, 5);
        assert_eq!((px[0], px[3]), (255, 255));
    }
}
