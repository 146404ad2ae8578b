//! Image encoder abstraction
//!
//! Trait-based encoder system with one implementation per supported output
//! format. Quality applies to the lossy formats; PNG instead encodes at the
//! maximum compression level, and JPEG goes through mozjpeg's progressive,
//! optimized-coding path.

use std::io::Cursor;

use crate::error::PipelineError;
use crate::format::OutputFormat;

/// Per-file encoding options, derived once from the resolved output format.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    pub format: OutputFormat,
    /// 1-100, meaningful for jpeg/webp/avif/tiff
    pub quality: u8,
}

impl EncodeOptions {
    pub fn new(format: OutputFormat, quality: u8) -> Self {
        Self {
            format,
            quality: quality.clamp(1, 100),
        }
    }
}

/// Trait for image encoders.
///
/// Implementations take raw RGBA pixel data (4 bytes per pixel) and produce
/// an encoded byte buffer in their target format.
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> OutputFormat;

    /// Encode raw RGBA image data to the target format
    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, PipelineError>;

    /// Check if this encoder can represent transparency
    fn supports_transparency(&self) -> bool;
}

/// JPEG encoder using mozjpeg (progressive mode, optimized coding).
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, PipelineError> {
        let rgb_data = rgba_to_rgb(data);

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality as f32);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| PipelineError::encode_failed("jpeg", e.to_string()))?;
        comp.write_scanlines(&rgb_data)
            .map_err(|e| PipelineError::encode_failed("jpeg", e.to_string()))?;
        comp.finish()
            .map_err(|e| PipelineError::encode_failed("jpeg", e.to_string()))
    }

    fn supports_transparency(&self) -> bool {
        false
    }
}

/// PNG encoder using the image crate at maximum compression level.
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        _quality: u8,
    ) -> Result<Vec<u8>, PipelineError> {
        use image::codecs::png::{CompressionType, FilterType, PngEncoder as ImagePngEncoder};
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new_with_quality(
            &mut output,
            CompressionType::Best,
            FilterType::Adaptive,
        );

        encoder
            .write_image(data, width, height, image::ColorType::Rgba8)
            .map_err(|e| PipelineError::encode_failed("png", e.to_string()))?;

        Ok(output.into_inner())
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// WebP encoder using libwebp bindings, explicitly lossy.
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebP
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, PipelineError> {
        let encoder = webp::Encoder::from_rgba(data, width, height);
        let encoded = encoder.encode(quality as f32);
        Ok(encoded.to_vec())
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// AVIF encoder using ravif.
pub struct AvifEncoder {
    /// Speed preset (1-10, where 1 is slowest/best compression)
    pub speed: u8,
}

impl Default for AvifEncoder {
    fn default() -> Self {
        Self { speed: 6 }
    }
}

impl ImageEncoder for AvifEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Avif
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, PipelineError> {
        let pixels: Vec<rgb::RGBA8> = data
            .chunks_exact(4)
            .map(|c| rgb::RGBA8::new(c[0], c[1], c[2], c[3]))
            .collect();

        let img = ravif::Img::new(pixels.as_slice(), width as usize, height as usize);

        let encoded = ravif::Encoder::new()
            .with_quality(quality as f32)
            .with_alpha_quality(quality as f32)
            .with_speed(self.speed)
            .encode_rgba(img)
            .map_err(|e| PipelineError::encode_failed("avif", e.to_string()))?;

        Ok(encoded.avif_file)
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// TIFF encoder using the image crate (deflate compression).
///
/// The writer has no quality knob; the configured quality is accepted and
/// ignored.
pub struct TiffEncoder;

impl ImageEncoder for TiffEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Tiff
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        _quality: u8,
    ) -> Result<Vec<u8>, PipelineError> {
        use image::codecs::tiff::TiffEncoder as ImageTiffEncoder;
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageTiffEncoder::new(&mut output);

        encoder
            .write_image(data, width, height, image::ColorType::Rgba8)
            .map_err(|e| PipelineError::encode_failed("tiff", e.to_string()))?;

        Ok(output.into_inner())
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// Factory for creating encoders based on output format.
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: OutputFormat) -> Box<dyn ImageEncoder> {
        match format {
            OutputFormat::Jpeg => Box::new(JpegEncoder),
            OutputFormat::Png => Box::new(PngEncoder),
            OutputFormat::WebP => Box::new(WebPEncoder),
            OutputFormat::Avif => Box::new(AvifEncoder::default()),
            OutputFormat::Tiff => Box::new(TiffEncoder),
        }
    }
}

/// Convert RGBA to RGB by discarding the alpha channel.
fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let pixel_count = rgba.len() / 4;
    let mut rgb = Vec::with_capacity(pixel_count * 3);

    for chunk in rgba.chunks_exact(4) {
        rgb.push(chunk[0]);
        rgb.push(chunk[1]);
        rgb.push(chunk[2]);
    }

    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard_rgba() -> Vec<u8> {
        vec![
            255, 0, 0, 255, // Red
            0, 255, 0, 255, // Green
            0, 0, 255, 255, // Blue
            255, 255, 255, 255, // White
        ]
    }

    #[test]
    fn test_encode_options_clamp() {
        let opts = EncodeOptions::new(OutputFormat::Jpeg, 150);
        assert_eq!(opts.quality, 100);

        let opts = EncodeOptions::new(OutputFormat::Jpeg, 0);
        assert_eq!(opts.quality, 1);
    }

    #[test]
    fn test_factory_covers_all_formats() {
        for fmt in [
            OutputFormat::Jpeg,
            OutputFormat::Png,
            OutputFormat::WebP,
            OutputFormat::Avif,
            OutputFormat::Tiff,
        ] {
            let encoder = EncoderFactory::create(fmt);
            assert_eq!(encoder.format(), fmt);
        }
    }

    #[test]
    fn test_transparency_support() {
        assert!(!EncoderFactory::create(OutputFormat::Jpeg).supports_transparency());
        assert!(EncoderFactory::create(OutputFormat::Png).supports_transparency());
        assert!(EncoderFactory::create(OutputFormat::WebP).supports_transparency());
        assert!(EncoderFactory::create(OutputFormat::Avif).supports_transparency());
        assert!(EncoderFactory::create(OutputFormat::Tiff).supports_transparency());
    }

    #[test]
    fn test_jpeg_magic_bytes() {
        let encoded = JpegEncoder.encode(&checkerboard_rgba(), 2, 2, 80).unwrap();
        assert_eq!(&encoded[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_png_magic_bytes() {
        let encoded = PngEncoder.encode(&checkerboard_rgba(), 2, 2, 80).unwrap();
        assert_eq!(&encoded[0..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_webp_magic_bytes() {
        let encoded = WebPEncoder.encode(&checkerboard_rgba(), 2, 2, 80).unwrap();
        assert_eq!(&encoded[0..4], b"RIFF");
        assert_eq!(&encoded[8..12], b"WEBP");
    }

    #[test]
    fn test_tiff_produces_output() {
        let encoded = TiffEncoder.encode(&checkerboard_rgba(), 2, 2, 80).unwrap();
        // TIFF magic: II*\0 (little endian) or MM\0* (big endian)
        assert!(&encoded[0..2] == b"II" || &encoded[0..2] == b"MM");
    }

    #[test]
    fn test_rgba_to_rgb() {
        let rgba = vec![255, 128, 64, 255, 0, 0, 0, 128];
        assert_eq!(rgba_to_rgb(&rgba), vec![255, 128, 64, 0, 0, 0]);
    }
}
