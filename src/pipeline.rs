//! Per-file pipeline execution: decode, transform, composite, encode, write.

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgba, RgbaImage};
use tracing::debug;

use crate::config::Config;
use crate::encoder::{EncodeOptions, EncoderFactory};
use crate::error::PipelineError;
use crate::format::{resolve_output_format, FormatSelector, OutputFormat};
use crate::metadata::{extract_exif, inject_exif};
use crate::orientation::auto_orient;
use crate::planner::{plan_transforms, SourceMeta, TransformStep};
use crate::resize::apply_resize;
use crate::watermark::{rasterize_svg_data, Watermark};

/// Outcome of one successfully processed file, for reporting.
#[derive(Debug)]
pub struct ProcessedFile {
    pub output_path: PathBuf,
    pub output_format: OutputFormat,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub width: u32,
    pub height: u32,
    pub watermarked: bool,
}

/// Run the full pipeline for a single source file, writing the result into
/// `output_dir` as `<stem>.<extension>` for the resolved output format.
/// An existing file at that path is overwritten.
pub fn process_file(
    config: &Config,
    watermark: Option<&Watermark>,
    input_path: &Path,
    output_dir: &Path,
) -> Result<ProcessedFile, PipelineError> {
    let data = std::fs::read(input_path)?;
    let bytes_in = data.len() as u64;

    let source_ext = input_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let mut img = decode_source(&data, &source_ext)?;

    let source = SourceMeta {
        width: img.width(),
        height: img.height(),
        has_alpha: img.color().has_alpha(),
    };

    let selector = FormatSelector::parse(&config.format);
    let output_format = resolve_output_format(selector, &source_ext, source.has_alpha);

    let plan = plan_transforms(config, &source, output_format);
    debug!(
        input = %input_path.display(),
        format = output_format.as_str(),
        steps = plan.steps().len(),
        "Planned transforms"
    );

    // The watermark composites between the metadata step and any alpha
    // flatten, so the mark's own transparency survives until the final
    // composite is flattened.
    let mut keep_metadata = false;
    let mut flatten: Option<[u8; 3]> = None;

    for step in plan.steps() {
        match step {
            TransformStep::Reorient => {
                img = auto_orient(img, &data);
            }
            TransformStep::Resize { width, height, fit } => {
                img = apply_resize(img, *width, *height, *fit)?;
            }
            TransformStep::Sharpen => {
                img = sharpen(img);
            }
            TransformStep::MetadataPolicy { strip } => {
                keep_metadata = !strip;
            }
            TransformStep::FlattenAlpha { background } => {
                flatten = Some(*background);
            }
        }
    }

    let mut watermarked = false;
    if let Some(wm) = watermark {
        let (marked, applied) = wm.apply(img)?;
        img = marked;
        watermarked = applied;
    }

    if let Some(background) = flatten {
        img = flatten_alpha(img, background);
    }

    let (width, height) = (img.width(), img.height());
    let rgba = img.to_rgba8();

    let options = EncodeOptions::new(output_format, config.quality);
    let encoder = EncoderFactory::create(options.format);
    let mut encoded = encoder.encode(rgba.as_raw(), width, height, options.quality)?;

    if keep_metadata {
        if let Some(exif) = extract_exif(&data) {
            encoded = inject_exif(encoded, output_format, exif);
        }
    }

    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let output_path = output_dir.join(format!("{}.{}", stem, output_format.extension()));

    let bytes_out = encoded.len() as u64;
    std::fs::write(&output_path, &encoded)?;

    Ok(ProcessedFile {
        output_path,
        output_format,
        bytes_in,
        bytes_out,
        width,
        height,
        watermarked,
    })
}

/// Decode source bytes into pixels. SVG sources rasterize at their declared
/// document size; everything else goes through the image crate's sniffing
/// decoder.
fn decode_source(data: &[u8], source_ext: &str) -> Result<DynamicImage, PipelineError> {
    if source_ext == "svg" {
        let rgba = rasterize_svg_data(data)
            .map_err(|e| PipelineError::decode_failed(e.to_string()))?;
        return Ok(DynamicImage::ImageRgba8(rgba));
    }

    image::load_from_memory(data).map_err(|e| PipelineError::decode_failed(e.to_string()))
}

/// Composite an image with alpha onto an opaque background color.
fn flatten_alpha(img: DynamicImage, background: [u8; 3]) -> DynamicImage {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut flattened = RgbaImage::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel[3] as f32 / 255.0;
        let blend = |fg: u8, bg: u8| -> u8 {
            (fg as f32 * alpha + bg as f32 * (1.0 - alpha)).round() as u8
        };
        flattened.put_pixel(
            x,
            y,
            Rgba([
                blend(pixel[0], background[0]),
                blend(pixel[1], background[1]),
                blend(pixel[2], background[2]),
                255,
            ]),
        );
    }

    DynamicImage::ImageRgba8(flattened)
}

/// Mild edge enhancement with a 3x3 kernel (4-neighborhood, weights sum
/// to 1 so flat regions are unchanged). Alpha passes through untouched.
fn sharpen(img: DynamicImage) -> DynamicImage {
    const INTENSITY: f32 = 0.5;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut sharpened = RgbaImage::new(width, height);

    let center = 1.0 + INTENSITY * 4.0;
    let edge = -INTENSITY;

    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f32; 3];

            for (dx, dy, weight) in [
                (0i32, 0i32, center),
                (-1, 0, edge),
                (1, 0, edge),
                (0, -1, edge),
                (0, 1, edge),
            ] {
                let nx = (x as i32 + dx).clamp(0, width as i32 - 1) as u32;
                let ny = (y as i32 + dy).clamp(0, height as i32 - 1) as u32;
                let pixel = rgba.get_pixel(nx, ny);
                for c in 0..3 {
                    acc[c] += pixel[c] as f32 * weight;
                }
            }

            let alpha = rgba.get_pixel(x, y)[3];
            sharpened.put_pixel(
                x,
                y,
                Rgba([
                    acc[0].clamp(0.0, 255.0) as u8,
                    acc[1].clamp(0.0, 255.0) as u8,
                    acc[2].clamp(0.0, 255.0) as u8,
                    alpha,
                ]),
            );
        }
    }

    DynamicImage::ImageRgba8(sharpened)
}
