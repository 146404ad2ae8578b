//! Resize execution
//!
//! Fit-mode target math plus Lanczos3 resampling via fast-image-resize.
//! Resizing never enlarges: a target box bigger than the source clamps to
//! source size, and aspect ratio is preserved for every mode except `Fill`.

use std::num::NonZeroU32;
use std::str::FromStr;

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::DynamicImage;

use crate::error::PipelineError;

/// How to map the image into the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Scale to cover the box, center-cropping the excess
    Cover,
    /// Scale to fit within the box, preserving aspect ratio
    Contain,
    /// Stretch to the exact box (may distort)
    Fill,
    /// Scale down to fit within the box (default)
    #[default]
    Inside,
    /// Scale so the box is covered, without cropping
    Outside,
}

impl FromStr for FitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cover" => Ok(FitMode::Cover),
            "contain" => Ok(FitMode::Contain),
            "fill" => Ok(FitMode::Fill),
            "inside" => Ok(FitMode::Inside),
            "outside" => Ok(FitMode::Outside),
            _ => Err(format!("unknown fit mode: {}", s)),
        }
    }
}

/// Resolved resize geometry: scaled dimensions plus an optional center crop
/// (used by `Cover`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeTarget {
    pub width: u32,
    pub height: u32,
    pub crop: Option<(u32, u32, u32, u32)>,
}

impl ResizeTarget {
    fn plain(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            crop: None,
        }
    }

    /// Dimensions after scaling and cropping.
    pub fn final_dims(&self) -> (u32, u32) {
        match self.crop {
            Some((_, _, w, h)) => (w, h),
            None => (self.width, self.height),
        }
    }
}

/// Compute the resize geometry for one image.
///
/// `width`/`height` describe the target box; either may be unset. The
/// scale factor is clamped to 1.0 so the result never exceeds the source
/// on either axis, for any fit mode.
pub fn compute_target(
    src_w: u32,
    src_h: u32,
    width: Option<u32>,
    height: Option<u32>,
    fit: FitMode,
) -> ResizeTarget {
    let (src_w, src_h) = (src_w.max(1), src_h.max(1));

    if width.is_none() && height.is_none() {
        return ResizeTarget::plain(src_w, src_h);
    }

    if fit == FitMode::Fill {
        return ResizeTarget::plain(
            width.unwrap_or(src_w).clamp(1, src_w),
            height.unwrap_or(src_h).clamp(1, src_h),
        );
    }

    let w_ratio = width.map(|w| w as f64 / src_w as f64);
    let h_ratio = height.map(|h| h as f64 / src_h as f64);

    let scale = match (w_ratio, h_ratio) {
        (Some(w), Some(h)) => match fit {
            FitMode::Cover | FitMode::Outside => w.max(h),
            _ => w.min(h),
        },
        (Some(w), None) => w,
        (None, Some(h)) => h,
        (None, None) => unreachable!(),
    };
    let scale = scale.min(1.0);

    let scaled_w = ((src_w as f64 * scale).round() as u32).max(1);
    let scaled_h = ((src_h as f64 * scale).round() as u32).max(1);

    if fit == FitMode::Cover {
        // Center-crop the covering scale down to the box.
        let crop_w = width.unwrap_or(scaled_w).min(scaled_w);
        let crop_h = height.unwrap_or(scaled_h).min(scaled_h);
        if crop_w != scaled_w || crop_h != scaled_h {
            let x = (scaled_w - crop_w) / 2;
            let y = (scaled_h - crop_h) / 2;
            return ResizeTarget {
                width: scaled_w,
                height: scaled_h,
                crop: Some((x, y, crop_w, crop_h)),
            };
        }
    }

    ResizeTarget::plain(scaled_w, scaled_h)
}

/// Apply a planned resize step to an image.
pub fn apply_resize(
    img: DynamicImage,
    width: Option<u32>,
    height: Option<u32>,
    fit: FitMode,
) -> Result<DynamicImage, PipelineError> {
    let target = compute_target(img.width(), img.height(), width, height, fit);

    let mut resized = if target.width == img.width() && target.height == img.height() {
        img
    } else {
        resample(&img, target.width, target.height)?
    };

    if let Some((x, y, w, h)) = target.crop {
        resized = resized.crop_imm(x, y, w, h);
    }

    Ok(resized)
}

/// Resample using fast-image-resize with the Lanczos3 filter.
pub(crate) fn resample(img: &DynamicImage, target_w: u32, target_h: u32) -> Result<DynamicImage, PipelineError> {
    let src_width = NonZeroU32::new(img.width())
        .ok_or_else(|| PipelineError::resize_failed("Source width is 0"))?;
    let src_height = NonZeroU32::new(img.height())
        .ok_or_else(|| PipelineError::resize_failed("Source height is 0"))?;
    let dst_width = NonZeroU32::new(target_w)
        .ok_or_else(|| PipelineError::resize_failed("Target width is 0"))?;
    let dst_height = NonZeroU32::new(target_h)
        .ok_or_else(|| PipelineError::resize_failed("Target height is 0"))?;

    let src_image = Image::from_vec_u8(
        src_width,
        src_height,
        img.to_rgba8().into_raw(),
        PixelType::U8x4,
    )
    .map_err(|e| PipelineError::resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));

    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| PipelineError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    let rgba_image = image::RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| PipelineError::resize_failed("Failed to create output image buffer"))?;

    Ok(DynamicImage::ImageRgba8(rgba_image))
}
