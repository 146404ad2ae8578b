//! EXIF orientation normalization
//!
//! Reads the source's embedded orientation tag and rewrites the pixels so
//! all downstream geometry works in upright pixel space.

use image::{imageops, DynamicImage};
use std::io::Cursor;

/// Read the EXIF orientation tag (1-8) from the raw source bytes.
///
/// Returns 1 (upright) when the container has no EXIF block or no
/// orientation field; malformed EXIF is treated the same way.
pub fn read_exif_orientation(data: &[u8]) -> u8 {
    let exifreader = exif::Reader::new();
    let parsed = match exifreader.read_from_container(&mut Cursor::new(data)) {
        Ok(parsed) => parsed,
        Err(_) => return 1,
    };

    parsed
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(|v| v as u8)
        .unwrap_or(1)
}

/// Decompose an orientation value into (rotation degrees, flip-h, flip-v),
/// with the flips applied after the rotation: 5 (transpose) is
/// rotate90 + flip-h, 7 (transverse) is rotate270 + flip-h.
///
/// Values outside 1-8 are treated as upright.
pub fn orientation_transforms(orientation: u8) -> (Option<u16>, bool, bool) {
    match orientation {
        2 => (None, true, false),
        3 => (Some(180), false, false),
        4 => (None, false, true),
        5 => (Some(90), true, false),
        6 => (Some(90), false, false),
        7 => (Some(270), true, false),
        8 => (Some(270), false, false),
        _ => (None, false, false),
    }
}

/// Apply the orientation correction implied by the source bytes.
pub fn auto_orient(img: DynamicImage, data: &[u8]) -> DynamicImage {
    let orientation = read_exif_orientation(data);
    if orientation == 1 {
        return img;
    }

    let (rotate, flip_h, flip_v) = orientation_transforms(orientation);
    tracing::debug!(
        orientation = orientation,
        rotate = ?rotate,
        flip_horizontal = flip_h,
        flip_vertical = flip_v,
        "Applying EXIF orientation"
    );

    let mut img = match rotate {
        Some(90) => DynamicImage::ImageRgba8(imageops::rotate90(&img.to_rgba8())),
        Some(180) => DynamicImage::ImageRgba8(imageops::rotate180(&img.to_rgba8())),
        Some(270) => DynamicImage::ImageRgba8(imageops::rotate270(&img.to_rgba8())),
        _ => img,
    };

    if flip_h {
        img = DynamicImage::ImageRgba8(imageops::flip_horizontal(&img.to_rgba8()));
    }
    if flip_v {
        img = DynamicImage::ImageRgba8(imageops::flip_vertical(&img.to_rgba8()));
    }

    img
}
