//! Metadata policy
//!
//! Re-encoding drops container metadata by itself, so the default strip
//! policy needs no work here. Preservation pulls the raw EXIF block out of
//! the source container and re-injects it into the encoded output for the
//! container formats that can carry it (JPEG, PNG, WebP).

use img_parts::{Bytes, DynImage, ImageEXIF};

use crate::format::OutputFormat;

/// Extract the raw EXIF block from the source container, if any.
pub fn extract_exif(data: &[u8]) -> Option<Bytes> {
    match DynImage::from_bytes(Bytes::copy_from_slice(data)) {
        Ok(Some(img)) => img.exif(),
        _ => None,
    }
}

/// Re-inject an EXIF block into freshly encoded output.
///
/// The Orientation tag is reset to upright first: the pixels were already
/// reoriented, so carrying the source tag through would make viewers rotate
/// the image a second time. Returns the input unchanged when the output
/// container cannot carry EXIF (AVIF, TIFF via this writer) or cannot be
/// re-parsed.
pub fn inject_exif(encoded: Vec<u8>, format: OutputFormat, exif: Bytes) -> Vec<u8> {
    let exif = reset_orientation(exif);
    match format {
        OutputFormat::Jpeg | OutputFormat::Png | OutputFormat::WebP => {}
        OutputFormat::Avif | OutputFormat::Tiff => {
            tracing::debug!(
                format = format.as_str(),
                "Output container cannot carry EXIF, metadata dropped"
            );
            return encoded;
        }
    }

    match DynImage::from_bytes(Bytes::from(encoded.clone())) {
        Ok(Some(mut img)) => {
            img.set_exif(Some(exif));
            img.encoder().bytes().to_vec()
        }
        _ => {
            tracing::debug!(
                format = format.as_str(),
                "Could not re-parse encoded output, metadata dropped"
            );
            encoded
        }
    }
}

/// Rewrite the IFD0 Orientation entry of a raw EXIF/TIFF block to 1.
///
/// A block that is too short, has an unknown byte order, or carries no
/// Orientation entry passes through unchanged.
pub fn reset_orientation(exif: Bytes) -> Bytes {
    let mut data = exif.to_vec();
    if data.len() < 8 {
        return exif;
    }

    let little_endian = match &data[0..4] {
        [0x49, 0x49, 0x2A, 0x00] => true,
        [0x4D, 0x4D, 0x00, 0x2A] => false,
        _ => return exif,
    };

    let ifd0 = read_u32(&data, 4, little_endian) as usize;
    let Some(entry_count) = try_read_u16(&data, ifd0, little_endian) else {
        return exif;
    };

    for i in 0..entry_count as usize {
        let entry = ifd0 + 2 + i * 12;
        let Some(tag) = try_read_u16(&data, entry, little_endian) else {
            return exif;
        };
        if tag == 0x0112 {
            // SHORT value is stored inline in the entry's value field
            let value = entry + 8;
            if value + 2 <= data.len() {
                let upright: [u8; 2] = if little_endian {
                    1u16.to_le_bytes()
                } else {
                    1u16.to_be_bytes()
                };
                data[value] = upright[0];
                data[value + 1] = upright[1];
                return Bytes::from(data);
            }
            return exif;
        }
    }

    exif
}

fn read_u32(data: &[u8], offset: usize, little_endian: bool) -> u32 {
    let bytes = [
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ];
    if little_endian {
        u32::from_le_bytes(bytes)
    } else {
        u32::from_be_bytes(bytes)
    }
}

fn try_read_u16(data: &[u8], offset: usize, little_endian: bool) -> Option<u16> {
    let bytes = [*data.get(offset)?, *data.get(offset + 1)?];
    Some(if little_endian {
        u16::from_le_bytes(bytes)
    } else {
        u16::from_be_bytes(bytes)
    })
}
