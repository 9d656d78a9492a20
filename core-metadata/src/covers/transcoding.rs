//! Cover transcoding
//!
//! Embedded covers are often multi-megabyte scans. Before a blob is stored it
//! can be downscaled and re-encoded so the cover directory stays small.

use bytes::Bytes;
use core_runtime::config::{CoverFormat, CoverTranscoding};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::error::{MetadataError, Result};

/// File name suffix identifying how a blob was transcoded.
///
/// The same source image stored under two settings gets two blobs.
pub fn suffix(transcoding: &CoverTranscoding) -> String {
    match transcoding {
        CoverTranscoding::None => ".img".to_string(),
        CoverTranscoding::Compress {
            format,
            resolution,
            quality,
        } => format!("_{}x{}.{}", resolution, quality, format.extension()),
    }
}

/// Apply `transcoding` to raw cover bytes.
pub fn transcode(data: &[u8], transcoding: CoverTranscoding) -> Result<Bytes> {
    let CoverTranscoding::Compress {
        format,
        resolution,
        quality,
    } = transcoding
    else {
        return Ok(Bytes::copy_from_slice(data));
    };

    let img = image::load_from_memory(data)
        .map_err(|e| MetadataError::ImageError(format!("Failed to load image: {}", e)))?;
    let img = fit(img, resolution);

    let mut buffer = Vec::new();
    match format {
        CoverFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            rgb.write_with_encoder(encoder)
        }
        CoverFormat::Png => img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png),
    }
    .map_err(|e| MetadataError::ImageError(format!("Failed to encode image: {}", e)))?;

    Ok(Bytes::from(buffer))
}

/// Downscale so neither side exceeds `resolution`, keeping the aspect ratio.
/// Smaller images are left alone.
fn fit(img: DynamicImage, resolution: u32) -> DynamicImage {
    if img.width() <= resolution && img.height() <= resolution {
        return img;
    }
    img.resize(resolution, resolution, image::imageops::FilterType::Lanczos3)
}
