// image crate: cropped extract -> PNG / JPEG bytes

use std::io::Cursor;

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;

use crate::config::job::ArtifactFormat;
use crate::error::ExtractError;

/// Encode an RGB image in the requested format.
///
/// `quality` (0-100) drives JPEG compression; 0 is raised to 1, the lowest
/// the encoder accepts. PNG is lossless and ignores it.
pub fn encode_rgb(
    rgb: &RgbImage,
    format: ArtifactFormat,
    quality: u8,
) -> crate::error::Result<Vec<u8>> {
    if quality > 100 {
        return Err(ExtractError::render(format!(
            "quality must be 0-100, got {}",
            quality
        )));
    }

    let mut buf = Cursor::new(Vec::new());
    match format {
        ArtifactFormat::Png => {
            rgb.write_with_encoder(PngEncoder::new(&mut buf))?;
        }
        ArtifactFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.max(1));
            rgb.write_with_encoder(encoder)?;
        }
    }

    Ok(buf.into_inner())
}
