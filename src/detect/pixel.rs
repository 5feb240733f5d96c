// Pixel buffer abstraction + RGB -> HSV conversion (8-bit scale)

use crate::error::ExtractError;

/// Borrowed raster: `width * height` pixels of `channels` interleaved bytes.
///
/// Supported layouts are gray (1), RGB (3) and RGBA (4, alpha ignored).
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    width: u32,
    height: u32,
    channels: u8,
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    pub fn new(
        width: u32,
        height: u32,
        channels: u8,
        data: &'a [u8],
    ) -> crate::error::Result<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(ExtractError::invalid_input(format!(
                "unsupported channel count {channels} (expected 1, 3 or 4)"
            )));
        }

        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|wh| wh.checked_mul(channels as usize))
            .ok_or_else(|| {
                ExtractError::invalid_input(format!(
                    "overflow computing buffer size for {width}x{height}x{channels}"
                ))
            })?;

        if data.len() != expected_len {
            return Err(ExtractError::invalid_input(format!(
                "pixel data size mismatch: expected {expected_len} bytes, got {}",
                data.len()
            )));
        }

        Ok(PixelBuffer {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGB value of the pixel at `(x, y)`. Gray pixels expand to `[g, g, g]`.
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = (y as usize * self.width as usize + x as usize) * self.channels as usize;
        match self.channels {
            1 => {
                let g = self.data[offset];
                [g, g, g]
            }
            _ => [
                self.data[offset],
                self.data[offset + 1],
                self.data[offset + 2],
            ],
        }
    }
}

/// Converts an RGB triple to HSV on the 8-bit scale used by OpenCV:
/// hue in `0..=179` (degrees / 2), saturation and value in `0..=255`.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(|c| c as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut hue_deg = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue_deg < 0.0 {
        hue_deg += 360.0;
    }

    let hue = (hue_deg / 2.0).round() as u32 % 180;
    [hue as u8, saturation.round() as u8, max as u8]
}
