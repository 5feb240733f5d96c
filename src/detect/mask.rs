// Color class -> binary mask (HSV range test per pixel)

use image::{GrayImage, Luma};

use super::pixel::{PixelBuffer, rgb_to_hsv};
use crate::config::color::HsvRange;

/// Foreground value stored in the mask image.
pub const MASK_ON: u8 = 255;

/// One bit per page pixel, backed by an 8-bit gray image (0 / 255).
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    image: GrayImage,
}

impl BinaryMask {
    /// An all-false mask of the given size.
    pub fn empty(width: u32, height: u32) -> Self {
        BinaryMask {
            image: GrayImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] != 0
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        let value = if on { MASK_ON } else { 0 };
        self.image.put_pixel(x, y, Luma([value]));
    }

    /// Number of set pixels.
    pub fn count(&self) -> u64 {
        self.image.as_raw().iter().filter(|&&p| p != 0).count() as u64
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}

/// Marks every pixel whose HSV value falls inside `range`.
///
/// Pure: the result depends only on the pixels and the range. A zero-area
/// buffer yields a zero-area mask.
pub fn detect(pixels: &PixelBuffer<'_>, range: &HsvRange) -> BinaryMask {
    let (width, height) = (pixels.width(), pixels.height());
    let mut mask = BinaryMask::empty(width, height);
    if pixels.is_empty() {
        return mask;
    }

    for y in 0..height {
        for x in 0..width {
            if range.contains(rgb_to_hsv(pixels.rgb(x, y))) {
                mask.set(x, y, true);
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_buffer(width: u32, height: u32, fill: [u8; 3]) -> Vec<u8> {
        fill.repeat((width * height) as usize)
    }

    #[test]
    fn test_detect_yellow_on_white() {
        let mut data = rgb_buffer(4, 4, [255, 255, 255]);
        // pixel (1, 2) is yellow
        let offset = (2 * 4 + 1) * 3;
        data[offset..offset + 3].copy_from_slice(&[250, 230, 40]);

        let pixels = PixelBuffer::new(4, 4, 3, &data).unwrap();
        let mask = detect(&pixels, &HsvRange::yellow_highlighter());

        assert_eq!(mask.count(), 1);
        assert!(mask.get(1, 2));
    }

    #[test]
    fn test_detect_zero_area_is_empty_mask() {
        let pixels = PixelBuffer::new(0, 0, 3, &[]).unwrap();
        let mask = detect(&pixels, &HsvRange::red_marker());
        assert_eq!((mask.width(), mask.height()), (0, 0));
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn test_detect_ignores_alpha() {
        let data = [255u8, 0, 0, 0];
        let pixels = PixelBuffer::new(1, 1, 4, &data).unwrap();
        assert!(detect(&pixels, &HsvRange::red_marker()).get(0, 0));
    }
}
