pub mod mask;
pub mod pixel;
pub mod regions;

pub use mask::{BinaryMask, detect};
pub use pixel::{PixelBuffer, rgb_to_hsv};
pub use regions::{RawDetection, find_regions};
