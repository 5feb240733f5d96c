// Color mask detection + connected region tests

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use markup_extract::config::color::{ColorClass, HsvRange};
use markup_extract::detect::{PixelBuffer, detect, find_regions, rgb_to_hsv};
use markup_extract::error::ExtractError;
use markup_extract::geometry::BoundingBox;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const YELLOW: Rgb<u8> = Rgb([250, 230, 40]);
const RED: Rgb<u8> = Rgb([220, 30, 30]);
const BLACK: Rgb<u8> = Rgb([20, 20, 20]);

fn blank_page(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, WHITE)
}

fn fill(img: &mut RgbImage, x: i32, y: i32, w: u32, h: u32, color: Rgb<u8>) {
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(w, h), color);
}

fn buffer(img: &RgbImage) -> PixelBuffer<'_> {
    PixelBuffer::new(img.width(), img.height(), 3, img.as_raw()).unwrap()
}

// ============================================================
// 1. HSV conversion
// ============================================================

#[test]
fn test_sample_colors_fall_in_default_ranges() {
    let yellow = rgb_to_hsv(YELLOW.0);
    let red = rgb_to_hsv(RED.0);

    assert!(HsvRange::yellow_highlighter().contains(yellow));
    assert!(!HsvRange::red_marker().contains(yellow));
    assert!(HsvRange::red_marker().contains(red));
    assert!(!HsvRange::yellow_highlighter().contains(red));

    for neutral in [WHITE.0, BLACK.0, [128, 128, 128]] {
        let hsv = rgb_to_hsv(neutral);
        assert!(!HsvRange::yellow_highlighter().contains(hsv));
        assert!(!HsvRange::red_marker().contains(hsv));
    }
}

// ============================================================
// 2. Pixel buffer validation
// ============================================================

#[test]
fn test_pixel_buffer_rejects_unsupported_channels() {
    let data = vec![0u8; 8];
    assert!(matches!(
        PixelBuffer::new(2, 2, 2, &data),
        Err(ExtractError::InvalidInput(_))
    ));
}

#[test]
fn test_rgba_and_gray_buffers_are_accepted() {
    let rgba = [250u8, 230, 40, 255];
    let px = PixelBuffer::new(1, 1, 4, &rgba).unwrap();
    assert_eq!(px.rgb(0, 0), [250, 230, 40]);

    let gray = [77u8];
    let px = PixelBuffer::new(1, 1, 1, &gray).unwrap();
    assert_eq!(px.rgb(0, 0), [77, 77, 77]);
}

// ============================================================
// 3. Mask
// ============================================================

#[test]
fn test_mask_matches_only_class_pixels() {
    let mut img = blank_page(40, 20);
    fill(&mut img, 2, 2, 10, 5, YELLOW);
    fill(&mut img, 20, 2, 6, 6, RED);
    fill(&mut img, 2, 12, 30, 3, BLACK);

    let px = buffer(&img);
    let yellow = detect(&px, &HsvRange::yellow_highlighter());
    let red = detect(&px, &HsvRange::red_marker());

    assert_eq!(yellow.width(), 40);
    assert_eq!(yellow.height(), 20);
    assert_eq!(yellow.count(), 50);
    assert!(yellow.get(2, 2));
    assert!(!yellow.get(20, 2));

    assert_eq!(red.count(), 36);
    assert!(red.get(25, 7));
}

#[test]
fn test_zero_area_page_gives_empty_mask() {
    let px = PixelBuffer::new(0, 0, 3, &[]).unwrap();
    let mask = detect(&px, &HsvRange::yellow_highlighter());
    assert_eq!(mask.count(), 0);
    assert!(find_regions(&mask, 0, ColorClass::Highlight, 1).is_empty());
}

#[test]
fn test_page_without_color_gives_no_regions() {
    let mut img = blank_page(50, 50);
    fill(&mut img, 5, 5, 40, 2, BLACK);
    let mask = detect(&buffer(&img), &HsvRange::yellow_highlighter());
    assert!(find_regions(&mask, 0, ColorClass::Highlight, 1).is_empty());
}

// ============================================================
// 4. Regions
// ============================================================

#[test]
fn test_small_blob_filtered_by_min_area() {
    // 2x2 blob (area 4) next to a 5x5 blob (area 25), min_area 20
    let mut img = blank_page(30, 30);
    fill(&mut img, 1, 1, 2, 2, YELLOW);
    fill(&mut img, 10, 10, 5, 5, YELLOW);

    let mask = detect(&buffer(&img), &HsvRange::yellow_highlighter());
    let regions = find_regions(&mask, 3, ColorClass::Highlight, 20);

    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].bounding_box, BoundingBox::new(10, 10, 5, 5));
    assert_eq!(regions[0].pixel_area, 25);
    assert_eq!(regions[0].page_index, 3);
    assert_eq!(regions[0].color_class, ColorClass::Highlight);
}

#[test]
fn test_diagonal_pixels_are_one_region() {
    let mut img = blank_page(10, 10);
    for i in 0..5 {
        img.put_pixel(i, i, YELLOW);
    }
    let mask = detect(&buffer(&img), &HsvRange::yellow_highlighter());
    let regions = find_regions(&mask, 0, ColorClass::Highlight, 1);

    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].bounding_box, BoundingBox::new(0, 0, 5, 5));
    assert_eq!(regions[0].pixel_area, 5);
}

#[test]
fn test_region_box_covers_irregular_shape() {
    // L-shape: bounding box is larger than the pixel area
    let mut img = blank_page(20, 20);
    fill(&mut img, 2, 2, 10, 2, RED);
    fill(&mut img, 2, 2, 2, 10, RED);

    let mask = detect(&buffer(&img), &HsvRange::red_marker());
    let regions = find_regions(&mask, 0, ColorClass::Mark, 1);

    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].bounding_box, BoundingBox::new(2, 2, 10, 10));
    assert_eq!(regions[0].pixel_area, 36);
    assert!(regions[0].bounding_box.area() >= regions[0].pixel_area);
}

#[test]
fn test_separate_blobs_are_separate_regions() {
    let mut img = blank_page(60, 20);
    fill(&mut img, 0, 0, 10, 10, YELLOW);
    fill(&mut img, 11, 0, 10, 10, YELLOW);
    fill(&mut img, 40, 5, 10, 10, YELLOW);

    let mask = detect(&buffer(&img), &HsvRange::yellow_highlighter());
    let mut boxes: Vec<BoundingBox> = find_regions(&mask, 0, ColorClass::Highlight, 1)
        .into_iter()
        .map(|r| r.bounding_box)
        .collect();
    boxes.sort_by_key(|b| (b.x, b.y));

    assert_eq!(
        boxes,
        vec![
            BoundingBox::new(0, 0, 10, 10),
            BoundingBox::new(11, 0, 10, 10),
            BoundingBox::new(40, 5, 10, 10),
        ]
    );
}
