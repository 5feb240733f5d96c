// Binary mask -> connected components (8-connectivity) -> RawDetection

use std::collections::BTreeMap;

use image::Luma;
use imageproc::region_labelling::{Connectivity, connected_components};
use serde::{Deserialize, Serialize};

use super::mask::BinaryMask;
use crate::config::color::ColorClass;
use crate::geometry::BoundingBox;

/// One connected blob of matching pixels on one page for one color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDetection {
    pub page_index: u32,
    pub color_class: ColorClass,
    pub bounding_box: BoundingBox,
    /// Number of set mask pixels in the component (always > 0).
    pub pixel_area: u64,
}

/// Running extents of one labelled component.
struct Extents {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    count: u64,
}

/// Labels 8-connected components of `mask` and returns those whose pixel
/// area reaches `min_area`.
///
/// Output order is raster order of each component's first pixel; callers
/// must not rely on it.
pub fn find_regions(
    mask: &BinaryMask,
    page_index: u32,
    color_class: ColorClass,
    min_area: u32,
) -> Vec<RawDetection> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    let labelled = connected_components(mask.as_image(), Connectivity::Eight, Luma([0u8]));

    let mut regions: BTreeMap<u32, Extents> = BTreeMap::new();
    for (x, y, label) in labelled.enumerate_pixels() {
        let label = label[0];
        if label == 0 {
            continue;
        }
        regions
            .entry(label)
            .and_modify(|e| {
                e.min_x = e.min_x.min(x);
                e.min_y = e.min_y.min(y);
                e.max_x = e.max_x.max(x);
                e.max_y = e.max_y.max(y);
                e.count += 1;
            })
            .or_insert(Extents {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                count: 1,
            });
    }

    regions
        .into_values()
        .filter(|e| e.count >= u64::from(min_area.max(1)))
        .map(|e| RawDetection {
            page_index,
            color_class,
            bounding_box: BoundingBox::from_extents(e.min_x, e.min_y, e.max_x, e.max_y),
            pixel_area: e.count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(mask: &mut BinaryMask, bbox: BoundingBox) {
        for y in bbox.y..bbox.bottom() {
            for x in bbox.x..bbox.right() {
                mask.set(x, y, true);
            }
        }
    }

    #[test]
    fn test_diagonal_pixels_are_one_component() {
        let mut mask = BinaryMask::empty(5, 5);
        for i in 0..5 {
            mask.set(i, i, true);
        }
        let regions = find_regions(&mask, 0, ColorClass::Mark, 1);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(0, 0, 5, 5));
        assert_eq!(regions[0].pixel_area, 5);
    }

    #[test]
    fn test_separate_blobs_and_area_filter() {
        let mut mask = BinaryMask::empty(40, 40);
        fill(&mut mask, BoundingBox::new(1, 1, 10, 3));
        fill(&mut mask, BoundingBox::new(20, 20, 2, 2));

        let regions = find_regions(&mask, 3, ColorClass::Highlight, 20);
        assert_eq!(regions.len(), 1, "4px blob is below min area");
        assert_eq!(regions[0].bounding_box, BoundingBox::new(1, 1, 10, 3));
        assert_eq!(regions[0].page_index, 3);
        assert_eq!(regions[0].pixel_area, 30);
    }

    #[test]
    fn test_empty_mask_has_no_regions() {
        assert!(find_regions(&BinaryMask::empty(8, 8), 0, ColorClass::Mark, 1).is_empty());
        assert!(find_regions(&BinaryMask::empty(0, 0), 0, ColorClass::Mark, 1).is_empty());
    }
}
