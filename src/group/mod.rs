// Raw detections -> proximity graph -> connected components -> GroupedExtract

pub mod union_find;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::color::ColorClass;
use crate::detect::RawDetection;
use crate::geometry::BoundingBox;
use union_find::UnionFind;

/// Grouping parameters for one color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingParams {
    /// Maximum gap distance (pixels) at which two detections join one group.
    pub proximity_threshold: u32,
    /// Margin (pixels) added around each group's union box.
    pub padding: u32,
}

/// A cluster of raw detections of one color class, unioned into one box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedExtract {
    pub page_index: u32,
    pub color_class: ColorClass,
    /// Union of member boxes, padded and clamped to the page.
    pub bounding_box: BoundingBox,
    pub member_count: usize,
    /// Reading-order ordinal within the page and color class, starting at 0.
    pub sequence_index: usize,
}

/// Merges detections that lie within `proximity_threshold` of each other.
///
/// Detections are expected to come from one page and one color class;
/// detections of different classes or pages are never joined. Two
/// detections are linked when their gap distance is at or below the
/// threshold, so overlapping or touching boxes always merge. Every
/// connected component of that graph becomes one [`GroupedExtract`]; a
/// detection with no neighbour is a singleton group.
///
/// The result is sorted in reading order (top, then left) and
/// `sequence_index` follows that order.
pub fn group(
    detections: &[RawDetection],
    page_width: u32,
    page_height: u32,
    params: &GroupingParams,
) -> Vec<GroupedExtract> {
    if detections.is_empty() {
        return Vec::new();
    }

    let mut uf = UnionFind::new(detections.len());

    // Sweep in order of left edge: once a candidate starts further right than
    // the threshold allows, no later candidate can link either.
    let mut order: Vec<usize> = (0..detections.len()).collect();
    order.sort_by_key(|&i| (detections[i].bounding_box.x, i));

    for (pos, &i) in order.iter().enumerate() {
        let a = &detections[i];
        let reach = a
            .bounding_box
            .right()
            .saturating_add(params.proximity_threshold);
        for &j in &order[pos + 1..] {
            let b = &detections[j];
            if b.bounding_box.x > reach {
                break;
            }
            if a.page_index != b.page_index || a.color_class != b.color_class {
                continue;
            }
            if a.bounding_box.gap_distance(&b.bounding_box) <= params.proximity_threshold {
                uf.union(i, j);
            }
        }
    }

    // root -> (union box, member count), keyed by first member index for stable output
    let mut components: BTreeMap<usize, (usize, BoundingBox, usize)> = BTreeMap::new();
    for (i, det) in detections.iter().enumerate() {
        let root = uf.find(i);
        components
            .entry(root)
            .and_modify(|(_, bbox, count)| {
                *bbox = bbox.union(&det.bounding_box);
                *count += 1;
            })
            .or_insert((i, det.bounding_box, 1));
    }

    let mut extracts: Vec<GroupedExtract> = components
        .into_values()
        .map(|(first, union_box, member_count)| {
            let first = &detections[first];
            GroupedExtract {
                page_index: first.page_index,
                color_class: first.color_class,
                bounding_box: union_box.expand_clamped(params.padding, page_width, page_height),
                member_count,
                sequence_index: 0,
            }
        })
        .collect();

    sort_reading_order(&mut extracts);
    extracts
}

/// Sorts extracts top-to-bottom then left-to-right and renumbers
/// `sequence_index` per page and color class.
fn sort_reading_order(extracts: &mut [GroupedExtract]) {
    extracts.sort_by_key(|e| {
        (
            e.page_index,
            e.bounding_box.y,
            e.bounding_box.x,
            e.bounding_box.height,
            e.bounding_box.width,
            e.color_class,
        )
    });

    let mut counters: BTreeMap<(u32, ColorClass), usize> = BTreeMap::new();
    for extract in extracts.iter_mut() {
        let counter = counters
            .entry((extract.page_index, extract.color_class))
            .or_insert(0);
        extract.sequence_index = *counter;
        *counter += 1;
    }
}

/// Fraction by which grouping shrinks the raw-detection count.
///
/// Defined as 0.0 when there were no raw detections.
pub fn reduction_ratio(raw: usize, grouped: usize) -> f64 {
    if raw == 0 {
        0.0
    } else {
        1.0 - grouped as f64 / raw as f64
    }
}
