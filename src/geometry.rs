use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle. `x`/`y` is the top-left corner; the
/// rectangle covers columns `x..x + width` and rows `y..y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        BoundingBox {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box from inclusive pixel extents.
    pub fn from_extents(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True when the interiors share at least one pixel.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Gap distance between two boxes.
    ///
    /// Per axis, the gap is zero when the projections overlap or touch and
    /// the number of pixels between them otherwise. The distance is the larger
    /// of the two axis gaps, so boxes stacked vertically with full horizontal
    /// overlap are as close as their vertical gap.
    pub fn gap_distance(&self, other: &BoundingBox) -> u32 {
        let gap_x = axis_gap(self.x, self.right(), other.x, other.right());
        let gap_y = axis_gap(self.y, self.bottom(), other.y, other.bottom());
        gap_x.max(gap_y)
    }

    /// Grows the box by `margin` on every side, clamped to `[0, width) x [0, height)`.
    pub fn expand_clamped(&self, margin: u32, bound_width: u32, bound_height: u32) -> BoundingBox {
        let x = self.x.saturating_sub(margin);
        let y = self.y.saturating_sub(margin);
        let right = self.right().saturating_add(margin).min(bound_width);
        let bottom = self.bottom().saturating_add(margin).min(bound_height);
        BoundingBox::new(
            x.min(right),
            y.min(bottom),
            right.saturating_sub(x),
            bottom.saturating_sub(y),
        )
    }
}

fn axis_gap(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> u32 {
    if b_start >= a_end {
        b_start - a_end
    } else if a_start >= b_end {
        a_start - b_end
    } else {
        0
    }
}
