// Native PDF annotations (/Annots): color class and position on the page raster

use crate::config::color::ColorClass;
use crate::geometry::BoundingBox;

/// Markup drawn over text by a PDF viewer's highlighter tools.
const TEXT_MARKUP_SUBTYPES: [&str; 4] = ["Highlight", "Squiggly", "StrikeOut", "Underline"];

/// Freehand pen strokes and typed notes.
const NOTE_SUBTYPES: [&str; 2] = ["Ink", "FreeText"];

/// PDFページ上の注釈1件。座標はPDFユーザー空間（pt、左下原点）。
#[derive(Debug, Clone, PartialEq)]
pub struct PdfAnnotation {
    /// 0-based page index.
    pub page_index: u32,
    /// `/Subtype` name, e.g. `Highlight` or `Ink`.
    pub subtype: String,
    /// `[x0, y0, x1, y1]` with `x0 <= x1` and `y0 <= y1`.
    pub rect: [f64; 4],
    /// `/C` (or `/IC`) as RGB in 0.0-1.0. Gray and CMYK are converted.
    pub color: Option<[f64; 3]>,
}

impl PdfAnnotation {
    /// 注釈の色クラスを判定する。
    ///
    /// 黄色系のテキストマークアップは Highlight、赤系の Ink / FreeText は Mark。
    /// 色を持たない注釈やそれ以外の組み合わせは `None`。
    pub fn color_class(&self) -> Option<ColorClass> {
        let [r, g, b] = self.color?;
        let subtype = self.subtype.as_str();
        if TEXT_MARKUP_SUBTYPES.contains(&subtype) && r > 0.7 && g > 0.7 && b < 0.5 {
            Some(ColorClass::Highlight)
        } else if NOTE_SUBTYPES.contains(&subtype) && r > 0.7 && g < 0.3 && b < 0.3 {
            Some(ColorClass::Mark)
        } else {
            None
        }
    }

    /// Maps `rect` onto a `width` x `height` raster rendered at `dpi`.
    ///
    /// `page_box` is the page's MediaBox in the same normalized form as
    /// `rect`. The result is clamped to the raster; `None` when nothing of
    /// the rectangle lies on it.
    pub fn pixel_box(
        &self,
        page_box: [f64; 4],
        dpi: u32,
        width: u32,
        height: u32,
    ) -> Option<BoundingBox> {
        let scale = f64::from(dpi) / 72.0;
        let [x0, y0, x1, y1] = self.rect;

        // PDFのy軸は下から上、ラスタは上から下
        let left = (x0 - page_box[0]) * scale;
        let right = (x1 - page_box[0]) * scale;
        let top = (page_box[3] - y1) * scale;
        let bottom = (page_box[3] - y0) * scale;

        let to_pixel = |v: f64, max: u32| v.clamp(0.0, f64::from(max)) as u32;
        let min_x = to_pixel(left.floor(), width);
        let min_y = to_pixel(top.floor(), height);
        let max_x = to_pixel(right.ceil(), width);
        let max_y = to_pixel(bottom.ceil(), height);

        if max_x <= min_x || max_y <= min_y {
            return None;
        }
        Some(BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Color class and raster position together, or `None` when the
    /// annotation is not extracted.
    pub fn locate(
        &self,
        page_box: [f64; 4],
        dpi: u32,
        width: u32,
        height: u32,
    ) -> Option<PageAnnotation> {
        let color_class = self.color_class()?;
        let bounding_box = self.pixel_box(page_box, dpi, width, height)?;
        Some(PageAnnotation {
            subtype: self.subtype.clone(),
            color_class,
            bounding_box,
        })
    }
}

/// An extractable annotation located on a loaded page raster (unpadded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAnnotation {
    pub subtype: String,
    pub color_class: ColorClass,
    pub bounding_box: BoundingBox,
}

/// A page annotation of an enabled class, padded and numbered for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationExtract {
    pub page_index: u32,
    pub color_class: ColorClass,
    pub subtype: String,
    pub bounding_box: BoundingBox,
    /// Position among this page's annotations of the same class, in `/Annots` order.
    pub sequence_index: usize,
}
