// GroupedExtract + page image -> cropped, downscaled, encoded artifact on disk

pub mod encode;

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::config::color::ColorClass;
use crate::config::job::ArtifactFormat;
use crate::error::ExtractError;
use crate::geometry::BoundingBox;
use crate::group::GroupedExtract;
use crate::loader::PageImage;
use crate::pdf::annotation::AnnotationExtract;

/// Rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderParams {
    /// Longest allowed artifact side in pixels; larger crops are downscaled.
    pub max_dimension: u32,
    /// Encode quality, 0-100.
    pub quality: u8,
    pub format: ArtifactFormat,
}

/// The written output of one grouped extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractArtifact {
    pub page_index: u32,
    pub color_class: ColorClass,
    pub bounding_box: BoundingBox,
    pub member_count: usize,
    pub sequence_index: usize,
    pub artifact_path: PathBuf,
    /// Encoded image size, after any downscale.
    pub width: u32,
    pub height: u32,
}

/// The written output of one native PDF annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationArtifact {
    pub page_index: u32,
    pub color_class: ColorClass,
    /// PDF annotation subtype, e.g. `Highlight` or `Ink`.
    pub subtype: String,
    pub bounding_box: BoundingBox,
    pub sequence_index: usize,
    pub artifact_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Writes extract crops into `<output_root>/<document_name>/`.
#[derive(Debug, Clone)]
pub struct ExtractRenderer {
    document_dir: PathBuf,
    params: RenderParams,
}

impl ExtractRenderer {
    pub fn new(output_root: &Path, document_name: &str, params: RenderParams) -> Self {
        ExtractRenderer {
            document_dir: output_root.join(document_name),
            params,
        }
    }

    pub fn document_dir(&self) -> &Path {
        &self.document_dir
    }

    /// `page_{page_index}_{color_class}_group_{sequence_index}.{ext}` inside the
    /// document directory.
    pub fn artifact_path(&self, extract: &GroupedExtract) -> PathBuf {
        self.document_dir.join(format!(
            "page_{}_{}_group_{}.{}",
            extract.page_index,
            extract.color_class,
            extract.sequence_index,
            self.params.format.extension()
        ))
    }

    /// `page_{page_index}_{color_class}_annot_{sequence_index}.{ext}` inside the
    /// document directory.
    pub fn annotation_path(&self, extract: &AnnotationExtract) -> PathBuf {
        self.document_dir.join(format!(
            "page_{}_{}_annot_{}.{}",
            extract.page_index,
            extract.color_class,
            extract.sequence_index,
            self.params.format.extension()
        ))
    }

    /// Crops `page` to the extract's box, downscales if needed, encodes and
    /// writes the artifact. Existing files at the same path are overwritten.
    pub fn render(
        &self,
        page: &PageImage,
        extract: &GroupedExtract,
    ) -> crate::error::Result<ExtractArtifact> {
        let path = self.artifact_path(extract);
        let (width, height) = self.write_crop(page, extract.bounding_box, &path)?;

        Ok(ExtractArtifact {
            page_index: extract.page_index,
            color_class: extract.color_class,
            bounding_box: extract.bounding_box,
            member_count: extract.member_count,
            sequence_index: extract.sequence_index,
            artifact_path: path,
            width,
            height,
        })
    }

    /// Same as [`render`](Self::render) for a native PDF annotation.
    pub fn render_annotation(
        &self,
        page: &PageImage,
        extract: &AnnotationExtract,
    ) -> crate::error::Result<AnnotationArtifact> {
        let path = self.annotation_path(extract);
        let (width, height) = self.write_crop(page, extract.bounding_box, &path)?;

        Ok(AnnotationArtifact {
            page_index: extract.page_index,
            color_class: extract.color_class,
            subtype: extract.subtype.clone(),
            bounding_box: extract.bounding_box,
            sequence_index: extract.sequence_index,
            artifact_path: path,
            width,
            height,
        })
    }

    /// 切り出し → 縮小 → エンコード → 書き込み。書き込んだ画像サイズを返す。
    fn write_crop(
        &self,
        page: &PageImage,
        bbox: BoundingBox,
        path: &Path,
    ) -> crate::error::Result<(u32, u32)> {
        if self.params.max_dimension == 0 {
            return Err(ExtractError::render("max_dimension must be at least 1"));
        }

        let page_box = BoundingBox::new(0, 0, page.width(), page.height());
        if bbox.is_empty() || !page_box.contains_box(&bbox) {
            return Err(ExtractError::render(format!(
                "extract box {:?} is empty or outside the {}x{} page",
                bbox,
                page.width(),
                page.height()
            )));
        }

        let cropped =
            imageops::crop_imm(&page.image, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
        let (width, height) = fit_within(bbox.width, bbox.height, self.params.max_dimension);
        let output = if (width, height) == (bbox.width, bbox.height) {
            cropped
        } else {
            imageops::resize(&cropped, width, height, FilterType::Lanczos3)
        };

        let bytes = encode::encode_rgb(&output, self.params.format, self.params.quality)?;

        std::fs::create_dir_all(&self.document_dir)
            .map_err(|e| ExtractError::render(format!("{}: {e}", self.document_dir.display())))?;
        std::fs::write(path, bytes)
            .map_err(|e| ExtractError::render(format!("{}: {e}", path.display())))?;

        Ok((width, height))
    }
}

/// Scales `(width, height)` so neither side exceeds `max_dimension`,
/// preserving aspect ratio. Sizes already within the limit are unchanged.
/// A `max_dimension` of 0 is treated as 1.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    let longest = width.max(height);
    if longest <= max_dimension || longest == 0 {
        return (width, height);
    }
    let scale = max_dimension as f64 / longest as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_dimension);
    (scaled(width), scaled(height))
}
