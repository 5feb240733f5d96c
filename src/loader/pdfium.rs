// pdfium-render wrapper: PDF page -> PageImage (in-memory only)

use std::path::{Path, PathBuf};

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::{DocumentLoader, PageImage};
use crate::error::ExtractError;
use crate::pdf::annotation::PageAnnotation;
use crate::pdf::reader::PdfReader;

/// Resolves the path to the pdfium shared library.
///
/// Search order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` environment variable
/// 2. `vendor/pdfium/lib/` relative to the project root (for development)
fn resolve_pdfium_lib_path() -> crate::error::Result<PathBuf> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        let p = PathBuf::from(&path);
        if p.exists() {
            return Ok(p);
        }
        return Err(ExtractError::page_load(format!(
            "PDFIUM_DYNAMIC_LIB_PATH is set to '{}' but the path does not exist",
            path
        )));
    }

    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let vendor_path = PathBuf::from(&manifest_dir).join("vendor/pdfium/lib");
        if vendor_path.exists() {
            return Ok(vendor_path);
        }
    }

    Err(ExtractError::page_load(
        "pdfium library not found: set PDFIUM_DYNAMIC_LIB_PATH or place libpdfium.so in vendor/pdfium/lib/",
    ))
}

/// Creates a new Pdfium instance by dynamically loading the shared library.
fn create_pdfium() -> crate::error::Result<Pdfium> {
    let lib_path = resolve_pdfium_lib_path()?;
    let lib_path_str = lib_path.to_str().ok_or_else(|| {
        ExtractError::page_load("pdfium library path contains non-UTF-8 characters")
    })?;
    let bindings =
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(lib_path_str))?;
    Ok(Pdfium::new(bindings))
}

/// Renders a PDF page at the specified DPI and returns a DynamicImage.
///
/// # Arguments
/// * `pdf_path` - Path to the PDF file
/// * `page_index` - 0-indexed page number
/// * `dpi` - Resolution in dots per inch (72 DPI = 1 point per pixel)
///
/// # Errors
/// Returns `ExtractError::PageLoadError` if the pdfium library cannot be
/// initialized, the PDF cannot be opened, the page index is out of range,
/// or rendering fails.
pub fn render_page(
    pdf_path: &Path,
    page_index: u32,
    dpi: u32,
) -> crate::error::Result<DynamicImage> {
    let pdfium = create_pdfium()?;

    let document = pdfium.load_pdf_from_file(pdf_path, None)?;

    let page_index_u16 = u16::try_from(page_index)
        .map_err(|_| ExtractError::page_load("page index exceeds u16 range"))?;

    let page = document.pages().get(page_index_u16)?;

    // PDF default user unit: 1 point = 1/72 inch
    let width_px = (page.width().value * dpi as f32 / 72.0).round() as i32;
    let height_px = (page.height().value * dpi as f32 / 72.0).round() as i32;

    let config = PdfRenderConfig::new()
        .set_target_width(width_px)
        .set_target_height(height_px);

    let bitmap = page.render_with_config(&config)?;

    Ok(bitmap.as_image())
}

/// Loads PDF pages through pdfium at a fixed resolution.
///
/// The page tree and annotations come from lopdf so opening a document does
/// not need the pdfium library; pdfium is bound on each page load.
pub struct PdfiumLoader {
    path: PathBuf,
    dpi: u32,
    reader: PdfReader,
    page_count: u32,
}

impl PdfiumLoader {
    pub fn open(path: &Path, dpi: u32) -> crate::error::Result<Self> {
        let reader = PdfReader::open(path)?;
        let page_count = reader.page_count();
        debug!(path = %path.display(), page_count, dpi, "opened PDF document");
        Ok(PdfiumLoader {
            path: path.to_path_buf(),
            dpi,
            reader,
            page_count,
        })
    }

    /// Extractable annotations of one page mapped onto a `width` x `height` raster.
    fn locate_annotations(
        &self,
        page_index: u32,
        width: u32,
        height: u32,
    ) -> crate::error::Result<Vec<PageAnnotation>> {
        let page_box = self.reader.page_box(page_index)?;
        Ok(self
            .reader
            .page_annotations(page_index)?
            .iter()
            .filter_map(|a| a.locate(page_box, self.dpi, width, height))
            .collect())
    }
}

impl DocumentLoader for PdfiumLoader {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn load_page(&self, page_index: u32) -> crate::error::Result<PageImage> {
        let image = render_page(&self.path, page_index, self.dpi)?.to_rgb8();

        let annotations = self
            .locate_annotations(page_index, image.width(), image.height())
            .unwrap_or_else(|e| {
                warn!(page = page_index, error = %e, "failed to read annotations, ignoring them");
                Vec::new()
            });
        if !annotations.is_empty() {
            debug!(page = page_index, count = annotations.len(), "found PDF annotations");
        }

        Ok(PageImage::new(page_index, self.dpi, image).with_annotations(annotations))
    }
}
