// Document loader: document path -> ordered sequence of PageImage

pub mod image_dir;
#[cfg(feature = "pdfium")]
pub mod pdfium;

use std::path::Path;

use image::RgbImage;

use crate::detect::PixelBuffer;
use crate::error::ExtractError;
use crate::pdf::annotation::PageAnnotation;

/// A raster of one document page, owned by the session while that page is processed.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 0-based page index within the document.
    pub page_index: u32,
    pub dpi: u32,
    pub image: RgbImage,
    /// Native annotations found on the page, in raster coordinates.
    pub annotations: Vec<PageAnnotation>,
}

impl PageImage {
    pub fn new(page_index: u32, dpi: u32, image: RgbImage) -> Self {
        PageImage {
            page_index,
            dpi,
            image,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotations(mut self, annotations: Vec<PageAnnotation>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Library-independent view of the page pixels.
    pub fn pixels(&self) -> crate::error::Result<PixelBuffer<'_>> {
        PixelBuffer::new(self.width(), self.height(), 3, self.image.as_raw())
    }
}

/// Produces page images for one document.
///
/// Pages are requested one at a time from the session thread, so
/// implementations need not be thread-safe. Failures are per page.
pub trait DocumentLoader {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Loads the page at the 0-based `page_index`.
    fn load_page(&self, page_index: u32) -> crate::error::Result<PageImage>;
}

/// Opens `input` as a document: a directory of page images, or a PDF file.
///
/// PDF support requires the `pdfium` feature.
pub fn open_document(input: &Path, dpi: u32) -> crate::error::Result<Box<dyn DocumentLoader>> {
    if input.is_dir() {
        return Ok(Box::new(image_dir::ImageDirLoader::open(input, dpi)?));
    }

    if !input.exists() {
        return Err(ExtractError::config(format!(
            "input not found: {}",
            input.display()
        )));
    }

    if !crate::pdf::reader::looks_like_pdf(input) {
        return Err(ExtractError::config(format!(
            "input is neither a PDF nor a directory of page images: {}",
            input.display()
        )));
    }

    open_pdf(input, dpi)
}

#[cfg(feature = "pdfium")]
fn open_pdf(input: &Path, dpi: u32) -> crate::error::Result<Box<dyn DocumentLoader>> {
    Ok(Box::new(pdfium::PdfiumLoader::open(input, dpi)?))
}

#[cfg(not(feature = "pdfium"))]
fn open_pdf(input: &Path, _dpi: u32) -> crate::error::Result<Box<dyn DocumentLoader>> {
    Err(ExtractError::config(format!(
        "PDF input {} requires the 'pdfium' feature",
        input.display()
    )))
}
