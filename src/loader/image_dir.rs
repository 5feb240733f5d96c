use std::path::{Path, PathBuf};

use tracing::debug;

use super::{DocumentLoader, PageImage};
use crate::error::ExtractError;

/// File extensions accepted as page images (lowercase).
const PAGE_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff"];

/// A document stored as one image file per page, ordered by file name.
///
/// Scans are taken at face value: `dpi` is recorded on each page but the
/// image is not resampled.
pub struct ImageDirLoader {
    pages: Vec<PathBuf>,
    dpi: u32,
}

impl ImageDirLoader {
    pub fn open(dir: &Path, dpi: u32) -> crate::error::Result<Self> {
        let mut pages: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_page_image(p))
            .collect();
        pages.sort();

        if pages.is_empty() {
            return Err(ExtractError::config(format!(
                "no page images found in {}",
                dir.display()
            )));
        }

        debug!(dir = %dir.display(), page_count = pages.len(), "opened image directory");
        Ok(ImageDirLoader { pages, dpi })
    }

    /// Page files in page order.
    pub fn page_paths(&self) -> &[PathBuf] {
        &self.pages
    }
}

fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| PAGE_IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl DocumentLoader for ImageDirLoader {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn load_page(&self, page_index: u32) -> crate::error::Result<PageImage> {
        let path = self.pages.get(page_index as usize).ok_or_else(|| {
            ExtractError::page_load(format!(
                "page index {page_index} out of range ({} pages)",
                self.pages.len()
            ))
        })?;

        let image = image::open(path).map_err(|e| {
            ExtractError::page_load(format!("failed to decode {}: {e}", path.display()))
        })?;
        Ok(PageImage::new(page_index, self.dpi, image.to_rgb8()))
    }
}
