use std::path::Path;

use serde::Deserialize;

use super::color::ColorClassSettings;
use super::job::ArtifactFormat;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dpi: u32,
    pub min_area: u32,
    pub proximity_threshold: u32,
    pub padding: u32,
    pub max_dimension: u32,
    pub quality: u8,
    pub format: ArtifactFormat,
    pub parallel_workers: usize,
    /// Also extract native PDF annotations (highlight markup, red ink).
    pub pdf_annotations: bool,
    pub color_classes: Vec<ColorClassSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            dpi: 216,
            min_area: 500,
            proximity_threshold: 50,
            padding: 15,
            max_dimension: 2000,
            quality: 90,
            format: ArtifactFormat::Png,
            parallel_workers: 0,
            pdf_annotations: true,
            color_classes: ColorClassSettings::default_classes(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| {
            crate::error::ExtractError::config(format!("Failed to parse settings YAML: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
