use std::collections::BTreeSet;

use super::color::{ColorClass, ColorClassConfig};
use super::job::{ArtifactFormat, Job};
use super::settings::Settings;
use crate::error::ExtractError;

/// Upper bound on the rendering resolution accepted by validation.
pub const MAX_DPI: u32 = 2400;

/// The explicit configuration value threaded through an extraction session.
///
/// Built once per document from settings.yaml merged with the job entry.
/// Each pipeline stage reads only the parameters it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub dpi: u32,
    pub padding: u32,
    pub max_dimension: u32,
    pub quality: u8,
    pub format: ArtifactFormat,
    pub parallel_workers: usize,
    pub pdf_annotations: bool,
    pub color_classes: Vec<ColorClassConfig>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig::from_settings(&Settings::default())
    }
}

impl ExtractionConfig {
    /// settings.yaml のみから構成する（ジョブ上書きなし）。
    pub fn from_settings(settings: &Settings) -> Self {
        ExtractionConfig {
            dpi: settings.dpi,
            padding: settings.padding,
            max_dimension: settings.max_dimension,
            quality: settings.quality,
            format: settings.format,
            parallel_workers: settings.parallel_workers,
            pdf_annotations: settings.pdf_annotations,
            color_classes: resolve_classes(settings, None, None, None),
        }
    }

    /// JobのOption値がSomeならJobの値を、NoneならSettingsの値を使用する。
    ///
    /// Job-level `min_area` / `proximity_threshold` override every class,
    /// including classes with their own value in settings.yaml.
    pub fn merge(settings: &Settings, job: &Job) -> Self {
        ExtractionConfig {
            dpi: job.dpi.unwrap_or(settings.dpi),
            padding: job.padding.unwrap_or(settings.padding),
            max_dimension: job.max_dimension.unwrap_or(settings.max_dimension),
            quality: job.quality.unwrap_or(settings.quality),
            format: job.format.unwrap_or(settings.format),
            parallel_workers: settings.parallel_workers,
            pdf_annotations: job.pdf_annotations.unwrap_or(settings.pdf_annotations),
            color_classes: resolve_classes(
                settings,
                job.min_area,
                job.proximity_threshold,
                job.classes.as_deref(),
            ),
        }
    }

    /// Classes that take part in extraction, in configuration order.
    pub fn enabled_classes(&self) -> impl Iterator<Item = &ColorClassConfig> {
        self.color_classes.iter().filter(|c| c.enabled)
    }

    /// Rejects settings that would make every page produce meaningless output.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.dpi == 0 || self.dpi > MAX_DPI {
            return Err(ExtractError::config(format!(
                "dpi must be 1-{MAX_DPI}, got {}",
                self.dpi
            )));
        }
        if self.quality > 100 {
            return Err(ExtractError::config(format!(
                "quality must be 0-100, got {}",
                self.quality
            )));
        }
        if self.max_dimension == 0 {
            return Err(ExtractError::config("max_dimension must be at least 1"));
        }

        let mut seen = BTreeSet::new();
        for class in &self.color_classes {
            if !seen.insert(class.class) {
                return Err(ExtractError::config(format!(
                    "color class '{}' is listed more than once",
                    class.class
                )));
            }
            class
                .range
                .validate()
                .map_err(|e| ExtractError::config(format!("color class '{}': {e}", class.class)))?;
        }

        if self.enabled_classes().next().is_none() {
            return Err(ExtractError::config("no color classes are enabled"));
        }
        Ok(())
    }
}

fn resolve_classes(
    settings: &Settings,
    min_area: Option<u32>,
    proximity_threshold: Option<u32>,
    only: Option<&[ColorClass]>,
) -> Vec<ColorClassConfig> {
    settings
        .color_classes
        .iter()
        .map(|c| ColorClassConfig {
            class: c.class,
            enabled: c.enabled && only.is_none_or(|only| only.contains(&c.class)),
            range: c.range(),
            min_area: min_area.or(c.min_area).unwrap_or(settings.min_area),
            proximity_threshold: proximity_threshold
                .or(c.proximity_threshold)
                .unwrap_or(settings.proximity_threshold),
        })
        .collect()
}
