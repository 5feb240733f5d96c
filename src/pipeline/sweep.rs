// Parameter sweep: detect once, group at several proximity thresholds, compare counts

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::color::ColorClass;
use crate::config::merged::ExtractionConfig;
use crate::detect::RawDetection;
use crate::error::ExtractError;
use crate::group::{self, GroupingParams, reduction_ratio};
use crate::loader::DocumentLoader;
use crate::pipeline::page_processor::detect_regions;
use crate::summary::record::write_atomic;
use crate::summary::{ColorBreakdown, PageFailure};

/// File name of the sweep report inside a document's output directory.
pub const SWEEP_FILE_NAME: &str = "parameter_sweep.json";

/// Grouping results at one proximity threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub proximity_threshold: u32,
    pub raw_detections: usize,
    pub grouped_extracts: usize,
    pub reduction_ratio: f64,
    pub per_color: BTreeMap<ColorClass, ColorBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub document_name: String,
    pub pages_processed: usize,
    pub page_failures: Vec<PageFailure>,
    /// One entry per threshold, in the order requested.
    pub entries: Vec<SweepEntry>,
}

/// Detections of one class on one page, kept for regrouping.
struct PageDetections {
    width: u32,
    height: u32,
    class: ColorClass,
    detections: Vec<RawDetection>,
}

/// Runs detection and region finding once per page and class, then groups
/// the same detections at every threshold in `thresholds`. Nothing is rendered.
///
/// Per-class thresholds in `config` are ignored; each sweep entry applies its
/// threshold to every enabled class.
pub fn run_sweep(
    loader: &dyn DocumentLoader,
    config: &ExtractionConfig,
    document_name: &str,
    page_indices: Option<&[u32]>,
    thresholds: &[u32],
) -> crate::error::Result<SweepReport> {
    config.validate()?;
    if thresholds.is_empty() {
        return Err(ExtractError::config("sweep needs at least one proximity threshold"));
    }

    let page_count = loader.page_count();
    let selected: Vec<u32> = match page_indices {
        Some(pages) => pages.to_vec(),
        None => (0..page_count).collect(),
    };
    let classes: Vec<_> = config.enabled_classes().collect();

    let mut collected: Vec<PageDetections> = Vec::new();
    let mut page_failures = Vec::new();
    let mut pages_processed = 0;

    for page_index in selected {
        let page = match loader.load_page(page_index) {
            Ok(page) => page,
            Err(e) => {
                warn!(page = page_index, error = %e, "failed to load page, skipping");
                page_failures.push(PageFailure {
                    page_index,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let per_class: Vec<PageDetections> = classes
            .par_iter()
            .map(|class| PageDetections {
                width: page.width(),
                height: page.height(),
                class: class.class,
                detections: detect_regions(&page, class),
            })
            .collect();
        collected.extend(per_class);
        pages_processed += 1;
    }

    let entries: Vec<SweepEntry> = thresholds
        .iter()
        .map(|&threshold| {
            let params = GroupingParams {
                proximity_threshold: threshold,
                padding: config.padding,
            };

            let mut per_color: BTreeMap<ColorClass, (usize, usize)> =
                classes.iter().map(|c| (c.class, (0, 0))).collect();
            for page in &collected {
                let grouped = group::group(&page.detections, page.width, page.height, &params);
                let entry = per_color.entry(page.class).or_default();
                entry.0 += page.detections.len();
                entry.1 += grouped.len();
            }

            let raw_detections = per_color.values().map(|c| c.0).sum();
            let grouped_extracts = per_color.values().map(|c| c.1).sum();
            SweepEntry {
                proximity_threshold: threshold,
                raw_detections,
                grouped_extracts,
                reduction_ratio: reduction_ratio(raw_detections, grouped_extracts),
                per_color: per_color
                    .into_iter()
                    .map(|(class, (raw, grouped))| {
                        (
                            class,
                            ColorBreakdown {
                                raw_detections: raw,
                                grouped_extracts: grouped,
                                reduction_ratio: reduction_ratio(raw, grouped),
                            },
                        )
                    })
                    .collect(),
            }
        })
        .collect();

    for entry in &entries {
        info!(
            document = document_name,
            threshold = entry.proximity_threshold,
            raw_detections = entry.raw_detections,
            grouped_extracts = entry.grouped_extracts,
            reduction = %format!("{:.1}%", entry.reduction_ratio * 100.0),
            "sweep"
        );
    }

    Ok(SweepReport {
        document_name: document_name.to_string(),
        pages_processed,
        page_failures,
        entries,
    })
}

/// Writes the report as pretty JSON to `<document_dir>/parameter_sweep.json`,
/// through a temporary file like the extraction record.
pub fn write_sweep_report(
    document_dir: &Path,
    report: &SweepReport,
) -> crate::error::Result<PathBuf> {
    std::fs::create_dir_all(document_dir)?;
    let path = document_dir.join(SWEEP_FILE_NAME);
    write_atomic(&path, serde_json::to_string_pretty(report)?.as_bytes())?;
    Ok(path)
}

/// Parses a comma separated threshold list such as `"25, 50,100"`.
pub fn parse_thresholds(s: &str) -> crate::error::Result<Vec<u32>> {
    let thresholds = s
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>().map_err(|_| {
                ExtractError::config(format!("Invalid proximity threshold: '{part}'"))
            })
        })
        .collect::<crate::error::Result<Vec<u32>>>()?;

    if thresholds.is_empty() {
        return Err(ExtractError::config("threshold list is empty"));
    }
    Ok(thresholds)
}
