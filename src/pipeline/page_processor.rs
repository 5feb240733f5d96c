// ページ単位処理: 色検出 → 連結成分 → グルーピング → 切り出し画像の書き出し

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::color::{ColorClass, ColorClassConfig};
use crate::config::merged::ExtractionConfig;
use crate::detect::{self, RawDetection};
use crate::group::{self, GroupedExtract, GroupingParams};
use crate::loader::PageImage;
use crate::pdf::annotation::AnnotationExtract;
use crate::render::{AnnotationArtifact, ExtractArtifact, ExtractRenderer};
use crate::summary::PartialSummary;

/// Result of one color class on one page.
#[derive(Debug, Clone)]
pub struct ClassOutcome {
    pub class: ColorClass,
    pub raw_detections: usize,
    pub extracts: Vec<GroupedExtract>,
    /// Successfully written artifacts, in sequence order.
    pub artifacts: Vec<ExtractArtifact>,
    pub render_failures: usize,
}

/// Single page processing result.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub page_index: u32,
    pub classes: Vec<ClassOutcome>,
    /// Native PDF annotations of enabled classes found on the page.
    pub annotation_extracts: usize,
    pub annotations: Vec<AnnotationArtifact>,
}

impl PageOutcome {
    pub fn artifacts(&self) -> impl Iterator<Item = &ExtractArtifact> {
        self.classes.iter().flat_map(|c| c.artifacts.iter())
    }

    pub fn partial_summary(&self) -> PartialSummary {
        let mut partial = PartialSummary {
            pages_processed: 1,
            ..Default::default()
        };
        for class in &self.classes {
            partial.record_class(class.class, class.raw_detections, class.extracts.len());
            partial.render_failures += class.render_failures;
        }
        partial.annotation_extracts = self.annotation_extracts;
        partial.render_failures += self.annotation_extracts - self.annotations.len();
        partial
    }
}

/// Mask detection and region finding for one class on one page.
///
/// A page whose pixels cannot be viewed yields no detections.
pub fn detect_regions(page: &PageImage, class: &ColorClassConfig) -> Vec<RawDetection> {
    let pixels = match page.pixels() {
        Ok(p) => p,
        Err(e) => {
            warn!(page = page.page_index, error = %e, "unreadable page pixels, no detections");
            return Vec::new();
        }
    };
    let mask = detect::detect(&pixels, &class.range);
    detect::find_regions(&mask, page.page_index, class.class, class.min_area)
}

/// Detection and grouping for one class on one page, without rendering.
pub fn group_page(
    page: &PageImage,
    class: &ColorClassConfig,
    padding: u32,
) -> (usize, Vec<GroupedExtract>) {
    let detections = detect_regions(page, class);
    let params = GroupingParams {
        proximity_threshold: class.proximity_threshold,
        padding,
    };
    let extracts = group::group(&detections, page.width(), page.height(), &params);
    (detections.len(), extracts)
}

/// Annotations of enabled classes on `page`, padded like grouped extracts and
/// numbered per class in `/Annots` order.
pub fn annotation_extracts(page: &PageImage, config: &ExtractionConfig) -> Vec<AnnotationExtract> {
    if !config.pdf_annotations {
        return Vec::new();
    }

    let mut next_index: BTreeMap<ColorClass, usize> = BTreeMap::new();
    page.annotations
        .iter()
        .filter(|a| config.enabled_classes().any(|c| c.class == a.color_class))
        .map(|a| {
            let index = next_index.entry(a.color_class).or_default();
            let sequence_index = *index;
            *index += 1;
            AnnotationExtract {
                page_index: page.page_index,
                color_class: a.color_class,
                subtype: a.subtype.clone(),
                bounding_box: a.bounding_box.expand_clamped(
                    config.padding,
                    page.width(),
                    page.height(),
                ),
                sequence_index,
            }
        })
        .collect()
}

/// Process a single page: every enabled class runs detect → find → group →
/// render, then native annotations are rendered. Render failures are logged
/// and counted, never propagated.
pub fn process_page(
    page: &PageImage,
    config: &ExtractionConfig,
    renderer: &ExtractRenderer,
) -> PageOutcome {
    let classes: Vec<&ColorClassConfig> = config.enabled_classes().collect();

    let classes = classes
        .par_iter()
        .map(|class| {
            let (raw_detections, extracts) = group_page(page, class, config.padding);

            let mut artifacts = Vec::with_capacity(extracts.len());
            let mut render_failures = 0;
            for extract in &extracts {
                match renderer.render(page, extract) {
                    Ok(artifact) => artifacts.push(artifact),
                    Err(e) => {
                        warn!(
                            page = page.page_index,
                            class = %class.class,
                            sequence = extract.sequence_index,
                            error = %e,
                            "failed to render extract, skipping"
                        );
                        render_failures += 1;
                    }
                }
            }

            debug!(
                page = page.page_index,
                class = %class.class,
                raw_detections,
                grouped = extracts.len(),
                "page class processed"
            );

            ClassOutcome {
                class: class.class,
                raw_detections,
                extracts,
                artifacts,
                render_failures,
            }
        })
        .collect();

    let extracts = annotation_extracts(page, config);
    let annotations: Vec<AnnotationArtifact> = extracts
        .iter()
        .filter_map(|extract| match renderer.render_annotation(page, extract) {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                warn!(
                    page = page.page_index,
                    class = %extract.color_class,
                    subtype = %extract.subtype,
                    error = %e,
                    "failed to render annotation, skipping"
                );
                None
            }
        })
        .collect();

    PageOutcome {
        page_index: page.page_index,
        classes,
        annotation_extracts: extracts.len(),
        annotations,
    }
}
