// Document-level aggregate counts + on-disk extraction record

pub mod fingerprint;
pub mod record;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::color::ColorClass;
use crate::group::reduction_ratio;

/// Counts for one color class.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorBreakdown {
    pub raw_detections: usize,
    pub grouped_extracts: usize,
    pub reduction_ratio: f64,
}

/// A page the document loader could not produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    pub page_index: u32,
    pub message: String,
}

/// Aggregate result of one extraction session. Computed once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_name: String,
    /// Pages selected for processing.
    pub pages_total: usize,
    pub pages_processed: usize,
    /// Pages never scheduled because the session was cancelled.
    pub pages_skipped: usize,
    pub page_failures: Vec<PageFailure>,
    pub render_failures: usize,
    pub raw_detections: usize,
    pub grouped_extracts: usize,
    pub per_color: BTreeMap<ColorClass, ColorBreakdown>,
    pub reduction_ratio: f64,
    /// Native PDF annotations matched to an enabled class. Not part of the
    /// detection counts above.
    #[serde(default)]
    pub annotation_extracts: usize,
    pub cancelled: bool,
}

impl DocumentSummary {
    /// Number of artifacts actually written: grouped extracts plus annotation
    /// extracts, minus render failures of either.
    pub fn artifacts_written(&self) -> usize {
        (self.grouped_extracts + self.annotation_extracts).saturating_sub(self.render_failures)
    }
}

/// Per-page (or per-chunk) partial counts, reduced into a [`DocumentSummary`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialSummary {
    pub pages_processed: usize,
    pub page_failures: Vec<PageFailure>,
    pub render_failures: usize,
    pub annotation_extracts: usize,
    /// class -> (raw detections, grouped extracts)
    pub per_color: BTreeMap<ColorClass, (usize, usize)>,
}

impl PartialSummary {
    pub fn record_class(&mut self, class: ColorClass, raw: usize, grouped: usize) {
        let entry = self.per_color.entry(class).or_default();
        entry.0 += raw;
        entry.1 += grouped;
    }

    pub fn merge(mut self, other: PartialSummary) -> PartialSummary {
        self.pages_processed += other.pages_processed;
        self.page_failures.extend(other.page_failures);
        self.render_failures += other.render_failures;
        self.annotation_extracts += other.annotation_extracts;
        for (class, (raw, grouped)) in other.per_color {
            self.record_class(class, raw, grouped);
        }
        self
    }

    /// Finalizes the counts. Every class in `classes` appears in
    /// `per_color`, with zeros if it never matched.
    pub fn finish(
        mut self,
        document_name: &str,
        pages_total: usize,
        pages_skipped: usize,
        cancelled: bool,
        classes: impl IntoIterator<Item = ColorClass>,
    ) -> DocumentSummary {
        for class in classes {
            self.per_color.entry(class).or_default();
        }
        self.page_failures.sort_by_key(|f| f.page_index);

        let per_color: BTreeMap<ColorClass, ColorBreakdown> = self
            .per_color
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
            .collect();

        let raw_detections = per_color.values().map(|b| b.raw_detections).sum();
        let grouped_extracts = per_color.values().map(|b| b.grouped_extracts).sum();

        DocumentSummary {
            document_name: document_name.to_string(),
            pages_total,
            pages_processed: self.pages_processed,
            pages_skipped,
            page_failures: self.page_failures,
            render_failures: self.render_failures,
            raw_detections,
            grouped_extracts,
            per_color,
            reduction_ratio: reduction_ratio(raw_detections, grouped_extracts),
            annotation_extracts: self.annotation_extracts,
            cancelled,
        }
    }
}
