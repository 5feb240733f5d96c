// ドキュメント単位: ページ読込（逐次） -> ページ処理（rayon並列） -> サマリ集計

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::merged::ExtractionConfig;
use crate::error::Result;
use crate::loader::{DocumentLoader, PageImage};
use crate::pipeline::page_processor::{PageOutcome, process_page};
use crate::render::{AnnotationArtifact, ExtractArtifact, ExtractRenderer, RenderParams};
use crate::summary::{DocumentSummary, PageFailure, PartialSummary};

/// Session-level cancellation signal. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops scheduling of pages that have not been loaded yet.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a session produced for one document.
#[derive(Debug, Clone)]
pub struct SessionOutput {
    pub summary: DocumentSummary,
    /// Written artifacts in page order.
    pub artifacts: Vec<ExtractArtifact>,
    /// Written native PDF annotation artifacts in page order.
    pub annotations: Vec<AnnotationArtifact>,
}

/// Drives detection → grouping → rendering across the pages of one document.
pub struct ExtractionSession {
    config: ExtractionConfig,
    document_name: String,
    renderer: ExtractRenderer,
    page_indices: Option<Vec<u32>>,
    cancel: CancelToken,
    pool: Option<rayon::ThreadPool>,
}

impl ExtractionSession {
    /// Validates `config` and prepares the worker pool.
    ///
    /// Artifacts are written to `<output_root>/<document_name>/`.
    pub fn new(config: ExtractionConfig, output_root: &Path, document_name: &str) -> Result<Self> {
        config.validate()?;

        let renderer = ExtractRenderer::new(
            output_root,
            document_name,
            RenderParams {
                max_dimension: config.max_dimension,
                quality: config.quality,
                format: config.format,
            },
        );

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_workers)
            .thread_name(|i| format!("extract-worker-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!(error = %e, "failed to build worker pool, using the global pool");
                None
            }
        };

        Ok(ExtractionSession {
            config,
            document_name: document_name.to_string(),
            renderer,
            page_indices: None,
            cancel: CancelToken::new(),
            pool,
        })
    }

    /// Restricts processing to the given 0-based page indices.
    pub fn with_pages(mut self, page_indices: Vec<u32>) -> Self {
        self.page_indices = Some(page_indices);
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn document_dir(&self) -> &Path {
        self.renderer.document_dir()
    }

    /// Processes the document and returns its summary plus all written artifacts.
    pub fn process(&self, loader: &dyn DocumentLoader) -> SessionOutput {
        self.process_with(loader, |_| {})
    }

    /// Like [`process`](Self::process), calling `on_page` with each page's
    /// outcome as soon as its chunk finishes, in page order.
    ///
    /// Never fails as a whole: page-load and render failures are recorded in
    /// the summary and processing continues.
    pub fn process_with<F>(&self, loader: &dyn DocumentLoader, mut on_page: F) -> SessionOutput
    where
        F: FnMut(&PageOutcome),
    {
        let page_count = loader.page_count();
        let selected: Vec<u32> = match &self.page_indices {
            Some(pages) => pages.clone(),
            None => (0..page_count).collect(),
        };

        let mut partial = PartialSummary::default();
        let mut artifacts = Vec::new();
        let mut annotations = Vec::new();
        let mut pages_skipped = 0;

        let chunk_size = self
            .pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |p| p.current_num_threads())
            .max(1);

        let mut remaining = selected.as_slice();
        while !remaining.is_empty() {
            let (chunk, rest) = remaining.split_at(chunk_size.min(remaining.len()));
            remaining = rest;

            let mut pages: Vec<PageImage> = Vec::with_capacity(chunk.len());
            for (i, &page_index) in chunk.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    pages_skipped += chunk.len() - i + remaining.len();
                    remaining = &[];
                    break;
                }
                match self.load_page(loader, page_index, page_count) {
                    Ok(page) => pages.push(page),
                    Err(failure) => partial.page_failures.push(failure),
                }
            }

            let outcomes = self.process_loaded(&pages);
            drop(pages);

            for outcome in outcomes {
                on_page(&outcome);
                partial = partial.merge(outcome.partial_summary());
                artifacts.extend(outcome.artifacts().cloned());
                annotations.extend(outcome.annotations);
            }
        }

        let summary = partial.finish(
            &self.document_name,
            selected.len(),
            pages_skipped,
            self.cancel.is_cancelled(),
            self.config.enabled_classes().map(|c| c.class),
        );

        info!(
            document = %summary.document_name,
            pages = summary.pages_processed,
            page_failures = summary.page_failures.len(),
            raw_detections = summary.raw_detections,
            grouped_extracts = summary.grouped_extracts,
            reduction = %format!("{:.1}%", summary.reduction_ratio * 100.0),
            annotation_extracts = summary.annotation_extracts,
            "extraction finished"
        );

        SessionOutput {
            summary,
            artifacts,
            annotations,
        }
    }

    fn load_page(
        &self,
        loader: &dyn DocumentLoader,
        page_index: u32,
        page_count: u32,
    ) -> std::result::Result<PageImage, PageFailure> {
        let result = if page_index >= page_count {
            Err(format!(
                "page index {page_index} out of range (document has {page_count} pages)"
            ))
        } else {
            loader.load_page(page_index).map_err(|e| e.to_string())
        };

        result.map_err(|message| {
            warn!(page = page_index, error = %message, "failed to load page, skipping");
            PageFailure {
                page_index,
                message,
            }
        })
    }

    fn process_loaded(&self, pages: &[PageImage]) -> Vec<PageOutcome> {
        let run = || {
            pages
                .par_iter()
                .map(|page| process_page(page, &self.config, &self.renderer))
                .collect::<Vec<_>>()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}
