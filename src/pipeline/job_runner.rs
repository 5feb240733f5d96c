// ジョブ単位: ドキュメントを開く -> 抽出セッション -> extraction_summary.json 書き出し

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::merged::ExtractionConfig;
use crate::error::ExtractError;
use crate::loader::{DocumentLoader, open_document};
use crate::pipeline::session::ExtractionSession;
use crate::pipeline::sweep::{SweepReport, run_sweep, write_sweep_report};
use crate::summary::DocumentSummary;
use crate::summary::fingerprint::settings_fingerprint;
use crate::summary::record::{ExtractionRecord, write_extraction_record};

/// Configuration for a single job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub input_path: PathBuf,
    /// Output root; the document directory is created beneath it.
    pub output_root: PathBuf,
    pub document_name: String,
    /// 1-based page numbers, `None` for every page.
    pub pages: Option<Vec<u32>>,
    pub extraction: ExtractionConfig,
}

impl JobConfig {
    /// Builds a job whose document name is derived from `input_path`.
    pub fn new(input_path: PathBuf, output_root: PathBuf, extraction: ExtractionConfig) -> Self {
        let document_name = document_name_for(&input_path);
        JobConfig {
            input_path,
            output_root,
            document_name,
            pages: None,
            extraction,
        }
    }

    pub fn document_dir(&self) -> PathBuf {
        self.output_root.join(&self.document_name)
    }
}

/// Result of processing a single job.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub input_path: PathBuf,
    pub document_dir: PathBuf,
    pub record_path: PathBuf,
    pub summary: DocumentSummary,
}

/// Result of a parameter-sweep job.
#[derive(Debug, Clone)]
pub struct SweepJobResult {
    pub input_path: PathBuf,
    pub report_path: PathBuf,
    pub report: SweepReport,
}

/// File stem of a PDF, or the directory name of an image directory.
pub fn document_name_for(input_path: &Path) -> String {
    let name = if input_path.is_dir() {
        input_path.file_name()
    } else {
        input_path.file_stem()
    };
    name.map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

/// Converts 1-based job page numbers to 0-based indices, checking them against the document.
fn resolve_page_indices(
    pages: Option<&[u32]>,
    page_count: u32,
) -> crate::error::Result<Option<Vec<u32>>> {
    let Some(pages) = pages else {
        return Ok(None);
    };
    for &page_num in pages {
        if page_num < 1 || page_num > page_count {
            return Err(ExtractError::config(format!(
                "page {} out of range (document has {} pages)",
                page_num, page_count
            )));
        }
    }
    Ok(Some(pages.iter().map(|p| p - 1).collect()))
}

fn open_job_document(
    config: &JobConfig,
) -> crate::error::Result<(Box<dyn DocumentLoader>, Option<Vec<u32>>)> {
    let loader = open_document(&config.input_path, config.extraction.dpi)?;
    let pages = resolve_page_indices(config.pages.as_deref(), loader.page_count())?;
    Ok((loader, pages))
}

/// Run a single extraction job.
///
/// Configuration problems and unreadable documents fail the job; page-load
/// and render failures are recorded in the summary instead.
pub fn run_job(config: &JobConfig) -> crate::error::Result<JobResult> {
    info!(input = %config.input_path.display(), document = %config.document_name, "starting job");

    let (loader, pages) = open_job_document(config)?;

    let mut session = ExtractionSession::new(
        config.extraction.clone(),
        &config.output_root,
        &config.document_name,
    )?;
    if let Some(pages) = pages {
        session = session.with_pages(pages);
    }

    let output = session.process(loader.as_ref());

    let record = ExtractionRecord::new(
        settings_fingerprint(&config.extraction),
        output.summary.clone(),
        output.artifacts,
    )
    .with_annotations(output.annotations);
    let record_path = write_extraction_record(session.document_dir(), &record)?;

    Ok(JobResult {
        input_path: config.input_path.clone(),
        document_dir: session.document_dir().to_path_buf(),
        record_path,
        summary: output.summary,
    })
}

/// Run a parameter sweep for a single job, writing `parameter_sweep.json`.
pub fn run_sweep_job(
    config: &JobConfig,
    thresholds: &[u32],
) -> crate::error::Result<SweepJobResult> {
    info!(input = %config.input_path.display(), ?thresholds, "starting parameter sweep");

    let (loader, pages) = open_job_document(config)?;
    let report = run_sweep(
        loader.as_ref(),
        &config.extraction,
        &config.document_name,
        pages.as_deref(),
        thresholds,
    )?;
    let report_path = write_sweep_report(&config.document_dir(), &report)?;

    Ok(SweepJobResult {
        input_path: config.input_path.clone(),
        report_path,
        report,
    })
}
