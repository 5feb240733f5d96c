use std::path::{Path, PathBuf};
use std::process::ExitCode;

use markup_extract::config::job::JobFile;
use markup_extract::config::merged::ExtractionConfig;
use markup_extract::config::{self};
use markup_extract::pipeline::job_runner::JobConfig;
use markup_extract::pipeline::orchestrator::{run_all_jobs, sweep_all_jobs};
use markup_extract::pipeline::sweep::parse_thresholds;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: markup_extract [--sweep <t1,t2,...>] <jobs.yaml>...");
    eprintln!(
        "  Extract highlighter and marker annotations from the documents listed in each job file."
    );
    eprintln!(
        "  --sweep  group at each proximity threshold and report counts instead of rendering"
    );
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("markup_extract {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    // Split off --sweep <list>; everything else is a job file.
    let mut sweep_thresholds: Option<Vec<u32>> = None;
    let mut job_file_args: Vec<&str> = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--sweep" {
            let Some(list) = iter.next() else {
                eprintln!("ERROR: --sweep requires a comma separated threshold list");
                return ExitCode::FAILURE;
            };
            match parse_thresholds(list) {
                Ok(t) => sweep_thresholds = Some(t),
                Err(e) => {
                    eprintln!("ERROR: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            job_file_args.push(arg);
        }
    }

    if job_file_args.is_empty() {
        print_usage();
        return ExitCode::FAILURE;
    }

    let mut job_configs: Vec<JobConfig> = Vec::new();
    for job_file_arg in job_file_args {
        match load_job_file(Path::new(job_file_arg)) {
            Ok(jobs) => job_configs.extend(jobs),
            Err(e) => {
                eprintln!("ERROR: {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let has_error = match sweep_thresholds {
        Some(thresholds) => report_sweeps(&job_configs, &thresholds),
        None => report_jobs(&job_configs),
    };

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Reads one job file and merges each job with the adjacent settings.yaml.
fn load_job_file(job_file_path: &Path) -> markup_extract::error::Result<Vec<JobConfig>> {
    let settings = config::load_settings_for_job(job_file_path)?;
    let yaml_content = std::fs::read_to_string(job_file_path)?;
    let job_file: JobFile = serde_yml::from_str(&yaml_content)?;

    let job_dir = job_file_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let mut jobs = Vec::with_capacity(job_file.jobs.len());
    for job in &job_file.jobs {
        let extraction = ExtractionConfig::merge(&settings, job);
        extraction.validate()?;

        let mut job_config = JobConfig::new(
            resolve_path(&job_dir, &job.input),
            resolve_path(&job_dir, &job.output),
            extraction,
        );
        job_config.pages = job.pages.clone();
        jobs.push(job_config);
    }
    Ok(jobs)
}

fn report_jobs(job_configs: &[JobConfig]) -> bool {
    let mut has_error = false;
    for (job, result) in job_configs.iter().zip(run_all_jobs(job_configs)) {
        match result {
            Ok(job_result) => {
                let summary = &job_result.summary;
                eprintln!(
                    "OK: {} -> {} ({} extracts from {} detections, {} annotations, {} pages, {} page failures)",
                    job_result.input_path.display(),
                    job_result.document_dir.display(),
                    summary.grouped_extracts,
                    summary.raw_detections,
                    summary.annotation_extracts,
                    summary.pages_processed,
                    summary.page_failures.len()
                );
            }
            Err(e) => {
                eprintln!(
                    "ERROR: {} -> {}: {e}",
                    job.input_path.display(),
                    job.document_dir().display()
                );
                has_error = true;
            }
        }
    }
    has_error
}

fn report_sweeps(job_configs: &[JobConfig], thresholds: &[u32]) -> bool {
    let mut has_error = false;
    for (job, result) in job_configs.iter().zip(sweep_all_jobs(job_configs, thresholds)) {
        match result {
            Ok(sweep) => {
                eprintln!("OK: {} -> {}", sweep.input_path.display(), sweep.report_path.display());
                eprintln!(
                    "  {:>9}  {:>6}  {:>7}  {:>9}",
                    "threshold", "raw", "grouped", "reduction"
                );
                for entry in &sweep.report.entries {
                    eprintln!(
                        "  {:>9}  {:>6}  {:>7}  {:>8.1}%",
                        entry.proximity_threshold,
                        entry.raw_detections,
                        entry.grouped_extracts,
                        entry.reduction_ratio * 100.0
                    );
                }
            }
            Err(e) => {
                eprintln!("ERROR: {}: {e}", job.input_path.display());
                has_error = true;
            }
        }
    }
    has_error
}

/// Resolve a potentially relative path against a base directory.
/// If the path is already absolute, return it as-is.
fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
