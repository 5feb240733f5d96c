// CLI entry point tests

use std::path::Path;
use std::process::Command;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_markup_extract"))
}

/// One-page image document with a single highlight stroke.
fn write_scan_dir(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    let mut page = RgbImage::from_pixel(200, 100, Rgb([255, 255, 255]));
    draw_filled_rect_mut(&mut page, Rect::at(20, 20).of_size(80, 12), Rgb([250, 230, 40]));
    page.save(dir.join("p1.png")).unwrap();
}

// ============================================================
// 1. No arguments shows usage and exits with failure
// ============================================================

#[test]
fn test_main_no_args_shows_usage() {
    let output = cargo_bin().output().expect("failed to execute binary");

    assert!(
        !output.status.success(),
        "should exit with failure when no args given"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Usage"),
        "stderr should contain 'Usage', got: {stderr}"
    );
}

// ============================================================
// 2. --help / --version
// ============================================================

#[test]
fn test_main_help_flag() {
    let output = cargo_bin()
        .arg("--help")
        .output()
        .expect("failed to execute binary");

    assert!(output.status.success(), "should exit with success for --help");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "got: {stderr}");
    assert!(stderr.contains("--sweep"), "got: {stderr}");
}

#[test]
fn test_main_version_flag() {
    let output = cargo_bin()
        .arg("--version")
        .output()
        .expect("failed to execute binary");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let version = env!("CARGO_PKG_VERSION");
    assert!(
        stderr.contains(version),
        "stderr should contain version '{version}', got: {stderr}"
    );
}

// ============================================================
// 3. Error paths
// ============================================================

#[test]
fn test_main_nonexistent_job_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = cargo_bin()
        .arg(dir.path().join("missing_jobs.yaml"))
        .output()
        .expect("failed to execute binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR"), "got: {stderr}");
}

#[test]
fn test_main_invalid_settings_rejected_before_running() {
    let dir = tempfile::tempdir().unwrap();
    write_scan_dir(&dir.path().join("scan"));
    std::fs::write(dir.path().join("settings.yaml"), "quality: 150\n").unwrap();
    let jobs = dir.path().join("jobs.yaml");
    std::fs::write(&jobs, "jobs:\n  - input: scan\n    output: out\n").unwrap();

    let output = cargo_bin().arg(&jobs).output().expect("failed to execute binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("quality"), "got: {stderr}");
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_main_sweep_requires_threshold_list() {
    let output = cargo_bin()
        .args(["jobs.yaml", "--sweep"])
        .output()
        .expect("failed to execute binary");
    assert!(!output.status.success());

    let output = cargo_bin()
        .args(["--sweep", "10,abc", "jobs.yaml"])
        .output()
        .expect("failed to execute binary");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("abc"), "got: {stderr}");
}

// ============================================================
// 4. Running jobs
// ============================================================

#[test]
fn test_main_runs_job_with_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    write_scan_dir(&dir.path().join("scan"));
    std::fs::write(dir.path().join("settings.yaml"), "min_area: 100\npadding: 4\n").unwrap();
    let jobs = dir.path().join("jobs.yaml");
    std::fs::write(&jobs, "jobs:\n  - input: scan\n    output: out\n").unwrap();

    let output = cargo_bin().arg(&jobs).output().expect("failed to execute binary");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "got: {stderr}");
    assert!(stderr.contains("OK:"), "got: {stderr}");
    assert!(stderr.contains("1 extracts from 1 detections"), "got: {stderr}");

    let doc_dir = dir.path().join("out").join("scan");
    assert!(doc_dir.join("extraction_summary.json").exists());
    assert!(doc_dir.join("page_0_highlight_group_0.png").exists());
}

#[test]
fn test_main_failed_job_sets_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    write_scan_dir(&dir.path().join("scan"));
    let jobs = dir.path().join("jobs.yaml");
    std::fs::write(
        &jobs,
        "jobs:\n  - input: missing\n    output: out\n  - input: scan\n    output: out\n",
    )
    .unwrap();

    let output = cargo_bin().arg(&jobs).output().expect("failed to execute binary");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("ERROR:"), "got: {stderr}");
    assert!(stderr.contains("OK:"), "second job should still run, got: {stderr}");
}

#[test]
fn test_main_sweep_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    write_scan_dir(&dir.path().join("scan"));
    let jobs = dir.path().join("jobs.yaml");
    std::fs::write(&jobs, "jobs:\n  - input: scan\n    output: out\n    min_area: 100\n").unwrap();

    let output = cargo_bin()
        .args(["--sweep", "10,50"])
        .arg(&jobs)
        .output()
        .expect("failed to execute binary");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "got: {stderr}");
    assert!(stderr.contains("threshold"), "got: {stderr}");
    let doc_dir = dir.path().join("out").join("scan");
    assert!(doc_dir.join("parameter_sweep.json").exists());
    assert!(!doc_dir.join("page_0_highlight_group_0.png").exists());
}
