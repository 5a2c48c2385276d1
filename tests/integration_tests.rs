//! Integration tests for the speedshift pipeline
//!
//! These tests drive full batches through the public API. On unix a scripted
//! stand-in for ffmpeg records its arguments so the real process backend is
//! exercised without needing ffmpeg installed.

use speedshift::config::Settings;
use speedshift::export::{self, BatchReport};
use speedshift::pipeline::{self, CollectingObserver};
use speedshift::{BatchOutcome, BatchRequest};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a file (and its parent directories) with placeholder content
fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, b"not really audio").expect("Failed to write file");
}

/// Source tree from the reference scenario: two audio files and one text file
fn reference_tree() -> TempDir {
    let dir = TempDir::new().expect("Failed to create input temp dir");
    touch(&dir.path().join("a.mp3"));
    touch(&dir.path().join("sub/b.wav"));
    touch(&dir.path().join("c.txt"));
    dir
}

/// Create test settings with the progress bar disabled
fn create_test_settings(input: &Path, output: &Path, speed: f64) -> Settings {
    Settings {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        speed,
        workers: 2,
        ffmpeg: PathBuf::from("ffmpeg"),
        max_slowdown_stages: 5,
        report: None,
        show_progress: false, // Disable progress bars in tests
        dry_run: false,
    }
}

#[cfg(unix)]
mod fake_ffmpeg {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Write an executable shell script that logs its arguments, fails for any
    /// input containing "broken" and otherwise writes the output file.
    pub fn install(dir: &Path) -> (PathBuf, PathBuf) {
        let script = dir.join("ffmpeg");
        let log = dir.join("calls.log");
        let body = format!(
            "#!/bin/sh\n\
             echo \"$*\" >> '{log}'\n\
             case \"$*\" in *broken*) echo 'Invalid data found when processing input' >&2; exit 1;; esac\n\
             for last in \"$@\"; do :; done\n\
             printf 'sped' > \"$last\"\n",
            log = log.display()
        );
        fs::write(&script, body).expect("Failed to write fake ffmpeg");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod fake ffmpeg");
        (script, log)
    }

    pub fn calls(log: &Path) -> Vec<String> {
        let mut lines: Vec<String> = fs::read_to_string(log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect();
        lines.sort();
        lines
    }
}

#[cfg(unix)]
#[test]
fn test_reference_scenario_with_process_backend() {
    let input_dir = reference_tree();
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let bin_dir = TempDir::new().expect("Failed to create bin temp dir");
    let (script, log) = fake_ffmpeg::install(bin_dir.path());

    let mut settings = create_test_settings(input_dir.path(), output_dir.path(), 2.0);
    settings.ffmpeg = script;

    let mut observer = CollectingObserver::new();
    let outcome = pipeline::run(&settings, &mut observer);

    assert_eq!(outcome, BatchOutcome::Success { processed: 2 });

    // Both audio files invoked with the single 2x stage, video copied
    let calls = fake_ffmpeg::calls(&log);
    assert_eq!(calls.len(), 2, "c.txt must not be processed: {:?}", calls);
    for call in &calls {
        assert!(call.contains("-filter:a atempo=2.0000 -c:v copy -y"), "{}", call);
        assert!(!call.contains("c.txt"));
    }
    assert!(calls.iter().any(|c| c.contains("a.mp3")));
    assert!(calls.iter().any(|c| c.contains("sub/b.wav")));

    // Outputs mirror the source tree
    assert!(output_dir.path().join("a.mp3").is_file());
    assert!(output_dir.path().join("sub/b.wav").is_file());
    assert!(!output_dir.path().join("c.txt").exists());

    // Progress reaches 100 after exactly two completions
    assert_eq!(observer.percents(), vec![50.0, 100.0]);
    assert_eq!(observer.terminals().len(), 1);
}

#[cfg(unix)]
#[test]
fn test_process_failure_is_reported_with_diagnostic() {
    let input_dir = reference_tree();
    touch(&input_dir.path().join("sub/broken.mp3"));
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let bin_dir = TempDir::new().expect("Failed to create bin temp dir");
    let (script, _log) = fake_ffmpeg::install(bin_dir.path());

    let mut settings = create_test_settings(input_dir.path(), output_dir.path(), 1.0);
    settings.ffmpeg = script;

    let outcome = pipeline::run(&settings, &mut CollectingObserver::new());

    match &outcome {
        BatchOutcome::PartialFailure { processed, failures } => {
            assert_eq!(*processed, 3);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].path, PathBuf::from("sub/broken.mp3"));
            assert!(failures[0]
                .message
                .contains("Invalid data found when processing input"));
        }
        other => panic!("expected partial failure, got {:?}", other),
    }
    let report = outcome.report_text();
    assert!(report.contains("broken.mp3"));
    assert!(report.contains("Invalid data found"));

    // The good files were still written
    assert!(output_dir.path().join("a.mp3").is_file());
}

#[cfg(unix)]
#[test]
fn test_unit_speed_uses_stream_copy() {
    let input_dir = reference_tree();
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let bin_dir = TempDir::new().expect("Failed to create bin temp dir");
    let (script, log) = fake_ffmpeg::install(bin_dir.path());

    let mut settings = create_test_settings(input_dir.path(), output_dir.path(), 1.0);
    settings.ffmpeg = script;

    let outcome = pipeline::run(&settings, &mut CollectingObserver::new());
    assert!(outcome.is_success());

    for call in fake_ffmpeg::calls(&log) {
        assert!(call.contains("-c copy -y"), "{}", call);
        assert!(!call.contains("atempo"), "{}", call);
    }
}

#[test]
fn test_missing_executable_fails_every_job_without_aborting() {
    let input_dir = reference_tree();
    let output_dir = TempDir::new().expect("Failed to create output temp dir");

    let mut settings = create_test_settings(input_dir.path(), output_dir.path(), 2.0);
    settings.ffmpeg = PathBuf::from("/nonexistent/speedshift-test/ffmpeg");

    let mut observer = CollectingObserver::new();
    let outcome = pipeline::run(&settings, &mut observer);

    match &outcome {
        BatchOutcome::PartialFailure { processed, failures } => {
            assert_eq!(*processed, 2);
            assert_eq!(failures.len(), 2);
            assert!(failures.iter().all(|f| f.message.contains("ffmpeg not found")));
        }
        other => panic!("expected partial failure, got {:?}", other),
    }
    assert_eq!(observer.percents().last().copied(), Some(100.0));
}

#[test]
fn test_empty_directory_is_not_an_error() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let dest = output_dir.path().join("never_created");

    let settings = create_test_settings(input_dir.path(), &dest, 2.0);
    let outcome = pipeline::run(&settings, &mut CollectingObserver::new());

    assert_eq!(outcome, BatchOutcome::NothingToProcess);
    assert!(!dest.exists(), "Destination should not be created for empty input");
}

#[test]
fn test_invalid_speed_is_fatal() {
    let input_dir = reference_tree();
    let output_dir = TempDir::new().expect("Failed to create output temp dir");

    let settings = create_test_settings(input_dir.path(), output_dir.path(), -1.0);
    let outcome = pipeline::run(&settings, &mut CollectingObserver::new());

    assert!(matches!(outcome, BatchOutcome::Fatal { .. }));
    assert!(fs::read_dir(output_dir.path()).unwrap().next().is_none());
}

#[test]
fn test_plan_matches_reference_scenario() {
    let input_dir = reference_tree();
    let output_dir = TempDir::new().expect("Failed to create output temp dir");

    let request = BatchRequest::new(input_dir.path(), output_dir.path(), 2.0);
    let plan = pipeline::plan(&request, 5).expect("Plan should succeed");

    let rel: Vec<PathBuf> = plan.jobs.iter().map(|j| j.relative_path.clone()).collect();
    assert_eq!(rel, vec![PathBuf::from("a.mp3"), PathBuf::from("sub/b.wav")]);
    assert_eq!(plan.chain.to_filter_expression().as_deref(), Some("atempo=2.0000"));

    // destRoot + relativePath reconstructs the mirrored location
    for job in &plan.jobs {
        assert_eq!(job.output_path, output_dir.path().join(&job.relative_path));
    }
}

#[test]
fn test_report_written_after_run() {
    let input_dir = reference_tree();
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let report_path = output_dir.path().join("report.json");

    let mut settings = create_test_settings(input_dir.path(), &output_dir.path().join("out"), 3.0);
    settings.ffmpeg = PathBuf::from("/nonexistent/speedshift-test/ffmpeg");

    let started_at = chrono::Utc::now();
    let outcome = pipeline::run(&settings, &mut CollectingObserver::new());
    let report = BatchReport::new(
        &settings.request(),
        Some("atempo=2.0000,atempo=1.5000".to_string()),
        &outcome,
        started_at,
    );
    export::write_report(&report, &report_path).expect("Report should be written");

    let json_content = fs::read_to_string(&report_path).expect("Failed to read JSON");
    let json: serde_json::Value =
        serde_json::from_str(&json_content).expect("Should be valid JSON");

    assert_eq!(json["outcome"], "partial_failure");
    assert_eq!(json["total"], 2);
    assert_eq!(json["succeeded"], 0);
    assert_eq!(json["speed"], 3.0);
    let failures = json["failures"].as_array().expect("failures array");
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().all(|f| f.get("path").is_some() && f.get("message").is_some()));
}

/// Run the built binary and return (exit code, stdout + stderr)
fn run_cli(args: &[&OsStr]) -> (Option<i32>, String) {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_speedshift"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("speedshift binary runs");
    let text = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output.status.code(), text)
}

#[test]
fn test_cli_prints_fatal_error_once() {
    let input_dir = reference_tree();
    let output_dir = TempDir::new().expect("Failed to create output temp dir");

    let (code, text) = run_cli(&[
        OsStr::new("-q"),
        OsStr::new("-s"),
        OsStr::new("0"),
        OsStr::new("-i"),
        input_dir.path().as_os_str(),
        OsStr::new("-o"),
        output_dir.path().as_os_str(),
    ]);

    assert_eq!(code, Some(1));
    assert_eq!(text.matches("Fatal error:").count(), 1, "output was: {text}");
}

#[test]
fn test_cli_reports_empty_directory_once() {
    let input_dir = TempDir::new().expect("Failed to create input temp dir");
    let output_dir = TempDir::new().expect("Failed to create output temp dir");
    let dest = output_dir.path().join("out");

    let (code, text) = run_cli(&[
        OsStr::new("-q"),
        OsStr::new("-i"),
        input_dir.path().as_os_str(),
        OsStr::new("-o"),
        dest.as_os_str(),
    ]);

    assert_eq!(code, Some(0));
    assert_eq!(text.matches("No audio files found").count(), 1, "output was: {text}");
    assert!(!dest.exists());
}
