//! Integration tests for the command-line tool
#![cfg(feature = "cli")]

mod common;

use common::*;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skydive-phases"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run skydive-phases")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

/// A card with one jump, one ground recording and a stray file
fn write_card(root: &Path) {
    fs::write(root.join("10-00-00.CSV"), flysight_csv(&synthetic_jump())).unwrap();
    let ground: Vec<Sample> = synthetic_jump().into_iter().take(300).collect();
    fs::write(root.join("09-00-00.CSV"), flysight_csv(&ground)).unwrap();
    fs::write(root.join("CONFIG.TXT"), "Model: 6\n").unwrap();
}

#[test]
fn test_directory_run_exports_jumps_only() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let card = temp_dir.path().join("card");
    let out = temp_dir.path().join("out");
    fs::create_dir_all(&card).unwrap();
    write_card(&card);

    let output = run(&[
        "--output-dir",
        path_arg(&out),
        "--json",
        path_arg(&card),
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert!(stdout.contains("Processing:"));
    assert!(stdout.contains(&format!("Freefall  sample {FREEFALL_INDEX}")), "{stdout}");
    assert!(stdout.contains("Skipped export"), "{stdout}");

    assert!(out.join("10-00-00.phases.csv").exists());
    assert!(out.join("10-00-00.phases.json").exists());
    assert!(!out.join("09-00-00.phases.csv").exists());
    assert!(!out.join("CONFIG.phases.csv").exists());
}

#[test]
fn test_force_export_writes_ground_tracks() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_card(temp_dir.path());

    let output = run(&["--force-export", "--quiet", path_arg(temp_dir.path())]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "--quiet should print nothing");
    assert!(temp_dir.path().join("09-00-00.phases.csv").exists());
    assert!(temp_dir.path().join("10-00-00.phases.csv").exists());
}

#[test]
fn test_glob_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_card(temp_dir.path());
    let pattern = format!("{}/10-*.CSV", path_arg(temp_dir.path()));

    let output = run(&[&pattern]);
    assert!(output.status.success());
    assert!(temp_dir.path().join("10-00-00.phases.csv").exists());
    assert!(!temp_dir.path().join("09-00-00.phases.csv").exists());
}

#[test]
fn test_config_file_changes_thresholds() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let track = temp_dir.path().join("10-00-00.CSV");
    fs::write(&track, flysight_csv(&synthetic_jump())).unwrap();
    // Nothing in the track descends faster than 50 m/s
    let config = temp_dir.path().join("slow.toml");
    fs::write(
        &config,
        "freefall_vertical_speed = 60.0\ncanopy_vertical_speed = 70.0\n\n[peak]\nlag = 20\n",
    )
    .unwrap();

    let output = run(&["--config", path_arg(&config), path_arg(&track)]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Freefall  not detected"), "{stdout}");
    assert!(!temp_dir.path().join("10-00-00.phases.csv").exists());
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let track = temp_dir.path().join("10-00-00.CSV");
    fs::write(&track, flysight_csv(&synthetic_jump())).unwrap();
    let config = temp_dir.path().join("bad.toml");
    fs::write(&config, "smoothing_window_size = 0\n").unwrap();

    let output = run(&["--config", path_arg(&config), path_arg(&track)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("smoothing_window_size"));
}

#[test]
fn test_nothing_processed_exits_with_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let broken = temp_dir.path().join("11-00-00.CSV");
    fs::write(&broken, "garbage,here\n1,2\n").unwrap();

    let output = run(&[path_arg(&broken)]);
    assert_eq!(output.status.code(), Some(1));

    let empty = temp_dir.path().join("empty");
    fs::create_dir_all(&empty).unwrap();
    let output = run(&[path_arg(&empty)]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_no_arguments_prints_help() {
    let output = run(&[]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--force-export"));
}

#[test]
fn test_explicit_format() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let track = temp_dir.path().join("TRACK.CSV");
    fs::write(&track, flysight2_csv(&synthetic_jump())).unwrap();

    let output = run(&["--format", "flysight", path_arg(&track)]);
    assert_eq!(output.status.code(), Some(1), "FlySight 2 file read as FlySight 1");

    let output = run(&["--format", "flysight2", path_arg(&track)]);
    assert!(output.status.success());
}
