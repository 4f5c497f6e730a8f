use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use glob::glob;
use regex::Regex;
use skydive_phases::{
    export_track, init_logging, read_track, DetectionConfig, ExportOptions, ExportReport,
    FlightPoint, FlightSummary, TrackFormat, Verbosity,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, error, warn};

/// Maximum recursion depth to prevent stack overflow
const MAX_RECURSION_DEPTH: usize = 100;

/// Track files as FlySight names them: `HH-MM-SS.CSV` (FlySight 1) or `TRACK.CSV` (FlySight 2)
const TRACK_FILE_PATTERN: &str = r"(?i)^(\d{2}-\d{2}-\d{2}|track)\.csv$";

fn long_version() -> &'static str {
    static LONG_VERSION: OnceLock<String> = OnceLock::new();
    LONG_VERSION.get_or_init(|| {
        format!(
            "{} (git {} {})",
            env!("CARGO_PKG_VERSION"),
            option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
            option_env!("VERGEN_GIT_COMMIT_DATE").unwrap_or("unknown"),
        )
    })
}

/// Expand input paths to a list of track files.
/// If a path is a file, add it directly (filtered later for a CSV extension).
/// If a path is a directory, recursively find FlySight track files within it.
/// If a path contains glob patterns, expand them first.
fn expand_input_paths(
    input_paths: &[String],
    track_files: &Regex,
    visited: &mut HashSet<PathBuf>,
) -> Result<Vec<PathBuf>> {
    expand_input_paths_with_depth(input_paths, track_files, visited, 0)
}

fn expand_input_paths_with_depth(
    input_paths: &[String],
    track_files: &Regex,
    visited: &mut HashSet<PathBuf>,
    depth: usize,
) -> Result<Vec<PathBuf>> {
    if depth > MAX_RECURSION_DEPTH {
        anyhow::bail!("Maximum recursion depth exceeded ({})", MAX_RECURSION_DEPTH);
    }
    let mut files = Vec::new();

    for input_path_str in input_paths {
        if input_path_str.contains('*') || input_path_str.contains('?') {
            let paths = glob(input_path_str)
                .with_context(|| format!("Invalid glob pattern '{input_path_str}'"))?
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("Error expanding glob pattern '{input_path_str}'"))?;
            for path in paths {
                if let Some(path_str) = path.to_str() {
                    files.extend(expand_input_paths_with_depth(
                        &[path_str.to_string()],
                        track_files,
                        visited,
                        depth + 1,
                    )?);
                }
            }
            continue;
        }

        let input_path = Path::new(input_path_str);
        match input_path.canonicalize() {
            Ok(canonical_path) if canonical_path.is_file() => files.push(canonical_path),
            Ok(canonical_path) if canonical_path.is_dir() => {
                files.extend(find_track_files_in_dir_with_depth(
                    &canonical_path,
                    track_files,
                    visited,
                    depth + 1,
                )?);
            }
            Ok(_) => warn!("Path not found or not accessible: {input_path_str}"),
            Err(e) => warn!("Failed to canonicalize path '{input_path_str}': {e}"),
        }
    }

    Ok(files)
}

/// Recursively find track files in a directory, protecting against symlink cycles and depth overflow
fn find_track_files_in_dir_with_depth(
    dir_path: &Path,
    track_files: &Regex,
    visited: &mut HashSet<PathBuf>,
    depth: usize,
) -> Result<Vec<PathBuf>> {
    if depth > MAX_RECURSION_DEPTH {
        anyhow::bail!(
            "Maximum recursion depth exceeded in directory traversal ({})",
            MAX_RECURSION_DEPTH
        );
    }
    let mut files = Vec::new();

    let canonical_dir = match dir_path.canonicalize() {
        Ok(dir) => dir,
        Err(e) => {
            warn!("Failed to canonicalize directory '{}': {e}", dir_path.display());
            return Ok(files);
        }
    };
    if !visited.insert(canonical_dir.clone()) || !canonical_dir.is_dir() {
        return Ok(files);
    }

    let entries = match fs::read_dir(&canonical_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read directory '{}': {e}", canonical_dir.display());
            return Ok(files);
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(
                    "Cannot read entry in directory '{}': {e}",
                    canonical_dir.display()
                );
                continue;
            }
        };
        let canonical_path = match path.canonicalize() {
            Ok(canonical_path) => canonical_path,
            Err(e) => {
                warn!("Failed to canonicalize path '{}': {e}", path.display());
                continue;
            }
        };

        if canonical_path.is_dir() {
            files.extend(find_track_files_in_dir_with_depth(
                &canonical_path,
                track_files,
                visited,
                depth + 1,
            )?);
        } else if canonical_path.is_file() && !visited.contains(&canonical_path) {
            let is_track = canonical_path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| track_files.is_match(name));
            if is_track {
                visited.insert(canonical_path.clone());
                files.push(canonical_path);
            }
        }
    }

    // Sort the files for consistent ordering
    files.sort();
    Ok(files)
}

fn build_command() -> Command {
    Command::new("Skydive Phases")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version())
        .about("Detect takeoff, freefall, canopy and landing in FlySight tracks. Writes an annotated CSV next to each track (optionally a JSON summary).")
        .arg(
            Arg::new("files")
                .help("Track files or directories. Direct file paths: any .CSV file. Directories: recursively finds FlySight track files (HH-MM-SS.CSV, TRACK.CSV). Case-insensitive, supports globbing.")
                .required(false)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output; repeat for per-sample trace output")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only report errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for output files (default: same as input file)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Also write a JSON flight summary per track")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("force-export")
                .long("force-export")
                .help("Export every track, including ones with no detected freefall or shorter than 30s")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Track file format")
                .value_name("FORMAT")
                .value_parser(["auto", "flysight", "flysight2"])
                .default_value("auto"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML file with detection settings (SKYDIVE_* environment variables override it)")
                .value_name("FILE"),
        )
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();

    let debug = matches.get_count("debug");
    let quiet = matches.get_flag("quiet");
    init_logging(Verbosity::from_flags(debug, quiet));

    // Check if no files were provided and show help
    let file_patterns: Vec<String> = match matches.get_many::<String>("files") {
        Some(files) => files.cloned().collect(),
        None => {
            build_command().print_help()?;
            println!();
            return Ok(());
        }
    };

    let format: TrackFormat = matches
        .get_one::<String>("format")
        .map(|name| name.parse())
        .transpose()?
        .unwrap_or_default();
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let config = DetectionConfig::load_from(config_path.as_deref())
        .context("Failed to load detection settings")?;

    let export_options = ExportOptions {
        csv: true, // CSV export is always enabled for the CLI binary
        json: matches.get_flag("json"),
        output_dir: matches.get_one::<String>("output-dir").cloned(),
        force_export: matches.get_flag("force-export"),
    };

    debug!("Input patterns: {file_patterns:?}");

    let track_files = Regex::new(TRACK_FILE_PATTERN)?;
    let mut visited = HashSet::new();
    let input_files = match expand_input_paths(&file_patterns, &track_files, &mut visited) {
        Ok(files) => files,
        Err(e) => {
            error!("Error expanding input paths: {e:#}");
            std::process::exit(1);
        }
    };

    let valid_paths: Vec<PathBuf> = input_files
        .into_iter()
        .filter(|path| {
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if !is_csv {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("none");
                warn!("Skipping file with unsupported extension '{ext}': {path:?}");
            }
            is_csv
        })
        .collect();

    if valid_paths.is_empty() {
        error!("No track files found in the specified input paths: {file_patterns:?}");
        std::process::exit(1);
    }
    debug!("Found {} track files to process", valid_paths.len());

    let mut processed_files = 0;
    for (index, path) in valid_paths.iter().enumerate() {
        if index > 0 && !quiet {
            println!();
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        if !quiet {
            println!("Processing: {}", path.display());
        }

        match process_track_file(path, format, &config, &export_options, quiet) {
            Ok(_) => processed_files += 1,
            Err(e) if is_malformed_track(&e) => {
                warn!("Skipping {filename}, not a readable track: {e:#}");
            }
            Err(e) => {
                error!("Error processing {filename}: {e:#}");
                eprintln!("Continuing with next file...");
            }
        }
    }

    if processed_files == 0 {
        error!(
            "No files were successfully processed out of {} files found. Use --debug for details.",
            valid_paths.len()
        );
        std::process::exit(1);
    }

    Ok(())
}

fn process_track_file(
    path: &Path,
    format: TrackFormat,
    config: &DetectionConfig,
    export_options: &ExportOptions,
    quiet: bool,
) -> Result<ExportReport> {
    let track = read_track(path, format)
        .with_context(|| format!("Failed to read track {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("track")
        .to_string();

    let annotated = track.annotate(name, config);
    if !quiet {
        display_summary(&annotated.summary);
    }

    let report = export_track(&annotated, path, export_options)
        .with_context(|| format!("Failed to export {}", path.display()))?;
    if !quiet {
        if let Some(reason) = &report.skipped {
            println!("  Skipped export: {reason}");
        }
        for written in report.written() {
            println!("  Exported: {}", written.display());
        }
    }
    Ok(report)
}

/// True when the file itself is bad, as opposed to an I/O or export failure
fn is_malformed_track(err: &anyhow::Error) -> bool {
    err.downcast_ref::<skydive_phases::Error>()
        .is_some_and(skydive_phases::Error::is_input_error)
}

fn display_summary(summary: &FlightSummary) {
    println!(
        "  Format: {}, {} samples, {:.1}s",
        summary.format,
        summary.samples,
        summary.duration_seconds()
    );
    for (label, point) in [
        ("Takeoff", summary.events.takeoff),
        ("Freefall", summary.events.freefall),
        ("Canopy", summary.events.canopy),
        ("Landing", summary.events.landing),
    ] {
        println!("  {label:<9} {}", describe_point(point));
    }
    if let Some(seconds) = summary.freefall_seconds {
        println!("  Freefall time: {seconds:.1}s");
    }
    if summary.despiked_samples > 0 {
        println!("  Despiked samples: {}", summary.despiked_samples);
    }
}

fn describe_point(point: Option<FlightPoint>) -> String {
    match point {
        Some(point) => format!("sample {} at {:.1} m", point.index, point.altitude),
        None => "not detected".to_string(),
    }
}
