//! Export of annotated tracks
//!
//! CSV export rewrites the input file with the phase columns appended to
//! every record; JSON export writes the per-track [`FlightSummary`].

#[cfg(any(feature = "csv", feature = "json"))]
use std::fs::File;
#[cfg(feature = "json")]
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "csv")]
use csv::WriterBuilder;
#[cfg(any(feature = "csv", feature = "json"))]
use tracing::info;
#[cfg(feature = "csv")]
use tracing::warn;

#[cfg(any(feature = "csv", feature = "json"))]
use crate::error::Error;
use crate::error::Result;
#[cfg(feature = "csv")]
use crate::filters::should_skip_export;
#[cfg(feature = "csv")]
use crate::format::AnnotatedTrack;
#[cfg(feature = "json")]
use crate::types::FlightSummary;

/// FlySight 2 names every track file like this, one per session directory
const GENERIC_TRACK_STEM: &str = "TRACK";

/// Export options for controlling output formats
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub csv: bool,
    pub json: bool,
    pub output_dir: Option<String>,
    /// Export tracks the filters would otherwise skip
    pub force_export: bool,
}

/// What an export run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    pub csv_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
    /// Why nothing was written, when the track was filtered out
    pub skipped: Option<String>,
}

impl ExportReport {
    pub fn written(&self) -> impl Iterator<Item = &PathBuf> {
        self.csv_path.iter().chain(self.json_path.iter())
    }
}

/// Output paths `(csv, json)` for `input_path`
///
/// Files land in `output_dir` when set, next to the input otherwise. A
/// generic `TRACK` stem is prefixed with its parent directory name so that
/// tracks from different sessions don't overwrite each other.
pub fn compute_export_paths(input_path: &Path, options: &ExportOptions) -> (PathBuf, PathBuf) {
    let parent = input_path.parent().filter(|p| !p.as_os_str().is_empty());
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("track");

    let base_name = match parent.and_then(|p| p.file_name()).and_then(|n| n.to_str()) {
        Some(session) if stem.eq_ignore_ascii_case(GENERIC_TRACK_STEM) => {
            format!("{session}_{stem}")
        }
        _ => stem.to_string(),
    };

    let output_dir = match options.output_dir.as_deref() {
        Some(dir) => PathBuf::from(dir),
        None => parent.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(".")),
    };

    (
        output_dir.join(format!("{base_name}.phases.csv")),
        output_dir.join(format!("{base_name}.phases.json")),
    )
}

#[cfg(any(feature = "csv", feature = "json"))]
fn create_output(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    File::create(path).map_err(|err| Error::Export {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Write the track with phase columns appended
#[cfg(feature = "csv")]
pub fn export_to_csv(
    track: &AnnotatedTrack,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<Option<PathBuf>> {
    if !export_options.csv {
        return Ok(None);
    }
    let (csv_path, _) = compute_export_paths(input_path, export_options);

    let file = create_output(&csv_path)?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(file);
    for record in track.adapter.header() {
        writer.write_record(&record)?;
    }
    for row in &track.rows {
        writer.write_record(&track.adapter.from_row(row))?;
    }
    writer.flush()?;

    info!(path = %csv_path.display(), rows = track.rows.len(), "exported phases CSV");
    Ok(Some(csv_path))
}

/// Write the flight summary as pretty-printed JSON
#[cfg(feature = "json")]
pub fn export_to_json(
    summary: &FlightSummary,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<Option<PathBuf>> {
    if !export_options.json {
        return Ok(None);
    }
    let (_, json_path) = compute_export_paths(input_path, export_options);

    let mut writer = BufWriter::new(create_output(&json_path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    writer.flush()?;

    info!(path = %json_path.display(), "exported flight summary");
    Ok(Some(json_path))
}

/// Apply the export filters, then write every requested output
#[cfg(feature = "csv")]
pub fn export_track(
    track: &AnnotatedTrack,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<ExportReport> {
    let (skip, reason) = should_skip_export(&track.summary, export_options.force_export);
    if skip {
        warn!(track = %track.summary.name, %reason, "skipping export");
        return Ok(ExportReport {
            skipped: Some(reason),
            ..ExportReport::default()
        });
    }

    let csv_path = export_to_csv(track, input_path, export_options)?;
    #[cfg(feature = "json")]
    let json_path = export_to_json(&track.summary, input_path, export_options)?;
    #[cfg(not(feature = "json"))]
    let json_path = None;

    Ok(ExportReport {
        csv_path,
        json_path,
        skipped: None,
    })
}
