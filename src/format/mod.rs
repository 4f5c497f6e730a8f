//! Vendor track formats
//!
//! Each supported logger layout gets a [`TrackAdapter`] that maps its CSV
//! records to canonical [`InputRow`]s and back. The original record rides
//! along as the row's `source`, so exported files keep every vendor column
//! untouched and only gain the phase columns.

pub mod flysight;
pub mod flysight2;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::iter::Peekable;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::config::DetectionConfig;
use crate::conversion::{down_to_up, format_phase, format_point, parse_finite, parse_timestamp};
use crate::detection::PhaseStream;
use crate::error::{Error, Result};
use crate::types::{FlightSummary, GeoVector, InputRow, OutputRow};

pub use flysight::FlySightAdapter;
pub use flysight2::FlySight2Adapter;

/// Columns appended to every exported track
pub const PHASE_COLUMNS: [&str; 10] = [
    "flight_phase",
    "takeoff_index",
    "takeoff_altitude",
    "freefall_index",
    "freefall_altitude",
    "canopy_index",
    "canopy_altitude",
    "landing_index",
    "landing_altitude",
    "last_point",
];

/// Units for [`PHASE_COLUMNS`], for formats that carry a units row
pub const PHASE_UNITS: [&str; 10] = ["", "", "(m)", "", "(m)", "", "(m)", "", "(m)", ""];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackFormat {
    /// Pick the format from the first line of the file
    #[default]
    Auto,
    /// FlySight 1: one header row, one units row, then data
    FlySight,
    /// FlySight 2 `TRACK.CSV` with a `$`-tagged preamble
    FlySight2,
}

impl TrackFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackFormat::Auto => "auto",
            TrackFormat::FlySight => "flysight",
            TrackFormat::FlySight2 => "flysight2",
        }
    }

    /// Guess the format from a file's first record
    pub fn detect(first: &StringRecord) -> Option<TrackFormat> {
        match first.get(0).map(str::trim) {
            Some("$FLYS") => Some(TrackFormat::FlySight2),
            Some("time") => Some(TrackFormat::FlySight),
            _ => None,
        }
    }
}

impl fmt::Display for TrackFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(TrackFormat::Auto),
            "flysight" | "flysight1" => Ok(TrackFormat::FlySight),
            "flysight2" => Ok(TrackFormat::FlySight2),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Conversion between one vendor layout and canonical rows
pub trait TrackAdapter: fmt::Debug {
    fn format(&self) -> TrackFormat;

    /// Canonical row for a data record, `None` for records that carry no fix
    fn to_row(&self, record: &StringRecord, line: u64) -> Result<Option<InputRow<StringRecord>>>;

    /// Records written ahead of the data when exporting
    fn header(&self) -> Vec<StringRecord>;

    /// The original record followed by the phase columns
    fn from_row(&self, row: &OutputRow<StringRecord>) -> StringRecord {
        let mut record = row.source.clone();
        record.extend(phase_cells(row));
        record
    }
}

/// Phase column values for one annotated row, in [`PHASE_COLUMNS`] order
pub fn phase_cells<S>(row: &OutputRow<S>) -> Vec<String> {
    let mut cells = Vec::with_capacity(PHASE_COLUMNS.len());
    cells.push(format_phase(row.phase).to_string());
    for point in [row.takeoff, row.freefall, row.canopy, row.landing] {
        let (index, altitude) = format_point(point);
        cells.push(index);
        cells.push(altitude);
    }
    cells.push(row.last_point.to_string());
    cells
}

/// Positions of the GNSS fields the detector needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GnssColumns {
    pub time: usize,
    pub altitude: usize,
    pub vel_north: usize,
    pub vel_east: usize,
    pub vel_down: usize,
}

impl GnssColumns {
    /// Locate the columns in `names`, whose first field sits at record position `offset`
    pub fn from_names<'a, I>(names: I, offset: usize) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<&str> = names.into_iter().map(str::trim).collect();
        let find = |name: &str| {
            names
                .iter()
                .position(|candidate| *candidate == name)
                .map(|index| index + offset)
                .ok_or_else(|| Error::InvalidHeader(format!("missing column '{name}'")))
        };

        Ok(Self {
            time: find("time")?,
            altitude: find("hMSL")?,
            vel_north: find("velN")?,
            vel_east: find("velE")?,
            vel_down: find("velD")?,
        })
    }

    /// Records shorter than this were cut off mid-write
    pub fn min_len(&self) -> usize {
        [self.time, self.altitude, self.vel_north, self.vel_east, self.vel_down]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Read one canonical row out of `record`
    pub fn parse(&self, record: &StringRecord, line: u64) -> Result<InputRow<StringRecord>> {
        let field = |index: usize| record.get(index).unwrap_or("");
        let number = |index: usize, name: &str| {
            parse_finite(field(index)).ok_or_else(|| {
                Error::parse(line, format!("{name} is not a finite number: '{}'", field(index)))
            })
        };

        let time = parse_timestamp(field(self.time)).ok_or_else(|| {
            Error::parse(line, format!("invalid timestamp '{}'", field(self.time)))
        })?;
        let altitude = number(self.altitude, "hMSL")?;
        let velocity = GeoVector::new(
            number(self.vel_north, "velN")?,
            number(self.vel_east, "velE")?,
            down_to_up(number(self.vel_down, "velD")?),
        );

        Ok(InputRow::new(time, altitude, velocity, record.clone()))
    }
}

/// Short record left by a logger that lost power mid-write
pub(crate) fn is_truncated(record: &StringRecord, columns: &GnssColumns, line: u64) -> bool {
    if record.len() < columns.min_len() {
        warn!(line, fields = record.len(), "skipping truncated record");
        return true;
    }
    false
}

/// A parsed track file
#[derive(Debug)]
pub struct Track {
    pub format: TrackFormat,
    pub adapter: Box<dyn TrackAdapter>,
    pub rows: Vec<InputRow<StringRecord>>,
}

impl Track {
    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.rows.iter().map(|row| row.time).collect()
    }

    /// Run phase detection over every row
    pub fn annotate(self, name: impl Into<String>, config: &DetectionConfig) -> AnnotatedTrack {
        let times = self.times();
        let mut stream = PhaseStream::new(self.rows, *config);
        let rows: Vec<OutputRow<StringRecord>> = stream.by_ref().collect();
        let summary = FlightSummary::from_track(
            name,
            self.format.as_str(),
            &times,
            rows.last(),
            stream.corrections(),
        );

        AnnotatedTrack {
            adapter: self.adapter,
            rows,
            summary,
        }
    }
}

/// A track after detection, ready for export
#[derive(Debug)]
pub struct AnnotatedTrack {
    pub adapter: Box<dyn TrackAdapter>,
    pub rows: Vec<OutputRow<StringRecord>>,
    pub summary: FlightSummary,
}

/// Load a track file
pub fn read_track(path: &Path, format: TrackFormat) -> Result<Track> {
    let file = File::open(path)?;
    read_track_from(BufReader::new(file), format)
}

/// Load a track from any reader
pub fn read_track_from<R: Read>(reader: R, format: TrackFormat) -> Result<Track> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = reader.records().peekable();

    let format = match format {
        TrackFormat::Auto => sniff(&mut records)?,
        explicit => explicit,
    };
    let adapter: Box<dyn TrackAdapter> = match format {
        TrackFormat::FlySight => Box::new(FlySightAdapter::from_records(&mut records)?),
        TrackFormat::FlySight2 => Box::new(FlySight2Adapter::from_records(&mut records)?),
        TrackFormat::Auto => return Err(Error::UnsupportedFormat("auto".to_string())),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);
        if let Some(row) = adapter.to_row(&record, line)? {
            rows.push(row);
        }
    }
    debug!(format = %format, rows = rows.len(), "track loaded");

    Ok(Track {
        format,
        adapter,
        rows,
    })
}

fn sniff<I>(records: &mut Peekable<I>) -> Result<TrackFormat>
where
    I: Iterator<Item = csv::Result<StringRecord>>,
{
    match records.peek() {
        None => Err(Error::InvalidHeader("track file is empty".to_string())),
        Some(Err(_)) => match records.next() {
            Some(Err(err)) => Err(err.into()),
            _ => Err(Error::InvalidHeader("unreadable first line".to_string())),
        },
        Some(Ok(first)) => TrackFormat::detect(first).ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "unrecognised first field '{}'",
                first.get(0).unwrap_or("")
            ))
        }),
    }
}

/// Take the next record, failing with `what` when the input ends first
pub(crate) fn next_record<I>(records: &mut Peekable<I>, what: &str) -> Result<StringRecord>
where
    I: Iterator<Item = csv::Result<StringRecord>>,
{
    match records.next() {
        Some(record) => Ok(record?),
        None => Err(Error::InvalidHeader(format!("file ends before {what}"))),
    }
}
