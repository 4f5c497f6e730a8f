//! FlySight 2 `TRACK.CSV` files
//!
//! A `$`-tagged preamble describes the columns of each record type and ends
//! at `$DATA`. Only `$GNSS` records carry position fixes.
//!
//! ```text
//! $FLYS,1
//! $VAR,FIRMWARE_VER,v2023.09.22
//! $COL,GNSS,time,lat,lon,hMSL,velN,velE,velD,hAcc,vAcc,sAcc,numSV
//! $UNIT,GNSS,,deg,deg,m,m/s,m/s,m/s,m,m,m/s,
//! $DATA
//! $GNSS,2023-10-15T17:05:52.400Z,52.1,5.1,45.123,0.1,0.2,-0.1,3.1,4.2,0.3,12
//! ```

use std::iter::Peekable;

use csv::StringRecord;
use tracing::trace;

use crate::error::{Error, Result};
use crate::format::{is_truncated, next_record, GnssColumns, TrackAdapter, TrackFormat};
use crate::format::{PHASE_COLUMNS, PHASE_UNITS};
use crate::types::InputRow;

const MAGIC: &str = "$FLYS";
const COLUMNS_TAG: &str = "$COL";
const UNITS_TAG: &str = "$UNIT";
const DATA_TAG: &str = "$DATA";
const GNSS: &str = "GNSS";
const GNSS_TAG: &str = "$GNSS";

/// Fields ahead of the column values in `$COL`, `$UNIT` and data records
const FIELD_OFFSET: usize = 2;
const DATA_OFFSET: usize = 1;

#[derive(Debug, Clone)]
pub struct FlySight2Adapter {
    columns: GnssColumns,
    preamble: Vec<StringRecord>,
}

impl FlySight2Adapter {
    /// Consume the preamble up to and including `$DATA`
    pub fn from_records<I>(records: &mut Peekable<I>) -> Result<Self>
    where
        I: Iterator<Item = csv::Result<StringRecord>>,
    {
        let magic = next_record(records, MAGIC)?;
        if magic.get(0) != Some(MAGIC) {
            return Err(Error::InvalidHeader(format!(
                "expected {MAGIC}, found '{}'",
                magic.get(0).unwrap_or("")
            )));
        }

        let mut preamble = vec![magic];
        let mut columns = None;
        loop {
            let record = next_record(records, DATA_TAG)?;
            let tag = record.get(0).unwrap_or("");
            if tag == COLUMNS_TAG && record.get(1) == Some(GNSS) {
                // Data records carry the tag but not the record type
                columns = Some(GnssColumns::from_names(
                    record.iter().skip(FIELD_OFFSET),
                    DATA_OFFSET,
                )?);
            }
            let done = tag == DATA_TAG;
            preamble.push(record);
            if done {
                break;
            }
        }

        let columns = columns
            .ok_or_else(|| Error::InvalidHeader(format!("no {COLUMNS_TAG},{GNSS} record")))?;
        Ok(Self { columns, preamble })
    }

    pub fn columns(&self) -> &GnssColumns {
        &self.columns
    }
}

impl TrackAdapter for FlySight2Adapter {
    fn format(&self) -> TrackFormat {
        TrackFormat::FlySight2
    }

    fn to_row(&self, record: &StringRecord, line: u64) -> Result<Option<InputRow<StringRecord>>> {
        if record.get(0) != Some(GNSS_TAG) {
            trace!(line, tag = record.get(0).unwrap_or(""), "skipping non-GNSS record");
            return Ok(None);
        }
        if is_truncated(record, &self.columns, line) {
            return Ok(None);
        }
        self.columns.parse(record, line).map(Some)
    }

    fn header(&self) -> Vec<StringRecord> {
        self.preamble
            .iter()
            .map(|record| {
                let mut record = record.clone();
                if record.get(1) == Some(GNSS) {
                    match record.get(0) {
                        Some(COLUMNS_TAG) => record.extend(PHASE_COLUMNS),
                        Some(UNITS_TAG) => record.extend(
                            PHASE_UNITS.map(|unit| unit.trim_matches(|c: char| c == '(' || c == ')')),
                        ),
                        _ => {}
                    }
                }
                record
            })
            .collect()
    }
}
