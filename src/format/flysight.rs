//! FlySight 1 track files
//!
//! ```text
//! time,lat,lon,hMSL,velN,velE,velD,hAcc,vAcc,sAcc,heading,cAcc,gpsFix,numSV
//! ,(deg),(deg),(m),(m/s),(m/s),(m/s),(m),(m),(m/s),(deg),(deg),,
//! 2019-04-20T17:42:05.40Z,33.63,-117.21,1210.512,1.20,-0.50,0.30,...
//! ```

use std::iter::Peekable;

use csv::StringRecord;

use crate::error::Result;
use crate::format::{is_truncated, next_record, GnssColumns, TrackAdapter, TrackFormat};
use crate::format::{PHASE_COLUMNS, PHASE_UNITS};
use crate::types::InputRow;

#[derive(Debug, Clone)]
pub struct FlySightAdapter {
    columns: GnssColumns,
    header: StringRecord,
    units: Option<StringRecord>,
}

impl FlySightAdapter {
    /// Consume the header row and, when present, the units row
    pub fn from_records<I>(records: &mut Peekable<I>) -> Result<Self>
    where
        I: Iterator<Item = csv::Result<StringRecord>>,
    {
        let header = next_record(records, "the header row")?;
        let columns = GnssColumns::from_names(header.iter(), 0)?;

        let has_units = matches!(
            records.peek(),
            Some(Ok(record)) if is_units_row(record, &columns)
        );
        let units = if has_units {
            Some(next_record(records, "the units row")?)
        } else {
            None
        };

        Ok(Self {
            columns,
            header,
            units,
        })
    }

    pub fn columns(&self) -> &GnssColumns {
        &self.columns
    }
}

fn is_units_row(record: &StringRecord, columns: &GnssColumns) -> bool {
    let time = record.get(columns.time).unwrap_or("").trim();
    time.is_empty() || time.starts_with('(')
}

impl TrackAdapter for FlySightAdapter {
    fn format(&self) -> TrackFormat {
        TrackFormat::FlySight
    }

    fn to_row(&self, record: &StringRecord, line: u64) -> Result<Option<InputRow<StringRecord>>> {
        if is_truncated(record, &self.columns, line) {
            return Ok(None);
        }
        self.columns.parse(record, line).map(Some)
    }

    fn header(&self) -> Vec<StringRecord> {
        let mut header = self.header.clone();
        header.extend(PHASE_COLUMNS);

        let mut records = vec![header];
        if let Some(units) = &self.units {
            let mut units = units.clone();
            units.extend(PHASE_UNITS);
            records.push(units);
        }
        records
    }
}
