//! Synthetic skydive shared by the integration tests
//!
//! 0.2 s sampling: on the ground, a climb to altitude, level flight to the
//! exit, about 20 s of freefall, an opening, a canopy descent and a landing.
#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use skydive_phases::{GeoVector, InputRow};

pub const SAMPLE_MILLIS: i64 = 200;
pub const SAMPLE_COUNT: usize = 1030;

pub const TAKEOFF_INDEX: usize = 51;
pub const FREEFALL_INDEX: usize = 711;
pub const CANOPY_INDEX: usize = 836;
pub const LANDING_INDEX: usize = 971;

/// First sample at which each phase is reported
pub const TAKEOFF_CONFIRMED: usize = 55;
pub const FREEFALL_CONFIRMED: usize = 717;
pub const CANOPY_CONFIRMED: usize = 837;
pub const LANDING_CONFIRMED: usize = 980;

/// Sample index inside freefall used for spike tests
pub const SPIKE_INDEX: usize = 780;

#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub millis: i64,
    pub altitude: f64,
    pub north: f64,
    /// Positive up
    pub vertical: f64,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

pub fn synthetic_jump() -> Vec<Sample> {
    let mut samples = Vec::with_capacity(SAMPLE_COUNT);
    let mut altitude = 100.0;
    let mut add = |vertical: f64, north: f64| {
        let millis = samples.len() as i64 * SAMPLE_MILLIS;
        samples.push(Sample {
            millis,
            altitude,
            north,
            vertical,
        });
        altitude += vertical * 0.2;
    };

    for _ in 0..50 {
        add(0.0, 0.0);
    }
    for i in 1..=20 {
        add(0.5 * i as f64, 2.0 * i as f64);
    }
    for _ in 0..600 {
        add(10.0, 40.0);
    }
    for i in 1..=20 {
        add(10.0 - 0.5 * i as f64, 40.0);
    }
    for _ in 0..20 {
        add(0.0, 40.0);
    }
    for i in 1..=25 {
        add(-2.0 * i as f64, 40.0 - 1.2 * i as f64);
    }
    for _ in 0..100 {
        add(-50.0, 10.0);
    }
    for i in 1..=10 {
        add(-50.0 + 4.5 * i as f64, 10.0);
    }
    for _ in 0..120 {
        add(-5.0, 10.0);
    }
    for i in 1..=5 {
        add(-5.0 + 1.0 * i as f64, 10.0 - 2.0 * i as f64);
    }
    for _ in 0..60 {
        add(0.0, 0.0);
    }
    samples
}

/// Same jump with one freefall sample reading far too slow
pub fn synthetic_jump_with_spike() -> Vec<Sample> {
    let mut samples = synthetic_jump();
    samples[SPIKE_INDEX].vertical = -10.0;
    samples
}

pub fn to_rows(samples: &[Sample]) -> Vec<InputRow<usize>> {
    samples
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            InputRow::new(
                start_time() + TimeDelta::milliseconds(sample.millis),
                sample.altitude,
                GeoVector::new(sample.north, 0.0, sample.vertical),
                index,
            )
        })
        .collect()
}

/// FlySight 1 `HH-MM-SS.CSV` rendering
pub fn flysight_csv(samples: &[Sample]) -> String {
    let mut text = String::from(
        "time,lat,lon,hMSL,velN,velE,velD,hAcc,vAcc,sAcc,heading,cAcc,gpsFix,numSV\n\
         ,(deg),(deg),(m),(m/s),(m/s),(m/s),(m),(m),(m/s),(deg),(deg),,\n",
    );
    for sample in samples {
        let time = start_time() + TimeDelta::milliseconds(sample.millis);
        text.push_str(&format!(
            "{}.{:02}Z,33.6301234,-117.2101234,{:.3},{:.2},0.00,{:.2},3.105,5.240,0.41,88.00,1.20,3,11\n",
            time.format("%Y-%m-%dT%H:%M:%S"),
            time.timestamp_subsec_millis() / 10,
            sample.altitude,
            sample.north,
            0.0 - sample.vertical,
        ));
    }
    text
}

/// FlySight 2 `TRACK.CSV` rendering
pub fn flysight2_csv(samples: &[Sample]) -> String {
    let mut text = String::from(
        "$FLYS,1\n\
         $VAR,FIRMWARE_VER,v2023.09.22\n\
         $VAR,DEVICE_ID,003e0038484e501420353131\n\
         $VAR,SESSION_ID,c4d1f08a2e5b7c9d\n\
         $COL,GNSS,time,lat,lon,hMSL,velN,velE,velD,hAcc,vAcc,sAcc,numSV\n\
         $UNIT,GNSS,,deg,deg,m,m/s,m/s,m/s,m,m,m/s,\n\
         $DATA\n",
    );
    for sample in samples {
        let time = start_time() + TimeDelta::milliseconds(sample.millis);
        text.push_str(&format!(
            "$GNSS,{},52.1234567,5.1234567,{:.3},{:.3},0.000,{:.3},2.911,4.523,0.352,18\n",
            time.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            sample.altitude,
            sample.north,
            0.0 - sample.vertical,
        ));
    }
    text
}
