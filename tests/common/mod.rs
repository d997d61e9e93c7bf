#![allow(dead_code)]

use kn_rate_filter::{
    alerts::{Alert, DiffSign, HistoryEntry, HistorySeries},
    photometry::{MagnitudeCorrection, PhotometryPoint},
    FilterResult,
};

/// Correction that returns the raw magnitude, so tests control corrected values.
pub struct Raw;

impl MagnitudeCorrection for Raw {
    fn correct(&self, point: &PhotometryPoint) -> FilterResult<(f64, f64)> {
        Ok((point.magpsf, point.sigmapsf))
    }
}

pub const NOW_JD: f64 = 2_459_310.5;

pub fn entry(jd: f64, fid: i64, magpsf: Option<f64>) -> HistoryEntry {
    HistoryEntry {
        jd,
        fid,
        magpsf,
        sigmapsf: 0.05,
        magnr: 22.0,
        sigmagnr: 0.1,
        magzpsci: 26.2,
        isdiffpos: DiffSign::Positive,
    }
}

/// Alert passing every predicate cut, at high galactic latitude, whose
/// g-band history ends with `previous` then `last` one day apart.
pub fn kn_alert(object_id: &str, previous: f64, last: f64) -> Alert {
    Alert {
        object_id: object_id.to_string(),
        rfscore: 0.2,
        snn_snia_vs_nonia: 0.3,
        snn_sn_vs_all: 0.4,
        drb: 0.95,
        classtar: 0.5,
        jdstarthist: NOW_JD - 5.0,
        ndethist: Some(5),
        cdsxmatch: Some("Unknown".to_string()),
        // Close to the north galactic pole.
        ra: 192.86,
        dec: 27.13,
        ssdistnr: -999.0,
        history: HistorySeries::new(vec![
            entry(NOW_JD - 1.0, 1, Some(previous)),
            entry(NOW_JD, 1, Some(last)),
        ]),
    }
}
