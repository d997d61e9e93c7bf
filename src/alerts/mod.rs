//! Alert data model: one row of a survey batch and its photometric history.

pub mod columns;

use serde::{Deserialize, Serialize};

/// Sign of the image difference for one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffSign {
    /// Science minus reference is positive (`"t"`): the source brightened.
    Positive,
    /// Anything else, including subtraction artefacts.
    Negative,
}

impl DiffSign {
    pub fn parse(raw: &str) -> Self {
        if raw == "t" {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }
}

/// One photometric measurement in an alert's history.
///
/// Only the magnitude may be absent: upstream non-detections carry no
/// `magpsf` but still record the epoch and filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Observation time, Julian date.
    pub jd: f64,
    /// Filter id: 1 = g, 2 = r, 3 = i.
    pub fid: i64,
    pub magpsf: Option<f64>,
    pub sigmapsf: f64,
    pub magnr: f64,
    pub sigmagnr: f64,
    pub magzpsci: f64,
    pub isdiffpos: DiffSign,
}

/// Ordered history of an alert; the current measurement is the last entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    entries: Vec<HistoryEntry>,
}

impl HistorySeries {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The measurement that triggered the alert.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One alert of a batch, with its classifier scores and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub object_id: String,
    /// Early SN Ia score.
    pub rfscore: f64,
    /// SuperNNova: Ia SN vs non-Ia SN.
    pub snn_snia_vs_nonia: f64,
    /// SuperNNova: SN Ia and core-collapse vs non-SN events.
    pub snn_sn_vs_all: f64,
    /// Deep-learning real/bogus score.
    pub drb: f64,
    /// SExtractor star/galaxy score.
    pub classtar: f64,
    /// Earliest detection of the object, Julian date.
    pub jdstarthist: f64,
    /// Number of prior detections at 3 sigma; `None` when the alert carries none.
    pub ndethist: Option<i64>,
    /// SIMBAD cross-match label; `None` when the alert was not cross-matched.
    pub cdsxmatch: Option<String>,
    /// Right ascension, J2000 degrees.
    pub ra: f64,
    /// Declination, J2000 degrees.
    pub dec: f64,
    /// Distance to the nearest known solar-system object in arcsec, -999 if none.
    pub ssdistnr: f64,
    pub history: HistorySeries,
}

impl Alert {
    /// Julian date of the current measurement.
    pub fn current_jd(&self) -> Option<f64> {
        self.history.current().map(|entry| entry.jd)
    }

    /// Days elapsed between the first detection and the current measurement.
    pub fn days_since_first_detection(&self) -> Option<f64> {
        self.current_jd().map(|jd| jd - self.jdstarthist)
    }
}

/// Inputs of the supernova candidate predicate, one per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnRow {
    pub object_id: Option<String>,
    pub cdsxmatch: Option<String>,
    pub snn_snia_vs_nonia: f64,
    pub snn_sn_vs_all: f64,
    pub drb: f64,
    pub classtar: f64,
    /// Julian date of the alert.
    pub jd: f64,
    /// Julian date of the first detection of the object.
    pub jdstarthist: f64,
    /// Solar-system object flag; 3 marks a known minor planet.
    pub roid: Option<i64>,
    pub ndethist: Option<i64>,
}
