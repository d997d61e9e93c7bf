//! Magnitude-change rate between the two most recent same-filter detections.

use serde::Serialize;
use tracing::warn;

use crate::{
    alerts::Alert,
    photometry::{
        dc_mag::{MagnitudeCorrection, PhotometryPoint},
        history::ExtractedHistory,
    },
};

/// Fading rate (mag/day) a candidate must exceed to be kept.
pub const RATE_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateMeasurement {
    /// Julian date of the current measurement.
    pub jd: f64,
    /// Filter the rate was measured in.
    pub fid: i64,
    /// Corrected magnitude of the current measurement.
    pub mag: f64,
    pub mag_err: f64,
    /// Positive when the source fades.
    pub rate: f64,
    pub rate_err: f64,
    /// Days between the last two valid detections, any band.
    pub days_since_last: f64,
    /// Days between the first detection and the current measurement.
    pub days_since_first: f64,
}

impl RateMeasurement {
    /// Measure the rate of an alert, or `None` when its history cannot support one.
    ///
    /// Requires two valid detections overall and two in the current filter.
    /// Same-filter epochs that do not advance in time yield no rate.
    pub fn measure<C>(alert: &Alert, correction: &C) -> Option<Self>
    where
        C: MagnitudeCorrection + ?Sized,
    {
        let extracted = ExtractedHistory::extract(&alert.history)?;
        let days_since_last = extracted.days_since_last_detection()?;
        let (previous, last) = extracted.last_pair()?;

        let dt = last.jd - previous.jd;
        if dt <= 0.0 {
            warn!(object_id = %alert.object_id, dt, "same-filter epochs out of order");
            return None;
        }

        let corrected = [previous, last]
            .into_iter()
            .map(|entry| {
                PhotometryPoint::from_entry(entry)
                    .map(|point| correction.correct(&point))
                    .transpose()
            })
            .collect::<Result<Option<Vec<_>>, _>>();
        let corrected = match corrected {
            Ok(Some(values)) => values,
            Ok(None) => return None,
            Err(err) => {
                warn!(object_id = %alert.object_id, error = %err, "magnitude correction failed");
                return None;
            }
        };
        let (mag_prev, err_prev) = corrected[0];
        let (mag, mag_err) = corrected[1];

        Some(Self {
            jd: extracted.current.jd,
            fid: extracted.current.fid,
            mag,
            mag_err,
            rate: (mag - mag_prev) / dt,
            rate_err: mag_err.hypot(err_prev) / dt,
            days_since_last,
            days_since_first: extracted.current.jd - alert.jdstarthist,
        })
    }

    pub fn is_fast_fading(&self) -> bool {
        self.rate > RATE_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alerts::{DiffSign, HistoryEntry, HistorySeries},
        error::{FilterError, FilterResult},
    };

    struct Raw;

    impl MagnitudeCorrection for Raw {
        fn correct(&self, point: &PhotometryPoint) -> FilterResult<(f64, f64)> {
            Ok((point.magpsf, point.sigmapsf))
        }
    }

    struct Broken;

    impl MagnitudeCorrection for Broken {
        fn correct(&self, point: &PhotometryPoint) -> FilterResult<(f64, f64)> {
            Err(FilterError::UnknownFilter(point.fid))
        }
    }

    fn entry(jd: f64, fid: i64, magpsf: Option<f64>, sigmapsf: f64) -> HistoryEntry {
        HistoryEntry {
            jd,
            fid,
            magpsf,
            sigmapsf,
            magnr: 21.0,
            sigmagnr: 0.05,
            magzpsci: 26.0,
            isdiffpos: DiffSign::Positive,
        }
    }

    fn alert(entries: Vec<HistoryEntry>) -> Alert {
        Alert {
            object_id: "ZTF21rate".into(),
            rfscore: 0.0,
            snn_snia_vs_nonia: 0.0,
            snn_sn_vs_all: 0.0,
            drb: 0.99,
            classtar: 0.9,
            jdstarthist: 100.0,
            ndethist: Some(2),
            cdsxmatch: Some("Unknown".into()),
            ra: 0.0,
            dec: 0.0,
            ssdistnr: -999.0,
            history: HistorySeries::new(entries),
        }
    }

    #[test]
    fn rate_and_error_between_last_two_points() {
        let alert = alert(vec![
            entry(101.0, 1, Some(18.0), 0.3),
            entry(102.0, 1, Some(18.5), 0.3),
            entry(104.0, 1, Some(19.5), 0.4),
        ]);
        let rate = RateMeasurement::measure(&alert, &Raw).unwrap();
        assert!((rate.rate - 0.5).abs() < 1e-12);
        assert!((rate.rate_err - 0.25).abs() < 1e-12);
        assert_eq!(rate.mag, 19.5);
        assert_eq!(rate.mag_err, 0.4);
        assert_eq!(rate.days_since_last, 2.0);
        assert_eq!(rate.days_since_first, 4.0);
        assert!(rate.is_fast_fading());
    }

    #[test]
    fn last_detection_gap_spans_all_bands() {
        let alert = alert(vec![
            entry(101.0, 1, Some(18.0), 0.1),
            entry(102.5, 2, Some(18.4), 0.1),
            entry(103.0, 1, Some(18.1), 0.1),
        ]);
        let rate = RateMeasurement::measure(&alert, &Raw).unwrap();
        assert_eq!(rate.days_since_last, 0.5);
        assert!((rate.rate - 0.05).abs() < 1e-9);
        assert!(!rate.is_fast_fading());
    }

    #[test]
    fn missing_magnitudes_are_skipped_not_zeroed() {
        let alert = alert(vec![
            entry(101.0, 1, Some(18.0), 0.1),
            entry(102.0, 1, None, 0.1),
            entry(103.0, 1, Some(19.0), 0.1),
        ]);
        let rate = RateMeasurement::measure(&alert, &Raw).unwrap();
        assert!((rate.rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn fewer_than_two_same_filter_points_yield_nothing() {
        let alert = alert(vec![entry(101.0, 2, Some(18.0), 0.1), entry(103.0, 1, Some(19.0), 0.1)]);
        assert!(RateMeasurement::measure(&alert, &Raw).is_none());
    }

    #[test]
    fn simultaneous_epochs_yield_nothing() {
        let alert = alert(vec![entry(103.0, 1, Some(18.0), 0.1), entry(103.0, 1, Some(19.0), 0.1)]);
        assert!(RateMeasurement::measure(&alert, &Raw).is_none());
    }

    #[test]
    fn correction_failure_yields_nothing() {
        let alert = alert(vec![entry(101.0, 1, Some(18.0), 0.1), entry(103.0, 1, Some(19.0), 0.1)]);
        assert!(RateMeasurement::measure(&alert, &Broken).is_none());
    }
}
