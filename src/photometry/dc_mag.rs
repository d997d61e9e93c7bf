//! Difference-corrected (DC) magnitudes.
//!
//! Alert photometry measures the flux of the difference image. The DC
//! magnitude adds the reference flux back so that successive epochs of the
//! same source can be compared directly.

use crate::{
    alerts::{DiffSign, HistoryEntry},
    error::{FilterError, FilterResult},
};

/// Converts magnitude uncertainty to relative flux uncertainty (2.5 / ln 10).
const MAG_TO_FLUX_ERR: f64 = 1.0857;
/// Clamp on zero-point minus magnitude, avoiding overflow for bogus inputs.
const MAX_MAG_DIFF: f64 = 12.0;

/// Inputs of one correction, taken from a single history entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotometryPoint {
    pub fid: i64,
    pub magpsf: f64,
    pub sigmapsf: f64,
    pub magnr: f64,
    pub sigmagnr: f64,
    pub magzpsci: f64,
    pub isdiffpos: DiffSign,
}

impl PhotometryPoint {
    /// `None` when the entry has no magnitude.
    pub fn from_entry(entry: &HistoryEntry) -> Option<Self> {
        Some(Self {
            fid: entry.fid,
            magpsf: entry.magpsf?,
            sigmapsf: entry.sigmapsf,
            magnr: entry.magnr,
            sigmagnr: entry.sigmagnr,
            magzpsci: entry.magzpsci,
            isdiffpos: entry.isdiffpos,
        })
    }
}

/// Maps raw difference photometry to a calibrated magnitude and uncertainty.
pub trait MagnitudeCorrection {
    fn correct(&self, point: &PhotometryPoint) -> FilterResult<(f64, f64)>;
}

/// Default correction using the survey's fixed reference zero points.
#[derive(Debug, Clone, Copy, Default)]
pub struct DcMag;

impl DcMag {
    /// Reference image zero point for a filter.
    pub fn reference_zero_point(fid: i64) -> FilterResult<f64> {
        match fid {
            1 => Ok(26.325),
            2 => Ok(26.275),
            3 => Ok(25.660),
            other => Err(FilterError::UnknownFilter(other)),
        }
    }
}

impl MagnitudeCorrection for DcMag {
    fn correct(&self, point: &PhotometryPoint) -> FilterResult<(f64, f64)> {
        let magzpref = Self::reference_zero_point(point.fid)?;

        let ref_flux = 10f64.powf(0.4 * clamp_mag_diff(magzpref - point.magnr));
        let ref_sigflux = (point.sigmagnr / MAG_TO_FLUX_ERR) * ref_flux;

        let magzpsci = if point.magzpsci == 0.0 {
            magzpref
        } else {
            point.magzpsci
        };
        let difference_flux = 10f64.powf(0.4 * clamp_mag_diff(magzpsci - point.magpsf));
        let difference_sigflux = (point.sigmapsf / MAG_TO_FLUX_ERR) * difference_flux;

        let dc_flux = match point.isdiffpos {
            DiffSign::Positive => ref_flux + difference_flux,
            DiffSign::Negative => ref_flux - difference_flux,
        };
        let dc_sigflux = difference_sigflux.hypot(ref_sigflux);

        if dc_flux > 0.0 {
            Ok((
                magzpsci - 2.5 * dc_flux.log10(),
                dc_sigflux / dc_flux * MAG_TO_FLUX_ERR,
            ))
        } else {
            // Flux vanished (or is NaN): fall back to the raw zero point.
            Ok((magzpsci, point.sigmapsf))
        }
    }
}

/// Caps a magnitude difference. NaN passes through.
fn clamp_mag_diff(diff: f64) -> f64 {
    if diff > MAX_MAG_DIFF {
        MAX_MAG_DIFF
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> PhotometryPoint {
        PhotometryPoint {
            fid: 1,
            magpsf: 19.0,
            sigmapsf: 0.1,
            magnr: 21.0,
            sigmagnr: 0.05,
            magzpsci: 26.325,
            isdiffpos: DiffSign::Positive,
        }
    }

    #[test]
    fn positive_difference_is_brighter_than_both_parts() {
        let (mag, err) = DcMag.correct(&point()).unwrap();
        assert!(mag < 19.0);
        assert!(mag > 18.0);
        assert!(err > 0.0 && err < 0.1);
    }

    #[test]
    fn faint_reference_leaves_magnitude_nearly_unchanged() {
        let mut faint = point();
        faint.magnr = 35.0;
        faint.sigmagnr = 0.0;
        let (mag, err) = DcMag.correct(&faint).unwrap();
        assert!((mag - 19.0).abs() < 1e-3);
        assert!((err - 0.1).abs() < 1e-3);
    }

    #[test]
    fn zero_science_zero_point_falls_back_to_reference() {
        let mut zp = point();
        zp.magzpsci = 0.0;
        let (lhs, _) = DcMag.correct(&zp).unwrap();
        let (rhs, _) = DcMag.correct(&point()).unwrap();
        assert!((lhs - rhs).abs() < 1e-12);
    }

    #[test]
    fn vanishing_flux_returns_zero_point() {
        let mut negative = point();
        negative.isdiffpos = DiffSign::Negative;
        negative.magpsf = 20.0;
        negative.magnr = 20.0;
        let (mag, err) = DcMag.correct(&negative).unwrap();
        assert_eq!(mag, 26.325);
        assert_eq!(err, 0.1);
    }

    #[test]
    fn missing_reference_magnitude_returns_zero_point() {
        let mut unknown = point();
        unknown.magnr = f64::NAN;
        unknown.magzpsci = 26.2;
        let (mag, err) = DcMag.correct(&unknown).unwrap();
        assert_eq!(mag, 26.2);
        assert_eq!(err, 0.1);
    }

    #[test]
    fn bright_difference_is_capped() {
        let mut bright = point();
        bright.magpsf = 10.0;
        bright.magnr = 35.0;
        bright.sigmagnr = 0.0;
        let (mag, _) = DcMag.correct(&bright).unwrap();
        assert!((mag - (26.325 - 12.0)).abs() < 1e-3);
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let mut odd = point();
        odd.fid = 7;
        assert!(matches!(
            DcMag.correct(&odd),
            Err(FilterError::UnknownFilter(7))
        ));
    }
}
