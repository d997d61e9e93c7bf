//! Photometric history reconstruction and fading-rate measurement.

pub mod dc_mag;
pub mod history;
pub mod rate;

pub use dc_mag::{DcMag, MagnitudeCorrection, PhotometryPoint};
pub use rate::{RateMeasurement, RATE_THRESHOLD};

/// Photometric band label for a filter id.
pub fn band_label(fid: i64) -> String {
    match fid {
        1 => "g".to_string(),
        2 => "r".to_string(),
        3 => "i".to_string(),
        other => format!("fid {other}"),
    }
}
