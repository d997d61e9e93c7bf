//! Equatorial (J2000) to galactic conversion and sexagesimal formatting.

use ndarray::{array, Array1, Array2};
use once_cell::sync::Lazy;
use serde::Serialize;

/// Rows are the galactic x, y, z axes expressed in equatorial coordinates.
static EQUATORIAL_TO_GALACTIC: Lazy<Array2<f64>> = Lazy::new(|| {
    array![
        [-0.054_875_560_416_215_4, -0.873_437_090_234_885_0, -0.483_835_015_548_713_2],
        [0.494_109_427_875_583_7, -0.444_829_629_960_011_2, 0.746_982_244_497_218_9],
        [-0.867_666_149_019_004_7, -0.198_076_373_431_201_5, 0.455_983_776_175_066_9],
    ]
});

/// Galactic longitude and latitude, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Galactic {
    pub l: f64,
    pub b: f64,
}

impl Galactic {
    pub fn from_equatorial(ra_deg: f64, dec_deg: f64) -> Self {
        let (ra, dec) = (ra_deg.to_radians(), dec_deg.to_radians());
        let unit: Array1<f64> = array![dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin()];
        let rotated = EQUATORIAL_TO_GALACTIC.dot(&unit);
        Self {
            l: rotated[1].atan2(rotated[0]).to_degrees().rem_euclid(360.0),
            b: rotated[2].clamp(-1.0, 1.0).asin().to_degrees(),
        }
    }
}

/// Right ascension as `H MM SS.ss`.
pub fn format_ra(ra_deg: f64) -> String {
    let (negative, body) = sexagesimal(ra_deg / 15.0, 2);
    if negative {
        format!("-{body}")
    } else {
        body
    }
}

/// Declination as `±D MM SS.s`.
pub fn format_dec(dec_deg: f64) -> String {
    let (negative, body) = sexagesimal(dec_deg, 1);
    format!("{}{body}", if negative { '-' } else { '+' })
}

/// Split `|value|` into whole units, minutes and seconds rounded to
/// `precision` decimals, carrying rounding overflow into the higher fields.
fn sexagesimal(value: f64, precision: usize) -> (bool, String) {
    let scale = 10u64.pow(precision as u32);
    let total = (value.abs() * 3600.0 * scale as f64).round() as u64;
    let whole = total / (3600 * scale);
    let minutes = (total / (60 * scale)) % 60;
    let seconds = (total % (60 * scale)) as f64 / scale as f64;
    let width = if precision == 0 { 2 } else { precision + 3 };
    (
        value < 0.0 && total > 0,
        format!("{whole} {minutes:02} {seconds:0width$.precision$}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn galactic_north_pole_has_latitude_ninety() {
        let pole = Galactic::from_equatorial(192.859_48, 27.128_25);
        assert!((pole.b - 90.0).abs() < 1e-3);
    }

    #[test]
    fn galactic_centre_sits_on_the_plane() {
        let centre = Galactic::from_equatorial(266.404_99, -28.936_17);
        assert!(centre.b.abs() < 1e-3);
        assert!(centre.l < 1e-3 || centre.l > 360.0 - 1e-3);
    }

    #[test]
    fn formats_right_ascension_in_hours() {
        assert_eq!(format_ra(150.0), "10 00 00.00");
        assert_eq!(format_ra(15.5), "1 02 00.00");
        assert_eq!(format_ra(0.0), "0 00 00.00");
    }

    #[test]
    fn formats_signed_declination() {
        assert_eq!(format_dec(-20.0), "-20 00 00.0");
        assert_eq!(format_dec(5.5), "+5 30 00.0");
        assert_eq!(format_dec(0.0), "+0 00 00.0");
    }

    #[test]
    fn rounding_carries_into_minutes() {
        // 59.96 arcsec rounds up to a full minute at one decimal.
        assert_eq!(format_dec(1.0 + 59.96 / 3600.0), "+1 01 00.0");
    }
}
