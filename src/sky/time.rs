//! Julian date conversion.

use chrono::{DateTime, Utc};

use crate::error::{FilterError, FilterResult};

/// Julian date of 1970-01-01T00:00:00 UTC.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub fn jd_to_datetime(jd: f64) -> FilterResult<DateTime<Utc>> {
    if !jd.is_finite() {
        return Err(FilterError::JulianDate(jd));
    }
    let millis = ((jd - UNIX_EPOCH_JD) * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 {
        return Err(FilterError::JulianDate(jd));
    }
    DateTime::from_timestamp_millis(millis as i64).ok_or(FilterError::JulianDate(jd))
}

/// ISO timestamp with millisecond precision, e.g. `2000-01-01 12:00:00.000`.
pub fn jd_to_iso(jd: f64) -> FilterResult<String> {
    Ok(jd_to_datetime(jd)?
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string())
}
