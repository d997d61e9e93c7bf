//! Error types shared by batch decoding and filtering.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Input-contract violations raised while decoding or evaluating a batch.
///
/// Every variant is fatal for the invocation that raised it.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Column missing, or a value that cannot be coerced to the required type.
    #[error("column decoding failed: {0}")]
    Polars(#[from] PolarsError),

    /// A required column holds a null, such as an identifier or a history time.
    #[error("column `{column}` has a null value at row {row}")]
    MissingValue { column: &'static str, row: usize },

    /// History arrays for one alert disagree in length.
    #[error("history arrays for row {row} have mismatched lengths ({expected} vs {found} in `{column}`)")]
    RaggedHistory {
        row: usize,
        column: &'static str,
        expected: usize,
        found: usize,
    },

    /// Julian date outside the representable calendar range.
    #[error("julian date {0} cannot be converted to a UTC timestamp")]
    JulianDate(f64),

    /// Filter id with no known photometric band.
    #[error("unknown filter id {0}")]
    UnknownFilter(i64),
}

pub type FilterResult<T> = Result<T, FilterError>;
