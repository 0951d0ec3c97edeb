use thiserror::Error;

/// Rejected field configuration.
///
/// These are programmer errors caught at construction; nothing in the per-frame
/// path can fail.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("`{field}` must be finite and > 0 (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("`{field}` must be finite (got {value})")]
    NotFinite { field: &'static str, value: f64 },

    #[error("`{field}` must be at least 1")]
    ZeroCount { field: &'static str },

    #[error("`{field}` range is empty: [{min}, {max}]")]
    EmptyRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("`{field}` range [{min}, {max}] is too wide to sample")]
    RangeTooWide {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("`{field}` = {value} exceeds the limit of {max}")]
    TooMany {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[error("particle speed range must be strictly positive (min = {0})")]
    NonPositiveSpeed(f64),

    #[error("`{field}` must lie in [0, 1] (got {value})")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("invalid color {0:?}: expected \"#RRGGBB\"")]
    InvalidColor(String),
}
