//! Error types for LitterScope

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for LitterScope operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error("date {date} is not available for region '{region}'")]
    DateNotInRegion { region: String, date: NaiveDate },

    #[error("no region selected")]
    NoRegionSelected,

    #[error("invalid region catalogue: {0}")]
    InvalidCatalog(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("mask asset '{0}' not found")]
    MaskNotFound(String),

    #[error("band '{band}' of scene '{scene}' is not available locally")]
    BandUnavailable { scene: String, band: String },

    #[error("imagery service error: {0}")]
    Imagery(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is a caller contract violation (selecting something
    /// outside the static region catalogue).
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::UnknownRegion(_) | Error::DateNotInRegion { .. } | Error::NoRegionSelected
        )
    }
}

/// Result type alias for LitterScope operations
pub type Result<T> = std::result::Result<T, Error>;
