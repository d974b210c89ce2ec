//! Error taxonomy for table exports.

use thiserror::Error;

/// Errors raised while planning or writing a table workbook.
#[derive(Error, Debug)]
pub enum ModelbookError {
    /// No record source and no way to obtain one.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid table spec: {0}")]
    InvalidSpec(String),

    /// A field lookup path failed against a record.
    #[error(
        "Cannot resolve field {field:?} (path {path:?}) at segment {segment:?} for record {record_idx}: {reason}"
    )]
    AttributeResolution {
        field: String,
        path: String,
        segment: String,
        record_idx: usize,
        reason: String,
    },

    #[error("Table exceeds Excel limits: last row {last_row}, last column {last_col}")]
    TableTooLarge { last_row: usize, last_col: usize },

    #[error("Record source yielded {actual} records, but count() reported {expected}")]
    SourceCountMismatch { expected: usize, actual: usize },

    #[error("Record source error: {0}")]
    Source(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModelbookError>;
