use polars::error::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FigureError>;

#[derive(Debug, Error)]
pub enum FigureError {
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("shape mismatch: {what} has length {got}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("length mismatch between paired vectors: A has {a} values, B has {b}")]
    LengthMismatch { a: usize, b: usize },

    #[error("unknown category label `{label}` at position {index}")]
    UnknownCategory { label: String, index: usize },

    #[error("non-finite value in {what} at position {index}")]
    NonFinite { what: &'static str, index: usize },

    #[error("bin width must be finite and positive, got {0}")]
    InvalidBinWidth(f64),

    #[error("bin width {bin_width} gives {bins} bins over the observed range (limit {max})")]
    TooManyBins {
        bin_width: f64,
        bins: f64,
        max: usize,
    },

    #[error("invalid demo distribution: {0}")]
    InvalidDistribution(String),

    #[error("missing value in column `{column}` at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("table error: {0}")]
    Polars(#[from] PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rendering failed: {0}")]
    Render(String),
}

/// Maps any plotters drawing error into [`FigureError::Render`].
pub fn render_err<E: std::fmt::Display>(e: E) -> FigureError {
    FigureError::Render(e.to_string())
}

/// Rejects empty slices and NaN/infinite entries.
pub(crate) fn ensure_finite(values: &[f64], what: &'static str) -> Result<()> {
    if values.is_empty() {
        return Err(FigureError::EmptyInput(what));
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(FigureError::NonFinite { what, index }),
        None => Ok(()),
    }
}
