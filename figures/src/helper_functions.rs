use std::fs;
use std::path::{Path, PathBuf};

use polars::frame::DataFrame;
use polars::prelude::{CsvReadOptions, DataType, SerReader};
use tracing::{debug, info};

use crate::error::{FigureError, Result};

pub fn read_csv(file_path: &Path) -> Result<DataFrame> {
    info!("Reading table from {}", file_path.display());
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))?
        .finish()?;
    debug!("Loaded {} rows x {} columns", df.height(), df.width());
    Ok(df)
}

/// Numeric column as `Vec<f64>`, casting integer or string columns. Nulls and
/// unparsable cells are reported with their row.
pub fn extract_f64_column(df: &DataFrame, column_name: &str) -> Result<Vec<f64>> {
    let casted = df.column(column_name)?.cast(&DataType::Float64)?;
    casted
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| FigureError::MissingValue {
                column: column_name.to_string(),
                row,
            })
        })
        .collect()
}

pub fn extract_str_column(df: &DataFrame, column_name: &str) -> Result<Vec<String>> {
    let casted = df.column(column_name)?.cast(&DataType::String)?;
    casted
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(str::to_string).ok_or_else(|| FigureError::MissingValue {
                column: column_name.to_string(),
                row,
            })
        })
        .collect()
}

/// `out/fig` + `_bland_altman` + `svg` -> `out/fig_bland_altman.svg`.
pub fn output_path(stem: &Path, suffix: &str, extension: &str) -> PathBuf {
    let name = stem
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.with_file_name(format!("{name}{suffix}.{extension}"))
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
