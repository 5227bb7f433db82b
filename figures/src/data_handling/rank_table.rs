use std::path::PathBuf;

use tracing::{error, info};

use crate::error::Result;
use crate::helper_functions::{extract_f64_column, extract_str_column, read_csv};
use crate::models::Dataset;

/// Inputs for the rank–log2 plot: the ratios plus optional caller labels and
/// optional per-protein significance values (e.g. adjusted p-values).
#[derive(Debug, Clone, PartialEq)]
pub struct RankInput {
    pub values: Vec<f64>,
    pub labels: Option<Vec<String>>,
    pub significance: Option<Vec<f64>>,
}

pub struct RankTable {
    pub path: PathBuf,
    pub value_column: String,
    pub label_column: Option<String>,
    pub significance_column: Option<String>,
}

impl Dataset for RankTable {
    type Output = RankInput;

    fn load(&self) -> Result<RankInput> {
        let df = match read_csv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read rank table {}: {}", self.path.display(), e);
                return Err(e);
            }
        };

        let values = extract_f64_column(&df, &self.value_column)?;
        let labels = self
            .label_column
            .as_deref()
            .map(|c| extract_str_column(&df, c))
            .transpose()?;
        let significance = self
            .significance_column
            .as_deref()
            .map(|c| extract_f64_column(&df, c))
            .transpose()?;

        info!(
            "Loaded {} log2 ratios (labels: {}, significance: {})",
            values.len(),
            labels.is_some(),
            significance.is_some()
        );
        Ok(RankInput {
            values,
            labels,
            significance,
        })
    }
}
