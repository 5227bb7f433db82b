use std::path::PathBuf;

use tracing::info;

use crate::error::{FigureError, Result};
use crate::helper_functions::{extract_f64_column, read_csv};
use crate::models::Dataset;

/// Paired measurements of the same samples by two methods.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedInput {
    pub a: Vec<f64>,
    pub b: Vec<f64>,
}

impl PairedInput {
    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }
}

pub struct PairedTable {
    pub path: PathBuf,
    pub column_a: String,
    pub column_b: String,
}

impl Dataset for PairedTable {
    type Output = PairedInput;

    fn load(&self) -> Result<PairedInput> {
        let df = read_csv(&self.path)?;
        let a = extract_f64_column(&df, &self.column_a)?;
        let b = extract_f64_column(&df, &self.column_b)?;
        if a.is_empty() {
            return Err(FigureError::EmptyInput("paired measurement table"));
        }
        info!(
            "Loaded {} paired measurements ({} vs {})",
            a.len(),
            self.column_a,
            self.column_b
        );
        Ok(PairedInput { a, b })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn table(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn paired(file: &tempfile::NamedTempFile) -> PairedTable {
        PairedTable {
            path: file.path().to_path_buf(),
            column_a: "lfq".to_string(),
            column_b: "tmt".to_string(),
        }
    }

    #[test]
    fn test_load_pairs() {
        let file = table("protein,lfq,tmt\nP1,20.5,20.1\nP2,18,18.4\n");
        let input = paired(&file).load().unwrap();
        assert_eq!(input.a, vec![20.5, 18.0]);
        assert_eq!(input.b, vec![20.1, 18.4]);
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn test_missing_partner_value_fails() {
        let file = table("protein,lfq,tmt\nP1,20.5,20.1\nP2,18,\nP3,17,17.2\n");
        let err = paired(&file).load().unwrap_err();
        assert!(matches!(err, FigureError::MissingValue { row: 1, .. }));
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let file = table("protein,lfq,tmt\n");
        assert!(paired(&file).load().is_err());
    }
}
