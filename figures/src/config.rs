//! Run configuration for both figure pipelines.
//!
//! Everything that used to be a script-level constant (fonts, colours, seed,
//! thresholds, export resolution) lives here and is passed explicitly into the
//! compute and render functions. A JSON file may override any subset of the
//! defaults; missing keys fall back to [`Default`].

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::bland_altman::AgreementConfig;
use crate::analysis::categorize::LabelRule;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub seed: u64,
    pub style: PlotStyle,
    pub export: ExportOptions,
    pub rank: RankPlotConfig,
    pub comparison: ComparisonConfig,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            style: PlotStyle::default(),
            export: ExportOptions::default(),
            rank: RankPlotConfig::default(),
            comparison: ComparisonConfig::default(),
        }
    }
}

impl FigureConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        info!("Reading figure configuration from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    pub font_family: String,
    pub title_size: u32,
    pub label_size: u32,
    pub tick_size: u32,
    pub legend_size: u32,
    pub point_radius: u32,
    pub margin: u32,
    pub upregulated: [u8; 3],
    pub downregulated: [u8; 3],
    pub unchanged: [u8; 3],
    pub method_a: [u8; 3],
    pub method_b: [u8; 3],
    pub reference_line: [u8; 3],
    pub limit_line: [u8; 3],
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            title_size: 26,
            label_size: 22,
            tick_size: 18,
            legend_size: 18,
            point_radius: 3,
            margin: 20,
            upregulated: [214, 39, 40],
            downregulated: [31, 119, 180],
            unchanged: [160, 160, 160],
            method_a: [0, 119, 182],
            method_b: [217, 72, 1],
            reference_line: [0, 0, 0],
            limit_line: [120, 120, 120],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "svg" => Ok(ExportFormat::Svg),
            other => Err(format!("unsupported export format `{other}` (use png|svg)")),
        }
    }
}

/// Physical figure size and resolution; pixel size is inches × dpi.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub formats: Vec<ExportFormat>,
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            formats: vec![ExportFormat::Png, ExportFormat::Svg],
            width_in: 8.0,
            height_in: 6.0,
            dpi: 150,
        }
    }
}

impl ExportOptions {
    pub fn pixel_size(&self) -> (u32, u32) {
        let w = (self.width_in * self.dpi as f64).round().max(1.0) as u32;
        let h = (self.height_in * self.dpi as f64).round().max(1.0) as u32;
        (w, h)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankPlotConfig {
    pub threshold: f64,
    pub significance_cutoff: f64,
    pub target_ticks: usize,
    pub title: String,
    pub y_label: String,
    pub demo_size: usize,
}

impl Default for RankPlotConfig {
    fn default() -> Self {
        let rule = LabelRule::default();
        Self {
            threshold: rule.threshold,
            significance_cutoff: rule.significance_cutoff,
            target_ticks: 6,
            title: "Protein abundance ratios".to_string(),
            y_label: "log2 ratio".to_string(),
            demo_size: 2000,
        }
    }
}

impl RankPlotConfig {
    pub fn label_rule(&self) -> LabelRule {
        LabelRule {
            threshold: self.threshold,
            significance_cutoff: self.significance_cutoff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub bin_width: f64,
    pub method_a: String,
    pub method_b: String,
    pub agreement: AgreementConfig,
    pub target_ticks: usize,
    pub value_label: String,
    pub demo_size: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            bin_width: 0.5,
            method_a: "Method A".to_string(),
            method_b: "Method B".to_string(),
            agreement: AgreementConfig::default(),
            target_ticks: 6,
            value_label: "log2 intensity".to_string(),
            demo_size: 1500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::bland_altman::SdEstimator;
    use std::io::Write;

    #[test]
    fn test_default_threshold_is_log2_one_point_five() {
        let cfg = FigureConfig::default();
        assert!((cfg.rank.threshold - 1.5f64.log2()).abs() < 1e-12);
        assert_eq!(cfg.rank.significance_cutoff, 0.05);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"seed": 7, "comparison": {{"bin_width": 0.25, "agreement": {{"estimator": "population"}}}}}}"#
        )
        .unwrap();

        let cfg = FigureConfig::from_json_file(file.path()).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.comparison.bin_width, 0.25);
        assert_eq!(cfg.comparison.agreement.estimator, SdEstimator::Population);
        assert_eq!(cfg.comparison.agreement.multiplier, 1.96);
        assert_eq!(cfg.style, PlotStyle::default());
        assert_eq!(cfg.export, ExportOptions::default());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(FigureConfig::from_json_file(file.path()).is_err());
    }

    #[test]
    fn test_pixel_size_follows_dpi() {
        let opts = ExportOptions {
            formats: vec![ExportFormat::Png],
            width_in: 3.5,
            height_in: 2.0,
            dpi: 300,
        };
        assert_eq!(opts.pixel_size(), (1050, 600));
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("svg".parse::<ExportFormat>().unwrap(), ExportFormat::Svg);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
