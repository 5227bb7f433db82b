//! Numeric outputs next to each figure: CSV tables, a JSON summary, and the
//! plain-text summary printed to the console.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::analysis::bland_altman::{BlandAltman, SdEstimator};
use crate::analysis::categorize::CategoryCounts;
use crate::analysis::mirrored_histogram::MirroredHistogram;
use crate::config::ComparisonConfig;
use crate::error::Result;
use crate::helper_functions::ensure_parent_dir;
use crate::models::{Category, RankedPoint};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankSummary {
    pub n: usize,
    pub threshold: f64,
    /// `None` when labels came from fold change alone or were supplied.
    pub significance_cutoff: Option<f64>,
    pub counts: CategoryCounts,
    pub max_value: f64,
    pub min_value: f64,
}

impl RankSummary {
    pub fn new(points: &[RankedPoint], threshold: f64, significance_cutoff: Option<f64>) -> Self {
        let labels: Vec<Category> = points.iter().map(|p| p.category).collect();
        let (min_value, max_value) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.value), hi.max(p.value))
            });
        Self {
            n: points.len(),
            threshold,
            significance_cutoff,
            counts: CategoryCounts::tally(&labels),
            max_value,
            min_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub method_a: String,
    pub method_b: String,
    pub bin_width: f64,
    pub n_bins: usize,
    pub n_pairs: usize,
    pub bias: f64,
    pub sd: f64,
    pub sd_estimator: SdEstimator,
    pub multiplier: f64,
    pub upper_loa: f64,
    pub lower_loa: f64,
    pub within_limits_fraction: f64,
}

impl ComparisonSummary {
    pub fn new(hist: &MirroredHistogram, ba: &BlandAltman, config: &ComparisonConfig) -> Self {
        Self {
            method_a: config.method_a.clone(),
            method_b: config.method_b.clone(),
            bin_width: hist.bin_width,
            n_bins: hist.n_bins(),
            n_pairs: ba.n,
            bias: ba.bias,
            sd: ba.sd,
            sd_estimator: ba.estimator,
            multiplier: ba.multiplier,
            upper_loa: ba.upper_loa,
            lower_loa: ba.lower_loa,
            within_limits_fraction: ba.within_limits_fraction(),
        }
    }
}

/// One row of the Bland–Altman CSV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlandAltmanRow {
    pub index: usize,
    pub average: f64,
    pub difference: f64,
}

pub fn bland_altman_rows(ba: &BlandAltman) -> Vec<BlandAltmanRow> {
    ba.points()
        .enumerate()
        .map(|(index, (average, difference))| BlandAltmanRow {
            index,
            average,
            difference,
        })
        .collect()
}

/// Writes one header row plus one row per item.
pub fn write_csv_rows<T, I>(path: &Path, rows: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    ensure_parent_dir(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    let mut n = 0;
    for row in rows {
        wtr.serialize(row)?;
        n += 1;
    }
    wtr.flush()?;
    info!("Wrote {} rows to {}", n, path.display());
    Ok(n)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), value)?;
    info!("Summary saved to {}", path.display());
    Ok(())
}

fn estimator_name(estimator: SdEstimator) -> &'static str {
    match estimator {
        SdEstimator::Sample => "sample",
        SdEstimator::Population => "population",
    }
}

pub fn render_rank_summary(summary: &RankSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Rank plot: {} values, threshold ±{:.3}\n",
        summary.n, summary.threshold
    ));
    match summary.significance_cutoff {
        Some(cutoff) => out.push_str(&format!("  significant when p < {}\n", cutoff)),
        None => out.push_str("  no significance filter applied\n"),
    }
    for category in Category::ALL {
        out.push_str(&format!(
            "  {:<15} {}\n",
            format!("{category}:"),
            summary.counts.get(category)
        ));
    }
    if summary.n > 0 {
        out.push_str(&format!(
            "  range: {:.3} to {:.3}\n",
            summary.min_value, summary.max_value
        ));
    }
    out
}

pub fn render_histogram_summary(hist: &MirroredHistogram, config: &ComparisonConfig) -> String {
    let mut out = String::new();
    out.push_str("Mirrored histogram\n");
    out.push_str(&format!("  left (negative counts):  {}\n", config.method_a));
    out.push_str(&format!("  right (positive counts): {}\n", config.method_b));
    out.push_str(&format!(
        "  bin width: {} ({} bins)\n",
        hist.bin_width,
        hist.n_bins()
    ));
    out
}

pub fn render_bland_altman_summary(ba: &BlandAltman) -> String {
    let m = ba.multiplier;
    let mut out = String::new();
    out.push_str("Bland-Altman agreement\n");
    out.push_str(&format!("  pairs: {}\n", ba.n));
    out.push_str(&format!("  bias: {:.4}\n", ba.bias));
    out.push_str(&format!(
        "  SD ({}): {:.4}\n",
        estimator_name(ba.estimator),
        ba.sd
    ));
    out.push_str(&format!("  upper LoA (+{m:.2} SD): {:.4}\n", ba.upper_loa));
    out.push_str(&format!("  lower LoA (-{m:.2} SD): {:.4}\n", ba.lower_loa));
    out.push_str(&format!(
        "  within limits: {:.1}%\n",
        ba.within_limits_fraction() * 100.0
    ));
    out
}
