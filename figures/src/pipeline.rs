//! The two figure pipelines: compute everything first, then write figures
//! and tables. Nothing is written when a compute step fails.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::analysis::bland_altman::{bland_altman, BlandAltman};
use crate::analysis::categorize::{rank_points, resolve_labels};
use crate::analysis::mirrored_histogram::{mirrored_histogram, MirroredHistogram};
use crate::config::{ComparisonConfig, FigureConfig, RankPlotConfig};
use crate::data_handling::paired_table::PairedInput;
use crate::data_handling::rank_table::RankInput;
use crate::error::Result;
use crate::helper_functions::output_path;
use crate::models::RankedPoint;
use crate::plotting::bland_altman::BlandAltmanPlot;
use crate::plotting::export_figure;
use crate::plotting::mirrored_histogram::MirroredHistogramPlot;
use crate::plotting::rank_plot::RankPlot;
use crate::report::{
    bland_altman_rows, write_csv_rows, write_json, ComparisonSummary, RankSummary,
};

#[derive(Debug, Clone)]
pub struct RankResult {
    pub points: Vec<RankedPoint>,
    pub summary: RankSummary,
}

#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub histogram: MirroredHistogram,
    pub agreement: BlandAltman,
    pub summary: ComparisonSummary,
}

pub fn compute_rank(input: &RankInput, config: &RankPlotConfig) -> Result<RankResult> {
    let rule = config.label_rule();
    let labels = resolve_labels(
        &input.values,
        input.labels.as_deref(),
        input.significance.as_deref(),
        &rule,
    )?;
    let points = rank_points(&input.values, &labels)?;

    let cutoff = match (&input.labels, &input.significance) {
        (None, Some(_)) => Some(rule.significance_cutoff),
        _ => None,
    };
    let summary = RankSummary::new(&points, rule.threshold, cutoff);
    Ok(RankResult { points, summary })
}

/// Agreement is computed first so unequal lengths fail before any binning.
pub fn compute_comparison(
    input: &PairedInput,
    config: &ComparisonConfig,
) -> Result<ComparisonResult> {
    let agreement = bland_altman(&input.a, &input.b, &config.agreement)?;
    let histogram = mirrored_histogram(&input.a, &input.b, config.bin_width)?;
    let summary = ComparisonSummary::new(&histogram, &agreement, config);
    Ok(ComparisonResult {
        histogram,
        agreement,
        summary,
    })
}

/// Writes `<stem>.<ext>`, `<stem>_points.csv` and `<stem>_summary.json`.
pub fn export_rank(result: &RankResult, config: &FigureConfig, stem: &Path) -> Result<Vec<PathBuf>> {
    let plot = RankPlot {
        points: &result.points,
        threshold: result.summary.threshold,
        config: &config.rank,
        style: &config.style,
    };
    let mut written = export_figure(&plot, stem, "", &config.export)?;

    let table = output_path(stem, "_points", "csv");
    write_csv_rows(&table, &result.points)?;
    written.push(table);

    let summary = output_path(stem, "_summary", "json");
    write_json(&summary, &result.summary)?;
    written.push(summary);

    info!("Rank plot outputs: {} files", written.len());
    Ok(written)
}

pub fn export_comparison(
    result: &ComparisonResult,
    config: &FigureConfig,
    stem: &Path,
) -> Result<Vec<PathBuf>> {
    let histogram = MirroredHistogramPlot {
        histogram: &result.histogram,
        config: &config.comparison,
        style: &config.style,
    };
    let mut written = export_figure(&histogram, stem, "_mirrored_histogram", &config.export)?;

    let agreement = BlandAltmanPlot {
        summary: &result.agreement,
        config: &config.comparison,
        style: &config.style,
    };
    written.extend(export_figure(&agreement, stem, "_bland_altman", &config.export)?);

    let bins = output_path(stem, "_histogram_bins", "csv");
    write_csv_rows(&bins, result.histogram.bins())?;
    written.push(bins);

    let points = output_path(stem, "_bland_altman_points", "csv");
    write_csv_rows(&points, bland_altman_rows(&result.agreement))?;
    written.push(points);

    let summary = output_path(stem, "_summary", "json");
    write_json(&summary, &result.summary)?;
    written.push(summary);

    info!("Comparison outputs: {} files", written.len());
    Ok(written)
}
