//! Rendering layer. Every figure consumes plain numbers from `analysis` and
//! draws onto any plotters backend, so PNG and SVG share one code path.

use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::DrawingBackend;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use tracing::info;

use crate::analysis::ticks::AxisScale;
use crate::config::{ExportFormat, ExportOptions, PlotStyle};
use crate::error::{render_err, Result};
use crate::helper_functions::{ensure_parent_dir, output_path};
use crate::models::Category;

pub mod bland_altman;
pub mod mirrored_histogram;
pub mod rank_plot;

pub type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<TickAxis, TickAxis>>;

/// Linear `f64` axis whose labelled key points are exactly the ticks of its
/// [`AxisScale`]. Plotters' own float axes pick their key points from a count
/// hint, which can disagree with the nice-number ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickAxis {
    pub scale: AxisScale,
}

impl TickAxis {
    pub fn new(scale: AxisScale) -> Self {
        Self { scale }
    }
}

impl Ranged for TickAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let span = self.scale.hi - self.scale.lo;
        let frac = (value - self.scale.lo) / span;
        limit.0 + (frac * (limit.1 - limit.0) as f64).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            Vec::new()
        } else {
            self.scale.ticks()
        }
    }

    fn range(&self) -> Range<f64> {
        self.scale.range()
    }
}

pub trait Figure {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>;
}

/// Writes `figure` once per requested format as `<stem><suffix>.<ext>`.
pub fn export_figure<F: Figure>(
    figure: &F,
    stem: &Path,
    suffix: &str,
    options: &ExportOptions,
) -> Result<Vec<PathBuf>> {
    let size = options.pixel_size();
    let mut written = Vec::with_capacity(options.formats.len());

    for &format in &options.formats {
        let path = output_path(stem, suffix, format.extension());
        ensure_parent_dir(&path)?;
        match format {
            ExportFormat::Png => {
                let root = BitMapBackend::new(&path, size).into_drawing_area();
                figure.draw(&root)?;
                root.present().map_err(render_err)?;
            }
            ExportFormat::Svg => {
                let root = SVGBackend::new(&path, size).into_drawing_area();
                figure.draw(&root)?;
                root.present().map_err(render_err)?;
            }
        }
        info!("Figure saved to {} ({}x{} px)", path.display(), size.0, size.1);
        written.push(path);
    }
    Ok(written)
}

pub fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

pub fn category_colour(style: &PlotStyle, category: Category) -> RGBColor {
    match category {
        Category::Upregulated => rgb(style.upregulated),
        Category::DownRegulated => rgb(style.downregulated),
        Category::Unchanged => rgb(style.unchanged),
    }
}

pub fn text_style(style: &PlotStyle, size: u32) -> TextStyle<'_> {
    (style.font_family.as_str(), size).into_font().color(&BLACK)
}

/// Mesh without grid lines, tick labels at the [`TickAxis`] key points, and a
/// closed rectangular frame around the plotting area.
pub fn draw_axes<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    x: &AxisScale,
    y: &AxisScale,
    x_desc: &str,
    y_desc: &str,
    style: &PlotStyle,
    x_format: &dyn Fn(&f64) -> String,
) -> Result<()> {
    let y_decimals = y.decimals();
    let y_format = move |v: &f64| format!("{:.*}", y_decimals, v);

    chart
        .configure_mesh()
        .disable_mesh()
        .x_label_formatter(x_format)
        .y_label_formatter(&y_format)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .axis_desc_style(text_style(style, style.label_size))
        .label_style(text_style(style, style.tick_size))
        .draw()
        .map_err(render_err)?;

    chart
        .plotting_area()
        .draw(&Rectangle::new(
            [(x.lo, y.hi), (x.hi, y.lo)],
            BLACK.stroke_width(1),
        ))
        .map_err(render_err)?;
    Ok(())
}

/// Splits a horizontal line into dash segments of `dashes` on/off pairs.
pub fn dash_segments(x_lo: f64, x_hi: f64, y: f64, dashes: usize) -> Vec<[(f64, f64); 2]> {
    let dashes = dashes.max(1);
    let period = (x_hi - x_lo) / dashes as f64;
    (0..dashes)
        .map(|i| {
            let start = x_lo + i as f64 * period;
            [(start, y), (start + period * 0.6, y)]
        })
        .collect()
}

pub fn draw_dashed_hline<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    x: &AxisScale,
    y: f64,
    style: ShapeStyle,
) -> Result<()> {
    chart
        .draw_series(
            dash_segments(x.lo, x.hi, y, 60)
                .into_iter()
                .map(move |seg| PathElement::new(seg.to_vec(), style)),
        )
        .map_err(render_err)?;
    Ok(())
}

/// Min and max over any number of slices, ignoring non-finite values.
pub fn extent<'a>(slices: impl IntoIterator<Item = &'a [f64]>) -> (f64, f64) {
    slices
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
