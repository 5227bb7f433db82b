use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::DrawingBackend;

use crate::analysis::mirrored_histogram::MirroredHistogram;
use crate::analysis::ticks::{nice_scale, AxisScale, MIN_TARGET_TICKS};
use crate::config::{ComparisonConfig, PlotStyle};
use crate::error::{render_err, Result};
use crate::plotting::{draw_axes, rgb, text_style, Figure, TickAxis};

/// Fraction of each bin height left empty between stacked bars.
const BAR_GAP: f64 = 0.08;

/// Horizontal bar in data coordinates: x spans counts, y spans the bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

pub struct MirroredHistogramPlot<'a> {
    pub histogram: &'a MirroredHistogram,
    pub config: &'a ComparisonConfig,
    pub style: &'a PlotStyle,
}

impl MirroredHistogramPlot<'_> {
    /// Count axis symmetric about zero with whole-number ticks; value axis
    /// over the bin edges.
    pub fn axes(&self) -> (AxisScale, AxisScale) {
        let ticks = self.config.target_ticks.max(MIN_TARGET_TICKS);
        let m = self.histogram.max_count().max(ticks.div_ceil(2)) as f64;
        let x = nice_scale(-m, m, ticks);
        let first = self.histogram.edges.first().copied().unwrap_or(f64::NAN);
        let last = self.histogram.edges.last().copied().unwrap_or(f64::NAN);
        let y = nice_scale(first, last, self.config.target_ticks);
        (x, y)
    }

    /// Left bars from method A (negated counts), right bars from method B.
    /// Empty bins produce no bar.
    pub fn bars(&self) -> (Vec<Bar>, Vec<Bar>) {
        let h = self.histogram;
        let inset = h.bin_width * BAR_GAP / 2.0;
        let mut left = Vec::new();
        let mut right = Vec::new();
        for bin in h.bins() {
            let (y0, y1) = (bin.lower + inset, bin.upper - inset);
            if bin.count_a > 0 {
                left.push(Bar {
                    x0: -(bin.count_a as f64),
                    x1: 0.0,
                    y0,
                    y1,
                });
            }
            if bin.count_b > 0 {
                right.push(Bar {
                    x0: 0.0,
                    x1: bin.count_b as f64,
                    y0,
                    y1,
                });
            }
        }
        (left, right)
    }
}

impl Figure for MirroredHistogramPlot<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(render_err)?;
        let style = self.style;
        let (x, y) = self.axes();

        let title = format!("{} vs {}", self.config.method_a, self.config.method_b);
        let mut chart = ChartBuilder::on(root)
            .caption(title, text_style(style, style.title_size))
            .margin(style.margin)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(TickAxis::new(x), TickAxis::new(y))
            .map_err(render_err)?;

        // Counts on both sides read as positive magnitudes.
        let x_format = |v: &f64| format!("{:.0}", v.abs());
        draw_axes(
            &mut chart,
            &x,
            &y,
            "Count",
            &self.config.value_label,
            style,
            &x_format,
        )?;

        let (left, right) = self.bars();
        for (bars, colour, name) in [
            (left, rgb(style.method_a), &self.config.method_a),
            (right, rgb(style.method_b), &self.config.method_b),
        ] {
            chart
                .draw_series(bars.into_iter().map(move |b| {
                    Rectangle::new([(b.x0, b.y1), (b.x1, b.y0)], colour.mix(0.85).filled())
                }))
                .map_err(render_err)?
                .label(name.as_str())
                .legend(move |(lx, ly)| {
                    Rectangle::new([(lx, ly - 5), (lx + 15, ly + 5)], colour.filled())
                });
        }

        chart
            .draw_series(LineSeries::new(
                vec![(0.0, y.lo), (0.0, y.hi)],
                rgb(style.reference_line).stroke_width(1),
            ))
            .map_err(render_err)?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(text_style(style, style.legend_size))
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(render_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::mirrored_histogram::mirrored_histogram;

    #[test]
    fn test_bars_mirror_counts_on_shared_bins() {
        let h = mirrored_histogram(&[0.0, 0.1, 1.2], &[1.1, 1.4, 1.9], 1.0).unwrap();
        let config = ComparisonConfig::default();
        let style = PlotStyle::default();
        let plot = MirroredHistogramPlot {
            histogram: &h,
            config: &config,
            style: &style,
        };
        let (left, right) = plot.bars();

        assert_eq!(left.len(), 2);
        assert_eq!(left[0].x0, -2.0);
        assert_eq!(left[0].x1, 0.0);
        // Only the second bin has B values.
        assert_eq!(right.len(), 1);
        assert_eq!(right[0].x1, 3.0);
        assert_eq!(right[0].y0, left[1].y0);
        assert_eq!(right[0].y1, left[1].y1);
        assert!(left[0].y0 > h.edges[0] && left[0].y1 < h.edges[1]);
    }

    #[test]
    fn test_axes_are_symmetric_in_count() {
        let h = mirrored_histogram(&[0.0; 7], &[0.0, 0.5], 1.0).unwrap();
        let config = ComparisonConfig::default();
        let style = PlotStyle::default();
        let plot = MirroredHistogramPlot {
            histogram: &h,
            config: &config,
            style: &style,
        };
        let (x, y) = plot.axes();
        assert!(x.lo <= -7.0 && x.hi >= 7.0);
        assert!((x.lo + x.hi).abs() < 1e-9);
        assert!(x.step >= 1.0);
        assert!(y.lo <= h.edges[0] && y.hi >= *h.edges.last().unwrap());
    }
}
