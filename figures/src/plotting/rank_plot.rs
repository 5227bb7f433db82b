use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::DrawingBackend;

use crate::analysis::ticks::{nice_scale, AxisScale, MIN_TARGET_TICKS};
use crate::config::{PlotStyle, RankPlotConfig};
use crate::error::{render_err, Result};
use crate::models::{Category, RankedPoint};
use crate::plotting::{
    category_colour, draw_axes, draw_dashed_hline, extent, rgb, text_style, Figure, TickAxis,
};

/// Unchanged first so regulated points are drawn on top.
const DRAW_ORDER: [Category; 3] = [
    Category::Unchanged,
    Category::DownRegulated,
    Category::Upregulated,
];

pub struct RankPlot<'a> {
    pub points: &'a [RankedPoint],
    pub threshold: f64,
    pub config: &'a RankPlotConfig,
    pub style: &'a PlotStyle,
}

impl RankPlot<'_> {
    /// Rank axis from 0 with whole-number ticks; value axis covers the data
    /// and both thresholds.
    pub fn axes(&self) -> (AxisScale, AxisScale) {
        let ticks = self.config.target_ticks.max(MIN_TARGET_TICKS);
        let n = self.points.len().max(ticks) as f64;
        let x = nice_scale(0.0, n, ticks);

        let values: Vec<f64> = self.points.iter().map(|p| p.value).collect();
        let thresholds = [self.threshold, -self.threshold];
        let (lo, hi) = extent([&values[..], &thresholds[..]]);
        let y = nice_scale(lo, hi, self.config.target_ticks);
        (x, y)
    }

    pub fn series(&self, category: Category) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter(|p| p.category == category)
            .map(|p| (p.rank as f64, p.value))
            .collect()
    }
}

impl Figure for RankPlot<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(render_err)?;
        let style = self.style;
        let (x, y) = self.axes();

        let mut chart = ChartBuilder::on(root)
            .caption(&self.config.title, text_style(style, style.title_size))
            .margin(style.margin)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(TickAxis::new(x), TickAxis::new(y))
            .map_err(render_err)?;

        let x_format = |v: &f64| format!("{:.0}", v);
        draw_axes(&mut chart, &x, &y, "Rank", &self.config.y_label, style, &x_format)?;

        for category in DRAW_ORDER {
            let pts = self.series(category);
            if pts.is_empty() {
                continue;
            }
            let colour = category_colour(style, category);
            let radius = style.point_radius as i32;
            let count = pts.len();
            chart
                .draw_series(
                    pts.into_iter()
                        .map(move |p| Circle::new(p, radius, colour.filled())),
                )
                .map_err(render_err)?
                .label(format!("{category} (n = {count})"))
                .legend(move |(lx, ly)| Circle::new((lx, ly), 5, colour.filled()));
        }

        let limit = rgb(style.limit_line).stroke_width(2);
        draw_dashed_hline(&mut chart, &x, self.threshold, limit)?;
        draw_dashed_hline(&mut chart, &x, -self.threshold, limit)?;
        chart
            .draw_series(LineSeries::new(
                vec![(x.lo, 0.0), (x.hi, 0.0)],
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
