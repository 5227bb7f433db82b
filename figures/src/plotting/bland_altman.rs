use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_backend::DrawingBackend;

use crate::analysis::bland_altman::BlandAltman;
use crate::analysis::ticks::{nice_scale, AxisScale};
use crate::config::{ComparisonConfig, PlotStyle};
use crate::error::{render_err, Result};
use crate::plotting::{
    draw_axes, draw_dashed_hline, extent, rgb, text_style, Figure, TickAxis,
};

pub struct BlandAltmanPlot<'a> {
    pub summary: &'a BlandAltman,
    pub config: &'a ComparisonConfig,
    pub style: &'a PlotStyle,
}

impl BlandAltmanPlot<'_> {
    /// x over the averages; y over the differences, the bias and both limits.
    pub fn axes(&self) -> (AxisScale, AxisScale) {
        let ba = self.summary;
        let x = {
            let (lo, hi) = extent([&ba.average[..]]);
            nice_scale(lo, hi, self.config.target_ticks)
        };
        let lines = [ba.bias, ba.upper_loa, ba.lower_loa];
        let (lo, hi) = extent([&ba.difference[..], &lines[..]]);
        (x, nice_scale(lo, hi, self.config.target_ticks))
    }

    /// Text placed next to each horizontal line, upper limit first.
    pub fn annotations(&self) -> [(f64, String); 3] {
        let ba = self.summary;
        let m = ba.multiplier;
        [
            (ba.upper_loa, format!("+{m:.2} SD: {:.3}", ba.upper_loa)),
            (ba.bias, format!("Bias: {:.3}", ba.bias)),
            (ba.lower_loa, format!("-{m:.2} SD: {:.3}", ba.lower_loa)),
        ]
    }
}

impl Figure for BlandAltmanPlot<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(render_err)?;
        let style = self.style;
        let ba = self.summary;
        let (x, y) = self.axes();

        let title = format!(
            "Bland-Altman: {} vs {}",
            self.config.method_a, self.config.method_b
        );
        let x_desc = format!("Mean of {} and {}", self.config.method_a, self.config.method_b);
        let y_desc = format!("{} - {}", self.config.method_a, self.config.method_b);

        let mut chart = ChartBuilder::on(root)
            .caption(title, text_style(style, style.title_size))
            .margin(style.margin)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(TickAxis::new(x), TickAxis::new(y))
            .map_err(render_err)?;

        let x_decimals = x.decimals();
        let x_format = move |v: &f64| format!("{:.*}", x_decimals, v);
        draw_axes(&mut chart, &x, &y, &x_desc, &y_desc, style, &x_format)?;

        let colour = rgb(style.method_a);
        let radius = style.point_radius as i32;
        chart
            .draw_series(
                ba.points()
                    .map(|p| Circle::new(p, radius, colour.mix(0.6).filled())),
            )
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(
                vec![(x.lo, ba.bias), (x.hi, ba.bias)],
                rgb(style.reference_line).stroke_width(2),
            ))
            .map_err(render_err)?;

        let limit = rgb(style.limit_line).stroke_width(2);
        draw_dashed_hline(&mut chart, &x, ba.upper_loa, limit)?;
        draw_dashed_hline(&mut chart, &x, ba.lower_loa, limit)?;

        let anchor = Pos::new(HPos::Right, VPos::Bottom);
        let label_style = text_style(style, style.legend_size).pos(anchor);
        chart
            .draw_series(self.annotations().into_iter().map(|(at, text)| {
                Text::new(text, (x.hi, at), label_style.clone())
            }))
            .map_err(render_err)?;
        Ok(())
    }
}
