//! Static Chart Renderer
//! Writes the grant chart to an SVG file with plotters.
//!
//! Layout:
//! 1. Title centered on top
//! 2. Bars per year (stacked or side-by-side), year ticks on the x axis
//! 3. Count / percentage labels above the bars
//! 4. Legend in the upper right corner

use crate::charts::layout::{
    year_index, ChartModel, Sex, TITLE, X_AXIS_LABEL, Y_AXIS_LABEL,
};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use thiserror::Error;

const MALE: RGBColor = RGBColor(52, 152, 219); // Blue
const FEMALE: RGBColor = RGBColor(233, 30, 99); // Pink

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart to {path}: {message}")]
    Draw { path: String, message: String },
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the chart as an SVG file of `size` pixels.
    pub fn render_svg(model: &ChartModel, path: &Path, size: (u32, u32)) -> Result<(), RenderError> {
        Self::draw(model, path, size).map_err(|e| RenderError::Draw {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn sex_color(sex: Sex) -> RGBColor {
        match sex {
            Sex::Male => MALE,
            Sex::Female => FEMALE,
        }
    }

    fn draw(
        model: &ChartModel,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = SVGBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let n_years = model.year_labels.len().max(1);
        let mut chart = ChartBuilder::on(&root)
            .caption(TITLE, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.6f64..(n_years as f64 - 0.4), 0f64..model.y_max)?;

        let year_labels = &model.year_labels;
        let format_year =
            |x: &f64| year_index(*x).and_then(|i| year_labels.get(i).cloned()).unwrap_or_default();

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n_years + 1)
            .x_label_formatter(&format_year)
            .y_label_formatter(&|y| format!("{:.0}", y))
            .x_desc(X_AXIS_LABEL)
            .y_desc(Y_AXIS_LABEL)
            .draw()?;

        for sex in [Sex::Male, Sex::Female] {
            let color = Self::sex_color(sex);
            chart
                .draw_series(model.bars_for(sex).map(|b| {
                    let half = b.width / 2.0;
                    Rectangle::new([(b.x - half, b.base), (b.x + half, b.top())], color.filled())
                }))?
                .label(sex.legend())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        let label_style = ("sans-serif", 12)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(
            model
                .labels
                .iter()
                .map(|l| Text::new(l.text.clone(), (l.x, l.y), label_style.clone())),
        )?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}
