//! Chart Plotter Module
//! Draws the bar chart interactively using egui_plot.

use crate::charts::layout::{year_index, ChartModel, Sex, X_AXIS_LABEL, Y_AXIS_LABEL};
use egui::{Align2, Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, Text};

pub const MALE_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const FEMALE_COLOR: Color32 = Color32::from_rgb(233, 30, 99); // Pink

/// Creates the grant chart using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn sex_color(sex: Sex) -> Color32 {
        match sex {
            Sex::Male => MALE_COLOR,
            Sex::Female => FEMALE_COLOR,
        }
    }

    fn bar_chart(model: &ChartModel, sex: Sex) -> BarChart {
        let color = Self::sex_color(sex);
        let bars: Vec<Bar> = model
            .bars_for(sex)
            .map(|b| {
                Bar::new(b.x, b.height)
                    .base_offset(b.base)
                    .width(b.width)
                    .fill(color)
            })
            .collect();

        BarChart::new(bars).name(sex.legend()).color(color)
    }

    /// Draw bars, labels and year ticks.
    pub fn draw_bar_chart(ui: &mut egui::Ui, model: &ChartModel) {
        let x_labels = model.year_labels.clone();
        let n_years = model.year_labels.len().max(1) as f64;

        Plot::new("grants_by_sex")
            .legend(Legend::default())
            .x_axis_label(X_AXIS_LABEL)
            .y_axis_label(Y_AXIS_LABEL)
            .allow_scroll(false)
            .include_x(-0.6)
            .include_x(n_years - 0.4)
            .include_y(0.0)
            .include_y(model.y_max)
            .x_axis_formatter(move |mark, _range| {
                year_index(mark.value)
                    .and_then(|i| x_labels.get(i).cloned())
                    .unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                // Stacking comes from each bar's base offset.
                plot_ui.bar_chart(Self::bar_chart(model, Sex::Male));
                plot_ui.bar_chart(Self::bar_chart(model, Sex::Female));

                for label in &model.labels {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(label.x, label.y),
                            RichText::new(&label.text).size(11.0),
                        )
                        .anchor(Align2::CENTER_BOTTOM)
                        .color(Color32::BLACK),
                    );
                }
            });
    }
}
