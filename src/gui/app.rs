//! Report Window
//! Summary table on the left, interactive bar chart in the center.

use crate::charts::{ChartModel, ChartPlotter, TITLE};
use crate::stats::YearSeries;
use egui::{Color32, RichText, SidePanel};

/// Main application window.
pub struct ReportApp {
    shape_name: String,
    files: Vec<String>,
    series: Vec<YearSeries>,
    model: ChartModel,
}

impl ReportApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        shape_name: String,
        files: Vec<String>,
        series: Vec<YearSeries>,
        model: ChartModel,
    ) -> Self {
        Self {
            shape_name,
            files,
            series,
            model,
        }
    }

    fn pct_text(pct: Option<f64>) -> String {
        pct.map(|p| format!("{:.1}%", p))
            .unwrap_or_else(|| "-".to_string())
    }

    /// Per-year counts and shares
    fn draw_summary_table(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("summary_table")
                    .striped(true)
                    .min_col_width(45.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["Ano", "H", "F", "Total", "% H", "% F"] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for s in &self.series {
                            ui.label(RichText::new(&s.year).size(11.0));
                            ui.label(
                                RichText::new(s.male.to_string())
                                    .size(11.0)
                                    .color(crate::charts::MALE_COLOR),
                            );
                            ui.label(
                                RichText::new(s.female.to_string())
                                    .size(11.0)
                                    .color(crate::charts::FEMALE_COLOR),
                            );
                            ui.label(RichText::new(s.total().to_string()).size(11.0));
                            ui.label(RichText::new(Self::pct_text(s.male_pct())).size(11.0));
                            ui.label(RichText::new(Self::pct_text(s.female_pct())).size(11.0));
                            ui.end_row();
                        }
                    });
            });
    }
}

impl eframe::App for ReportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        SidePanel::left("summary_panel")
            .min_width(300.0)
            .max_width(380.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.heading(format!("Shape: {}", self.shape_name));
                    ui.label(format!("{} file(s), {:?} layout", self.files.len(), self.model.layout));
                    for file in &self.files {
                        ui.label(RichText::new(file).size(10.0).color(Color32::GRAY));
                    }
                    ui.separator();

                    if self.model.is_empty() {
                        ui.label(RichText::new("No matching grants").color(Color32::from_rgb(220, 53, 69)));
                    } else {
                        self.draw_summary_table(ui);
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(TITLE);
            });
            ChartPlotter::draw_bar_chart(ui, &self.model);
        });
    }
}
