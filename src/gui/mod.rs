//! GUI module - report window

mod app;

pub use app::ReportApp;

use crate::charts::ChartModel;
use crate::stats::YearSeries;
use eframe::egui;

/// Open the native chart window and block until it is closed.
pub fn run(
    shape_name: String,
    files: Vec<String>,
    series: Vec<YearSeries>,
    model: ChartModel,
) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 720.0])
            .with_min_inner_size([900.0, 500.0])
            .with_title("ProUni Chart"),
        ..Default::default()
    };

    eframe::run_native(
        "ProUni Chart",
        options,
        Box::new(move |cc| {
            Ok(Box::new(ReportApp::new(
                cc, shape_name, files, series, model,
            )))
        }),
    )
}
