//! Charts module - chart layout and rendering

mod layout;
mod plotter;
mod renderer;

pub use layout::{ChartModel, TITLE};
pub use plotter::{ChartPlotter, FEMALE_COLOR, MALE_COLOR};
pub use renderer::StaticChartRenderer;
