//! Charts module - Chart planning and rendering

mod plotter;
mod renderer;

pub use plotter::{ChartData, ChartKind, ChartPlotter, PALETTE, PIE_COLORS};
pub use renderer::{ChartError, StaticChartRenderer};
