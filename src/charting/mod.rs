//! Chart geometry - stacked polygon paths, monotone smoothing, and axis
//! ticks. Pure geometry in a normalized 0-1000 viewport; themes, colors and
//! label formatting belong to the renderer.

mod axis;
mod chart_layout;
mod spline;

pub use axis::{value_axis, AxisScale};
pub use chart_layout::{ChartLayer, ChartLayout, ChartLayoutOptions, StackOffset};
pub use spline::monotone_spline;
