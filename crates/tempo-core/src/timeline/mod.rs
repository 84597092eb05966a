//! Timeline - ガントバー / ボードの割合バー / 目盛りの投影

mod axis;
mod projector;
mod zoom;

pub use axis::{AxisTick, TimelineAxis, ViewMode};
pub use projector::{PercentBar, TimelineBar, TimelineItem, TimelineProjector};
pub use zoom::Zoom;
