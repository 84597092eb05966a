use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Zoom;
use crate::config::TimelineConfig;
use crate::error::{EngineError, EngineResult};

/// バー背後のグリッド線の間隔（バー自体には影響しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Day,
    #[default]
    Week,
    Month,
}

impl ViewMode {
    pub fn tick_days(self) -> i64 {
        match self {
            ViewMode::Day => 1,
            ViewMode::Week => 7,
            ViewMode::Month => 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub date: NaiveDate,
    pub offset: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct TimelineAxis {
    unit_per_day: f64,
}

impl TimelineAxis {
    pub fn new(unit_per_day: f64) -> Self {
        Self { unit_per_day }
    }

    /// `[window_start, window_start + window_days)` のグリッド線。
    ///
    /// projector と同じスケールなので目盛りはバーの端とそろう。
    pub fn ticks(
        &self,
        window_start: DateTime<Utc>,
        window_days: i64,
        view_mode: ViewMode,
        zoom: Zoom,
    ) -> EngineResult<Vec<AxisTick>> {
        if !(1..=TimelineConfig::MAX_WINDOW_DAYS).contains(&window_days) {
            return Err(EngineError::InvalidWindow(window_days));
        }
        let scale = self.unit_per_day * zoom.get();
        let step = view_mode.tick_days() as usize;

        (0..window_days)
            .step_by(step)
            .map(|offset_days| {
                let at = window_start
                    .checked_add_signed(Duration::days(offset_days))
                    .ok_or(EngineError::InvalidWindow(window_days))?;
                Ok(AxisTick {
                    date: at.date_naive(),
                    offset: offset_days as f64 * scale,
                })
            })
            .collect()
    }
}
