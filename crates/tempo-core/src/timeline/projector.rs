//! TimelineProjector - 日付区間から 1 次元のバー形状への投影
//!
//! # 2 つのモード
//! - **絶対単位**（`project`）: ガントチャート用。1 日あたり `U` 単位を zoom 倍
//! - **ウィンドウ比**（`project_percent`）: グリッドボード用
//!
//! どちらも入力だけで決まる純粋関数で、呼び出し間のキャッシュはありません。

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Zoom;
use crate::config::TimelineConfig;
use crate::domain::{Project, ResourceRef, Task};
use crate::error::{EngineError, EngineResult};
use crate::temporal::{DateRange, days_between, is_overdue};

/// バーとして描けるもの
pub trait TimelineItem {
    fn resource(&self) -> ResourceRef;

    fn planned_range(&self) -> EngineResult<DateRange>;

    /// 完了済みは期限超過にしない
    fn is_done(&self) -> bool;
}

impl TimelineItem for Task {
    fn resource(&self) -> ResourceRef {
        Task::resource(self)
    }

    fn planned_range(&self) -> EngineResult<DateRange> {
        Task::planned_range(self)
    }

    fn is_done(&self) -> bool {
        self.is_completed()
    }
}

impl TimelineItem for Project {
    fn resource(&self) -> ResourceRef {
        Project::resource(self)
    }

    fn planned_range(&self) -> EngineResult<DateRange> {
        Project::planned_range(self)
    }

    fn is_done(&self) -> bool {
        self.status.is_closed()
    }
}

/// 絶対単位のバー。`left` は負になりうる（表示より前に始まる）ので
/// 切り詰めは呼び出し側で行う。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineBar {
    pub resource: ResourceRef,
    pub left: f64,
    pub width: f64,
    pub overdue: bool,
}

/// ウィンドウ比のバー。どちらの値も `0..=100`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentBar {
    pub resource: ResourceRef,
    pub left_percent: f64,
    pub width_percent: f64,
    pub overdue: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TimelineProjector {
    unit_per_day: f64,
    min_width_units: f64,
}

impl TimelineProjector {
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            unit_per_day: config.unit_per_day,
            min_width_units: config.min_width_units,
        }
    }

    pub fn unit_per_day(&self) -> f64 {
        self.unit_per_day
    }

    /// 検証済み区間の `(left, width)`（単位）
    pub fn geometry(&self, range: DateRange, zoom: Zoom, reference_now: DateTime<Utc>) -> (f64, f64) {
        let scale = self.unit_per_day * zoom.get();
        let days_from_now = days_between(reference_now, range.start());
        let left = days_from_now as f64 * scale;
        let width = (range.duration_days() as f64 * scale).max(self.min_width_units);
        (left, width)
    }

    pub fn project<I: TimelineItem + ?Sized>(
        &self,
        item: &I,
        zoom: Zoom,
        reference_now: DateTime<Utc>,
    ) -> EngineResult<TimelineBar> {
        let range = item.planned_range()?;
        let (left, width) = self.geometry(range, zoom, reference_now);
        Ok(TimelineBar {
            resource: item.resource(),
            left,
            width,
            overdue: is_overdue(range.end(), reference_now) && !item.is_done(),
        })
    }

    /// まとめて投影。不正な項目があれば最初の 1 件でエラー
    pub fn project_all<'a, I, It>(
        &self,
        items: It,
        zoom: Zoom,
        reference_now: DateTime<Utc>,
    ) -> EngineResult<Vec<TimelineBar>>
    where
        I: TimelineItem + 'a,
        It: IntoIterator<Item = &'a I>,
    {
        items
            .into_iter()
            .map(|item| self.project(item, zoom, reference_now))
            .collect()
    }

    /// ボード表示用のウィンドウ比投影
    ///
    /// `reference_now` はウィンドウの開始（今日、または設定した基準日）。
    pub fn project_percent<I: TimelineItem + ?Sized>(
        &self,
        item: &I,
        window_days: i64,
        reference_now: DateTime<Utc>,
    ) -> EngineResult<PercentBar> {
        if window_days <= 0 {
            return Err(EngineError::InvalidWindow(window_days));
        }
        let range = item.planned_range()?;
        let window = window_days as f64;
        let days_from_now = days_between(reference_now, range.start()) as f64;

        Ok(PercentBar {
            resource: item.resource(),
            left_percent: (days_from_now / window).clamp(0.0, 1.0) * 100.0,
            width_percent: (range.duration_days() as f64 / window).clamp(0.0, 1.0) * 100.0,
            overdue: is_overdue(range.end(), reference_now) && !item.is_done(),
        })
    }
}

impl Default for TimelineProjector {
    fn default() -> Self {
        Self::new(&TimelineConfig::default())
    }
}
