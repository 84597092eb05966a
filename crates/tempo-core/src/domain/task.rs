use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ids::{ProjectId, TaskId};
use super::resource::ResourceRef;
use super::state::{TaskPriority, TaskStatus};
use crate::error::EngineResult;
use crate::temporal::DateRange;

/// ちょうどひとつのプロジェクトに属する作業単位
///
/// `progress` は呼び出し側が最後に報告した値。エンジンは集計に使うだけで、
/// 状態から計算し直すことはしない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub plan_start: DateTime<Utc>,
    pub plan_end: DateTime<Utc>,
    #[serde(default)]
    pub actual_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_end: Option<DateTime<Utc>>,
    /// 0..=100
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub estimate_hours: f64,
    #[serde(default)]
    pub dependencies: BTreeSet<TaskId>,
    /// 進捗か状態が最後に変わった時刻
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn resource(&self) -> ResourceRef {
        ResourceRef::Task(self.id.clone())
    }

    pub fn planned_range(&self) -> EngineResult<DateRange> {
        DateRange::new(
            &format!("task {}", self.id),
            self.plan_start,
            self.plan_end,
        )
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// 予定終了日までに終われば `Some(true)`。未完了または実績終了日が
    /// ないうちは判定できないので `None`。
    pub fn finished_on_time(&self) -> Option<bool> {
        if !self.is_completed() {
            return None;
        }
        self.actual_end.map(|end| end <= self.plan_end)
    }

    /// 集計用に 0..=100 に丸めた進捗
    pub fn bounded_progress(&self) -> u32 {
        u32::from(self.progress.min(100))
    }
}
