//! DashboardSummarizer - ダッシュボードの集計
//!
//! `Workspace` を読んで集計するだけで、スナップショットは呼び出しごとに
//! 作り直します（キャッシュしない）。

use chrono::{DateTime, Days, NaiveDate, Utc};
use log::info;
use serde::Serialize;

use crate::config::{DashboardConfig, EngineConfig};
use crate::domain::{Alert, OrphanPolicy, ProjectStatus, Task, TaskStatus, Workspace};
use crate::error::{EngineError, EngineResult};
use crate::observability::AlertCounts;
use crate::progress::{
    ProjectProgress, on_time_rate, overdue_rate, project_progress_for, task_completion_rate,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// `active` は `doing` のタスク数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub blocked: usize,
}

/// 実績終了日が `[start, end]` に入る完了タスクの件数。
///
/// `completed == on_time + delayed`（実績終了日のない完了タスクは日付を
/// 持たないので数えない）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub completed: usize,
    pub on_time: usize,
    pub delayed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub projects: ProjectCounts,
    pub tasks: TaskCounts,
    pub completion_rate: u8,
    pub on_time_rate: u8,
    pub delay_rate: u8,
    pub recent_alerts: Vec<Alert>,
    pub alert_counts: AlertCounts,
    pub project_progress: Vec<ProjectProgress>,
    pub trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardSummarizer {
    config: DashboardConfig,
    orphan_policy: OrphanPolicy,
}

impl DashboardSummarizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.dashboard,
            orphan_policy: config.orphan_policy,
        }
    }

    pub fn summarize(
        &self,
        workspace: &Workspace,
        now: DateTime<Utc>,
    ) -> EngineResult<DashboardSnapshot> {
        let alerts = self.visible_alerts(workspace)?;
        let tasks = &workspace.tasks;

        let mut recent: Vec<Alert> = alerts
            .iter()
            .filter(|a| a.is_active())
            .map(|a| (*a).clone())
            .collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(self.config.recent_alert_limit);

        let snapshot = DashboardSnapshot {
            generated_at: now,
            projects: count_projects(workspace),
            tasks: count_tasks(tasks),
            completion_rate: task_completion_rate(tasks),
            on_time_rate: on_time_rate(tasks),
            delay_rate: overdue_rate(tasks, now),
            recent_alerts: recent,
            alert_counts: AlertCounts::tally(alerts.iter().copied()),
            project_progress: workspace
                .projects
                .iter()
                .map(|p| project_progress_for(p, tasks))
                .collect(),
            trend: trend(tasks, now.date_naive(), &self.config)?,
        };

        info!(
            "dashboard: {} projects, {} tasks, {} active alerts",
            snapshot.projects.total, snapshot.tasks.total, snapshot.alert_counts.active
        );
        Ok(snapshot)
    }

    /// 既知のリソースを指すアラート
    ///
    /// `Report` ではオーファンがあると集計全体がエラー、`Cascade` では除外。
    fn visible_alerts<'a>(&self, workspace: &'a Workspace) -> EngineResult<Vec<&'a Alert>> {
        match self.orphan_policy {
            OrphanPolicy::Report => {
                workspace.check_alert_references()?;
                Ok(workspace.alerts.iter().collect())
            }
            OrphanPolicy::Cascade => Ok(workspace
                .alerts
                .iter()
                .filter(|a| workspace.contains(&a.resource))
                .collect()),
        }
    }
}

fn count_projects(workspace: &Workspace) -> ProjectCounts {
    let mut counts = ProjectCounts::default();
    for project in &workspace.projects {
        counts.total += 1;
        match project.status {
            ProjectStatus::Active => counts.active += 1,
            ProjectStatus::Completed => counts.completed += 1,
            _ => {}
        }
    }
    counts
}

fn count_tasks(tasks: &[Task]) -> TaskCounts {
    let mut counts = TaskCounts::default();
    for task in tasks {
        counts.total += 1;
        match task.status {
            TaskStatus::Doing => counts.active += 1,
            TaskStatus::Completed => counts.completed += 1,
            TaskStatus::Blocked => counts.blocked += 1,
            TaskStatus::Todo => {}
        }
    }
    counts
}

/// `trend_days` 個のバケット（古い順）。最後のバケットは `today` で終わる。
///
/// 暦の範囲に収まらない系列は `Config` エラー。
fn trend(
    tasks: &[Task],
    today: NaiveDate,
    config: &DashboardConfig,
) -> EngineResult<Vec<TrendPoint>> {
    let width = config.granularity.bucket_days().unsigned_abs();
    let out_of_calendar = || {
        EngineError::Config(format!(
            "trend of {} buckets runs past the calendar",
            config.trend_days
        ))
    };

    let mut points = Vec::new();
    for back in (0..config.trend_days as u64).rev() {
        let end = back
            .checked_mul(width)
            .and_then(|span| today.checked_sub_days(Days::new(span)))
            .ok_or_else(out_of_calendar)?;
        let start = end
            .checked_sub_days(Days::new(width - 1))
            .ok_or_else(out_of_calendar)?;
        points.push(TrendPoint {
            start,
            end,
            completed: 0,
            on_time: 0,
            delayed: 0,
        });
    }

    for task in tasks {
        let (Some(on_time), Some(finished)) = (task.finished_on_time(), task.actual_end) else {
            continue;
        };
        let date = finished.date_naive();
        if let Some(point) = points.iter_mut().find(|p| p.start <= date && date <= p.end) {
            point.completed += 1;
            if on_time {
                point.on_time += 1;
            } else {
                point.delayed += 1;
            }
        }
    }
    Ok(points)
}
