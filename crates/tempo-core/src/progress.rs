//! Progress - プロジェクト進捗とタスクの各種レート
//!
//! レートはすべて四捨五入した整数パーセント。入力が空なら 0 を返します（NaN にはならない）。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Project, ProjectId, ProjectStatus, Task, TaskStatus};
use crate::temporal::is_overdue;

/// `round_half_up(100 * part / whole)`（`whole == 0` なら 0）
pub(crate) fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (part as u64, whole as u64);
    ((200 * part + whole) / (2 * whole)).min(100) as u8
}

/// `project_id` に属するタスクの平均進捗
pub fn project_progress(project_id: &ProjectId, tasks: &[Task]) -> u8 {
    let (sum, count) = tasks
        .iter()
        .filter(|t| &t.project_id == project_id)
        .fold((0u64, 0u64), |(sum, count), t| {
            (sum + u64::from(t.bounded_progress()), count + 1)
        });
    if count == 0 {
        return 0;
    }
    ((2 * sum + count) / (2 * count)).min(100) as u8
}

/// `completed` のタスクの割合
pub fn task_completion_rate(tasks: &[Task]) -> u8 {
    let completed = tasks.iter().filter(|t| t.is_completed()).count();
    percent(completed, tasks.len())
}

/// 判定可能なタスク（完了かつ実績終了日あり）のうち予定終了日までに終わった割合。
/// 判定できないタスクは分子にも分母にも入れない。
pub fn on_time_rate(tasks: &[Task]) -> u8 {
    let (on_time, judged) = tasks
        .iter()
        .filter_map(Task::finished_on_time)
        .fold((0, 0), |(on_time, judged), ok| {
            (on_time + usize::from(ok), judged + 1)
        });
    percent(on_time, judged)
}

/// 全タスクのうち、未完了で予定終了日を過ぎたものの割合
pub fn overdue_rate(tasks: &[Task], now: DateTime<Utc>) -> u8 {
    let overdue = tasks
        .iter()
        .filter(|t| !t.is_completed() && is_overdue(t.plan_end, now))
        .count();
    percent(overdue, tasks.len())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStatusCounts {
    pub total: usize,
    pub todo: usize,
    pub doing: usize,
    pub blocked: usize,
    pub completed: usize,
}

impl TaskStatusCounts {
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            counts.total += 1;
            match task.status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::Doing => counts.doing += 1,
                TaskStatus::Blocked => counts.blocked += 1,
                TaskStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }
}

/// プロジェクト別進捗リストの 1 行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectProgress {
    pub project_id: ProjectId,
    pub project_name: String,
    pub progress: u8,
    pub status: ProjectStatus,
    pub owner: String,
    pub department: String,
}

pub fn project_progress_for(project: &Project, tasks: &[Task]) -> ProjectProgress {
    ProjectProgress {
        project_id: project.id.clone(),
        project_name: project.name.clone(),
        progress: project_progress(&project.id, tasks),
        status: project.status,
        owner: project.owner_id.clone(),
        department: project.department.clone(),
    }
}
