//! Rules - ルール検出器
//!
//! 各検出器はプロジェクトまたはタスク 1 件に対する純粋関数で、
//! ルールファミリーごとに `Finding` を 0 件か 1 件返します。
//! 既存のアラートは見ません。重複排除は classifier の担当です。

use chrono::{DateTime, Utc};

use crate::config::RuleThresholds;
use crate::domain::{AlertRule, Project, ResourceRef, Task};
use crate::temporal::{days_between, is_overdue};

/// リソースに対して現在成り立っているルール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub resource: ResourceRef,
    pub rule: AlertRule,
    pub reason: String,
    pub predicted_delay_days: Option<i64>,
    /// 新しいアラートの `notified_to` に入れる宛先
    pub recipient: Option<String>,
}

// ---------------------------------------------------------------------------
// Deadline family: approaching -> predicted overrun -> critical overrun
// ---------------------------------------------------------------------------

/// 期限系の Finding（該当する中で最も重いもの 1 件まで）
pub fn detect_deadline(
    resource: &ResourceRef,
    plan_end: DateTime<Utc>,
    now: DateTime<Utc>,
    thresholds: &RuleThresholds,
) -> Option<Finding> {
    if is_overdue(plan_end, now) {
        let delay = days_between(plan_end, now);
        let rule = if delay > thresholds.critical_delay_days {
            AlertRule::CriticalOverrun
        } else {
            AlertRule::PredictedOverrun
        };
        return Some(Finding {
            resource: resource.clone(),
            rule,
            reason: format!("past planned end, expected delay {delay} days"),
            predicted_delay_days: Some(delay),
            recipient: None,
        });
    }

    let remaining = days_between(now, plan_end);
    (remaining <= thresholds.approaching_days).then(|| Finding {
        resource: resource.clone(),
        rule: AlertRule::DeadlineApproaching,
        reason: format!("due in {remaining} days"),
        predicted_delay_days: None,
        recipient: None,
    })
}

// ---------------------------------------------------------------------------
// Stalled (tasks only)
// ---------------------------------------------------------------------------

pub fn detect_stalled(
    task: &Task,
    now: DateTime<Utc>,
    thresholds: &RuleThresholds,
) -> Option<Finding> {
    let idle = (now - task.updated_at).num_days();
    (idle >= thresholds.stale_days).then(|| Finding {
        resource: task.resource(),
        rule: AlertRule::Stalled,
        reason: format!("not updated in {idle} days"),
        predicted_delay_days: None,
        recipient: None,
    })
}

// ---------------------------------------------------------------------------
// Milestone approaching (projects only)
// ---------------------------------------------------------------------------

/// 先読み期間内で期日前の、最も近い未完了マイルストーン
pub fn detect_milestone(
    project: &Project,
    now: DateTime<Utc>,
    thresholds: &RuleThresholds,
) -> Option<Finding> {
    let milestone = project
        .open_milestones()
        .filter(|m| !is_overdue(m.due, now))
        .filter(|m| days_between(now, m.due) <= thresholds.milestone_horizon_days)
        .min_by_key(|m| m.due)?;

    let remaining = days_between(now, milestone.due);
    let name = if milestone.name.is_empty() {
        "milestone"
    } else {
        milestone.name.as_str()
    };
    Some(Finding {
        resource: project.resource(),
        rule: AlertRule::MilestoneApproaching,
        reason: format!("{name} due in {remaining} days"),
        predicted_delay_days: None,
        recipient: None,
    })
}

// ---------------------------------------------------------------------------
// Per-resource entry points
// ---------------------------------------------------------------------------

/// タスク 1 件分の Finding（完了タスクは何も出さない）
pub fn detect_task(
    task: &Task,
    owner: Option<&str>,
    now: DateTime<Utc>,
    thresholds: &RuleThresholds,
) -> Vec<Finding> {
    if task.is_completed() {
        return Vec::new();
    }
    let resource = task.resource();
    [
        detect_deadline(&resource, task.plan_end, now, thresholds),
        detect_stalled(task, now, thresholds),
    ]
    .into_iter()
    .flatten()
    .map(|f| with_recipient(f, owner))
    .collect()
}

/// プロジェクト 1 件分の Finding（完了・中止プロジェクトは何も出さない）
pub fn detect_project(
    project: &Project,
    now: DateTime<Utc>,
    thresholds: &RuleThresholds,
) -> Vec<Finding> {
    if project.status.is_closed() {
        return Vec::new();
    }
    let resource = project.resource();
    let owner = Some(project.owner_id.as_str());
    [
        detect_deadline(&resource, project.plan_end, now, thresholds),
        detect_milestone(project, now, thresholds),
    ]
    .into_iter()
    .flatten()
    .map(|f| with_recipient(f, owner))
    .collect()
}

fn with_recipient(mut finding: Finding, owner: Option<&str>) -> Finding {
    finding.recipient = owner.filter(|o| !o.is_empty()).map(str::to_string);
    finding
}
