//! AlertClassifier - 検出器の実行とアラートの upsert
//!
//! # 設計
//! - プロジェクトとタスクは読むだけ、書き込むのはアラートだけ
//! - (resource, rule family) をキーに upsert するので、変化のない
//!   スナップショットを再スキャンしてもアクティブなアラートは重複しない
//! - ファミリー内では最も重いアラートが残り、エスカレーションは既存の
//!   アラートをその場で書き換えて ID を保つ

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;

use super::rules::{Finding, detect_project, detect_task};
use crate::config::RuleThresholds;
use crate::domain::{
    Alert, AlertId, AlertStatus, Project, ResourceRef, RuleFamily, Task, Workspace,
};
use crate::error::EngineResult;
use crate::ports::{IdGenerator, SystemClock, UlidGenerator};

/// スキャン 1 回分の変更内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub created: Vec<AlertId>,
    pub escalated: Vec<AlertId>,
    pub refreshed: Vec<AlertId>,
    /// 同じリソースで同じルールが dismiss 済みのためスキップした件数
    pub suppressed: usize,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.escalated.is_empty() && self.refreshed.is_empty()
    }
}

pub struct AlertClassifier<G = UlidGenerator<SystemClock>> {
    thresholds: RuleThresholds,
    id_gen: G,
}

impl AlertClassifier {
    /// システム時計と ULID で ID を振る classifier
    pub fn with_thresholds(thresholds: RuleThresholds) -> Self {
        Self::new(thresholds, UlidGenerator::new(SystemClock))
    }
}

impl<G: IdGenerator> AlertClassifier<G> {
    pub fn new(thresholds: RuleThresholds, id_gen: G) -> Self {
        Self { thresholds, id_gen }
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// 現時点で成り立つルールをすべて返す（アラートには触れない）
    ///
    /// 予定終了日が開始日より前のプロジェクト / タスクがあればエラー。
    pub fn evaluate(
        &self,
        projects: &[Project],
        tasks: &[Task],
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<Finding>> {
        let owners: HashMap<_, _> = projects
            .iter()
            .map(|p| (&p.id, p.owner_id.as_str()))
            .collect();

        let mut findings = Vec::new();
        for project in projects {
            project.planned_range()?;
            findings.extend(detect_project(project, now, &self.thresholds));
        }
        for task in tasks {
            task.planned_range()?;
            let owner = owners.get(&task.project_id).copied();
            findings.extend(detect_task(task, owner, now, &self.thresholds));
        }
        Ok(findings)
    }

    /// ルールを評価し、結果を `alerts` に upsert
    pub fn scan(
        &self,
        projects: &[Project],
        tasks: &[Task],
        alerts: &mut Vec<Alert>,
        now: DateTime<Utc>,
    ) -> EngineResult<ScanReport> {
        let findings = self.evaluate(projects, tasks, now)?;

        let mut active: HashMap<(ResourceRef, RuleFamily), usize> = alerts
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_active())
            .map(|(i, a)| ((a.resource.clone(), a.family()), i))
            .collect();

        let mut report = ScanReport::default();
        for finding in findings {
            let key = (finding.resource.clone(), finding.rule.family());
            match active.get(&key).copied() {
                Some(index) => upsert(&mut alerts[index], finding, now, &mut report),
                None if is_dismissed(alerts.as_slice(), &finding) => {
                    debug!("{} {:?} suppressed (dismissed)", finding.resource, finding.rule);
                    report.suppressed += 1;
                }
                None => {
                    let alert = self.raise(finding, now);
                    debug!("{} raised {} ({})", alert.resource, alert.id, alert.level);
                    report.created.push(alert.id.clone());
                    active.insert(key, alerts.len());
                    alerts.push(alert);
                }
            }
        }

        info!(
            "alert scan: created={} escalated={} refreshed={} suppressed={}",
            report.created.len(),
            report.escalated.len(),
            report.refreshed.len(),
            report.suppressed
        );
        Ok(report)
    }

    pub fn scan_workspace(
        &self,
        workspace: &mut Workspace,
        now: DateTime<Utc>,
    ) -> EngineResult<ScanReport> {
        let Workspace {
            projects,
            tasks,
            alerts,
        } = workspace;
        self.scan(projects, tasks, alerts, now)
    }

    fn raise(&self, finding: Finding, now: DateTime<Utc>) -> Alert {
        let mut alert = Alert::new(
            self.id_gen.generate_alert_id(),
            finding.resource,
            finding.rule,
            finding.reason,
            finding.predicted_delay_days,
            now,
        );
        alert.notified_to.extend(finding.recipient);
        alert
    }
}

fn is_dismissed(alerts: &[Alert], finding: &Finding) -> bool {
    alerts.iter().any(|a| {
        a.status == AlertStatus::Dismissed
            && a.resource == finding.resource
            && a.rule == finding.rule
    })
}

/// Finding を同じファミリーのアクティブなアラートへマージ
fn upsert(alert: &mut Alert, finding: Finding, now: DateTime<Utc>, report: &mut ScanReport) {
    let level = finding.rule.level();
    if level > alert.level {
        debug!("{} escalated {} -> {}", alert.id, alert.level, level);
        alert.upsert_rule(finding.rule, finding.reason, finding.predicted_delay_days, now);
        report.escalated.push(alert.id.clone());
    } else if finding.rule == alert.rule
        && (alert.reason != finding.reason
            || alert.predicted_delay_days != finding.predicted_delay_days)
    {
        alert.upsert_rule(finding.rule, finding.reason, finding.predicted_delay_days, now);
        report.refreshed.push(alert.id.clone());
    }
    // A less severe finding never downgrades an active alert.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AlertLevel, AlertRule, ProjectId, ProjectStatus, TaskId, TaskPriority, TaskStatus,
    };
    use crate::error::EngineError;
    use crate::ports::FixedClock;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn classifier() -> AlertClassifier<UlidGenerator<FixedClock>> {
        AlertClassifier::new(
            RuleThresholds::default(),
            UlidGenerator::new(FixedClock::new(day(1))),
        )
    }

    fn project() -> Project {
        Project {
            id: ProjectId::new("p-1"),
            name: "launch".to_string(),
            department: "eng".to_string(),
            status: ProjectStatus::Active,
            plan_start: day(1),
            plan_end: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            owner_id: "u-lead".to_string(),
            member_ids: BTreeSet::new(),
            milestones: Vec::new(),
            dependencies: BTreeSet::new(),
        }
    }

    /// 更新直後なので期限系のルールだけが発火
    fn doing_task(now: DateTime<Utc>) -> Task {
        Task {
            id: TaskId::new("t-1"),
            project_id: ProjectId::new("p-1"),
            title: "api".to_string(),
            status: TaskStatus::Doing,
            priority: TaskPriority::High,
            plan_start: day(1),
            plan_end: day(10),
            actual_start: Some(day(1)),
            actual_end: None,
            progress: 60,
            estimate_hours: 24.0,
            dependencies: BTreeSet::new(),
            updated_at: now,
        }
    }

    fn active(alerts: &[Alert]) -> Vec<&Alert> {
        alerts.iter().filter(|a| a.is_active()).collect()
    }

    #[test]
    fn overdue_task_raises_one_high_alert() {
        let c = classifier();
        let mut alerts = Vec::new();

        let report = c
            .scan(&[project()], &[doing_task(day(15))], &mut alerts, day(15))
            .unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.level, AlertLevel::High);
        assert_eq!(alert.rule, AlertRule::PredictedOverrun);
        assert_eq!(alert.predicted_delay_days, Some(5));
        assert_eq!(alert.resource, ResourceRef::Task(TaskId::new("t-1")));
        assert!(alert.notified_to.contains("u-lead"));
    }

    #[test]
    fn rescanning_unchanged_snapshot_is_idempotent() {
        let c = classifier();
        let projects = [project()];
        let tasks = [doing_task(day(15))];
        let mut alerts = Vec::new();

        c.scan(&projects, &tasks, &mut alerts, day(15)).unwrap();
        let snapshot = alerts.clone();
        let second = c.scan(&projects, &tasks, &mut alerts, day(15)).unwrap();

        assert!(second.is_empty());
        assert_eq!(alerts, snapshot);
    }

    #[test]
    fn growing_delay_escalates_in_place_to_critical() {
        let c = classifier();
        let projects = [project()];
        let mut alerts = Vec::new();

        c.scan(&projects, &[doing_task(day(15))], &mut alerts, day(15))
            .unwrap();
        let first_id = alerts[0].id.clone();

        let report = c
            .scan(&projects, &[doing_task(day(21))], &mut alerts, day(21))
            .unwrap();

        assert_eq!(report.escalated, vec![first_id.clone()]);
        assert!(report.created.is_empty());
        assert_eq!(active(&alerts).len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.id, first_id);
        assert_eq!(alert.level, AlertLevel::Critical);
        assert_eq!(alert.rule, AlertRule::CriticalOverrun);
        assert_eq!(alert.predicted_delay_days, Some(11));
        assert_eq!(alert.created_at, day(15));
        assert_eq!(alert.updated_at, day(21));
    }

    #[test]
    fn same_rule_with_new_delay_is_refreshed() {
        let c = classifier();
        let projects = [project()];
        let mut alerts = Vec::new();

        c.scan(&projects, &[doing_task(day(13))], &mut alerts, day(13))
            .unwrap();
        let report = c
            .scan(&projects, &[doing_task(day(14))], &mut alerts, day(14))
            .unwrap();

        assert_eq!(report.refreshed.len(), 1);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].predicted_delay_days, Some(4));
    }

    #[test]
    fn approaching_alert_escalates_when_deadline_passes() {
        let c = classifier();
        let projects = [project()];
        let mut alerts = Vec::new();

        c.scan(&projects, &[doing_task(day(9))], &mut alerts, day(9))
            .unwrap();
        assert_eq!(alerts[0].rule, AlertRule::DeadlineApproaching);

        c.scan(&projects, &[doing_task(day(12))], &mut alerts, day(12))
            .unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule, AlertRule::PredictedOverrun);
    }

    #[test]
    fn dismissed_rule_is_not_raised_again() {
        let c = classifier();
        let projects = [project()];
        let tasks = [doing_task(day(15))];
        let mut alerts = Vec::new();

        c.scan(&projects, &tasks, &mut alerts, day(15)).unwrap();
        alerts[0].dismiss(day(15)).unwrap();

        let report = c.scan(&projects, &tasks, &mut alerts, day(15)).unwrap();
        assert_eq!(report.suppressed, 1);
        assert_eq!(alerts.len(), 1);
        assert!(active(&alerts).is_empty());
    }

    #[test]
    fn dismissed_high_does_not_hide_critical() {
        let c = classifier();
        let projects = [project()];
        let mut alerts = Vec::new();

        c.scan(&projects, &[doing_task(day(15))], &mut alerts, day(15))
            .unwrap();
        alerts[0].dismiss(day(15)).unwrap();

        let report = c
            .scan(&projects, &[doing_task(day(21))], &mut alerts, day(21))
            .unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(active(&alerts)[0].level, AlertLevel::Critical);
    }

    #[test]
    fn resolved_condition_that_still_holds_is_raised_again() {
        let c = classifier();
        let projects = [project()];
        let tasks = [doing_task(day(15))];
        let mut alerts = Vec::new();

        c.scan(&projects, &tasks, &mut alerts, day(15)).unwrap();
        alerts[0].resolve(day(15)).unwrap();

        let report = c.scan(&projects, &tasks, &mut alerts, day(16)).unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(alerts.len(), 2);
        assert_eq!(active(&alerts).len(), 1);
    }

    #[test]
    fn stalled_and_overrun_are_separate_alerts() {
        let c = classifier();
        let mut task = doing_task(day(1));
        task.updated_at = day(2);
        let mut alerts = Vec::new();

        c.scan(&[project()], &[task], &mut alerts, day(12)).unwrap();

        let mut rules: Vec<AlertRule> = alerts.iter().map(|a| a.rule).collect();
        rules.sort();
        assert_eq!(rules, vec![AlertRule::PredictedOverrun, AlertRule::Stalled]);
    }

    #[test]
    fn completed_task_raises_nothing() {
        let c = classifier();
        let mut task = doing_task(day(1));
        task.status = TaskStatus::Completed;
        let mut alerts = Vec::new();

        let report = c.scan(&[project()], &[task], &mut alerts, day(30)).unwrap();
        assert!(report.created.is_empty());
        assert!(alerts.is_empty());
    }

    #[test]
    fn inverted_range_fails_the_scan() {
        let c = classifier();
        let mut task = doing_task(day(1));
        task.plan_start = day(20);
        let mut alerts = Vec::new();

        let err = c
            .scan(&[project()], &[task], &mut alerts, day(5))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRange { .. }));
        assert!(alerts.is_empty());
    }

    #[test]
    fn scan_workspace_writes_into_workspace_alerts() {
        let c = classifier();
        let mut ws = Workspace::new(vec![project()], vec![doing_task(day(15))]);

        c.scan_workspace(&mut ws, day(15)).unwrap();
        assert_eq!(ws.alerts.len(), 1);
        assert!(ws.check_alert_references().is_ok());
    }
}
