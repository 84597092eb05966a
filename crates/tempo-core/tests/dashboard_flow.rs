use chrono::{DateTime, TimeZone, Utc};

use tempo_core::config::TrendGranularity;
use tempo_core::domain::{
    AlertLevel, AlertRule, OrphanPolicy, ProjectId, ResourceRef, TaskId, Workspace,
};
use tempo_core::ports::{FixedClock, UlidGenerator};
use tempo_core::timeline::{TimelineProjector, Zoom};
use tempo_core::{AlertClassifier, DashboardSummarizer, EngineConfig, EngineError};

const WORKSPACE: &str = include_str!("../../../demos/workspace.json");
const CONFIG: &str = include_str!("../../../demos/config.json");

fn jan(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

fn classifier(config: &EngineConfig) -> AlertClassifier<UlidGenerator<FixedClock>> {
    AlertClassifier::new(config.thresholds, UlidGenerator::new(FixedClock::new(jan(1))))
}

fn rule_for(ws: &Workspace, resource: &ResourceRef) -> Vec<AlertRule> {
    let mut rules: Vec<AlertRule> = ws
        .alerts
        .iter()
        .filter(|a| a.is_active() && &a.resource == resource)
        .map(|a| a.rule)
        .collect();
    rules.sort();
    rules
}

#[test]
fn scan_then_summarize_demo_workspace() {
    let config = EngineConfig::default();
    let mut ws = Workspace::from_json_str(WORKSPACE).unwrap();
    ws.validate().unwrap();

    let report = classifier(&config).scan_workspace(&mut ws, jan(15)).unwrap();
    assert_eq!(report.created.len(), 6);

    let task = |id: &str| ResourceRef::Task(TaskId::new(id));
    let project = |id: &str| ResourceRef::Project(ProjectId::new(id));
    assert_eq!(rule_for(&ws, &project("p-billing")), vec![AlertRule::PredictedOverrun]);
    assert_eq!(rule_for(&ws, &project("p-portal")), vec![AlertRule::MilestoneApproaching]);
    assert_eq!(rule_for(&ws, &task("t-dashboard")), vec![AlertRule::DeadlineApproaching]);
    assert_eq!(rule_for(&ws, &task("t-notify")), vec![AlertRule::Stalled]);
    assert_eq!(
        rule_for(&ws, &task("t-ledger")),
        vec![AlertRule::CriticalOverrun, AlertRule::Stalled]
    );
    assert!(rule_for(&ws, &task("t-login")).is_empty());

    let snapshot = DashboardSummarizer::new(&config).summarize(&ws, jan(15)).unwrap();
    assert_eq!(snapshot.projects.total, 3);
    assert_eq!(snapshot.projects.active, 2);
    assert_eq!(snapshot.tasks.total, 5);
    assert_eq!(snapshot.tasks.blocked, 1);
    assert_eq!(snapshot.completion_rate, 40);
    assert_eq!(snapshot.on_time_rate, 50);
    assert_eq!(snapshot.delay_rate, 20);

    let progress: Vec<u8> = snapshot.project_progress.iter().map(|p| p.progress).collect();
    assert_eq!(progress, vec![50, 85, 0]);

    assert_eq!(snapshot.alert_counts.active, 6);
    assert_eq!(snapshot.alert_counts.critical, 1);
    assert_eq!(snapshot.alert_counts.high, 1);
    assert_eq!(snapshot.alert_counts.medium, 3);
    assert_eq!(snapshot.alert_counts.low, 1);
    assert_eq!(snapshot.recent_alerts.len(), 5);

    // t-cutover finished late on Jan 9, the first day of the window
    assert_eq!(snapshot.trend.len(), 7);
    assert_eq!(snapshot.trend[0].completed, 1);
    assert_eq!(snapshot.trend[0].delayed, 1);
    assert_eq!(snapshot.trend.iter().map(|p| p.on_time).sum::<usize>(), 0);
}

#[test]
fn rescans_upsert_instead_of_duplicating() {
    let config = EngineConfig::default();
    let c = classifier(&config);
    let mut ws = Workspace::from_json_str(WORKSPACE).unwrap();

    c.scan_workspace(&mut ws, jan(15)).unwrap();
    let again = c.scan_workspace(&mut ws, jan(15)).unwrap();
    assert!(again.is_empty());
    assert_eq!(ws.alerts.len(), 6);

    let dashboard = ResourceRef::Task(TaskId::new("t-dashboard"));
    let before = ws.alerts.iter().find(|a| a.resource == dashboard).unwrap().id.clone();

    let later = c.scan_workspace(&mut ws, jan(21)).unwrap();
    assert!(later.escalated.contains(&before));

    let alert = ws.alerts.iter().find(|a| a.id == before).unwrap();
    assert_eq!(alert.level, AlertLevel::High);
    assert_eq!(alert.predicted_delay_days, Some(5));
    // idle since Jan 13 09:30, so it has also stalled by now
    assert_eq!(
        rule_for(&ws, &dashboard),
        vec![AlertRule::PredictedOverrun, AlertRule::Stalled]
    );
}

#[test]
fn demo_config_changes_thresholds_and_trend() {
    let config = EngineConfig::from_json_str(CONFIG).unwrap();
    assert_eq!(config.thresholds.approaching_days, 3);
    assert_eq!(config.thresholds.stale_days, 7);
    assert_eq!(config.dashboard.granularity, TrendGranularity::Weekly);

    let mut ws = Workspace::from_json_str(WORKSPACE).unwrap();
    classifier(&config).scan_workspace(&mut ws, jan(15)).unwrap();

    let snapshot = DashboardSummarizer::new(&config).summarize(&ws, jan(15)).unwrap();
    assert_eq!(snapshot.trend.len(), 4);
    assert_eq!(snapshot.recent_alerts.len(), 6);
    // Jan 9..=15 holds the late cutover, Jan 2..=8 the on-time login
    assert_eq!(snapshot.trend[3].delayed, 1);
    assert_eq!(snapshot.trend[2].on_time, 1);
}

#[test]
fn deleting_a_task_under_report_policy_surfaces_orphans() {
    let config = EngineConfig::default();
    let mut ws = Workspace::from_json_str(WORKSPACE).unwrap();
    classifier(&config).scan_workspace(&mut ws, jan(15)).unwrap();

    ws.remove_task(&TaskId::new("t-notify"), OrphanPolicy::Report);

    let err = DashboardSummarizer::new(&config)
        .summarize(&ws, jan(15))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownResource { .. }));
}

#[test]
fn deleting_a_project_under_cascade_policy_removes_its_alerts() {
    let config = EngineConfig {
        orphan_policy: OrphanPolicy::Cascade,
        ..Default::default()
    };
    let mut ws = Workspace::from_json_str(WORKSPACE).unwrap();
    classifier(&config).scan_workspace(&mut ws, jan(15)).unwrap();

    ws.remove_project(&ProjectId::new("p-billing"), config.orphan_policy);

    assert_eq!(ws.tasks.len(), 3);
    assert_eq!(ws.alerts.len(), 3);
    ws.validate().unwrap();

    let snapshot = DashboardSummarizer::new(&config).summarize(&ws, jan(15)).unwrap();
    assert_eq!(snapshot.alert_counts.critical, 0);
}

#[test]
fn gantt_bars_for_demo_tasks() {
    let ws = Workspace::from_json_str(WORKSPACE).unwrap();
    let projector = TimelineProjector::default();

    let bars = projector.project_all(&ws.tasks, Zoom::default(), jan(15)).unwrap();
    let ledger = bars
        .iter()
        .find(|b| b.resource == ResourceRef::Task(TaskId::new("t-ledger")))
        .unwrap();

    // Dec 4 is 42 days before Jan 15; the plan spans 30 days
    assert_eq!(ledger.left, -1680.0);
    assert_eq!(ledger.width, 1200.0);
    assert!(ledger.overdue);

    let login = bars
        .iter()
        .find(|b| b.resource == ResourceRef::Task(TaskId::new("t-login")))
        .unwrap();
    assert!(!login.overdue);
}
