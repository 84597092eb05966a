//! Workspace - アプリ側が所有するインメモリのスナップショット
//!
//! # 設計
//! - プロジェクト・タスク・アラートの唯一の情報源
//! - エンジンは `&Workspace` からビューを導出するだけで、更新するのは
//!   アプリ側（ユーザー編集のあと再スキャン）

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::alert::Alert;
use super::ids::{AlertId, ProjectId, TaskId};
use super::project::Project;
use super::resource::ResourceRef;
use super::task::Task;
use crate::error::{EngineError, EngineResult};

/// プロジェクト / タスク削除時にそのアラートをどう扱うか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// アラートを残す。集計時に `UnknownResource` として報告
    #[default]
    Report,
    /// リソースと一緒にアラートも削除
    Cascade,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl Workspace {
    pub fn new(projects: Vec<Project>, tasks: Vec<Task>) -> Self {
        Self {
            projects,
            tasks,
            alerts: Vec::new(),
        }
    }

    pub fn from_json_str(content: &str) -> EngineResult<Self> {
        serde_json::from_str(content)
            .map_err(|err| EngineError::Config(format!("invalid workspace JSON: {err}")))
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn tasks_of<'a>(&'a self, project_id: &'a ProjectId) -> impl Iterator<Item = &'a Task> {
        self.tasks.iter().filter(move |t| &t.project_id == project_id)
    }

    pub fn contains(&self, resource: &ResourceRef) -> bool {
        match resource {
            ResourceRef::Project(id) => self.project(id).is_some(),
            ResourceRef::Task(id) => self.task(id).is_some(),
        }
    }

    /// すべての予定期間（`end >= start`）とアラートの参照先を検査
    pub fn validate(&self) -> EngineResult<()> {
        for project in &self.projects {
            project.planned_range()?;
        }
        for task in &self.tasks {
            task.planned_range()?;
        }
        self.check_alert_references()
    }

    /// 存在しないリソースを指すアラートがあれば最初の 1 件でエラー
    pub fn check_alert_references(&self) -> EngineResult<()> {
        match self.orphaned_alerts().next() {
            Some(alert) => Err(EngineError::UnknownResource {
                alert: alert.id.clone(),
                resource: alert.resource.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn orphaned_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| !self.contains(&a.resource))
    }

    /// タスクを削除。`Cascade` ならそのアラートも削除
    pub fn remove_task(&mut self, id: &TaskId, policy: OrphanPolicy) -> Option<Task> {
        let index = self.tasks.iter().position(|t| &t.id == id)?;
        let task = self.tasks.remove(index);
        if policy == OrphanPolicy::Cascade {
            let resource = task.resource();
            self.drop_alerts_for(|r| r == &resource);
        }
        Some(task)
    }

    /// プロジェクトを削除。`Cascade` なら配下のタスクと関連アラートもすべて
    /// 削除し、`Report` ならタスクは残す。
    pub fn remove_project(&mut self, id: &ProjectId, policy: OrphanPolicy) -> Option<Project> {
        let index = self.projects.iter().position(|p| &p.id == id)?;
        let project = self.projects.remove(index);
        if policy == OrphanPolicy::Cascade {
            let (removed, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
                .into_iter()
                .partition(|t| &t.project_id == id);
            self.tasks = kept;

            let mut doomed: Vec<ResourceRef> = removed.iter().map(Task::resource).collect();
            doomed.push(project.resource());
            self.drop_alerts_for(|r| doomed.contains(r));
        }
        Some(project)
    }

    fn drop_alerts_for(&mut self, matches: impl Fn(&ResourceRef) -> bool) {
        let before = self.alerts.len();
        self.alerts.retain(|a| !matches(&a.resource));
        debug!("cascade removed {} alert(s)", before - self.alerts.len());
    }

    pub fn alert_mut(&mut self, id: &AlertId) -> EngineResult<&mut Alert> {
        self.alerts
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| EngineError::UnknownAlert(id.clone()))
    }

    pub fn resolve_alert(&mut self, id: &AlertId, now: DateTime<Utc>) -> EngineResult<()> {
        self.alert_mut(id)?.resolve(now)
    }

    pub fn dismiss_alert(&mut self, id: &AlertId, now: DateTime<Utc>) -> EngineResult<()> {
        self.alert_mut(id)?.dismiss(now)
    }
}
