//! Alert - アラートとそのライフサイクル

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ids::AlertId;
use super::resource::ResourceRef;
use super::state::{AlertLevel, AlertStatus};
use crate::error::{EngineError, EngineResult};

/// アラートを出したルール（reason コードとしてシリアライズ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertRule {
    DeadlineApproaching,
    PredictedOverrun,
    CriticalOverrun,
    Stalled,
    MilestoneApproaching,
}

/// 同じ状況を表すルールのまとまり
///
/// (resource, family) ごとにアクティブなアラートは最大 1 件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleFamily {
    Deadline,
    Stalled,
    Milestone,
}

impl AlertRule {
    pub fn family(self) -> RuleFamily {
        match self {
            AlertRule::DeadlineApproaching
            | AlertRule::PredictedOverrun
            | AlertRule::CriticalOverrun => RuleFamily::Deadline,
            AlertRule::Stalled => RuleFamily::Stalled,
            AlertRule::MilestoneApproaching => RuleFamily::Milestone,
        }
    }

    pub fn level(self) -> AlertLevel {
        match self {
            AlertRule::MilestoneApproaching => AlertLevel::Low,
            AlertRule::DeadlineApproaching | AlertRule::Stalled => AlertLevel::Medium,
            AlertRule::PredictedOverrun => AlertLevel::High,
            AlertRule::CriticalOverrun => AlertLevel::Critical,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            AlertRule::DeadlineApproaching => "deadline_approaching",
            AlertRule::PredictedOverrun => "predicted_overrun",
            AlertRule::CriticalOverrun => "critical_overrun",
            AlertRule::Stalled => "stalled",
            AlertRule::MilestoneApproaching => "milestone_approaching",
        }
    }
}

/// プロジェクトまたはタスク 1 件に対するレベル付きの警告
///
/// # 設計
/// - 生成するのは classifier だけ。呼び出し側は resolve / dismiss のみ
/// - 状態遷移はメソッド経由で、`status` を直接書き換えない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub resource: ResourceRef,
    #[serde(rename = "type")]
    pub rule: AlertRule,
    pub level: AlertLevel,
    pub reason: String,
    #[serde(default)]
    pub predicted_delay_days: Option<i64>,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub notified_to: BTreeSet<String>,
}

impl Alert {
    pub fn new(
        id: AlertId,
        resource: ResourceRef,
        rule: AlertRule,
        reason: String,
        predicted_delay_days: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            resource,
            rule,
            level: rule.level(),
            reason,
            predicted_delay_days,
            status: AlertStatus::Active,
            created_at: now,
            updated_at: now,
            notified_to: BTreeSet::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    pub fn family(&self) -> RuleFamily {
        self.rule.family()
    }

    pub fn resolve(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        self.transition(AlertStatus::Resolved, now)
    }

    pub fn dismiss(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        self.transition(AlertStatus::Dismissed, now)
    }

    fn transition(&mut self, next: AlertStatus, now: DateTime<Utc>) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                alert: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// ルール（同じファミリーで同等以上の重さ）をその場で差し替え
    ///
    /// ID と作成時刻はそのまま。更新できるのはアクティブなアラートだけ。
    pub(crate) fn upsert_rule(
        &mut self,
        rule: AlertRule,
        reason: String,
        predicted_delay_days: Option<i64>,
        now: DateTime<Utc>,
    ) {
        debug_assert!(self.is_active());
        debug_assert_eq!(self.family(), rule.family());
        self.rule = rule;
        self.level = rule.level();
        self.reason = reason;
        self.predicted_delay_days = predicted_delay_days;
        self.updated_at = now;
    }
}
