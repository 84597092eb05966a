use serde::Serialize;

use crate::domain::{Alert, AlertLevel, AlertStatus};

/// ダッシュボードのバッジ用アラート件数
///
/// レベル別の件数はアクティブなアラートだけを数える。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub total: usize,
    pub active: usize,
    pub resolved: usize,
    pub dismissed: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl AlertCounts {
    pub fn tally<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> Self {
        let mut counts = Self::default();
        for alert in alerts {
            counts.total += 1;
            match alert.status {
                AlertStatus::Active => counts.active += 1,
                AlertStatus::Resolved => counts.resolved += 1,
                AlertStatus::Dismissed => counts.dismissed += 1,
            }
            if !alert.is_active() {
                continue;
            }
            match alert.level {
                AlertLevel::Low => counts.low += 1,
                AlertLevel::Medium => counts.medium += 1,
                AlertLevel::High => counts.high += 1,
                AlertLevel::Critical => counts.critical += 1,
            }
        }
        counts
    }

    /// アクティブな high + critical
    pub fn urgent(&self) -> usize {
        self.high + self.critical
    }
}
