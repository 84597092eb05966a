//! AlertFilter - アラート一覧の絞り込み（レベル / 状態 / テキスト検索）

use serde::Deserialize;

use crate::domain::{Alert, AlertLevel, AlertStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AlertFilter {
    pub level: Option<AlertLevel>,
    pub status: Option<AlertStatus>,
    /// reason・ルールコード・リソース ID に対する大文字小文字を区別しない部分一致
    pub search: Option<String>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        if self.level.is_some_and(|level| alert.level != level) {
            return false;
        }
        if self.status.is_some_and(|status| alert.status != status) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                [alert.reason.as_str(), alert.rule.code(), alert.resource.id()]
                    .iter()
                    .any(|haystack| haystack.to_lowercase().contains(&needle))
            }
        }
    }

    /// 条件に合うアラート（新しい順）
    pub fn apply<'a>(&self, alerts: &'a [Alert]) -> Vec<&'a Alert> {
        let mut matched: Vec<&Alert> = alerts.iter().filter(|a| self.matches(a)).collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }
}
