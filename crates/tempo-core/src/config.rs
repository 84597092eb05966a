//! EngineConfig - エンジン設定
//!
//! ルールのしきい値、タイムライン定数、ダッシュボード設定、オーファンポリシー。
//! 全フィールドにデフォルトがあるので、一部だけの JSON や設定なしでも有効です。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::OrphanPolicy;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// 残り日数がこれ以下で期限接近
    pub approaching_days: i64,
    /// 進捗・状態の更新がこの日数ないと停滞
    pub stale_days: i64,
    /// 予測遅延がこれを超えると重大超過
    pub critical_delay_days: i64,
    /// マイルストーン接近の先読み日数
    pub milestone_horizon_days: i64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            approaching_days: 2,
            stale_days: 7,
            critical_delay_days: 5,
            milestone_horizon_days: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub unit_per_day: f64,
    pub min_width_units: f64,
    pub window_days: i64,
}

impl TimelineConfig {
    /// 表示ウィンドウの上限（約 10 年）
    pub const MAX_WINDOW_DAYS: i64 = 3660;
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            unit_per_day: 40.0,
            min_width_units: 20.0,
            window_days: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendGranularity {
    #[default]
    Daily,
    Weekly,
}

impl TrendGranularity {
    pub fn bucket_days(self) -> i64 {
        match self {
            TrendGranularity::Daily => 1,
            TrendGranularity::Weekly => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub recent_alert_limit: usize,
    /// 今日で終わるトレンドのバケット数
    pub trend_days: usize,
    pub granularity: TrendGranularity,
}

impl DashboardConfig {
    /// トレンド系列のバケット数の上限
    pub const MAX_TREND_BUCKETS: usize = 366;
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_alert_limit: 5,
            trend_days: 7,
            granularity: TrendGranularity::Daily,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: RuleThresholds,
    pub timeline: TimelineConfig,
    pub dashboard: DashboardConfig,
    pub orphan_policy: OrphanPolicy,
}

impl EngineConfig {
    pub fn from_json_str(content: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(content)
            .map_err(|err| EngineError::Config(format!("invalid JSON: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| EngineError::Config(format!("{}: {}", path.display(), err)))?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let t = &self.thresholds;
        if t.approaching_days < 0
            || t.stale_days < 0
            || t.critical_delay_days < 0
            || t.milestone_horizon_days < 0
        {
            return Err(EngineError::Config(
                "rule thresholds must not be negative".to_string(),
            ));
        }
        let tl = &self.timeline;
        if !(tl.unit_per_day.is_finite() && tl.unit_per_day > 0.0) {
            return Err(EngineError::Config(format!(
                "unit_per_day must be positive, got {}",
                tl.unit_per_day
            )));
        }
        if !(tl.min_width_units.is_finite() && tl.min_width_units >= 0.0) {
            return Err(EngineError::Config(format!(
                "min_width_units must not be negative, got {}",
                tl.min_width_units
            )));
        }
        if !(1..=TimelineConfig::MAX_WINDOW_DAYS).contains(&tl.window_days) {
            return Err(EngineError::InvalidWindow(tl.window_days));
        }
        if self.dashboard.trend_days > DashboardConfig::MAX_TREND_BUCKETS {
            return Err(EngineError::Config(format!(
                "trend_days must be at most {}, got {}",
                DashboardConfig::MAX_TREND_BUCKETS,
                self.dashboard.trend_days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.thresholds.approaching_days, 2);
        assert_eq!(config.thresholds.stale_days, 7);
        assert_eq!(config.thresholds.critical_delay_days, 5);
        assert_eq!(config.timeline.unit_per_day, 40.0);
        assert_eq!(config.orphan_policy, OrphanPolicy::Report);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let content = serde_json::json!({
            "thresholds": { "stale_days": 3 },
            "dashboard": { "granularity": "weekly" },
            "orphan_policy": "cascade"
        });
        let config = EngineConfig::from_json_str(&content.to_string()).unwrap();

        assert_eq!(config.thresholds.stale_days, 3);
        assert_eq!(config.thresholds.approaching_days, 2);
        assert_eq!(config.dashboard.granularity, TrendGranularity::Weekly);
        assert_eq!(config.dashboard.trend_days, 7);
        assert_eq!(config.orphan_policy, OrphanPolicy::Cascade);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = EngineConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "timeline": { "window_days": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidWindow(0)));
    }

    #[rstest]
    #[case::huge_window(r#"{ "timeline": { "window_days": 100000000 } }"#)]
    #[case::negative_window(r#"{ "timeline": { "window_days": -3 } }"#)]
    #[case::huge_trend(r#"{ "dashboard": { "trend_days": 20000000, "granularity": "weekly" } }"#)]
    fn out_of_range_spans_are_rejected(#[case] content: &str) {
        let err = EngineConfig::from_json_str(content).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidWindow(_) | EngineError::Config(_)
        ));
    }

    #[test]
    fn largest_allowed_spans_are_accepted() {
        let content = serde_json::json!({
            "timeline": { "window_days": TimelineConfig::MAX_WINDOW_DAYS },
            "dashboard": { "trend_days": DashboardConfig::MAX_TREND_BUCKETS },
        });
        assert!(EngineConfig::from_json_str(&content.to_string()).is_ok());
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let path = std::env::temp_dir().join("tempo-config-that-does-not-exist.json");
        let err = EngineConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("tempo-config-that-does-not-exist.json"));
    }
}
