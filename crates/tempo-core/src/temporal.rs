//! Temporal - 日付計算のユーティリティ
//!
//! どの関数も純粋でタイムゾーンを意識しません。呼び出し側がすべての時刻を
//! ひとつの基準タイムゾーンにそろえてから渡します。

use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// 日数差 `ceil((b - a) / 1 day)`
///
/// `b` が `a` より後なら正。
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    let diff = (b - a).num_milliseconds();
    let days = diff.div_euclid(MILLIS_PER_DAY);
    if diff.rem_euclid(MILLIS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

pub fn is_overdue(end: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    end < now
}

/// `end` までの残り日数（過ぎたら負）
pub fn days_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    days_between(now, end)
}

/// `YYYY-MM-DD`
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD HH:MM`
pub fn format_date_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// 検証済みの `[start, end]` 区間
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// `end < start` を拒否。`label` はエラーに載せるリソース名
    pub fn new(label: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::InvalidRange {
                resource: label.to_string(),
                start,
                end,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// 日数（切り上げ）。長さ 0 の区間でもバーが見えるよう最小 1。
    pub fn duration_days(&self) -> i64 {
        days_between(self.start, self.end).max(1)
    }
}
