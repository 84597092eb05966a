use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{AlertId, AlertStatus, ResourceRef};

/// ローカルな検証エラー。一時的なものはないので、該当レコードを飛ばすか
/// 描画全体を中断するかは呼び出し側が決める。
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid range for {resource}: end {end} is before start {start}")]
    InvalidRange {
        resource: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("invalid zoom {0}: zoom must be a positive finite number")]
    InvalidZoom(f64),

    #[error("invalid window of {0} days: window must span 1..=3660 days")]
    InvalidWindow(i64),

    #[error("alert {alert} references unknown resource {resource}")]
    UnknownResource { alert: AlertId, resource: ResourceRef },

    #[error("alert not found: {0}")]
    UnknownAlert(AlertId),

    #[error("alert {alert} cannot move from {from} to {to}")]
    InvalidTransition {
        alert: AlertId,
        from: AlertStatus,
        to: AlertStatus,
    },

    #[error("config: {0}")]
    Config(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
