use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// 日数から単位への倍率。常に正の有限値
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Zoom(f64);

impl Zoom {
    /// ガント表示ツールバーの上下限と刻み
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 2.0;
    pub const STEP: f64 = 0.1;

    pub fn new(value: f64) -> EngineResult<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(EngineError::InvalidZoom(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    pub fn zoom_in(self) -> Self {
        Self::stepped(self.0 + Self::STEP)
    }

    pub fn zoom_out(self) -> Self {
        Self::stepped(self.0 - Self::STEP)
    }

    /// 小数 1 桁に丸めて、繰り返し操作でずれないようにする
    fn stepped(value: f64) -> Self {
        let rounded = (value * 10.0).round() / 10.0;
        Self(rounded.clamp(Self::MIN, Self::MAX))
    }

    /// 整数パーセントのラベル（例: `110%`）
    pub fn percent_label(self) -> String {
        format!("{}%", (self.0 * 100.0).round() as i64)
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(1.0)
    }
}
