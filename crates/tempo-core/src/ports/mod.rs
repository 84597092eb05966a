//! Ports - 抽象化レイヤー
//!
//! エンジン本体は純粋な計算だけを行い、時刻と ID 生成だけを
//! trait 経由で外から差し込みます。

pub mod clock;
pub mod id_generator;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
