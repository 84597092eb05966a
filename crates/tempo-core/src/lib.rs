//! tempo-core
//!
//! Timeline & alert derivation engine for project/task schedules.
//!
//! # モジュール構成
//! - **temporal**: 日付ユーティリティ（days_between, is_overdue, DateRange）
//! - **domain**: ドメインモデル（ids, state, project, task, alert, workspace）
//! - **ports**: 抽象化レイヤー（Clock, IdGenerator）
//! - **timeline**: ガントバー / 割合バー / 目盛りの投影
//! - **progress**: 進捗と各種レートの集計
//! - **alerts**: ルール検出とアラートの keyed upsert
//! - **dashboard**: ダッシュボードのスナップショット
//! - **config**: しきい値・タイムライン定数・オーファンポリシー
//! - **observability**: アラート件数ビュー
//! - **error**: エラー型
//!
//! エンジンは純粋な計算だけを行い、`Workspace` の所有と更新は呼び出し側が担います。

pub mod alerts;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod observability;
pub mod ports;
pub mod progress;
pub mod temporal;
pub mod timeline;

pub use alerts::{AlertClassifier, AlertFilter, ScanReport};
pub use config::EngineConfig;
pub use dashboard::{DashboardSnapshot, DashboardSummarizer};
pub use error::{EngineError, EngineResult};
