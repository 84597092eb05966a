//! Alerts - ルール検出・keyed upsert・一覧フィルタ

mod classifier;
mod filter;
pub mod rules;

pub use classifier::{AlertClassifier, ScanReport};
pub use filter::AlertFilter;
pub use rules::Finding;
