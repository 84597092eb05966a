//! Domain identifiers - 型付き ID
//!
//! # 文字列ベースの ID + Phantom Type
//! Project と Task の ID は呼び出し側（UI / モックデータ）が決めるため、
//! 任意の文字列をそのまま保持します。Alert の ID だけはエンジン側で
//! ULID から生成します（`alert-01H...`）。
//!
//! `Id<T>` の `T` は実行時には使わないマーカー型で、
//! ProjectId と TaskId を取り違えるとコンパイルエラーになります。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {}

/// ジェネリック ID 型
///
/// Serialize / Deserialize は中身の文字列と同じ表現になります。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// 任意の文字列から Id を作成
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Project のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Project {}

impl IdMarker for Project {}

/// Task のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {}

/// Alert のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Alert {}

impl IdMarker for Alert {}

/// Project の ID
pub type ProjectId = Id<Project>;

/// Task の ID（必ずひとつの Project に属する）
pub type TaskId = Id<Task>;

/// Alert の ID（classifier が生成）
pub type AlertId = Id<Alert>;

impl Id<Alert> {
    /// ULID から Alert の ID を作成（`alert-` プレフィックス付き）
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self::new(format!("alert-{ulid}"))
    }
}
