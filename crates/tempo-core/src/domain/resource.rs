use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ProjectId, TaskId};

/// アラートやタイムラインバーの対象
///
/// `{"kind": "task", "id": "t-1"}` の形でシリアライズ。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ResourceRef {
    Project(ProjectId),
    Task(TaskId),
}

impl ResourceRef {
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceRef::Project(_) => "project",
            ResourceRef::Task(_) => "task",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ResourceRef::Project(id) => id.as_str(),
            ResourceRef::Task(id) => id.as_str(),
        }
    }
}

impl From<ProjectId> for ResourceRef {
    fn from(id: ProjectId) -> Self {
        ResourceRef::Project(id)
    }
}

impl From<TaskId> for ResourceRef {
    fn from(id: TaskId) -> Self {
        ResourceRef::Task(id)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}
