use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ids::ProjectId;
use super::resource::ResourceRef;
use super::state::ProjectStatus;
use crate::error::EngineResult;
use crate::temporal::DateRange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub name: String,
    pub due: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: String,
    pub status: ProjectStatus,
    pub plan_start: DateTime<Utc>,
    pub plan_end: DateTime<Utc>,
    pub owner_id: String,
    #[serde(default)]
    pub member_ids: BTreeSet<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub dependencies: BTreeSet<ProjectId>,
}

impl Project {
    pub fn resource(&self) -> ResourceRef {
        ResourceRef::Project(self.id.clone())
    }

    pub fn planned_range(&self) -> EngineResult<DateRange> {
        DateRange::new(
            &format!("project {}", self.id),
            self.plan_start,
            self.plan_end,
        )
    }

    pub fn open_milestones(&self) -> impl Iterator<Item = &Milestone> {
        self.milestones.iter().filter(|m| !m.completed)
    }
}
