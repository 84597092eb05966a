//! Domain - ドメインモデル（ID、状態、プロジェクト、タスク、アラート、ワークスペース）

pub mod alert;
pub mod ids;
pub mod project;
pub mod resource;
pub mod state;
pub mod task;
pub mod workspace;

pub use alert::{Alert, AlertRule, RuleFamily};
pub use ids::{AlertId, ProjectId, TaskId};
pub use project::{Milestone, Project};
pub use resource::ResourceRef;
pub use state::{AlertLevel, AlertStatus, ProjectStatus, TaskPriority, TaskStatus};
pub use task::Task;
pub use workspace::{OrphanPolicy, Workspace};
