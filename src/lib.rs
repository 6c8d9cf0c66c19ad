pub mod calculations;
pub mod catalog;
pub mod config;
pub mod graph;
pub mod logging;
pub mod metadata;
pub mod palette;
pub mod persistence;
pub mod render;
pub mod scenario;
pub mod task;
pub mod task_validation;
pub mod timeline;
pub mod workflow;

#[cfg(feature = "http_api")]
pub mod http_api;

pub use calculations::compare::{ScenarioOutcome, compare_scenarios};
pub use calculations::forward_pass::ForwardPass;
pub use config::{ConfigError, PlannerConfig};
pub use graph::DependencyGraph;
pub use metadata::WorkflowMetadata;
pub use palette::{Palette, Rgb};
pub use scenario::{DelayMode, DelayScenario, NO_DELAY};
pub use task::{ScheduledTask, StartSpec, TaskDef};
pub use timeline::{Timeline, TimelineSummary};
pub use workflow::{PlanError, TimelineSettings, Workflow};
