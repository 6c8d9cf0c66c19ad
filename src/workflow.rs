use crate::calculations::delay;
use crate::calculations::forward_pass::ForwardPass;
use crate::metadata::WorkflowMetadata;
use crate::palette::Palette;
use crate::scenario::{DelayMode, DelayScenario, NO_DELAY, is_no_delay};
use crate::task::TaskDef;
use crate::task_validation::{self, WorkflowValidationError};
use crate::timeline::Timeline;
use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug)]
pub enum PlanError {
    /// A start references a task that is not declared earlier in the list.
    UnknownPredecessor {
        task: String,
        predecessor: String,
    },
    DuplicateTask(String),
    InvalidTask {
        task: String,
        reason: String,
    },
    UnknownScenario {
        workflow: String,
        label: String,
    },
    UnknownWorkflow(String),
    InvalidWorkflow(String),
    /// The resolved grid needs more columns than a sheet row can hold.
    GridTooLarge {
        workflow: String,
        slots: f64,
    },
    DateOutOfRange {
        workflow: String,
        offset: f64,
    },
    DataFrame(PolarsError),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::UnknownPredecessor { task, predecessor } => write!(
                f,
                "task '{task}' starts after '{predecessor}', which is not declared before it"
            ),
            PlanError::DuplicateTask(name) => write!(f, "task '{name}' is declared more than once"),
            PlanError::InvalidTask { task, reason } => write!(f, "task '{task}': {reason}"),
            PlanError::UnknownScenario { workflow, label } => {
                write!(f, "workflow '{workflow}' has no delay scenario '{label}'")
            }
            PlanError::UnknownWorkflow(key) => write!(f, "no workflow named '{key}'"),
            PlanError::InvalidWorkflow(msg) => write!(f, "invalid workflow: {msg}"),
            PlanError::GridTooLarge { workflow, slots } => write!(
                f,
                "workflow '{workflow}' needs {slots} grid columns, at most {} are supported",
                crate::timeline::MAX_SLOTS
            ),
            PlanError::DateOutOfRange { workflow, offset } => write!(
                f,
                "day {offset} of workflow '{workflow}' is outside the supported calendar"
            ),
            PlanError::DataFrame(err) => write!(f, "dataframe error: {err}"),
        }
    }
}

impl std::error::Error for PlanError {}

impl From<PolarsError> for PlanError {
    fn from(value: PolarsError) -> Self {
        Self::DataFrame(value)
    }
}

impl From<WorkflowValidationError> for PlanError {
    fn from(value: WorkflowValidationError) -> Self {
        Self::InvalidWorkflow(value.to_string())
    }
}

/// Day grid used by the spreadsheet and chart renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSettings {
    /// Width of one grid column in days (1.0 or 0.5 in the built-in workflows).
    pub step_days: f64,
    /// Minimum span of the grid; the latest task end extends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_days: Option<f64>,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            step_days: 1.0,
            horizon_days: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub key: String,
    pub metadata: WorkflowMetadata,
    pub tasks: Vec<TaskDef>,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub scenarios: Vec<DelayScenario>,
    #[serde(default)]
    pub timeline: TimelineSettings,
}

impl Workflow {
    pub fn new(key: impl Into<String>, metadata: WorkflowMetadata) -> Self {
        Self {
            key: key.into(),
            metadata,
            tasks: Vec::new(),
            palette: Palette::new(),
            scenarios: Vec::new(),
            timeline: TimelineSettings::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn push_task(&mut self, task: TaskDef) {
        self.tasks.push(task);
    }

    /// Categories in first-declared order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for task in &self.tasks {
            if !seen.contains(&task.category.as_str()) {
                seen.push(task.category.as_str());
            }
        }
        seen
    }

    /// `None` followed by every scenario label, the order a picker shows them.
    pub fn scenario_labels(&self) -> Vec<&str> {
        let mut labels = Vec::with_capacity(self.scenarios.len() + 1);
        labels.push(NO_DELAY);
        labels.extend(self.scenarios.iter().map(|s| s.label.as_str()));
        labels
    }

    /// Looks up a scenario; "None" resolves to `Ok(None)`.
    pub fn scenario(&self, label: &str) -> Result<Option<&DelayScenario>, PlanError> {
        if is_no_delay(label) {
            return Ok(None);
        }
        self.scenarios
            .iter()
            .find(|s| s.label.eq_ignore_ascii_case(label.trim()))
            .map(Some)
            .ok_or_else(|| PlanError::UnknownScenario {
                workflow: self.key.clone(),
                label: label.to_string(),
            })
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        task_validation::validate_workflow(self)?;
        Ok(())
    }

    /// Resolved timeline with no delay applied.
    pub fn resolve(&self) -> Result<Timeline, PlanError> {
        self.timeline(None, DelayMode::Flat)
    }

    /// Resolves the workflow and applies the scenario named `label`.
    pub fn timeline(&self, label: Option<&str>, mode: DelayMode) -> Result<Timeline, PlanError> {
        let scenario = match label {
            Some(label) => self.scenario(label)?,
            None => None,
        };

        let tasks = match (scenario, mode) {
            (Some(scenario), DelayMode::Propagate) => {
                delay::warn_unmatched(scenario, &self.tasks);
                ForwardPass::new(&self.tasks)
                    .with_offsets(scenario)
                    .execute()?
            }
            (Some(scenario), DelayMode::Flat) => {
                delay::warn_unmatched(scenario, &self.tasks);
                let mut tasks = ForwardPass::new(&self.tasks).execute()?;
                delay::apply_flat(&mut tasks, scenario);
                tasks
            }
            (None, _) => ForwardPass::new(&self.tasks).execute()?,
        };

        debug!(
            workflow = %self.key,
            scenario = scenario.map(|s| s.label.as_str()).unwrap_or(NO_DELAY),
            mode = %mode,
            tasks = tasks.len(),
            "resolved timeline"
        );

        let timeline = Timeline::new(self, scenario.map(|s| s.label.clone()), mode, tasks);
        timeline.check_extent()?;
        Ok(timeline)
    }
}
