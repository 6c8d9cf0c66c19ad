use crate::graph::DependencyGraph;
use crate::scenario::DelayMode;
use crate::task::{StartSpec, TaskDef};
use crate::workflow::Workflow;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct WorkflowValidationError {
    message: String,
}

impl WorkflowValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for WorkflowValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WorkflowValidationError {}

pub fn validate_task(task: &TaskDef) -> Result<(), WorkflowValidationError> {
    if task.name.trim().is_empty() {
        return Err(WorkflowValidationError::new("task name must not be empty"));
    }

    if !task.duration_days.is_finite() || task.duration_days < 0.0 {
        return Err(WorkflowValidationError::new(format!(
            "task '{}' has invalid duration {}",
            task.name, task.duration_days
        )));
    }

    match &task.start {
        StartSpec::Offset(offset) => {
            if !offset.is_finite() || *offset < 0.0 {
                return Err(WorkflowValidationError::new(format!(
                    "task '{}' has invalid start offset {}",
                    task.name, offset
                )));
            }
        }
        StartSpec::After(name) => {
            if name.trim().is_empty() {
                return Err(WorkflowValidationError::new(format!(
                    "task '{}' names an empty predecessor",
                    task.name
                )));
            }
        }
        StartSpec::AfterAll(names) => {
            if names.is_empty() {
                return Err(WorkflowValidationError::new(format!(
                    "task '{}' starts after an empty predecessor list",
                    task.name
                )));
            }
        }
    }

    Ok(())
}

pub fn validate_task_collection(tasks: &[TaskDef]) -> Result<(), WorkflowValidationError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen.insert(task.name.as_str()) {
            return Err(WorkflowValidationError::new(format!(
                "duplicate task name '{}'",
                task.name
            )));
        }
        validate_task(task)?;
    }

    let dag = DependencyGraph::build(tasks);
    dag.check_order(tasks)
        .map_err(|err| WorkflowValidationError::new(err.to_string()))
}

pub fn validate_workflow(workflow: &Workflow) -> Result<(), WorkflowValidationError> {
    if workflow.key.trim().is_empty() {
        return Err(WorkflowValidationError::new("workflow key must not be empty"));
    }
    if workflow.key.contains(char::is_whitespace) {
        return Err(WorkflowValidationError::new(format!(
            "workflow key '{}' must not contain whitespace",
            workflow.key
        )));
    }

    let step = workflow.timeline.step_days;
    if !step.is_finite() || step <= 0.0 {
        return Err(WorkflowValidationError::new(format!(
            "workflow '{}' has invalid step_days {}",
            workflow.key, step
        )));
    }
    if let Some(horizon) = workflow.timeline.horizon_days {
        if !horizon.is_finite() || horizon < 0.0 {
            return Err(WorkflowValidationError::new(format!(
                "workflow '{}' has invalid horizon_days {}",
                workflow.key, horizon
            )));
        }
    }

    workflow
        .palette
        .validate()
        .map_err(|err| WorkflowValidationError::new(format!("workflow '{}': {err}", workflow.key)))?;

    validate_task_collection(&workflow.tasks)?;

    let mut labels = HashSet::with_capacity(workflow.scenarios.len());
    for scenario in &workflow.scenarios {
        let label = scenario.label.trim();
        if label.is_empty() || crate::scenario::is_no_delay(label) {
            return Err(WorkflowValidationError::new(format!(
                "workflow '{}' has a scenario with reserved or empty label '{}'",
                workflow.key, scenario.label
            )));
        }
        if !labels.insert(label.to_ascii_lowercase()) {
            return Err(WorkflowValidationError::new(format!(
                "workflow '{}' declares scenario '{}' more than once",
                workflow.key, scenario.label
            )));
        }
        for (task, offset) in &scenario.offsets {
            if !offset.is_finite() {
                return Err(WorkflowValidationError::new(format!(
                    "scenario '{}' has non-finite offset for '{task}'",
                    scenario.label
                )));
            }
        }
    }

    validate_extent(workflow)
}

/// Every scenario, in both modes, must fit the day grid and the calendar.
fn validate_extent(workflow: &Workflow) -> Result<(), WorkflowValidationError> {
    for label in workflow.scenario_labels() {
        for mode in [DelayMode::Flat, DelayMode::Propagate] {
            workflow
                .timeline(Some(label), mode)
                .map_err(|err| WorkflowValidationError::new(err.to_string()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::scenario::DelayScenario;

    #[test]
    fn rejects_negative_duration_and_duplicates() {
        let negative = vec![TaskDef::new("Soil Sampling", "Testing", 0.0, -1.0)];
        assert!(validate_task_collection(&negative).is_err());

        let duplicated = vec![
            TaskDef::new("Soil Sampling", "Testing", 0.0, 1.0),
            TaskDef::new("Soil Sampling", "Testing", 1.0, 1.0),
        ];
        let err = validate_task_collection(&duplicated).unwrap_err();
        assert!(err.to_string().contains("duplicate task name"));
    }

    #[test]
    fn rejects_reserved_and_repeated_scenario_labels() {
        let mut workflow = catalog::soil_testing();
        workflow
            .scenarios
            .push(DelayScenario::new("none", [("Soil Sampling", 1.0)]));
        assert!(validate_workflow(&workflow).is_err());

        let mut workflow = catalog::soil_testing();
        workflow
            .scenarios
            .push(DelayScenario::new("Dryer Down", [("Sample Drying", 1.0)]));
        workflow
            .scenarios
            .push(DelayScenario::new("dryer down", [("Sample Drying", 2.0)]));
        let err = validate_workflow(&workflow).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn rejects_bad_palette_and_step() {
        let mut workflow = catalog::soil_testing();
        workflow.palette.insert("Testing", "not-a-color");
        assert!(validate_workflow(&workflow).is_err());

        let mut workflow = catalog::soil_testing();
        workflow.timeline.step_days = 0.0;
        assert!(validate_workflow(&workflow).is_err());
    }

    #[test]
    fn rejects_workflows_too_wide_to_chart() {
        let mut workflow = catalog::soil_testing();
        workflow.tasks[0].duration_days = 1e9;
        let err = validate_workflow(&workflow).unwrap_err();
        assert!(err.to_string().contains("grid columns"));

        let mut workflow = catalog::soil_testing();
        workflow.timeline.step_days = 1e-9;
        assert!(validate_workflow(&workflow).is_err());

        let mut workflow = catalog::soil_testing();
        workflow
            .scenarios
            .push(DelayScenario::new("Lost Season", [("Soil Sampling", 1e6)]));
        assert!(validate_workflow(&workflow).is_err());
    }
}
