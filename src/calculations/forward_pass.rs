use crate::scenario::DelayScenario;
use crate::task::{ScheduledTask, StartSpec, TaskDef};
use crate::workflow::PlanError;
use std::collections::HashMap;
use tracing::debug;

/// Single forward substitution over tasks in declaration order.
///
/// A predecessor must appear earlier in the list than the task naming it.
/// When offsets are attached, each named task's start is pushed before its
/// end is recorded, so dependents resolve from the shifted end.
pub struct ForwardPass<'a> {
    tasks: &'a [TaskDef],
    offsets: Option<&'a DelayScenario>,
}

impl<'a> ForwardPass<'a> {
    pub fn new(tasks: &'a [TaskDef]) -> Self {
        Self {
            tasks,
            offsets: None,
        }
    }

    pub fn with_offsets(mut self, scenario: &'a DelayScenario) -> Self {
        self.offsets = Some(scenario);
        self
    }

    pub fn execute(&self) -> Result<Vec<ScheduledTask>, PlanError> {
        let mut ends: HashMap<&str, f64> = HashMap::with_capacity(self.tasks.len());
        let mut baseline_ends: HashMap<&str, f64> = HashMap::with_capacity(self.tasks.len());
        let mut results = Vec::with_capacity(self.tasks.len());

        for def in self.tasks {
            if ends.contains_key(def.name.as_str()) {
                return Err(PlanError::DuplicateTask(def.name.clone()));
            }

            let baseline_start = Self::start_from(def, &baseline_ends)?;
            let mut start = Self::start_from(def, &ends)?;
            if let Some(offset) = self
                .offsets
                .and_then(|scenario| scenario.offset_for(&def.name, &def.category))
            {
                debug!(task = %def.name, offset, "pushing start before resolving dependents");
                start += offset;
            }

            let end = start + def.duration_days;
            let baseline_end = baseline_start + def.duration_days;
            ends.insert(def.name.as_str(), end);
            baseline_ends.insert(def.name.as_str(), baseline_end);

            results.push(ScheduledTask {
                name: def.name.clone(),
                category: def.category.clone(),
                start,
                end,
                baseline_start,
                baseline_end,
                predecessors: def.start.predecessors().into_iter().map(String::from).collect(),
                delay_cause: def.delay_cause.clone(),
            });
        }

        Ok(results)
    }

    fn start_from(def: &TaskDef, ends: &HashMap<&str, f64>) -> Result<f64, PlanError> {
        let lookup = |name: &str| {
            ends.get(name)
                .copied()
                .ok_or_else(|| PlanError::UnknownPredecessor {
                    task: def.name.clone(),
                    predecessor: name.to_string(),
                })
        };

        match &def.start {
            StartSpec::Offset(value) => Ok(*value),
            StartSpec::After(name) => lookup(name),
            StartSpec::AfterAll(names) => {
                if names.is_empty() {
                    return Err(PlanError::InvalidTask {
                        task: def.name.clone(),
                        reason: "start references an empty predecessor list".into(),
                    });
                }
                let mut latest = f64::NEG_INFINITY;
                for name in names {
                    latest = latest.max(lookup(name)?);
                }
                Ok(latest)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs() -> Vec<TaskDef> {
        vec![
            TaskDef::new("Check Seed Cost", "Costing", 0.0, 0.5),
            TaskDef::new("Assess Availability", "Costing", 0.0, 1.5),
            TaskDef::new(
                "Finalize Procurement Decision",
                "Costing",
                StartSpec::after_all(["Check Seed Cost", "Assess Availability"]),
                0.5,
            ),
            TaskDef::new("Seed Procurement", "Procurement", "Finalize Procurement Decision", 1.0),
        ]
    }

    #[test]
    fn max_of_rule_picks_latest_predecessor_end() {
        let tasks = ForwardPass::new(&defs()).execute().unwrap();
        assert_eq!((tasks[2].start, tasks[2].end), (1.5, 2.0));
        assert_eq!((tasks[3].start, tasks[3].end), (2.0, 3.0));
        assert_eq!(tasks[3].predecessors, vec!["Finalize Procurement Decision"]);
    }

    #[test]
    fn offsets_propagate_to_dependents_but_not_baseline() {
        let scenario = DelayScenario::new("Cost Issue", [("Assess Availability", 1.0)]);
        let defs = defs();
        let tasks = ForwardPass::new(&defs).with_offsets(&scenario).execute().unwrap();
        assert_eq!((tasks[1].start, tasks[1].end), (1.0, 2.5));
        assert_eq!((tasks[3].start, tasks[3].end), (3.0, 4.0));
        assert_eq!((tasks[3].baseline_start, tasks[3].baseline_end), (2.0, 3.0));
        assert_eq!(tasks[0].shift(), 0.0);
    }

    #[test]
    fn forward_reference_is_an_error() {
        let defs = vec![
            TaskDef::new("Vendor Approval", "Vendor", "Vendor Verification", 0.5),
            TaskDef::new("Vendor Verification", "Vendor", 3.0, 0.5),
        ];
        let err = ForwardPass::new(&defs).execute().unwrap_err();
        match err {
            PlanError::UnknownPredecessor { task, predecessor } => {
                assert_eq!(task, "Vendor Approval");
                assert_eq!(predecessor, "Vendor Verification");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let defs = vec![
            TaskDef::new("Soil Testing", "Soil Testing", 0.0, 2.0),
            TaskDef::new("Soil Testing", "Soil Testing", 1.0, 2.0),
        ];
        assert!(matches!(
            ForwardPass::new(&defs).execute(),
            Err(PlanError::DuplicateTask(name)) if name == "Soil Testing"
        ));
    }
}
