use crate::scenario::DelayScenario;
use crate::task::{ScheduledTask, TaskDef};
use tracing::warn;

/// Shifts the start and end of every task the scenario names.
///
/// Dependents are left where they were resolved. Returns how many tasks moved.
pub fn apply_flat(tasks: &mut [ScheduledTask], scenario: &DelayScenario) -> usize {
    let mut shifted = 0;
    for task in tasks.iter_mut() {
        if let Some(offset) = scenario.offset_for(&task.name, &task.category) {
            task.shift_by(offset);
            shifted += 1;
        }
    }
    shifted
}

/// Scenario entries that match no task in the workflow (or fall outside the
/// scenario's category scope).
pub fn unmatched_offsets<'a>(scenario: &'a DelayScenario, tasks: &[TaskDef]) -> Vec<&'a str> {
    scenario
        .offsets
        .keys()
        .filter(|name| {
            !tasks
                .iter()
                .any(|t| &t.name == *name && scenario.offset_for(&t.name, &t.category).is_some())
        })
        .map(String::as_str)
        .collect()
}

pub(crate) fn warn_unmatched(scenario: &DelayScenario, tasks: &[TaskDef]) {
    for name in unmatched_offsets(scenario, tasks) {
        warn!(
            scenario = %scenario.label,
            task = name,
            "delay entry names no task in scope, ignoring"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::forward_pass::ForwardPass;

    #[test]
    fn flat_shift_moves_only_named_tasks() {
        let defs = vec![
            TaskDef::new("PH-Level", "Soil Testing", 2.0, 2.0),
            TaskDef::new("NPK Balance", "Soil Testing", 2.0, 2.0),
            TaskDef::new("Organic Carbon", "Soil Testing", 2.0, 2.0),
        ];
        let mut tasks = ForwardPass::new(&defs).execute().unwrap();
        let scenario = DelayScenario::new("Lab Delay", [("PH-Level", 2.0), ("NPK Balance", 2.0)]);

        assert_eq!(apply_flat(&mut tasks, &scenario), 2);
        assert_eq!((tasks[0].start, tasks[0].end), (4.0, 6.0));
        assert_eq!((tasks[1].start, tasks[1].end), (4.0, 6.0));
        assert_eq!((tasks[2].start, tasks[2].end), (2.0, 4.0));
    }

    #[test]
    fn unmatched_reports_names_outside_scope() {
        let defs = vec![TaskDef::new("Soil Testing", "Soil Testing", 0.0, 2.0)];
        let scenario = DelayScenario::new("Mixed", [("Soil Testing", 3.0), ("Pit Monitoring", 1.0)])
            .scoped_to("Soil Testing");
        assert_eq!(unmatched_offsets(&scenario, &defs), vec!["Pit Monitoring"]);

        let rescoped = scenario.clone().scoped_to("Compost Planning");
        assert_eq!(
            unmatched_offsets(&rescoped, &defs),
            vec!["Pit Monitoring", "Soil Testing"]
        );
    }
}
