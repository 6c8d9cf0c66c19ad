use crate::scenario::{DelayMode, NO_DELAY};
use crate::workflow::{PlanError, Workflow};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub label: String,
    pub finish: f64,
    /// Finish minus the unshifted finish.
    pub slip: f64,
    pub shifted_tasks: usize,
}

/// Evaluates the unshifted timeline and every scenario of `workflow`.
///
/// Outcomes come back in picker order, `None` first.
pub fn compare_scenarios(
    workflow: &Workflow,
    mode: DelayMode,
) -> Result<Vec<ScenarioOutcome>, PlanError> {
    let baseline_finish = workflow.resolve()?.finish();

    let labels = workflow.scenario_labels();
    labels
        .par_iter()
        .map(|label| -> Result<ScenarioOutcome, PlanError> {
            let timeline = if *label == NO_DELAY {
                workflow.resolve()?
            } else {
                workflow.timeline(Some(*label), mode)?
            };
            let finish = timeline.finish();
            Ok(ScenarioOutcome {
                label: label.to_string(),
                finish,
                slip: finish - baseline_finish,
                shifted_tasks: timeline.shifted_count(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn rain_delay_slips_further_when_propagating() {
        let workflow = catalog::find("seed-procurement").unwrap();

        let flat = compare_scenarios(&workflow, DelayMode::Flat).unwrap();
        let propagate = compare_scenarios(&workflow, DelayMode::Propagate).unwrap();

        assert_eq!(flat[0].label, "None");
        assert_eq!(flat[0].slip, 0.0);

        let rain_flat = flat.iter().find(|o| o.label == "Rain Delay").unwrap();
        let rain_prop = propagate.iter().find(|o| o.label == "Rain Delay").unwrap();
        // the shifted task itself now ends last, dependents stay put
        assert_eq!(rain_flat.slip, 1.0);
        assert_eq!(rain_flat.shifted_tasks, 1);
        assert_eq!(rain_prop.slip, 2.0);
        assert_eq!(rain_prop.shifted_tasks, 3);
    }
}
