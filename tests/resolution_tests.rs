use chrono::NaiveDate;
use farm_gantt::{
    DelayMode, DelayScenario, PlanError, StartSpec, TaskDef, Workflow, WorkflowMetadata, catalog,
    compare_scenarios,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn span(workflow: &Workflow, label: Option<&str>, mode: DelayMode, task: &str) -> (f64, f64) {
    let timeline = workflow.timeline(label, mode).unwrap();
    let t = timeline.find(task).unwrap();
    (t.start, t.end)
}

fn small_workflow() -> Workflow {
    // A(2) -> {B(3), C(1)} -> D(2) where D waits for both
    let mut wf = Workflow::new("small", WorkflowMetadata::new("Small", ""));
    wf.push_task(TaskDef::new("A", "Prep", 0.0, 2.0));
    wf.push_task(TaskDef::new("B", "Prep", "A", 3.0));
    wf.push_task(TaskDef::new("C", "Field", "A", 1.0));
    wf.push_task(TaskDef::new("D", "Field", StartSpec::after_all(["B", "C"]), 2.0));
    wf.scenarios.push(DelayScenario::new("Late C", [("C", 5.0)]));
    wf
}

#[test]
fn literal_tasks_end_after_their_duration() {
    for workflow in catalog::builtin() {
        let timeline = workflow.resolve().unwrap();
        for (def, task) in workflow.tasks.iter().zip(&timeline.tasks) {
            assert_eq!(def.name, task.name);
            if let StartSpec::Offset(start) = def.start {
                assert_eq!(task.start, start, "{} in {}", task.name, workflow.key);
                assert_eq!(task.end, start + def.duration_days);
            }
        }
    }
}

#[test]
fn references_resolve_to_latest_predecessor_end() {
    let wf = small_workflow();
    let timeline = wf.resolve().unwrap();
    assert_eq!(timeline.find("B").map(|t| (t.start, t.end)), Some((2.0, 5.0)));
    assert_eq!(timeline.find("C").map(|t| (t.start, t.end)), Some((2.0, 3.0)));
    assert_eq!(timeline.find("D").map(|t| (t.start, t.end)), Some((5.0, 7.0)));
}

#[test]
fn vendor_delay_in_flat_mode_moves_only_verification() {
    let wf = catalog::find(catalog::SEED_PROCUREMENT).unwrap();
    assert_eq!(span(&wf, None, DelayMode::Flat, "Vendor Verification"), (3.0, 3.5));

    let label = Some("Vendor Delay");
    assert_eq!(span(&wf, label, DelayMode::Flat, "Vendor Verification"), (5.0, 5.5));
    assert_eq!(span(&wf, label, DelayMode::Flat, "Vendor Approval"), (3.5, 4.0));

    let baseline = wf.resolve().unwrap();
    let delayed = wf.timeline(label, DelayMode::Flat).unwrap();
    for (before, after) in baseline.tasks.iter().zip(&delayed.tasks) {
        if before.name != "Vendor Verification" {
            assert_eq!((before.start, before.end), (after.start, after.end));
        }
    }
}

#[test]
fn vendor_delay_in_propagate_mode_moves_dependents() {
    let wf = catalog::find(catalog::SEED_PROCUREMENT).unwrap();
    let label = Some("Vendor Delay");
    assert_eq!(span(&wf, label, DelayMode::Propagate, "Vendor Verification"), (5.0, 5.5));
    assert_eq!(span(&wf, label, DelayMode::Propagate, "Vendor Approval"), (5.5, 6.0));
    assert_eq!(span(&wf, label, DelayMode::Propagate, "Storage Planning"), (8.5, 9.0));
    // planning tasks sit upstream of the delay
    assert_eq!(
        span(&wf, label, DelayMode::Propagate, "Determine Sowing Window"),
        (0.0, 1.0)
    );
}

#[test]
fn max_of_rule_can_absorb_a_propagated_delay() {
    let mut wf = small_workflow();
    wf.scenarios.push(DelayScenario::new("Slightly late C", [("C", 1.0)]));
    // C moves to (3, 4) but B still ends at 5
    let timeline = wf
        .timeline(Some("Slightly late C"), DelayMode::Propagate)
        .unwrap();
    assert_eq!(timeline.find("D").map(|t| t.start), Some(5.0));

    let timeline = wf.timeline(Some("Late C"), DelayMode::Propagate).unwrap();
    assert_eq!(timeline.find("D").map(|t| (t.start, t.end)), Some((8.0, 10.0)));
}

#[test]
fn none_scenario_is_a_no_op() {
    let wf = catalog::find(catalog::SEED_PROCUREMENT).unwrap();
    let baseline = wf.resolve().unwrap();
    for mode in [DelayMode::Flat, DelayMode::Propagate] {
        let none = wf.timeline(Some("None"), mode).unwrap();
        assert_eq!(none.shifted_count(), 0);
        assert_eq!(none.finish(), baseline.finish());
        assert_eq!(none.scenario_label(), "None");
    }
}

#[test]
fn unknown_scenario_is_reported() {
    let wf = catalog::find(catalog::SOIL_TESTING).unwrap();
    let err = wf.timeline(Some("Hailstorm"), DelayMode::Flat).unwrap_err();
    assert!(matches!(err, PlanError::UnknownScenario { ref label, .. } if label == "Hailstorm"));
}

#[test]
fn forward_references_are_rejected() {
    let mut wf = Workflow::new("broken", WorkflowMetadata::new("Broken", ""));
    wf.push_task(TaskDef::new("Sowing", "Field", "Tilling", 1.0));
    wf.push_task(TaskDef::new("Tilling", "Field", 0.0, 1.0));
    assert!(matches!(
        wf.resolve(),
        Err(PlanError::UnknownPredecessor { ref predecessor, .. }) if predecessor == "Tilling"
    ));
    assert!(wf.validate().is_err());
}

#[test]
fn scoped_scenarios_leave_other_categories_alone() {
    let wf = catalog::find(catalog::UNIFIED).unwrap();
    let timeline = wf
        .timeline(Some("Sensor Malfunction"), DelayMode::Propagate)
        .unwrap();
    let soil = timeline.find("Soil Testing").unwrap();
    assert_eq!((soil.start, soil.end), (3.0, 5.0));
    assert_eq!(timeline.find("PH-Level").map(|t| t.start), Some(5.0));
    assert!(
        timeline
            .tasks
            .iter()
            .filter(|t| t.category != "Soil Testing")
            .all(|t| !t.is_shifted())
    );
}

#[test]
fn comparison_covers_every_scenario_in_picker_order() {
    let wf = catalog::find(catalog::SEED_PROCUREMENT).unwrap();
    let outcomes = compare_scenarios(&wf, DelayMode::Propagate).unwrap();
    let labels: Vec<&str> = outcomes.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["None", "Vendor Delay", "Rain Delay", "Cost Issue"]);

    let vendor = &outcomes[1];
    assert_eq!(vendor.finish, 9.0);
    assert_eq!(vendor.slip, 2.0);
}

#[test]
fn start_dates_follow_the_season_start() {
    let mut wf = catalog::find(catalog::SEED_PROCUREMENT).unwrap();
    wf.metadata.season_start = d(2025, 6, 1);
    let timeline = wf.resolve().unwrap();
    let verification = timeline.find("Vendor Verification").unwrap();
    assert_eq!(timeline.start_date(verification).unwrap(), d(2025, 6, 4));
}

#[test]
fn huge_durations_fail_instead_of_overflowing_dates() {
    let mut wf = Workflow::new("long-haul", WorkflowMetadata::new("Long haul", ""));
    wf.push_task(TaskDef::new("Fallow", "Field", 0.0, 1e9));
    wf.push_task(TaskDef::new("Sow", "Field", "Fallow", 1.0));
    assert!(wf.validate().is_err());
    assert!(matches!(
        wf.resolve(),
        Err(PlanError::GridTooLarge { .. })
    ));

    wf.timeline.step_days = 1e6;
    assert!(matches!(
        wf.resolve(),
        Err(PlanError::DateOutOfRange { .. })
    ));
}
