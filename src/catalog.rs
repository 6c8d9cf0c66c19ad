//! Built-in agricultural planning workflows.

use crate::metadata::WorkflowMetadata;
use crate::palette::Palette;
use crate::scenario::DelayScenario;
use crate::task::{StartSpec, TaskDef};
use crate::workflow::{TimelineSettings, Workflow};

pub const CROP_HISTORY_MASTER: &str = "crop-history-master";
pub const SOIL_TESTING: &str = "soil-testing";
pub const SEED_PROCUREMENT_STATIC: &str = "seed-procurement-static";
pub const SEED_PROCUREMENT: &str = "seed-procurement";
pub const UNIFIED: &str = "unified";

pub fn builtin() -> Vec<Workflow> {
    vec![
        crop_history_master(),
        soil_testing(),
        seed_procurement_static(),
        seed_procurement(),
        unified(),
    ]
}

pub fn keys() -> Vec<&'static str> {
    vec![
        CROP_HISTORY_MASTER,
        SOIL_TESTING,
        SEED_PROCUREMENT_STATIC,
        SEED_PROCUREMENT,
        UNIFIED,
    ]
}

pub fn find(key: &str) -> Option<Workflow> {
    builtin().into_iter().find(|wf| wf.key == key)
}

fn literal(rows: &[(&str, &str, f64, f64)]) -> Vec<TaskDef> {
    rows.iter()
        .map(|(name, category, start, duration)| TaskDef::new(*name, *category, *start, *duration))
        .collect()
}

fn seed_scenarios() -> Vec<DelayScenario> {
    vec![
        DelayScenario::new("Vendor Delay", [("Vendor Verification", 2.0)]),
        DelayScenario::new("Rain Delay", [("Seed Procurement", 2.0)]),
        DelayScenario::new("Cost Issue", [("Check Seed Cost", 1.0)]),
    ]
}

/// Crop history, soil testing, composting and seed procurement on one sheet.
pub fn crop_history_master() -> Workflow {
    let rows: &[(&str, &str, f64, f64, &str)] = &[
        ("Identify Preceding Crop", "Crop History", 0.0, 0.5, "None"),
        ("Confirm Crop Type from Records", "Crop History", 0.5, 0.5, "Farmer log delay"),
        ("Retrieve Harvest Date", "Crop History", 1.0, 0.5, "Record not updated"),
        ("Verify Harvest Records", "Crop History", 1.5, 0.5, "Manual entry mistake"),
        ("Inspect Field for Residues", "Field Check", 2.0, 1.0, "Field inaccessible"),
        ("Lab Testing for Residual Nutrients", "Lab Analysis", 2.0, 1.0, "Lab backlog"),
        ("Pest Scouting", "Field Check", 3.0, 1.0, "Heavy rain"),
        ("Compile Residue & Pest Report", "Reporting", 4.0, 0.5, "Staff unavailability"),
        ("Soil Sampling", "Testing", 4.5, 1.0, "Sample collection delay"),
        ("Sample Labeling", "Testing", 4.5, 0.5, "Tag mismatch"),
        ("Sample Drying", "Testing", 5.0, 1.0, "Dryer malfunction"),
        ("Sample Sieving", "Testing", 5.5, 1.0, "Sieve unavailable"),
        ("Sample Packing", "Testing", 6.0, 0.5, "Bag shortage"),
        ("PH Extraction Prep", "PH-Level", 6.0, 0.5, "Reagent unavailability"),
        ("PH Measurement", "PH-Level", 6.5, 0.5, "pH meter calibration"),
        ("NPK Extraction Preps", "NPK", 7.0, 1.0, "Glassware shortage"),
        ("NPK Measurements", "NPK", 8.0, 1.0, "Instrument drift"),
        ("Carbon Reagent Prep", "Organic Carbon", 9.0, 0.5, "Reagent delay"),
        ("Organic Carbon Titration", "Organic Carbon", 9.5, 0.5, "Burette unavailable"),
        ("Result Compilation", "Reporting", 10.0, 0.5, "Format error"),
        ("Result Verification", "Reporting", 10.5, 0.5, "Supervisor unavailable"),
        ("Reporting to Farmer", "Reporting", 11.0, 0.5, "Farmer unavailable"),
        ("Compost Material Collection", "Compost", 11.5, 1.0, "Transport delay"),
        ("Compost Pit Setup", "Compost", 12.5, 1.0, "Labor shortage"),
        ("Initial Moisture Adjustment", "Compost", 13.5, 0.5, "Water scarcity"),
        ("Microbial Inoculation", "Compost", 14.0, 0.5, "Culture expired"),
        ("Initial Covering", "Compost", 14.5, 0.5, "Cover material delay"),
        ("1st Turning", "Compost", 16.5, 0.5, "Tool unavailability"),
        ("2nd Turning", "Compost", 20.5, 0.5, "Rain interruption"),
        ("3rd Turning", "Compost", 25.0, 0.5, "Low labor"),
        ("Final Compost Testing", "Lab Analysis", 28.0, 1.0, "Lab overload"),
        ("Compost Ready to Use", "Reporting", 29.0, 0.5, "Final approval delay"),
        ("Select Crop Variety", "Seed Planning", 11.5, 1.0, "Farmer indecision"),
        ("Check Vendor List", "Seed Planning", 12.5, 1.0, "List outdated"),
        ("Request Quotation", "Vendor", 13.5, 1.0, "Late response"),
        ("Price Comparison", "Vendor", 14.5, 0.5, "Data error"),
        ("Place Order", "Procurement", 15.0, 0.5, "Payment delay"),
        ("Vendor Confirmation", "Vendor", 15.5, 0.5, "No response"),
        ("Receive Seeds", "Procurement", 16.0, 1.0, "Courier delay"),
        ("Verify Seed Quality", "Procurement", 17.0, 1.0, "Sample rejected"),
        ("Store Seeds Properly", "Storage", 18.0, 0.5, "Store not ready"),
    ];

    let mut workflow = Workflow::new(
        CROP_HISTORY_MASTER,
        WorkflowMetadata::new(
            "All 4 Workflows Master Gantt",
            "Preceding crop review, soil testing, compost planning and seed procurement",
        ),
    );
    workflow.tasks = rows
        .iter()
        .map(|(name, category, start, duration, cause)| {
            TaskDef::new(*name, *category, *start, *duration).with_delay_cause(*cause)
        })
        .collect();
    workflow.palette = Palette::from_pairs([
        ("Crop History", "#DDEBF7"),
        ("Field Check", "#FCE4D6"),
        ("Lab Analysis", "#E2EFDA"),
        ("Reporting", "#FFF2CC"),
        ("Testing", "#ADD8E6"),
        ("PH-Level", "#90EE90"),
        ("NPK", "#FFD700"),
        ("Organic Carbon", "#FFB6C1"),
        ("Compost", "#C4D79B"),
        ("Seed Planning", "#B7DEE8"),
        ("Vendor", "#E6B8B7"),
        ("Procurement", "#B4C6E7"),
        ("Storage", "#F4B084"),
    ]);
    workflow.timeline = TimelineSettings {
        step_days: 0.5,
        horizon_days: Some(35.0),
    };
    workflow
}

pub fn soil_testing() -> Workflow {
    let mut workflow = Workflow::new(
        SOIL_TESTING,
        WorkflowMetadata::new(
            "Soil Analysis Compact Gantt",
            "Sampling through pH, NPK and organic carbon analysis to the farmer report",
        ),
    );
    workflow.tasks = literal(&[
        ("Soil Sampling", "Testing", 0.0, 1.0),
        ("Sample Labeling", "Testing", 0.5, 0.5),
        ("Sample Drying", "Testing", 1.0, 1.0),
        ("Sample Sieving", "Testing", 1.5, 1.0),
        ("Sample Packing", "Testing", 2.0, 0.5),
        ("PH Extraction Prep", "PH-Level", 2.0, 0.5),
        ("PH Measurement", "PH-Level", 2.5, 0.5),
        ("NPK Extraction Preps", "NPK", 3.0, 1.0),
        ("NPK Measurements", "NPK", 4.0, 1.0),
        ("Carbon Reagent Prep", "Organic Carbon", 5.0, 0.5),
        ("Organic Carbon Titration", "Organic Carbon", 5.5, 0.5),
        ("Result Compilation", "Reporting", 6.0, 0.5),
        ("Result Verification", "Reporting", 6.5, 0.5),
        ("Reporting to Farmer", "Reporting", 7.0, 0.5),
    ]);
    workflow.palette = Palette::from_pairs([
        ("Testing", "#ADD8E6"),
        ("PH-Level", "#90EE90"),
        ("NPK", "#FFD700"),
        ("Organic Carbon", "#FFB6C1"),
        ("Reporting", "#D3D3D3"),
    ]);
    workflow.timeline = TimelineSettings {
        step_days: 0.5,
        horizon_days: Some(8.0),
    };
    workflow
}

/// Seed procurement with fixed whole-day starts and a scenario picker per row.
pub fn seed_procurement_static() -> Workflow {
    let mut workflow = Workflow::new(
        SEED_PROCUREMENT_STATIC,
        WorkflowMetadata::new(
            "Interactive Gantt (per-task dropdown)",
            "Seed procurement planning laid out on fixed day offsets",
        ),
    );
    workflow.tasks = literal(&[
        ("Understand Crop Requirement", "Planning", 0.0, 1.0),
        ("Determine Sowing Window", "Planning", 0.0, 1.0),
        ("Identify Suitable Varieties", "Planning", 0.0, 1.0),
        ("Evaluate Crop Variety Suitability", "Planning", 1.0, 1.0),
        ("Search for Certified Vendors", "Vendor", 2.0, 1.0),
        ("Vendor Verification", "Vendor", 3.0, 1.0),
        ("Vendor Approval", "Vendor", 4.0, 1.0),
        ("Check Seed Cost", "Costing", 5.0, 1.0),
        ("Assess Availability", "Costing", 5.0, 1.0),
        ("Finalize Procurement Decision", "Costing", 6.0, 1.0),
        ("Seed Procurement", "Procurement", 7.0, 1.0),
        ("Seed Conditioning", "Procurement", 8.0, 1.0),
        ("Storage Planning", "Procurement", 9.0, 1.0),
    ]);
    workflow.palette = Palette::from_pairs([
        ("Planning", "#B0E0E6"),
        ("Vendor", "#90EE90"),
        ("Costing", "#DDA0DD"),
        ("Procurement", "#FFA500"),
    ]);
    workflow.scenarios = seed_scenarios();
    workflow.timeline = TimelineSettings {
        step_days: 1.0,
        horizon_days: Some(15.0),
    };
    workflow
}

/// Seed procurement where each step starts when its predecessors end.
pub fn seed_procurement() -> Workflow {
    let mut workflow = Workflow::new(
        SEED_PROCUREMENT,
        WorkflowMetadata::new(
            "Seed Procurement Gantt Timeline",
            "Optimized seed procurement breakdown with reduced durations",
        ),
    );
    workflow.tasks = vec![
        TaskDef::new("Understand Crop Requirement", "Planning", 0.0, 1.0),
        TaskDef::new("Determine Sowing Window", "Planning", 0.0, 1.0),
        TaskDef::new("Identify Suitable Varieties", "Planning", 0.0, 1.0),
        TaskDef::new(
            "Evaluate Crop Variety Suitability",
            "Planning",
            "Identify Suitable Varieties",
            1.0,
        ),
        TaskDef::new(
            "Search for Certified Vendors",
            "Vendor",
            "Evaluate Crop Variety Suitability",
            1.0,
        ),
        TaskDef::new("Vendor Verification", "Vendor", "Search for Certified Vendors", 0.5),
        TaskDef::new("Vendor Approval", "Vendor", "Vendor Verification", 0.5),
        TaskDef::new("Check Seed Cost", "Costing", "Vendor Approval", 0.5),
        TaskDef::new("Assess Availability", "Costing", "Vendor Approval", 0.5),
        TaskDef::new(
            "Finalize Procurement Decision",
            "Costing",
            StartSpec::after_all(["Check Seed Cost", "Assess Availability"]),
            0.5,
        ),
        TaskDef::new("Seed Procurement", "Procurement", "Finalize Procurement Decision", 1.0),
        TaskDef::new("Seed Conditioning", "Procurement", "Seed Procurement", 0.5),
        TaskDef::new("Storage Planning", "Procurement", "Seed Conditioning", 0.5),
    ];
    workflow.palette = Palette::from_pairs([
        ("Planning", "skyblue"),
        ("Vendor", "lightgreen"),
        ("Costing", "violet"),
        ("Procurement", "orange"),
    ]);
    workflow.scenarios = seed_scenarios();
    workflow.timeline = TimelineSettings {
        step_days: 0.5,
        horizon_days: None,
    };
    workflow
}

/// Seed, compost and soil-testing plans, each with its own delay triggers.
pub fn unified() -> Workflow {
    const SEED: &str = "Seed Planning";
    const COMPOST: &str = "Compost Planning";
    const SOIL: &str = "Soil Testing";

    let mut workflow = Workflow::new(
        UNIFIED,
        WorkflowMetadata::new(
            "Unified Gantt Chart with Soil Testing",
            "Combined seed, compost and soil-testing plans",
        ),
    );
    workflow.tasks = vec![
        TaskDef::new("Seed Procurement", SEED, 0.0, 2.0),
        TaskDef::new("Certified Vendor", SEED, "Seed Procurement", 2.0),
        TaskDef::new("Crop Variety Suitability", SEED, "Certified Vendor", 3.0),
        TaskDef::new("Cost & Availability", SEED, "Crop Variety Suitability", 2.0),
        TaskDef::new("Vendor Approval", SEED, "Certified Vendor", 1.0),
        TaskDef::new("Logistics Planning", SEED, "Seed Procurement", 2.0),
        TaskDef::new("Crop & Soil Analysis", COMPOST, 0.0, 5.0),
        TaskDef::new("Compost Requirement", COMPOST, "Crop & Soil Analysis", 2.0),
        TaskDef::new("Decision Tree Finalization", COMPOST, "Compost Requirement", 3.0),
        TaskDef::new("Gobar Procurement", COMPOST, "Decision Tree Finalization", 4.0),
        TaskDef::new("Green Manure Collection", COMPOST, "Decision Tree Finalization", 4.0),
        TaskDef::new("Pit Readiness", COMPOST, "Decision Tree Finalization", 3.0),
        TaskDef::new("Compost Mixing", COMPOST, "Gobar Procurement", 2.0),
        TaskDef::new("Pit Monitoring", COMPOST, "Compost Mixing", 36.0),
        TaskDef::new("Tractor Preparation", COMPOST, "Pit Monitoring", 1.0),
        TaskDef::new("Rotavator Check", COMPOST, "Tractor Preparation", 1.0),
        TaskDef::new("Field Prep & Compost Application", COMPOST, "Rotavator Check", 4.0),
        TaskDef::new("Sowing Preparation", COMPOST, "Field Prep & Compost Application", 3.0),
        TaskDef::new("Soil Testing", SOIL, 0.0, 2.0),
        TaskDef::new("PH-Level", SOIL, "Soil Testing", 2.0),
        TaskDef::new("NPK Balance", SOIL, "Soil Testing", 2.0),
        TaskDef::new("Organic Carbon", SOIL, "Soil Testing", 2.0),
    ];
    workflow.palette = Palette::from_pairs([
        (SEED, "cornflowerblue"),
        (COMPOST, "lightgreen"),
        (SOIL, "lightpink"),
    ]);
    workflow.scenarios = vec![
        DelayScenario::new("Vendor Delay", [("Certified Vendor", 2.0)]).scoped_to(SEED),
        DelayScenario::new("Cost Issue", [("Cost & Availability", 1.0)]).scoped_to(SEED),
        DelayScenario::new("Rain Delay", [("Logistics Planning", 3.0)]).scoped_to(SEED),
        DelayScenario::new(
            "Compost Immature",
            [
                ("Field Prep & Compost Application", 7.0),
                ("Sowing Preparation", 7.0),
            ],
        )
        .scoped_to(COMPOST),
        DelayScenario::new("Power Failure", [("Decision Tree Finalization", 2.0)])
            .scoped_to(COMPOST),
        DelayScenario::new("Gobar Vendor Delay", [("Gobar Procurement", 3.0)]).scoped_to(COMPOST),
        DelayScenario::new(
            "Labour Shortage",
            [("Compost Mixing", 2.0), ("Pit Readiness", 2.0)],
        )
        .scoped_to(COMPOST),
        DelayScenario::new(
            "Lab Delay",
            [("PH-Level", 2.0), ("NPK Balance", 2.0), ("Organic Carbon", 2.0)],
        )
        .scoped_to(SOIL),
        DelayScenario::new("Sensor Malfunction", [("Soil Testing", 3.0)]).scoped_to(SOIL),
    ];
    workflow
}
