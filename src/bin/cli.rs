use std::collections::BTreeMap;
use std::io::{self, Write};

use farm_gantt::persistence::{self, PersistenceError};
use farm_gantt::render::{
    RenderError, SvgRenderer, XlsxRenderer, render_df_as_text_table, render_text_chart,
    render_timeline_table,
};
use farm_gantt::{
    DelayMode, DependencyGraph, PlanError, PlannerConfig, Timeline, Workflow, catalog,
    compare_scenarios, logging,
};
use polars::prelude::*;

struct Session {
    config: PlannerConfig,
    workflows: BTreeMap<String, Workflow>,
    current: Option<String>,
    scenario: Option<String>,
    mode: DelayMode,
}

impl Session {
    fn new(config: PlannerConfig) -> Self {
        let workflows = catalog::builtin()
            .into_iter()
            .map(|wf| (wf.key.clone(), wf))
            .collect();
        Self {
            mode: config.default_mode,
            config,
            workflows,
            current: None,
            scenario: None,
        }
    }

    fn workflow(&self) -> Result<&Workflow, String> {
        self.current
            .as_ref()
            .and_then(|key| self.workflows.get(key))
            .ok_or_else(|| "No workflow selected. Use 'use <key>' (see 'workflows').".to_string())
    }

    fn timeline(&self) -> Result<Timeline, String> {
        let workflow = self.workflow()?;
        workflow
            .timeline(self.scenario.as_deref(), self.mode)
            .map(|t| t.with_palette_overrides(&self.config.palette_overrides))
            .map_err(|e| e.to_string())
    }

    fn select(&mut self, key: &str) -> Result<&Workflow, PlanError> {
        let workflow = self
            .workflows
            .get(key)
            .ok_or_else(|| PlanError::UnknownWorkflow(key.to_string()))?;
        self.current = Some(key.to_string());
        self.scenario = None;
        Ok(workflow)
    }

    fn register(&mut self, workflow: Workflow) -> String {
        let key = workflow.key.clone();
        self.workflows.insert(key.clone(), workflow);
        self.current = Some(key.clone());
        self.scenario = None;
        key
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  workflows                          List available workflows\n  use <key>                          Select a workflow\n  show                               Show the resolved timeline\n  scenarios                          List delay scenarios of the workflow\n  delay <label...>                   Apply a delay scenario ('None' clears)\n  mode <flat|propagate>              Choose how delays move dependent tasks\n  chart [category...]                Text chart of the current timeline\n  impact                             Tasks affected by the current scenario\n  compare                            Finish and slip of every scenario\n  summary                            Timeline summary with finish chain\n  export <xlsx|svg|csv> <path>       Write the current timeline\n  save <path>                        Save the workflow definition as JSON\n  load <path>                        Load a workflow from JSON and select it\n  import <key> <csv_path>            Build a workflow from a task CSV\n  quit|exit                          Exit"
    );
}

fn list_workflows(session: &Session) {
    for (key, workflow) in &session.workflows {
        let marker = if session.current.as_deref() == Some(key.as_str()) { "*" } else { " " };
        println!(
            "{marker} {key:<26} {} ({} tasks)",
            workflow.title(),
            workflow.tasks.len()
        );
    }
}

fn print_impact(session: &Session) -> Result<(), String> {
    let workflow = session.workflow()?;
    let Some(label) = session.scenario.as_deref() else {
        println!("No delay scenario selected.");
        return Ok(());
    };
    let Some(scenario) = workflow.scenario(label).map_err(|e| e.to_string())? else {
        println!("No delay scenario selected.");
        return Ok(());
    };

    let timeline = session.timeline()?;
    let direct: Vec<&str> = timeline
        .tasks
        .iter()
        .filter(|t| scenario.offset_for(&t.name, &t.category).is_some())
        .map(|t| t.name.as_str())
        .collect();
    let dag = DependencyGraph::from_workflow(workflow);
    let downstream = dag.downstream(direct.iter().copied());

    println!("Scenario '{}' ({}):", scenario.label, session.mode);
    for name in &direct {
        let shift = timeline.find(name).map(|t| t.shift()).unwrap_or_default();
        println!("  delayed    {name} (+{shift})");
    }
    for name in &downstream {
        let moved = timeline.find(name).is_some_and(|t| t.is_shifted());
        let note = match (moved, session.mode) {
            (true, _) => "moved",
            (false, DelayMode::Flat) => "unchanged in flat mode",
            (false, DelayMode::Propagate) => "absorbed by a later predecessor",
        };
        println!("  downstream {name} ({note})");
    }
    if direct.is_empty() {
        println!("  no task in this workflow matches the scenario");
    }
    Ok(())
}

fn print_comparison(session: &Session) -> Result<(), String> {
    let workflow = session.workflow()?;
    let outcomes = compare_scenarios(workflow, session.mode).map_err(|e| e.to_string())?;
    let labels: Vec<&str> = outcomes.iter().map(|o| o.label.as_str()).collect();
    let finishes: Vec<f64> = outcomes.iter().map(|o| o.finish).collect();
    let slips: Vec<f64> = outcomes.iter().map(|o| o.slip).collect();
    let shifted: Vec<i64> = outcomes.iter().map(|o| o.shifted_tasks as i64).collect();
    let df = DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("scenario"), labels).into_column(),
        Series::new(PlSmallStr::from_static("finish"), finishes).into_column(),
        Series::new(PlSmallStr::from_static("slip"), slips).into_column(),
        Series::new(PlSmallStr::from_static("shifted_tasks"), shifted).into_column(),
    ])
    .map_err(|e| e.to_string())?;
    println!("Mode: {}\n{}", session.mode, render_df_as_text_table(&df));
    Ok(())
}

fn export(session: &Session, format: &str, path: &str) -> Result<String, String> {
    let timeline = session.timeline()?;
    let target = session.config.resolve_output_path(path);
    let result: Result<(), String> = match format {
        "xlsx" => XlsxRenderer::from_config(&session.config)
            .save(&timeline, &target)
            .map_err(|e: RenderError| e.to_string()),
        "svg" => SvgRenderer::from_config(&session.config)
            .save(&timeline, &target)
            .map_err(|e: RenderError| e.to_string()),
        "csv" => persistence::save_timeline_to_csv(&timeline, &target)
            .map_err(|e: PersistenceError| e.to_string()),
        other => Err(format!("Unknown export format '{other}' (expected xlsx|svg|csv)")),
    };
    result.map(|_| target.display().to_string())
}

fn main() {
    logging::init_tracing("warn");

    let config = match PlannerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}; using defaults");
            PlannerConfig::default()
        }
    };
    let mut session = Session::new(config);

    println!("Farm Gantt (CLI) - type 'help' for commands\n");
    list_workflows(&session);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() { continue; }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "workflows" => list_workflows(&session),
            "use" => match parts.next() {
                Some(key) => match session.select(key) {
                    Ok(workflow) => {
                        println!("Selected workflow '{}' ({}).", key, workflow.title());
                    }
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: use <key>"),
            },
            "show" => match session.timeline().and_then(|t| {
                render_timeline_table(&t).map_err(|e| e.to_string())
            }) {
                Ok(table) => println!("{table}"),
                Err(e) => println!("Error: {e}"),
            },
            "scenarios" => match session.workflow() {
                Ok(workflow) => {
                    for label in workflow.scenario_labels() {
                        let selected = session.scenario.as_deref().unwrap_or("None");
                        let marker = if label.eq_ignore_ascii_case(selected) { "*" } else { " " };
                        println!("{marker} {label}");
                    }
                }
                Err(e) => println!("Error: {e}"),
            },
            "delay" => {
                let label = parts.collect::<Vec<_>>().join(" ");
                if label.is_empty() {
                    println!("Usage: delay <label...>");
                    continue;
                }
                let chosen = session
                    .workflow()
                    .and_then(|wf| wf.scenario(&label).map_err(|e| e.to_string()))
                    .map(|found| found.map(|s| s.label.clone()));
                match chosen {
                    Ok(Some(chosen)) => {
                        println!("Scenario set to '{chosen}'.");
                        session.scenario = Some(chosen);
                    }
                    Ok(None) => {
                        session.scenario = None;
                        println!("Scenario cleared.");
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "mode" => match parts.next().map(str::parse::<DelayMode>) {
                Some(Ok(mode)) => {
                    session.mode = mode;
                    println!("Mode set to {mode}.");
                }
                Some(Err(e)) => println!("Error: {e}"),
                None => println!("Usage: mode <flat|propagate>"),
            },
            "chart" => {
                let category = parts.collect::<Vec<_>>().join(" ");
                match session.timeline() {
                    Ok(timeline) => {
                        let shown = if category.is_empty() {
                            timeline
                        } else {
                            timeline.for_category(&category)
                        };
                        if shown.tasks.is_empty() {
                            println!("Error: no tasks in category '{category}'");
                        } else {
                            match render_text_chart(&shown) {
                                Ok(chart) => print!("{chart}"),
                                Err(e) => println!("Error: {e}"),
                            }
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "impact" => {
                if let Err(e) = print_impact(&session) {
                    println!("Error: {e}");
                }
            }
            "compare" => {
                if let Err(e) = print_comparison(&session) {
                    println!("Error: {e}");
                }
            }
            "summary" => match session.timeline() {
                Ok(timeline) => println!("{}", timeline.summary().to_cli_summary()),
                Err(e) => println!("Error: {e}"),
            },
            "export" => match (parts.next(), parts.next()) {
                (Some(format), Some(path)) => match export(&session, format, path) {
                    Ok(target) => println!("Exported {format} to {target}"),
                    Err(e) => println!("Error: {e}"),
                },
                _ => println!("Usage: export <xlsx|svg|csv> <path>"),
            },
            "save" => match parts.next() {
                Some(path) => {
                    let target = session.config.resolve_output_path(path);
                    match session.workflow() {
                        Ok(workflow) => match persistence::save_workflow_to_json(workflow, &target) {
                            Ok(()) => println!("Workflow saved to {}", target.display()),
                            Err(e) => println!("Error: {e}"),
                        },
                        Err(e) => println!("Error: {e}"),
                    }
                }
                None => println!("Usage: save <path>"),
            },
            "load" => match parts.next() {
                Some(path) => match persistence::load_workflow_from_json(path) {
                    Ok(workflow) => {
                        let key = session.register(workflow);
                        println!("Workflow loaded from {path} as '{key}'.");
                    }
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: load <path>"),
            },
            "import" => match (parts.next(), parts.next()) {
                (Some(key), Some(path)) => match persistence::workflow_from_csv(key, path) {
                    Ok(workflow) => {
                        let count = workflow.tasks.len();
                        let key = session.register(workflow);
                        println!("Imported {count} tasks into '{key}'.");
                    }
                    Err(e) => println!("Error: {e}"),
                },
                _ => println!("Usage: import <key> <csv_path>"),
            },
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
