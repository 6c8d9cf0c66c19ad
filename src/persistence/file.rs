use super::{PersistenceError, PersistenceResult};
use crate::metadata::WorkflowMetadata;
use crate::task::{StartSpec, TaskDef};
use crate::timeline::Timeline;
use crate::workflow::Workflow;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

pub fn save_workflow_to_json<P: AsRef<Path>>(
    workflow: &Workflow,
    path: P,
) -> PersistenceResult<()> {
    workflow.validate()?;
    let path = path.as_ref();
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, workflow)?;
    info!(workflow = %workflow.key, path = %path.display(), "saved workflow");
    Ok(())
}

pub fn load_workflow_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Workflow> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let workflow: Workflow = serde_json::from_reader(file)?;
    workflow.validate()?;
    info!(
        workflow = %workflow.key,
        tasks = workflow.tasks.len(),
        path = %path.display(),
        "loaded workflow"
    );
    Ok(workflow)
}

#[derive(Serialize, Deserialize)]
struct TaskCsvRecord {
    name: String,
    category: String,
    start: String,
    duration_days: f64,
    #[serde(default)]
    delay_cause: String,
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<TaskDef> {
        let start = parse_start(&self.start).ok_or_else(|| {
            PersistenceError::InvalidData(format!("task '{}' has an empty start", self.name))
        })?;
        let mut task = TaskDef::new(self.name, self.category, start, self.duration_days);
        task.delay_cause = parse_string_option(self.delay_cause);
        Ok(task)
    }
}

/// Reads task definitions, one per row, from any CSV source.
pub fn read_tasks_csv<R: Read>(reader: R) -> PersistenceResult<Vec<TaskDef>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        tasks.push(record?.into_task()?);
    }

    if tasks.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no tasks".into(),
        ));
    }
    Ok(tasks)
}

pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<TaskDef>> {
    let file = File::open(path)?;
    read_tasks_csv(file)
}

/// Builds a validated workflow under `key` from a task CSV.
///
/// CSV carries no palette or scenarios; callers add those afterwards.
pub fn workflow_from_csv<P: AsRef<Path>>(key: &str, path: P) -> PersistenceResult<Workflow> {
    let path = path.as_ref();
    let tasks = load_tasks_from_csv(path)?;
    let mut workflow = Workflow::new(key, WorkflowMetadata::new(key, ""));
    workflow.tasks = tasks;
    workflow.validate()?;
    info!(
        workflow = %workflow.key,
        tasks = workflow.tasks.len(),
        path = %path.display(),
        "imported tasks"
    );
    Ok(workflow)
}

#[derive(Serialize)]
struct TimelineCsvRecord<'a> {
    task: &'a str,
    category: &'a str,
    start: f64,
    end: f64,
    duration_days: f64,
    baseline_start: f64,
    delay: f64,
    start_date: String,
    delay_cause: &'a str,
}

pub fn write_timeline_csv<W: Write>(timeline: &Timeline, writer: W) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for task in &timeline.tasks {
        writer.serialize(TimelineCsvRecord {
            task: &task.name,
            category: &task.category,
            start: task.start,
            end: task.end,
            duration_days: task.duration(),
            baseline_start: task.baseline_start,
            delay: task.shift(),
            start_date: timeline.start_date(task)?.format("%Y-%m-%d").to_string(),
            delay_cause: task.delay_cause.as_deref().unwrap_or_default(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_timeline_to_csv<P: AsRef<Path>>(
    timeline: &Timeline,
    path: P,
) -> PersistenceResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_timeline_csv(timeline, file)?;
    info!(
        workflow = %timeline.workflow_key,
        scenario = timeline.scenario_label(),
        path = %path.display(),
        "saved timeline csv"
    );
    Ok(())
}

fn parse_start(input: &str) -> Option<StartSpec> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(offset) = input.parse::<f64>() {
        return Some(StartSpec::Offset(offset));
    }
    let names: Vec<&str> = input
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    match names.as_slice() {
        [] => None,
        [single] => Some(StartSpec::after(*single)),
        many => Some(StartSpec::after_all(many.iter().copied())),
    }
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_column_accepts_offsets_names_and_lists() {
        assert_eq!(parse_start("2.5"), Some(StartSpec::Offset(2.5)));
        assert_eq!(
            parse_start(" Vendor Approval "),
            Some(StartSpec::after("Vendor Approval"))
        );
        assert_eq!(
            parse_start("Check Seed Cost|Assess Seed Availability"),
            Some(StartSpec::after_all(["Check Seed Cost", "Assess Seed Availability"]))
        );
        assert_eq!(parse_start("  "), None);
    }

    #[test]
    fn reads_tasks_with_optional_cause() {
        let data = "name,category,start,duration_days,delay_cause\n\
                    Sampling,Testing,0,1,Rain\n\
                    Drying,Testing,Sampling,2,\n";
        let tasks = read_tasks_csv(data.as_bytes()).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].delay_cause.as_deref(), Some("Rain"));
        assert_eq!(tasks[1].start, StartSpec::after("Sampling"));
        assert_eq!(tasks[1].delay_cause, None);
    }

    #[test]
    fn empty_csv_is_rejected() {
        let data = "name,category,start,duration_days,delay_cause\n";
        assert!(matches!(
            read_tasks_csv(data.as_bytes()),
            Err(PersistenceError::InvalidData(_))
        ));
    }

    #[test]
    fn out_of_range_start_date_is_an_error() {
        let mut timeline = crate::catalog::soil_testing().resolve().unwrap();
        timeline.settings.step_days = 1e7;
        timeline.tasks[0].start = 1e9;
        timeline.tasks[0].end = 1e9 + 1.0;
        let mut out = Vec::new();
        assert!(matches!(
            write_timeline_csv(&timeline, &mut out),
            Err(PersistenceError::Plan(crate::workflow::PlanError::DateOutOfRange { .. }))
        ));
    }
}
