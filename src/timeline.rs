use crate::metadata::WorkflowMetadata;
use crate::palette::Palette;
use crate::scenario::{DelayMode, NO_DELAY};
use crate::task::ScheduledTask;
use crate::workflow::{PlanError, TimelineSettings, Workflow};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const EPSILON: f64 = 1e-9;

/// Day columns that fit in a sheet row after the nine task columns.
pub const MAX_SLOTS: u32 = 16_375;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineSummary {
    pub workflow: String,
    pub scenario: String,
    pub mode: DelayMode,
    pub task_count: usize,
    pub shifted_count: usize,
    pub start: f64,
    pub finish: f64,
    pub finish_chain: Vec<String>,
}

impl TimelineSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("workflow={}", self.workflow));
        parts.push(format!("scenario={}", self.scenario));
        parts.push(format!("mode={}", self.mode));
        parts.push(format!("tasks={}", self.task_count));
        if self.shifted_count > 0 {
            parts.push(format!("shifted={}", self.shifted_count));
        }
        parts.push(format!("start={}", self.start));
        parts.push(format!("finish={}", self.finish));
        if !self.finish_chain.is_empty() {
            parts.push(format!("chain={}", self.finish_chain.join(" -> ")));
        }
        parts.join(", ")
    }
}

/// A workflow resolved onto the day axis, with a scenario applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub workflow_key: String,
    pub metadata: WorkflowMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    pub mode: DelayMode,
    pub settings: TimelineSettings,
    pub palette: Palette,
    pub scenario_labels: Vec<String>,
    pub tasks: Vec<ScheduledTask>,
}

impl Timeline {
    pub(crate) fn new(
        workflow: &Workflow,
        scenario: Option<String>,
        mode: DelayMode,
        tasks: Vec<ScheduledTask>,
    ) -> Self {
        Self {
            workflow_key: workflow.key.clone(),
            metadata: workflow.metadata.clone(),
            scenario,
            mode,
            settings: workflow.timeline.clone(),
            palette: workflow.palette.clone(),
            scenario_labels: workflow
                .scenario_labels()
                .into_iter()
                .map(String::from)
                .collect(),
            tasks,
        }
    }

    pub fn scenario_label(&self) -> &str {
        self.scenario.as_deref().unwrap_or(NO_DELAY)
    }

    pub fn find(&self, name: &str) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn start(&self) -> f64 {
        self.tasks
            .iter()
            .map(|t| t.start)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// Latest end across all tasks, 0 for an empty timeline.
    pub fn finish(&self) -> f64 {
        self.tasks
            .iter()
            .map(|t| t.end)
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    pub fn shifted_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_shifted()).count()
    }

    /// Keeps only tasks of `category`, like a per-category chart tab.
    pub fn for_category(&self, category: &str) -> Self {
        let mut filtered = self.clone();
        filtered.tasks.retain(|t| t.category == category);
        filtered
    }

    pub fn with_palette_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        self.palette = self.palette.merged_with(overrides);
        self
    }

    pub fn horizon_days(&self) -> f64 {
        self.settings.horizon_days.unwrap_or(0.0).max(self.finish())
    }

    fn grid_columns(&self) -> f64 {
        ((self.horizon_days() / self.step()) - EPSILON).ceil().max(1.0)
    }

    /// Number of grid columns needed to cover the horizon.
    pub fn slot_count(&self) -> u32 {
        self.grid_columns().min(MAX_SLOTS as f64) as u32
    }

    /// Grid columns `[first, last)` a task occupies, never empty.
    ///
    /// `None` for a task that ends before the grid starts at day 0.
    pub fn slot_span(&self, task: &ScheduledTask) -> Option<(u32, u32)> {
        if task.start < 0.0 && task.end <= 0.0 {
            return None;
        }
        let step = self.step();
        let first = ((task.start / step) + EPSILON).floor().max(0.0) as u32;
        let last = ((task.end / step) - EPSILON).ceil().max(0.0) as u32;
        Some((first, last.max(first + 1)))
    }

    /// Rejects timelines whose grid or calendar dates cannot be rendered.
    pub fn check_extent(&self) -> Result<(), PlanError> {
        let slots = self.grid_columns();
        if !slots.is_finite() || slots > MAX_SLOTS as f64 {
            return Err(PlanError::GridTooLarge {
                workflow: self.workflow_key.clone(),
                slots,
            });
        }
        for offset in [self.start(), self.finish()] {
            self.date_at(offset)?;
        }
        Ok(())
    }

    /// Offset in days of grid column `slot`.
    pub fn slot_offset(&self, slot: u32) -> f64 {
        slot as f64 * self.step()
    }

    fn step(&self) -> f64 {
        if self.settings.step_days > 0.0 {
            self.settings.step_days
        } else {
            1.0
        }
    }

    pub fn start_date(&self, task: &ScheduledTask) -> Result<NaiveDate, PlanError> {
        self.date_at(task.start)
    }

    fn date_at(&self, offset: f64) -> Result<NaiveDate, PlanError> {
        self.metadata
            .date_for_offset(offset)
            .ok_or_else(|| PlanError::DateOutOfRange {
                workflow: self.workflow_key.clone(),
                offset,
            })
    }

    /// Chain of tasks feeding into the latest-finishing one, earliest first.
    ///
    /// A predecessor belongs to the chain when its end meets the task's start.
    pub fn finish_chain(&self) -> Vec<String> {
        let Some(mut current) = self
            .tasks
            .iter()
            .reduce(|best, t| if t.end > best.end + EPSILON { t } else { best })
        else {
            return Vec::new();
        };

        let mut chain = vec![current.name.clone()];
        for _ in 0..self.tasks.len() {
            let driver = current
                .predecessors
                .iter()
                .filter_map(|name| self.find(name))
                .filter(|pred| (pred.end - current.start).abs() <= EPSILON)
                .reduce(|best, t| if t.end > best.end { t } else { best });
            match driver {
                Some(pred) => {
                    chain.push(pred.name.clone());
                    current = pred;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    pub fn summary(&self) -> TimelineSummary {
        TimelineSummary {
            workflow: self.workflow_key.clone(),
            scenario: self.scenario_label().to_string(),
            mode: self.mode,
            task_count: self.tasks.len(),
            shifted_count: self.shifted_count(),
            start: self.start(),
            finish: self.finish(),
            finish_chain: self.finish_chain(),
        }
    }

    pub fn to_dataframe(&self) -> Result<DataFrame, PlanError> {
        let height = self.tasks.len();
        let mut names: Vec<&str> = Vec::with_capacity(height);
        let mut categories: Vec<&str> = Vec::with_capacity(height);
        let mut starts: Vec<f64> = Vec::with_capacity(height);
        let mut ends: Vec<f64> = Vec::with_capacity(height);
        let mut durations: Vec<f64> = Vec::with_capacity(height);
        let mut baseline_starts: Vec<f64> = Vec::with_capacity(height);
        let mut delays: Vec<f64> = Vec::with_capacity(height);
        let mut start_dates: Vec<i32> = Vec::with_capacity(height);
        let mut causes: Vec<Option<&str>> = Vec::with_capacity(height);

        for task in &self.tasks {
            names.push(task.name.as_str());
            categories.push(task.category.as_str());
            starts.push(task.start);
            ends.push(task.end);
            durations.push(task.duration());
            baseline_starts.push(task.baseline_start);
            delays.push(task.shift());
            start_dates.push(Self::date_to_i32(self.start_date(task)?));
            causes.push(task.delay_cause.as_deref());
        }

        let columns: Vec<Column> = vec![
            Series::new(PlSmallStr::from_static("task"), names).into_column(),
            Series::new(PlSmallStr::from_static("category"), categories).into_column(),
            Series::new(PlSmallStr::from_static("start"), starts).into_column(),
            Series::new(PlSmallStr::from_static("end"), ends).into_column(),
            Series::new(PlSmallStr::from_static("duration_days"), durations).into_column(),
            Series::new(PlSmallStr::from_static("baseline_start"), baseline_starts).into_column(),
            Series::new(PlSmallStr::from_static("delay"), delays).into_column(),
            Series::new(PlSmallStr::from_static("start_date"), start_dates)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("delay_cause"), causes).into_column(),
        ];

        Ok(DataFrame::new(columns)?)
    }

    fn date_to_i32(date: NaiveDate) -> i32 {
        (date - NaiveDate::default()).num_days() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn half_day_slots_cover_fractional_tasks() {
        let timeline = catalog::find("soil-testing").unwrap().resolve().unwrap();
        let labeling = timeline.find("Sample Labeling").unwrap();
        assert_eq!(timeline.slot_span(labeling), Some((1, 2)));
        let sieving = timeline.find("Sample Sieving").unwrap();
        assert_eq!(timeline.slot_span(sieving), Some((3, 5)));
        // 0..8 days on a half-day grid
        assert_eq!(timeline.slot_count(), 16);
    }

    #[test]
    fn horizon_grows_to_fit_latest_task() {
        let mut timeline = catalog::find("soil-testing").unwrap().resolve().unwrap();
        timeline.tasks[0].end = 11.0;
        assert_eq!(timeline.horizon_days(), 11.0);
        assert_eq!(timeline.slot_count(), 22);
    }

    #[test]
    fn finish_chain_follows_meeting_predecessors() {
        let timeline = catalog::find("seed-procurement").unwrap().resolve().unwrap();
        let chain = timeline.finish_chain();
        assert_eq!(chain.first().map(String::as_str), Some("Identify Suitable Varieties"));
        assert_eq!(chain.last().map(String::as_str), Some("Storage Planning"));
        assert!(chain.contains(&"Finalize Procurement Decision".to_string()));
    }

    #[test]
    fn dataframe_has_one_row_per_task() {
        let timeline = catalog::find("seed-procurement").unwrap().resolve().unwrap();
        let df = timeline.to_dataframe().unwrap();
        assert_eq!(df.height(), timeline.tasks.len());
        let delay = df.column("delay").unwrap().f64().unwrap();
        assert!(delay.into_iter().all(|d| d == Some(0.0)));
    }

    #[test]
    fn tasks_before_day_zero_occupy_no_slot() {
        let mut timeline = catalog::find("soil-testing").unwrap().resolve().unwrap();
        timeline.tasks[0].start = -3.0;
        timeline.tasks[0].end = -2.0;
        assert_eq!(timeline.slot_span(&timeline.tasks[0]), None);

        timeline.tasks[0].end = 0.5;
        assert_eq!(timeline.slot_span(&timeline.tasks[0]), Some((0, 1)));
    }

    #[test]
    fn oversized_grid_and_far_dates_are_rejected() {
        let mut timeline = catalog::find("soil-testing").unwrap().resolve().unwrap();
        timeline.tasks[0].end = 1e9;
        assert!(matches!(
            timeline.check_extent(),
            Err(PlanError::GridTooLarge { .. })
        ));
        assert_eq!(timeline.slot_count(), MAX_SLOTS);

        let mut timeline = catalog::find("soil-testing").unwrap().resolve().unwrap();
        timeline.settings.step_days = 1e7;
        timeline.tasks[0].start = 1e9;
        timeline.tasks[0].end = 1e9 + 1.0;
        assert!(matches!(
            timeline.check_extent(),
            Err(PlanError::DateOutOfRange { .. })
        ));
        assert!(matches!(
            timeline.to_dataframe(),
            Err(PlanError::DateOutOfRange { .. })
        ));
    }
}
