use serde::{Deserialize, Serialize};
use std::fmt;

/// How a task's start is expressed in a workflow definition.
///
/// In JSON this is untagged: a number is a literal day offset, a string names
/// a single predecessor and a list of strings starts after the latest of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartSpec {
    Offset(f64),
    After(String),
    AfterAll(Vec<String>),
}

impl StartSpec {
    pub fn after(name: impl Into<String>) -> Self {
        StartSpec::After(name.into())
    }

    pub fn after_all<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StartSpec::AfterAll(names.into_iter().map(Into::into).collect())
    }

    /// Predecessor names referenced by this start, empty for literal offsets.
    pub fn predecessors(&self) -> Vec<&str> {
        match self {
            StartSpec::Offset(_) => Vec::new(),
            StartSpec::After(name) => vec![name.as_str()],
            StartSpec::AfterAll(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl From<f64> for StartSpec {
    fn from(value: f64) -> Self {
        StartSpec::Offset(value)
    }
}

impl From<&str> for StartSpec {
    fn from(value: &str) -> Self {
        StartSpec::After(value.to_string())
    }
}

impl fmt::Display for StartSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartSpec::Offset(value) => write!(f, "{value}"),
            StartSpec::After(name) => write!(f, "{name}"),
            StartSpec::AfterAll(names) => write!(f, "{}", names.join("|")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDef {
    pub name: String,
    pub category: String,
    pub start: StartSpec,
    pub duration_days: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_cause: Option<String>,
}

impl TaskDef {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        start: impl Into<StartSpec>,
        duration_days: f64,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            start: start.into(),
            duration_days,
            delay_cause: None,
        }
    }

    pub fn with_delay_cause(mut self, cause: impl Into<String>) -> Self {
        self.delay_cause = Some(cause.into());
        self
    }
}

/// A task placed on the day axis.
///
/// `baseline_*` hold the unshifted resolution so the applied delay can be
/// reported next to the adjusted bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub name: String,
    pub category: String,
    pub start: f64,
    pub end: f64,
    pub baseline_start: f64,
    pub baseline_end: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predecessors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_cause: Option<String>,
}

impl ScheduledTask {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn shift(&self) -> f64 {
        self.start - self.baseline_start
    }

    pub fn is_shifted(&self) -> bool {
        self.shift().abs() > f64::EPSILON
    }

    pub(crate) fn shift_by(&mut self, offset: f64) {
        self.start += offset;
        self.end += offset;
    }
}
