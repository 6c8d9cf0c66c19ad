use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Label that selects the unshifted timeline.
pub const NO_DELAY: &str = "None";

/// A named what-if table: task name to additive day offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayScenario {
    pub label: String,
    /// Restricts the scenario to tasks of one category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub offsets: BTreeMap<String, f64>,
}

impl DelayScenario {
    pub fn new<I, S>(label: impl Into<String>, offsets: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            category: None,
            offsets: offsets
                .into_iter()
                .map(|(name, offset)| (name.into(), offset))
                .collect(),
        }
    }

    pub fn scoped_to(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Offset for a task, honoring the category scope.
    pub fn offset_for(&self, task_name: &str, category: &str) -> Option<f64> {
        if let Some(scope) = &self.category {
            if scope != category {
                return None;
            }
        }
        self.offsets.get(task_name).copied()
    }
}

pub fn is_no_delay(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case(NO_DELAY)
}

/// Whether a delay moves only the named tasks or also everything downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayMode {
    #[default]
    Flat,
    Propagate,
}

impl DelayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelayMode::Flat => "flat",
            DelayMode::Propagate => "propagate",
        }
    }
}

impl fmt::Display for DelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DelayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(DelayMode::Flat),
            "propagate" | "cascade" => Ok(DelayMode::Propagate),
            other => Err(format!("unknown delay mode '{other}' (expected flat|propagate)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_scenario_ignores_other_categories() {
        let scenario =
            DelayScenario::new("Sensor Malfunction", [("Soil Testing", 3.0)]).scoped_to("Soil Testing");
        assert_eq!(scenario.offset_for("Soil Testing", "Soil Testing"), Some(3.0));
        assert_eq!(scenario.offset_for("Soil Testing", "Seed Planning"), None);
    }

    #[test]
    fn delay_mode_parses_case_insensitively() {
        assert_eq!("Propagate".parse::<DelayMode>().unwrap(), DelayMode::Propagate);
        assert_eq!("flat".parse::<DelayMode>().unwrap(), DelayMode::Flat);
        assert!("sideways".parse::<DelayMode>().is_err());
        assert!(is_no_delay(" none "));
    }
}
