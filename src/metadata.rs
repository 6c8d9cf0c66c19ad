use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Calendar date that day offset 0 maps to.
    pub season_start: NaiveDate,
}

impl Default for WorkflowMetadata {
    fn default() -> Self {
        Self {
            title: "New Workflow".to_string(),
            description: "No description".to_string(),
            season_start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default(),
        }
    }
}

impl WorkflowMetadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Calendar date of a day offset; fractional days fall on the same date.
    ///
    /// `None` when the offset lands outside the range chrono can represent.
    pub fn date_for_offset(&self, offset_days: f64) -> Option<NaiveDate> {
        if !offset_days.is_finite() {
            return None;
        }
        let whole_days = offset_days.floor() as i64;
        chrono::Duration::try_days(whole_days)
            .and_then(|days| self.season_start.checked_add_signed(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_for_offset_truncates_half_days() {
        let mut metadata = WorkflowMetadata::default();
        metadata.season_start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(
            metadata.date_for_offset(3.5),
            NaiveDate::from_ymd_opt(2025, 6, 4)
        );
        assert_eq!(metadata.date_for_offset(0.0), Some(metadata.season_start));
    }

    #[test]
    fn date_for_offset_out_of_range_is_none() {
        let metadata = WorkflowMetadata::default();
        assert_eq!(metadata.date_for_offset(1e9), None);
        assert_eq!(metadata.date_for_offset(-1e9), None);
        assert_eq!(metadata.date_for_offset(f64::INFINITY), None);
    }
}
