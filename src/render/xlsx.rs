//! Spreadsheet Gantt export.
//!
//! One worksheet: task attributes on the left, an editable delay block with
//! live formulas, then one colored cell per grid slot the task occupies.

use super::{RenderError, day_label};
use crate::config::PlannerConfig;
use crate::palette::{Palette, Rgb};
use crate::timeline::Timeline;
use rust_xlsxwriter::{
    DataValidation, Format, FormatAlign, FormatBorder, Formula, Workbook, Worksheet,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

const COL_TASK: u16 = 0;
const COL_CATEGORY: u16 = 1;
const COL_START: u16 = 2;
const COL_DURATION: u16 = 3;
const COL_CAUSE: u16 = 4;
const COL_SCENARIO: u16 = 5;
const COL_DELAY: u16 = 6;
const COL_ADJ_START: u16 = 7;
const COL_END: u16 = 8;
const FIRST_DAY_COL: u16 = 9;

const HEADERS: [&str; 9] = [
    "Task",
    "Category",
    "Start",
    "Duration",
    "Delay Cause",
    "Scenario",
    "Delay",
    "Adj Start",
    "End",
];

#[derive(Clone, Debug)]
pub struct XlsxRenderer {
    pub sheet_name: String,
    pub palette_overrides: BTreeMap<String, String>,
}

impl Default for XlsxRenderer {
    fn default() -> Self {
        Self {
            sheet_name: "Gantt".to_string(),
            palette_overrides: Default::default(),
        }
    }
}

/// A colored day cell of a task row.
#[derive(Debug, Clone, PartialEq)]
struct SlotCell<'a> {
    row: u32,
    col: u16,
    text: Option<&'a str>,
    color: Rgb,
}

/// Filled day cells for every task; the first cell of a bar carries the name.
fn slot_cells<'a>(timeline: &'a Timeline, palette: &Palette) -> Vec<SlotCell<'a>> {
    let mut cells = Vec::new();
    for (idx, task) in timeline.tasks.iter().enumerate() {
        let Some((first, last)) = timeline.slot_span(task) else {
            continue;
        };
        let color = palette.color_for(&task.category);
        for slot in first..last {
            cells.push(SlotCell {
                row: idx as u32 + 1,
                col: FIRST_DAY_COL + slot as u16,
                text: (slot == first).then_some(task.name.as_str()),
                color,
            });
        }
    }
    cells
}

/// `Adj Start` and `End` formulas of sheet row `row` (0-based).
fn delay_formulas(row: u32) -> (String, String) {
    let r = row + 1;
    (format!("=C{r}+G{r}"), format!("=H{r}+D{r}"))
}

/// Cell range `(first_row, col, last_row, col)` holding the scenario dropdown.
fn scenario_range(timeline: &Timeline) -> Option<(u32, u16, u32, u16)> {
    if timeline.tasks.is_empty() {
        return None;
    }
    Some((1, COL_SCENARIO, timeline.tasks.len() as u32, COL_SCENARIO))
}

struct Formats {
    header: Format,
    text: Format,
    number: Format,
    editable: Format,
    empty_slot: Format,
}

impl XlsxRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            sheet_name: config.sheet_name.clone(),
            palette_overrides: config.palette_overrides.clone(),
        }
    }

    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    pub fn render_to_bytes(&self, timeline: &Timeline) -> Result<Vec<u8>, RenderError> {
        let mut workbook = self.build_workbook(timeline)?;
        Ok(workbook.save_to_buffer()?)
    }

    pub fn save<P: AsRef<Path>>(&self, timeline: &Timeline, path: P) -> Result<(), RenderError> {
        let path = path.as_ref();
        let mut workbook = self.build_workbook(timeline)?;
        workbook.save(path)?;
        info!(
            workflow = %timeline.workflow_key,
            scenario = timeline.scenario_label(),
            path = %path.display(),
            "wrote spreadsheet"
        );
        Ok(())
    }

    fn build_workbook(&self, timeline: &Timeline) -> Result<Workbook, RenderError> {
        timeline.check_extent()?;
        let palette = timeline.palette.merged_with(&self.palette_overrides);
        palette.validate()?;

        let formats = Self::create_formats();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name)?;

        self.write_header(sheet, timeline, &formats)?;

        let slots = timeline.slot_count();
        for (idx, task) in timeline.tasks.iter().enumerate() {
            let row = idx as u32 + 1;

            sheet.write_with_format(row, COL_TASK, task.name.as_str(), &formats.text)?;
            sheet.write_with_format(row, COL_CATEGORY, task.category.as_str(), &formats.text)?;
            sheet.write_with_format(row, COL_START, task.baseline_start, &formats.number)?;
            sheet.write_with_format(row, COL_DURATION, task.duration(), &formats.number)?;
            sheet.write_with_format(
                row,
                COL_CAUSE,
                task.delay_cause.as_deref().unwrap_or(""),
                &formats.text,
            )?;
            sheet.write_with_format(row, COL_SCENARIO, timeline.scenario_label(), &formats.editable)?;
            sheet.write_with_format(row, COL_DELAY, task.shift(), &formats.editable)?;

            let (adj_start, end) = delay_formulas(row);
            let adj_start = Formula::new(adj_start).set_result(task.start.to_string());
            sheet.write_formula_with_format(row, COL_ADJ_START, adj_start, &formats.number)?;
            let end = Formula::new(end).set_result(task.end.to_string());
            sheet.write_formula_with_format(row, COL_END, end, &formats.number)?;

            for slot in 0..slots {
                sheet.write_blank(row, FIRST_DAY_COL + slot as u16, &formats.empty_slot)?;
            }
        }

        let mut slot_formats: HashMap<Rgb, Format> = HashMap::new();
        for cell in slot_cells(timeline, &palette) {
            let filled = slot_formats.entry(cell.color).or_insert_with(|| {
                Format::new()
                    .set_background_color(cell.color.as_u32())
                    .set_align(FormatAlign::Center)
                    .set_border(FormatBorder::Thin)
            });
            match cell.text {
                Some(name) => sheet.write_with_format(cell.row, cell.col, name, &*filled)?,
                None => sheet.write_blank(cell.row, cell.col, &*filled)?,
            };
        }

        if let Some((first_row, first_col, last_row, last_col)) = scenario_range(timeline) {
            let labels: Vec<&str> = timeline.scenario_labels.iter().map(String::as_str).collect();
            let validation = DataValidation::new().allow_list_strings(&labels)?;
            sheet.add_data_validation(first_row, first_col, last_row, last_col, &validation)?;
        }

        sheet.set_freeze_panes(1, FIRST_DAY_COL)?;
        Ok(workbook)
    }

    fn write_header(
        &self,
        sheet: &mut Worksheet,
        timeline: &Timeline,
        formats: &Formats,
    ) -> Result<(), RenderError> {
        for (col, header) in HEADERS.iter().enumerate() {
            sheet.write_with_format(0, col as u16, *header, &formats.header)?;
        }
        sheet.set_column_width(COL_TASK, 34)?;
        sheet.set_column_width(COL_CATEGORY, 16)?;
        sheet.set_column_width(COL_CAUSE, 24)?;
        sheet.set_column_width(COL_SCENARIO, 16)?;

        let step = timeline.settings.step_days;
        for slot in 0..timeline.slot_count() {
            let col = FIRST_DAY_COL + slot as u16;
            let label = day_label(timeline.slot_offset(slot), step);
            sheet.write_with_format(0, col, label, &formats.header)?;
            sheet.set_column_width(col, 9)?;
        }
        Ok(())
    }

    fn create_formats() -> Formats {
        Formats {
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(0xD9D9D9)
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
            number: Format::new()
                .set_num_format("0.0")
                .set_border(FormatBorder::Thin),
            editable: Format::new()
                .set_background_color(0xFFF2CC)
                .set_border(FormatBorder::Thin),
            empty_slot: Format::new().set_border(FormatBorder::Thin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::scenario::DelayMode;

    #[test]
    fn renders_a_workbook_with_scenario_applied() {
        let workflow = catalog::find(catalog::SEED_PROCUREMENT).unwrap();
        let timeline = workflow
            .timeline(Some("Vendor Delay"), DelayMode::Flat)
            .unwrap();
        let bytes = XlsxRenderer::new().render_to_bytes(&timeline).unwrap();
        // xlsx files are zip archives
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn bad_override_color_is_reported() {
        let timeline = catalog::find(catalog::SOIL_TESTING).unwrap().resolve().unwrap();
        let mut renderer = XlsxRenderer::new();
        renderer
            .palette_overrides
            .insert("Testing".into(), "mud".into());
        assert!(matches!(
            renderer.render_to_bytes(&timeline),
            Err(RenderError::Color(_))
        ));
    }

    #[test]
    fn half_day_bars_land_in_their_columns() {
        let timeline = catalog::find(catalog::SOIL_TESTING).unwrap().resolve().unwrap();
        let palette = timeline.palette.clone();
        let cells = slot_cells(&timeline, &palette);
        let sieving: Vec<&SlotCell> = cells.iter().filter(|c| c.row == 4).collect();
        let testing = palette.color_for("Testing");
        assert_eq!(
            sieving,
            vec![
                &SlotCell { row: 4, col: 12, text: Some("Sample Sieving"), color: testing },
                &SlotCell { row: 4, col: 13, text: None, color: testing },
            ]
        );
        // every task has exactly one named cell
        assert_eq!(
            cells.iter().filter(|c| c.text.is_some()).count(),
            timeline.tasks.len()
        );
    }

    #[test]
    fn shifted_task_moves_its_bar_only() {
        let workflow = catalog::find(catalog::SEED_PROCUREMENT).unwrap();
        let timeline = workflow
            .timeline(Some("Vendor Delay"), DelayMode::Flat)
            .unwrap();
        let cells = slot_cells(&timeline, &timeline.palette);
        let row_of = |name: &str| {
            timeline.tasks.iter().position(|t| t.name == name).unwrap() as u32 + 1
        };

        let verification: Vec<(u16, Option<&str>)> = cells
            .iter()
            .filter(|c| c.row == row_of("Vendor Verification"))
            .map(|c| (c.col, c.text))
            .collect();
        assert_eq!(verification, vec![(19, Some("Vendor Verification"))]);

        let approval: Vec<u16> = cells
            .iter()
            .filter(|c| c.row == row_of("Vendor Approval"))
            .map(|c| c.col)
            .collect();
        assert_eq!(approval, vec![16]);
    }

    #[test]
    fn formulas_and_dropdown_point_at_the_delay_block() {
        assert_eq!(
            delay_formulas(1),
            ("=C2+G2".to_string(), "=H2+D2".to_string())
        );
        assert_eq!(HEADERS[COL_ADJ_START as usize], "Adj Start");
        assert_eq!(HEADERS[COL_DELAY as usize], "Delay");
        assert_eq!(HEADERS.len(), FIRST_DAY_COL as usize);

        let timeline = catalog::find(catalog::SEED_PROCUREMENT).unwrap().resolve().unwrap();
        assert_eq!(scenario_range(&timeline), Some((1, COL_SCENARIO, 13, COL_SCENARIO)));
        assert_eq!(HEADERS[COL_SCENARIO as usize], "Scenario");
    }

    #[test]
    fn tasks_before_day_zero_get_no_cells() {
        let mut timeline = catalog::find(catalog::SOIL_TESTING).unwrap().resolve().unwrap();
        timeline.tasks[0].start = -2.0;
        timeline.tasks[0].end = -1.0;
        let cells = slot_cells(&timeline, &timeline.palette);
        assert!(cells.iter().all(|c| c.row != 1));
        assert!(XlsxRenderer::new().render_to_bytes(&timeline).is_ok());
    }
}
