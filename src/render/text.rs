//! Plain-text tables and charts for terminal output.

use super::RenderError;
use crate::timeline::Timeline;
use polars::prelude::{AnyValue, DataFrame};

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Float64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

/// Boxed ASCII table of every column in `df`.
pub fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &col_names, &widths);
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_row(out: &mut String, values: &[String], widths: &[usize]) {
    out.push('|');
    for (value, width) in values.iter().zip(widths) {
        out.push(' ');
        out.push_str(value);
        out.push_str(&" ".repeat(width.saturating_sub(value.chars().count())));
        out.push_str(" |");
    }
    out.push('\n');
}

pub fn render_timeline_table(timeline: &Timeline) -> Result<String, RenderError> {
    let df = timeline.to_dataframe()?;
    Ok(render_df_as_text_table(&df))
}

/// One row per task, `#` in every grid slot the task occupies.
pub fn render_text_chart(timeline: &Timeline) -> Result<String, RenderError> {
    timeline.check_extent()?;
    let name_width = timeline
        .tasks
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let slots = timeline.slot_count();
    let per_day = (1.0 / timeline.settings.step_days).round().max(1.0) as u32;

    let mut out = format!(
        "{} [{} / {}]\n",
        timeline.metadata.title,
        timeline.scenario_label(),
        timeline.mode
    );

    // Ruler: a day number every whole day that fits.
    let mut ruler = String::new();
    let mut slot = 0;
    while slot < slots {
        let label = (slot / per_day).to_string();
        if slot % per_day == 0 && ruler.chars().count() <= slot as usize {
            ruler.push_str(&" ".repeat(slot as usize - ruler.chars().count()));
            ruler.push_str(&label);
        }
        slot += 1;
    }
    out.push_str(&format!("{:name_width$} |{}\n", "Day", ruler));

    for task in &timeline.tasks {
        let (first, last) = timeline.slot_span(task).unwrap_or((0, 0));
        let bar: String = (0..slots)
            .map(|s| if s >= first && s < last { '#' } else { '.' })
            .collect();
        let marker = if task.is_shifted() { " *" } else { "" };
        out.push_str(&format!("{:name_width$} |{}{}\n", task.name, bar, marker));
    }
    Ok(out)
}
