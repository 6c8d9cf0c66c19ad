//! Standalone SVG bar chart of a timeline.

use super::RenderError;
use crate::config::PlannerConfig;
use crate::timeline::Timeline;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Clone, Debug)]
pub struct SvgRenderer {
    /// Width of the bar area (excluding labels) in pixels
    pub chart_width: u32,
    /// Height per task row in pixels
    pub row_height: u32,
    /// Width of the task label column in pixels
    pub label_width: u32,
    pub header_height: u32,
    pub padding: u32,
    pub palette_overrides: BTreeMap<String, String>,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            chart_width: 960,
            row_height: 28,
            label_width: 260,
            header_height: 64,
            padding: 16,
            palette_overrides: BTreeMap::new(),
        }
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            chart_width: config.chart_width,
            row_height: config.row_height,
            palette_overrides: config.palette_overrides.clone(),
            ..Self::default()
        }
    }

    pub fn chart_width(mut self, width: u32) -> Self {
        self.chart_width = width;
        self
    }

    pub fn row_height(mut self, height: u32) -> Self {
        self.row_height = height;
        self
    }

    pub fn render(&self, timeline: &Timeline) -> Result<String, RenderError> {
        timeline.check_extent()?;
        let palette = timeline.palette.merged_with(&self.palette_overrides);
        palette.validate()?;

        let categories = categories_in_order(timeline);
        let legend_height = if categories.is_empty() { 0 } else { self.row_height };
        let rows = timeline.tasks.len() as u32;
        let chart_top = self.padding + self.header_height;
        let width = self.padding * 2 + self.label_width + self.chart_width;
        let height = chart_top + rows * self.row_height + legend_height + self.padding * 2;

        let horizon = timeline.horizon_days().max(1.0);
        let px_per_day = self.chart_width as f64 / horizon;
        let chart_left = (self.padding + self.label_width) as f64;

        let mut svg = String::new();
        svg.push_str(&format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif">"##
        ));
        svg.push('\n');
        svg.push_str(r##"  <rect width="100%" height="100%" fill="#FFFFFF"/>"##);
        svg.push('\n');

        let title = format!(
            "{} (scenario: {}, {})",
            timeline.metadata.title,
            timeline.scenario_label(),
            timeline.mode
        );
        svg.push_str(&format!(
            r##"  <text x="{x}" y="{y}" font-size="16" font-weight="bold" text-anchor="middle">{title}</text>"##,
            x = width / 2,
            y = self.padding + 18,
            title = xml_escape(&title)
        ));
        svg.push('\n');

        svg.push_str(&self.render_grid(timeline, rows, chart_left, px_per_day));

        for (row, task) in timeline.tasks.iter().enumerate() {
            let y = chart_top + row as u32 * self.row_height;
            let bar_height = (self.row_height as f64 * 0.6) as u32;
            let bar_y = y + (self.row_height - bar_height) / 2;

            svg.push_str(&format!(
                r##"  <text x="{x}" y="{y}" font-size="12">{label}</text>"##,
                x = self.padding + 4,
                y = y + self.row_height / 2 + 4,
                label = xml_escape(&task.name)
            ));
            svg.push('\n');

            if task.end <= 0.0 && task.start < 0.0 {
                continue;
            }
            let visible_start = task.start.max(0.0);
            let x_start = chart_left + visible_start * px_per_day;
            let bar_width = ((task.end - visible_start) * px_per_day).max(2.0);
            let color = palette.color_for(&task.category).to_hex();
            svg.push_str(&format!(
                r##"  <rect x="{x:.1}" y="{y}" width="{w:.1}" height="{h}" rx="3" fill="{color}" stroke="#333333" stroke-width="0.5"><title>{tip}</title></rect>"##,
                x = x_start,
                y = bar_y,
                w = bar_width,
                h = bar_height,
                tip = xml_escape(&format!("{}: {} - {}", task.name, task.start, task.end))
            ));
            svg.push('\n');
            svg.push_str(&format!(
                r##"  <text x="{x:.1}" y="{y}" font-size="10" text-anchor="middle">{label}</text>"##,
                x = x_start + bar_width / 2.0,
                y = bar_y + bar_height / 2 + 3,
                label = xml_escape(&task.name)
            ));
            svg.push('\n');
        }

        let legend_y = chart_top + rows * self.row_height + self.padding;
        let mut legend_x = chart_left;
        for category in &categories {
            let color = palette.color_for(category).to_hex();
            svg.push_str(&format!(
                r##"  <rect x="{x:.1}" y="{y}" width="12" height="12" fill="{color}" stroke="#333333" stroke-width="0.5"/>"##,
                x = legend_x,
                y = legend_y
            ));
            svg.push('\n');
            svg.push_str(&format!(
                r##"  <text x="{x:.1}" y="{y}" font-size="11">{label}</text>"##,
                x = legend_x + 16.0,
                y = legend_y + 10,
                label = xml_escape(category)
            ));
            svg.push('\n');
            legend_x += 28.0 + category.chars().count() as f64 * 7.0;
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }

    pub fn save<P: AsRef<Path>>(&self, timeline: &Timeline, path: P) -> Result<(), RenderError> {
        let path = path.as_ref();
        let svg = self.render(timeline)?;
        fs::write(path, svg)?;
        info!(
            workflow = %timeline.workflow_key,
            scenario = timeline.scenario_label(),
            path = %path.display(),
            "wrote chart"
        );
        Ok(())
    }

    /// Day axis: vertical lines at least `MIN_LINE_GAP_PX` apart, labels wider apart.
    fn render_grid(&self, timeline: &Timeline, rows: u32, chart_left: f64, px_per_day: f64) -> String {
        let mut svg = String::new();
        let chart_top = self.padding + self.header_height;
        let chart_bottom = chart_top + rows * self.row_height;
        let days = timeline.horizon_days().ceil() as u64;
        let stride = grid_stride(MIN_LINE_GAP_PX / px_per_day);
        let label_every = grid_stride(MIN_LABEL_GAP_PX / px_per_day).max(stride);

        for day in (0..=days).step_by(stride as usize) {
            let x = chart_left + day as f64 * px_per_day;
            svg.push_str(&format!(
                r##"  <line x1="{x:.1}" y1="{chart_top}" x2="{x:.1}" y2="{chart_bottom}" stroke="#E0E0E0" stroke-width="1"/>"##
            ));
            svg.push('\n');
            if day % label_every == 0 {
                svg.push_str(&format!(
                    r##"  <text x="{x:.1}" y="{y}" font-size="11" text-anchor="middle">{day}</text>"##,
                    y = chart_top - 8
                ));
                svg.push('\n');
            }
        }

        for row in 0..=rows {
            let y = chart_top + row * self.row_height;
            svg.push_str(&format!(
                r##"  <line x1="{x1}" y1="{y}" x2="{x2:.1}" y2="{y}" stroke="#E0E0E0" stroke-width="1"/>"##,
                x1 = self.padding,
                x2 = chart_left + self.chart_width as f64
            ));
            svg.push('\n');
        }

        svg.push_str(&format!(
            r##"  <text x="{x:.1}" y="{y}" font-size="12" text-anchor="middle">Day</text>"##,
            x = chart_left + self.chart_width as f64 / 2.0,
            y = chart_top - 26
        ));
        svg.push('\n');
        svg
    }
}

const MIN_LINE_GAP_PX: f64 = 6.0;
const MIN_LABEL_GAP_PX: f64 = 28.0;

/// Smallest 1-2-5 day step that is at least `min_days`.
fn grid_stride(min_days: f64) -> u64 {
    let mut magnitude = 1u64;
    while magnitude < u64::MAX / 10 {
        for factor in [1, 2, 5] {
            let step = factor * magnitude;
            if step as f64 >= min_days {
                return step;
            }
        }
        magnitude *= 10;
    }
    magnitude
}

fn categories_in_order(timeline: &Timeline) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for task in &timeline.tasks {
        if !seen.contains(&task.category.as_str()) {
            seen.push(task.category.as_str());
        }
    }
    seen
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
