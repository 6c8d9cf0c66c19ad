//! Output renderers for resolved timelines.

use crate::palette::ColorError;
use crate::workflow::PlanError;
use rust_xlsxwriter::XlsxError;
use std::fmt;
use std::io;

pub mod svg;
pub mod text;
pub mod xlsx;

pub use svg::SvgRenderer;
pub use text::{render_df_as_text_table, render_text_chart, render_timeline_table};
pub use xlsx::XlsxRenderer;

#[derive(Debug)]
pub enum RenderError {
    Xlsx(XlsxError),
    Io(io::Error),
    Plan(PlanError),
    Color(ColorError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Xlsx(err) => write!(f, "spreadsheet error: {err}"),
            RenderError::Io(err) => write!(f, "io error: {err}"),
            RenderError::Plan(err) => write!(f, "{err}"),
            RenderError::Color(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<XlsxError> for RenderError {
    fn from(value: XlsxError) -> Self {
        Self::Xlsx(value)
    }
}

impl From<io::Error> for RenderError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<PlanError> for RenderError {
    fn from(value: PlanError) -> Self {
        Self::Plan(value)
    }
}

impl From<ColorError> for RenderError {
    fn from(value: ColorError) -> Self {
        Self::Color(value)
    }
}

/// Header label of a grid column, e.g. `Day 3` or `Day 1.5`.
pub(crate) fn day_label(offset: f64, step_days: f64) -> String {
    if step_days.fract() == 0.0 {
        format!("Day {}", offset.round() as i64)
    } else {
        format!("Day {offset:.1}")
    }
}
