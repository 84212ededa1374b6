use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::countdown::Countdown;

use super::components::{render_fields, render_footer, render_header};

/// Feedback attached below a field value that is not a validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
}

#[derive(Debug, Clone)]
pub struct FieldRow {
    pub label: String,
    pub kind: &'static str,
    pub value: String,
    pub help: Option<String>,
    pub error: Option<String>,
    pub notice: Option<Notice>,
    pub cursor: bool,
}

pub struct UiContext<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub countdown: Option<Countdown>,
    pub last_saved: Option<DateTime<Local>>,
    pub rows: &'a [FieldRow],
    pub focus: usize,
    pub status_message: &'a str,
    pub dirty: bool,
    pub submitting: bool,
    pub error_count: usize,
    pub failure: Option<&'a str>,
    pub help: Option<&'a str>,
}

pub fn draw(frame: &mut Frame<'_>, ctx: UiContext<'_>, scroll_offset: &mut usize) {
    let header_height = if ctx.description.is_some() { 4 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height),
            Constraint::Min(7),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], &ctx);
    render_fields(frame, chunks[1], &ctx, scroll_offset);
    render_footer(frame, chunks[2], &ctx);
}
