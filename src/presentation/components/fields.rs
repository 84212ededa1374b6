use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use super::super::view::{FieldRow, Notice, UiContext};

pub fn render_fields(
    frame: &mut Frame<'_>,
    area: Rect,
    ctx: &UiContext<'_>,
    scroll_offset: &mut usize,
) {
    if ctx.rows.is_empty() {
        let placeholder =
            Paragraph::new("This form has no fields").block(Block::default().borders(Borders::ALL));
        frame.render_widget(placeholder, area);
        return;
    }

    let selected = ctx.focus.min(ctx.rows.len() - 1);
    adjust_scroll_offset(scroll_offset, selected, area.height);
    let content_width = area.width.saturating_sub(6);

    let mut items = Vec::with_capacity(ctx.rows.len());
    let mut cursor_hint = None;
    let mut line_offset = 0usize;
    for (idx, row) in ctx.rows.iter().enumerate() {
        let render = build_field_render(row, idx == selected, content_width);
        if idx >= *scroll_offset && cursor_hint.is_none() {
            if let Some(mut hint) = render.cursor_hint {
                hint.line_offset += line_offset;
                cursor_hint = Some(hint);
            }
        }
        if idx >= *scroll_offset {
            line_offset += render.lines.len();
        }
        items.push(ListItem::new(render.lines));
    }

    let mut list_state = ListState::default();
    list_state.select(Some(selected));
    *list_state.offset_mut() = *scroll_offset;

    let list = List::new(items)
        .block(Block::default().title("Application").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, area, &mut list_state);

    if !ctx.submitting
        && let Some(cursor) = cursor_hint
    {
        let max_line = area.height.saturating_sub(2) as usize;
        if cursor.line_offset < max_line {
            let cursor_y = area.y.saturating_add(1).saturating_add(cursor.line_offset as u16);
            let cursor_x = area
                .x
                .saturating_add(1)
                .saturating_add(2)
                .saturating_add(cursor.column_offset)
                .saturating_add(cursor.value_width);
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }
}

fn adjust_scroll_offset(offset: &mut usize, selected: usize, height: u16) {
    // Rows are several lines tall; assume four per row when sizing the window.
    let window = (height.saturating_sub(2) / 4) as usize;
    if window == 0 {
        *offset = selected;
        return;
    }
    if selected < *offset {
        *offset = selected;
    } else if selected >= *offset + window {
        *offset = selected + 1 - window;
    }
}

struct FieldRender {
    lines: Vec<Line<'static>>,
    cursor_hint: Option<CursorHint>,
}

struct CursorHint {
    line_offset: usize,
    column_offset: u16,
    value_width: u16,
}

fn build_field_render(row: &FieldRow, is_selected: bool, max_width: u16) -> FieldRender {
    let mut lines = Vec::new();
    let label_style = if is_selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(vec![
        Span::styled(row.label.clone(), label_style),
        Span::styled(
            format!("  ({})", row.kind),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    let (value_panel, cursor_hint) = value_panel_lines(row, is_selected, max_width);
    lines.extend(value_panel);

    if is_selected && let Some(help) = &row.help {
        for line in wrap(help, max_width.max(4) as usize) {
            lines.push(Line::from(Span::styled(
                format!("  {}", line.into_owned()),
                Style::default().fg(Color::Gray),
            )));
        }
    }
    if let Some(notice) = &row.notice {
        lines.extend(notice_lines(notice, max_width));
    }
    if let Some(error) = &row.error {
        lines.extend(error_lines(error, max_width));
    }

    FieldRender {
        lines,
        cursor_hint: cursor_hint.filter(|_| row.cursor),
    }
}

fn value_panel_lines(
    row: &FieldRow,
    is_selected: bool,
    max_width: u16,
) -> (Vec<Line<'static>>, Option<CursorHint>) {
    let clamp_width = max_width.max(4) as usize;
    let mut wrapped_value: Vec<String> = wrap(&row.value, clamp_width)
        .into_iter()
        .map(|segment| segment.into_owned())
        .collect();
    if wrapped_value.is_empty() {
        wrapped_value.push(String::new());
    }
    let inner_width = wrapped_value
        .iter()
        .map(|line| UnicodeWidthStr::width(line.as_str()))
        .max()
        .unwrap_or(0);
    let last_line_width = wrapped_value
        .last()
        .map(|line| UnicodeWidthStr::width(line.as_str()))
        .unwrap_or(0);
    let mut lines = Vec::new();

    if !is_selected {
        for segment in wrapped_value {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(segment, Style::default().fg(Color::White)),
            ]));
        }
        return (lines, None);
    }

    let border_line = "─".repeat(inner_width.saturating_add(2));
    let border_style = Style::default().fg(Color::Yellow);
    let value_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    lines.push(Line::from(Span::styled(
        format!("┌{border_line}┐"),
        border_style,
    )));
    let last_value_line = lines.len() + wrapped_value.len() - 1;
    for segment in &wrapped_value {
        let mut content = segment.clone();
        let mut width = UnicodeWidthStr::width(content.as_str());
        while width < inner_width {
            content.push(' ');
            width += 1;
        }
        lines.push(Line::from(vec![
            Span::styled("│ ", border_style),
            Span::styled(content, value_style),
            Span::styled(" │", border_style),
        ]));
    }
    lines.push(Line::from(Span::styled(
        format!("└{border_line}┘"),
        border_style,
    )));

    let cursor_hint = CursorHint {
        line_offset: last_value_line,
        column_offset: 2,
        value_width: last_line_width as u16,
    };
    (lines, Some(cursor_hint))
}

fn notice_lines(notice: &Notice, max_width: u16) -> Vec<Line<'static>> {
    let (text, style) = match notice {
        Notice::Info(text) => (text, Style::default().fg(Color::Green)),
        Notice::Warning(text) => (
            text,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ),
    };
    wrap(text, max_width.max(4) as usize)
        .into_iter()
        .map(|line| Line::from(Span::styled(format!("  {}", line.into_owned()), style)))
        .collect()
}

fn error_lines(message: &str, max_width: u16) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "  Error:",
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ))];
    for line in wrap(message, max_width.max(4) as usize) {
        lines.push(Line::from(Span::styled(
            format!("    {}", line.into_owned()),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}
