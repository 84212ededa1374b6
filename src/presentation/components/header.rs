use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::super::view::UiContext;

pub fn render_header(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let mut spans = vec![Span::styled(
        ctx.title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    match ctx.countdown {
        Some(countdown) if countdown.expired => {
            spans.push(Span::styled(
                "  • Applications closed",
                Style::default().fg(Color::Red),
            ));
        }
        Some(countdown) => {
            spans.push(Span::styled(
                format!("  • Closes in {countdown}"),
                Style::default().fg(Color::Yellow),
            ));
        }
        None => {}
    }
    if let Some(saved) = ctx.last_saved {
        spans.push(Span::styled(
            format!("  • Draft saved {}", saved.format("%H:%M:%S")),
            Style::default().fg(Color::Green),
        ));
    }

    let mut lines = vec![Line::from(spans)];
    if let Some(description) = ctx.description {
        lines.push(Line::from(Span::styled(
            description.to_string(),
            Style::default().fg(Color::Gray),
        )));
    }

    let header = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}
