use crate::toolkit::Hint;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Bottom bar of button hints: ` A Select │ B Back`
pub fn hint_line(hints: &[Hint]) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 3);
    for (i, (button, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(
            format!(" {}", button.label()),
            Style::default().fg(Color::Cyan).bold(),
        ));
        spans.push(Span::styled(
            format!(" {label}"),
            Style::default().fg(Color::Gray),
        ));
    }
    Line::from(spans)
}

pub fn render(frame: &mut Frame, area: Rect, hints: &[Hint]) {
    let bar = Paragraph::new(hint_line(hints)).style(Style::default().bg(Color::Black));
    frame.render_widget(bar, area);
}

/// Warning strip above the content, as used for degraded data
pub fn render_banner(frame: &mut Frame, area: Rect, message: &str) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled(" ⚠ ", Style::default().fg(Color::Yellow).bold()),
        Span::styled(message.to_string(), Style::default().fg(Color::Yellow)),
    ]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(banner, area);
}
