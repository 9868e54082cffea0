//! Help overlay, opened with the Menu button

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Help modal listing whatever lines the current screen supplies
pub struct HelpModal {
    visible: bool,
}

impl Default for HelpModal {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpModal {
    pub fn new() -> Self {
        Self { visible: false }
    }

    /// Toggle help modal visibility
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Render the help modal as an overlay
    pub fn render(&self, frame: &mut Frame, area: Rect, lines: &[String]) {
        if !self.visible || lines.is_empty() {
            return;
        }

        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = ((widest + 4) as u16).max(30).min(area.width);
        let height = ((lines.len() + 2) as u16).min(area.height);
        let modal_area = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                " Help ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .title_alignment(Alignment::Center);

        let content: Vec<Line> = lines.iter().map(|l| Line::from(l.as_str())).collect();
        let help_text = Paragraph::new(content)
            .block(block)
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Left);

        frame.render_widget(help_text, modal_area);
    }
}
