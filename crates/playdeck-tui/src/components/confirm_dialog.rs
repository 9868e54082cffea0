//! Confirmation dialog component

use crate::keybindings::Button;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Confirmation dialog result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    Yes,
    No,
}

/// Yes/no dialog answered with A (yes) or B (no)
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    title: String,
    message: String,
}

impl ConfirmDialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Returns Some(result) if the button answers the dialog
    pub fn handle_button(&self, button: Button) -> Option<ConfirmResult> {
        match button {
            Button::A => Some(ConfirmResult::Yes),
            Button::B => Some(ConfirmResult::No),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let dialog_width = (area.width as f32 * 0.6).max(40.0).min(area.width as f32) as u16;
        let dialog_height = 9u16.min(area.height);
        let dialog_area = Rect {
            x: area.x + area.width.saturating_sub(dialog_width) / 2,
            y: area.y + area.height.saturating_sub(dialog_height) / 2,
            width: dialog_width,
            height: dialog_height,
        };

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Message
                Constraint::Length(1), // Buttons
            ])
            .split(inner);

        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                self.message.as_str(),
                Style::default().fg(Color::White),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(message, chunks[0]);

        let buttons = Line::from(vec![
            Span::styled(
                format!("[{}] ", Button::A.key_hint()),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("Yes"),
            Span::raw("   "),
            Span::styled(
                format!("[{}] ", Button::B.key_hint()),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw("No"),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_a_and_b_answer() {
        let dialog = ConfirmDialog::new("Clear History", "Delete all sessions?");
        assert_eq!(dialog.handle_button(Button::A), Some(ConfirmResult::Yes));
        assert_eq!(dialog.handle_button(Button::B), Some(ConfirmResult::No));
        assert_eq!(dialog.handle_button(Button::X), None);
        assert_eq!(dialog.handle_button(Button::Down), None);
    }
}
