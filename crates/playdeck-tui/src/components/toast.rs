//! Toast notification component

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::time::{Duration, Instant};

/// Single timed message
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            created_at: Instant::now(),
            duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }
}

/// Holds at most one toast; a new message replaces the old one
#[derive(Debug, Default)]
pub struct ToastManager {
    current: Option<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn push(&mut self, toast: Toast) {
        self.current = Some(toast);
    }

    pub fn clear_expired(&mut self) {
        if self.current.as_ref().is_some_and(Toast::is_expired) {
            self.current = None;
        }
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|t| !t.is_expired())
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.clear_expired();
        let Some(toast) = &self.current else {
            return;
        };

        let lines: Vec<&str> = toast.message.lines().collect();
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = ((widest + 6) as u16).min(area.width);
        let height = ((lines.len() + 2) as u16).min(area.height);

        let toast_area = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, toast_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));

        let content: Vec<Line> = lines
            .into_iter()
            .map(|line| {
                Line::from(Span::styled(
                    line,
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect();

        let paragraph = Paragraph::new(content)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, toast_area);
    }
}
