use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{
        Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
    Frame,
};

/// Selectable list with a title, or a centered message when empty
pub struct ListPane<'a> {
    pub title: &'a str,
    pub items: &'a [String],
    pub empty_message: &'a str,
    /// Selection and scroll offset, read back after rendering
    pub state: &'a mut ListState,
}

impl<'a> ListPane<'a> {
    pub fn new(
        title: &'a str,
        items: &'a [String],
        empty_message: &'a str,
        state: &'a mut ListState,
    ) -> Self {
        Self {
            title,
            items,
            empty_message,
            state,
        }
    }

    /// Rows available for items inside the border
    pub fn page_size(area: Rect) -> usize {
        (area.height as usize).saturating_sub(2).max(1)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));

        if self.items.is_empty() {
            let message = Paragraph::new(self.empty_message)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(message, area);
            return;
        }

        let list_items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| ListItem::new(item.as_str()))
            .collect();

        let list = List::new(list_items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::Cyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, self.state);

        if self.items.len() > Self::page_size(area) {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            let scroll_area = Rect {
                x: area.x + area.width.saturating_sub(1),
                y: area.y + 1,
                width: 1,
                height: area.height.saturating_sub(2),
            };

            let selected = self.state.selected().unwrap_or(0);
            let mut scrollbar_state = ScrollbarState::new(self.items.len()).position(selected);
            frame.render_stateful_widget(scrollbar, scroll_area, &mut scrollbar_state);
        }
    }
}
