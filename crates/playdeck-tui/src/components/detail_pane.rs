use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Row, Table},
    Frame,
};

/// Two-column label/value pane
pub struct DetailPane<'a> {
    pub title: &'a str,
    pub rows: &'a [(String, String)],
}

impl<'a> DetailPane<'a> {
    pub fn new(title: &'a str, rows: &'a [(String, String)]) -> Self {
        Self { title, rows }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let label_width = self
            .rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0) as u16
            + 1;

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|(label, value)| {
                Row::new(vec![
                    Span::styled(label.as_str(), Style::default().fg(Color::Cyan)),
                    Span::styled(value.as_str(), Style::default().fg(Color::White)),
                ])
            })
            .collect();

        let table = Table::new(rows, [Constraint::Length(label_width), Constraint::Min(0)])
            .column_spacing(2)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(Span::styled(
                        format!(" {} ", self.title),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    )),
            );

        frame.render_widget(table, area);
    }
}
