use super::{filter_prefix, format_timestamp, ScreenContext, Selection};
use crate::keybindings::Button;
use crate::nav::{Cursor, ScreenOutcome, Transition};
use crate::toolkit::{DetailChoice, DetailView};
use playdeck_core::models::RomHome;
use playdeck_core::names::{format_duration, format_percent};
use playdeck_core::FilterStack;

/// Statistics for one game
#[derive(Debug, Clone, PartialEq)]
pub struct GameDetailsScreen {
    pub console: String,
    pub name: String,
    pub filters: FilterStack,
}

impl GameDetailsScreen {
    pub fn new(console: impl Into<String>, name: impl Into<String>, filters: FilterStack) -> Self {
        Self {
            console: console.into(),
            name: name.into(),
            filters,
        }
    }

    pub(super) fn draw(
        &self,
        ctx: &mut ScreenContext<'_>,
        prior: Cursor,
    ) -> anyhow::Result<ScreenOutcome<Selection>> {
        let maps = ctx.app.cache.view(&self.filters.current_predicate());
        // Gone after its history was cleared or the log changed underneath
        let Some(game) = maps.find_game(&self.console, &self.name) else {
            return Ok(ScreenOutcome::no_data(None, prior));
        };

        let average = game
            .average_session_secs()
            .map(format_duration)
            .unwrap_or_else(|| "-".to_string());
        let cheats = ctx.app.cheats.availability(&self.console, &game.name);

        let view = DetailView::new(format!(
            "{}{}",
            filter_prefix(&self.filters, ": "),
            game.name
        ))
        .row("Console", self.console.as_str())
        .row("First Played", format_timestamp(game.first_played))
        .row("Last Played", format_timestamp(game.last_played))
        .row("Play Sessions", game.play_count.to_string())
        .row("Total Play Time", format_duration(game.total_play_secs))
        .row("Average Session", average)
        .row(
            "Pct of Total",
            format_percent(game.percent_of(maps.grand_total)),
        )
        .row(
            "Pct of Console",
            format_percent(game.percent_of(maps.console_total(&self.console))),
        )
        .row("Cheats", cheats.label())
        .row("ROM", home_label(&game.home))
        .hints(vec![
            (Button::B, "Back"),
            (Button::X, "Clear History"),
            (Button::A, "History"),
        ])
        .banner(ctx.app.banner());

        let transition = match ctx.toolkit.details(&view)? {
            DetailChoice::Confirm => Transition::Forward(Selection::None),
            DetailChoice::Action => Transition::Action(Selection::None),
            DetailChoice::Back => Transition::Back,
        };
        Ok(ScreenOutcome::new(transition, prior))
    }
}

fn home_label(home: &RomHome) -> String {
    match home {
        RomHome::Unknown => "Unknown".to_string(),
        RomHome::Present => "Present".to_string(),
        RomHome::Archived(archive) => format!("Archived ({archive})"),
        RomHome::Missing => "Missing".to_string(),
    }
}
