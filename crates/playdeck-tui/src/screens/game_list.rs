use super::{filter_prefix, list_outcome, ScreenContext, Selection};
use crate::keybindings::Button;
use crate::nav::{Cursor, ScreenOutcome};
use crate::toolkit::ListView;
use playdeck_core::names::format_hours;
use playdeck_core::FilterStack;

const TAG_HELP: [&str; 4] = [
    "(+) => Rom location matches play history",
    "(-) => Missing Rom, 'Orphaned' history",
    "(A) => Archived Rom, first letter of archive",
    "[ABC] => Collections containing Rom",
];

/// Games of one console ranked by play time
#[derive(Debug, Clone, PartialEq)]
pub struct GameListScreen {
    pub console: String,
    pub filters: FilterStack,
}

impl GameListScreen {
    pub fn new(console: impl Into<String>, filters: FilterStack) -> Self {
        Self {
            console: console.into(),
            filters,
        }
    }

    pub(super) fn draw(
        &self,
        ctx: &mut ScreenContext<'_>,
        prior: Cursor,
    ) -> anyhow::Result<ScreenOutcome<Selection>> {
        let maps = ctx.app.cache.view(&self.filters.current_predicate());
        let games = maps.games_for(&self.console);

        let items = games
            .iter()
            .map(|game| {
                format!(
                    "{} {}{}: {}",
                    format_hours(game.total_play_secs, 999.0),
                    game.home.tag(),
                    ctx.app.collection_tag(&game.name),
                    game.name
                )
            })
            .collect();

        let title = format!(
            "{}{} : {}",
            filter_prefix(&self.filters, " : "),
            format_hours(maps.console_total(&self.console), f64::MAX),
            self.console
        );
        let view = ListView::new(title, items, prior)
            .empty_message("No Play Records Found")
            .with_action()
            .help(TAG_HELP.iter().map(|line| line.to_string()).collect())
            .hints(vec![
                (Button::B, "Back"),
                (Button::X, "Filter"),
                (Button::Menu, "Help"),
                (Button::A, "Details"),
            ])
            .banner(ctx.app.banner());

        let response = ctx.toolkit.list(&view)?;
        Ok(list_outcome(response.choice, response.cursor, |index| {
            games.get(index).cloned().map(Selection::Game)
        }))
    }
}
