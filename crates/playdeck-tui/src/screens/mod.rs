//! Play-history screens and the router that links them
//!
//! ```text
//! ConsoleList ──A──▶ GameList ──A──▶ GameDetails ──A──▶ GameHistory
//!      │X               │X               │X                 │X
//!      ▼                ▼                ▼                  ▼
//!   Filter(all)    Filter(console)   ClearHistory      Filter(game)
//! ```
//!
//! Filter screens chain: A on a criterion opens a narrower filter screen, X
//! opens the list for the filter's scope with every chosen criterion applied.

mod clear_history;
mod console_list;
mod filter;
mod game_details;
mod game_history;
mod game_list;

pub use clear_history::ClearHistoryScreen;
pub use console_list::ConsoleListScreen;
pub use filter::{FilterScope, FilterScreen};
pub use game_details::GameDetailsScreen;
pub use game_history::GameHistoryScreen;
pub use game_list::GameListScreen;

use crate::app::AppState;
use crate::nav::{Cursor, Notifier, Router, Screen, ScreenOutcome};
use crate::toolkit::{ListChoice, Toolkit, MESSAGE_DURATION};
use playdeck_core::models::{to_local, GameAggregate, RomId};
use playdeck_core::FilterCriterion;
use tracing::debug;

/// What a screen hands back to the router
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Console(String),
    Game(GameAggregate),
    Criterion(FilterCriterion),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    ConsoleList,
    GameList,
    GameDetails,
    GameHistory,
    Filter,
    ClearHistory,
}

/// Borrowed state plus the toolkit a screen draws with
pub struct ScreenContext<'a> {
    pub app: &'a AppState,
    pub toolkit: &'a mut dyn Toolkit,
}

impl<'a> ScreenContext<'a> {
    pub fn new(app: &'a AppState, toolkit: &'a mut dyn Toolkit) -> Self {
        Self { app, toolkit }
    }
}

impl Notifier for ScreenContext<'_> {
    fn notify(&mut self, message: &str) {
        self.toolkit.show_message(message, MESSAGE_DURATION);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayHistoryScreen {
    ConsoleList(ConsoleListScreen),
    GameList(GameListScreen),
    GameDetails(GameDetailsScreen),
    GameHistory(GameHistoryScreen),
    Filter(FilterScreen),
    ClearHistory(ClearHistoryScreen),
}

impl PlayHistoryScreen {
    pub fn id(&self) -> ScreenId {
        match self {
            PlayHistoryScreen::ConsoleList(_) => ScreenId::ConsoleList,
            PlayHistoryScreen::GameList(_) => ScreenId::GameList,
            PlayHistoryScreen::GameDetails(_) => ScreenId::GameDetails,
            PlayHistoryScreen::GameHistory(_) => ScreenId::GameHistory,
            PlayHistoryScreen::Filter(_) => ScreenId::Filter,
            PlayHistoryScreen::ClearHistory(_) => ScreenId::ClearHistory,
        }
    }
}

impl<'a> Screen<ScreenContext<'a>> for PlayHistoryScreen {
    type Id = ScreenId;
    type Value = Selection;

    fn identity(&self) -> ScreenId {
        self.id()
    }

    fn draw(
        &self,
        ctx: &mut ScreenContext<'a>,
        prior: Cursor,
    ) -> anyhow::Result<ScreenOutcome<Selection>> {
        match self {
            PlayHistoryScreen::ConsoleList(s) => s.draw(ctx, prior),
            PlayHistoryScreen::GameList(s) => s.draw(ctx, prior),
            PlayHistoryScreen::GameDetails(s) => s.draw(ctx, prior),
            PlayHistoryScreen::GameHistory(s) => s.draw(ctx, prior),
            PlayHistoryScreen::Filter(s) => s.draw(ctx, prior),
            PlayHistoryScreen::ClearHistory(s) => s.draw(ctx, prior),
        }
    }
}

/// Routes selections between the play-history screens
#[derive(Debug, Default)]
pub struct PlayHistoryRouter;

impl<'a> Router<ScreenContext<'a>, PlayHistoryScreen> for PlayHistoryRouter {
    fn forward(
        &mut self,
        ctx: &mut ScreenContext<'a>,
        from: &PlayHistoryScreen,
        value: Selection,
    ) -> Option<PlayHistoryScreen> {
        let next = match (from, value) {
            (PlayHistoryScreen::ConsoleList(s), Selection::Console(console)) => {
                PlayHistoryScreen::GameList(GameListScreen::new(console, s.filters.clone()))
            }
            (PlayHistoryScreen::GameList(s), Selection::Game(game)) => {
                PlayHistoryScreen::GameDetails(GameDetailsScreen::new(
                    s.console.clone(),
                    game.name,
                    s.filters.clone(),
                ))
            }
            (PlayHistoryScreen::GameDetails(s), _) => {
                let ids = all_ids(ctx.app, &s.console, &s.name);
                PlayHistoryScreen::GameHistory(GameHistoryScreen::new(
                    s.console.clone(),
                    s.name.clone(),
                    ids,
                    s.filters.clone(),
                ))
            }
            (PlayHistoryScreen::Filter(s), Selection::Criterion(criterion)) => {
                PlayHistoryScreen::Filter(s.narrowed(criterion))
            }
            (from, value) => {
                debug!(screen = ?from.id(), ?value, "No forward route");
                return None;
            }
        };
        Some(next)
    }

    fn action(
        &mut self,
        ctx: &mut ScreenContext<'a>,
        from: &PlayHistoryScreen,
        _value: Selection,
    ) -> Option<PlayHistoryScreen> {
        let next = match from {
            PlayHistoryScreen::ConsoleList(s) => {
                PlayHistoryScreen::Filter(FilterScreen::new(FilterScope::All, s.filters.clone()))
            }
            PlayHistoryScreen::GameList(s) => PlayHistoryScreen::Filter(FilterScreen::new(
                FilterScope::Console(s.console.clone()),
                s.filters.clone(),
            )),
            PlayHistoryScreen::GameHistory(s) => PlayHistoryScreen::Filter(FilterScreen::new(
                FilterScope::Game {
                    console: s.console.clone(),
                    name: s.name.clone(),
                    ids: s.ids.clone(),
                },
                s.filters.clone(),
            )),
            PlayHistoryScreen::GameDetails(s) => {
                let ids = all_ids(ctx.app, &s.console, &s.name);
                PlayHistoryScreen::ClearHistory(ClearHistoryScreen::new(s.name.clone(), ids))
            }
            PlayHistoryScreen::Filter(s) => s.saved(),
            PlayHistoryScreen::ClearHistory(_) => return None,
        };
        Some(next)
    }
}

/// Every id of a title in the unfiltered aggregates.
fn all_ids(app: &AppState, console: &str, name: &str) -> Vec<RomId> {
    app.cache
        .get()
        .maps
        .find_game(console, name)
        .map(|g| g.ids.clone())
        .unwrap_or_default()
}

/// Map a list answer onto a transition, resolving selected rows with `select`.
fn list_outcome(
    choice: ListChoice,
    cursor: Cursor,
    select: impl FnOnce(usize) -> Option<Selection>,
) -> ScreenOutcome<Selection> {
    use crate::nav::Transition;

    let transition = match choice {
        ListChoice::Selected(index) => match select(index) {
            Some(selection) => Transition::Forward(selection),
            None => Transition::Back,
        },
        ListChoice::Action => Transition::Action(Selection::None),
        ListChoice::Cancelled => Transition::Back,
    };
    ScreenOutcome::new(transition, cursor)
}

/// `Sat Mar 16 10:00:00 2024` in local time
pub fn format_timestamp(epoch_secs: i64) -> String {
    to_local(epoch_secs).format("%a %b %e %H:%M:%S %Y").to_string()
}

/// `2024 > Evenings : ` when filters are applied
fn filter_prefix(filters: &playdeck_core::FilterStack, separator: &str) -> String {
    filters
        .label()
        .map(|label| format!("{label}{separator}"))
        .unwrap_or_default()
}
