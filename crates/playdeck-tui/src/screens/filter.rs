use super::{
    list_outcome, ConsoleListScreen, GameHistoryScreen, GameListScreen, PlayHistoryScreen,
    ScreenContext, Selection,
};
use crate::keybindings::Button;
use crate::nav::{Cursor, ScreenOutcome};
use crate::toolkit::ListView;
use playdeck_core::models::RomId;
use playdeck_core::names::{console_label, format_hours};
use playdeck_core::{FilterCriterion, FilterStack};

/// Which titles a filter screen narrows
#[derive(Debug, Clone, PartialEq)]
pub enum FilterScope {
    All,
    Console(String),
    Game {
        console: String,
        name: String,
        ids: Vec<RomId>,
    },
}

/// Candidate criteria for narrowing the current view
#[derive(Debug, Clone, PartialEq)]
pub struct FilterScreen {
    pub scope: FilterScope,
    pub filters: FilterStack,
    /// Tier of the criterion this screen narrows, `None` at the root
    pub parent_tier: Option<u8>,
}

impl FilterScreen {
    pub fn new(scope: FilterScope, filters: FilterStack) -> Self {
        let parent_tier = filters.last_tier();
        Self {
            scope,
            filters,
            parent_tier,
        }
    }

    /// The next filter screen after choosing `criterion`.
    pub fn narrowed(&self, criterion: FilterCriterion) -> Self {
        let parent_tier = Some(criterion.tier);
        Self {
            scope: self.scope.clone(),
            filters: self.filters.with(criterion),
            parent_tier,
        }
    }

    /// The list for this scope with the chosen filters applied.
    pub fn saved(&self) -> PlayHistoryScreen {
        let filters = self.filters.clone();
        match &self.scope {
            FilterScope::All => PlayHistoryScreen::ConsoleList(ConsoleListScreen::new(filters)),
            FilterScope::Console(console) => {
                PlayHistoryScreen::GameList(GameListScreen::new(console.clone(), filters))
            }
            FilterScope::Game { console, name, ids } => PlayHistoryScreen::GameHistory(
                GameHistoryScreen::new(console.clone(), name.clone(), ids.clone(), filters),
            ),
        }
    }

    fn title(&self) -> String {
        let mut title = "Filter".to_string();
        if let Some(last) = self.filters.last() {
            title.push_str(": ");
            title.push_str(&last.display_name);
        }
        match &self.scope {
            FilterScope::All => {}
            FilterScope::Console(console) => {
                title.push(' ');
                title.push_str(&console_label(console));
            }
            FilterScope::Game { name, .. } => {
                title.push_str(&format!(" ({name})"));
            }
        }
        title
    }

    fn candidates(&self, ctx: &ScreenContext<'_>) -> Vec<RomId> {
        match &self.scope {
            FilterScope::All => ctx.app.cache.get().maps.ids(None),
            FilterScope::Console(console) => ctx.app.cache.get().maps.ids(Some(console)),
            FilterScope::Game { ids, .. } => ids.clone(),
        }
    }

    pub(super) fn draw(
        &self,
        ctx: &mut ScreenContext<'_>,
        prior: Cursor,
    ) -> anyhow::Result<ScreenOutcome<Selection>> {
        let criteria = ctx.app.engine.generate(
            &self.candidates(ctx),
            &self.filters.current_predicate(),
            self.parent_tier,
        );
        let items = criteria
            .iter()
            .map(|c| {
                format!(
                    "{} : {}",
                    c.display_name,
                    format_hours(c.matched_play_secs, 9999.0)
                )
            })
            .collect();

        let mut hints = vec![(Button::X, "Save Filter"), (Button::A, "Select")];
        if !self.filters.is_empty() {
            hints.insert(0, (Button::B, "Back"));
        }
        let view = ListView::new(self.title(), items, prior)
            .empty_message("Max Filter Depth\nX to save filter")
            .with_action()
            .hints(hints)
            .banner(ctx.app.banner());

        let response = ctx.toolkit.list(&view)?;
        Ok(list_outcome(response.choice, response.cursor, |index| {
            criteria.get(index).cloned().map(Selection::Criterion)
        }))
    }
}
