use super::{filter_prefix, format_timestamp, list_outcome, ScreenContext, Selection};
use crate::keybindings::Button;
use crate::nav::{Cursor, ScreenOutcome};
use crate::toolkit::ListView;
use playdeck_core::models::{PlaySession, RomId};
use playdeck_core::names::format_duration;
use playdeck_core::{FilterStack, Predicate};
use std::collections::HashSet;
use tracing::warn;

/// Individual sessions of one game under the current filters
#[derive(Debug, Clone, PartialEq)]
pub struct GameHistoryScreen {
    pub console: String,
    pub name: String,
    pub ids: Vec<RomId>,
    pub filters: FilterStack,
}

impl GameHistoryScreen {
    pub fn new(
        console: impl Into<String>,
        name: impl Into<String>,
        ids: Vec<RomId>,
        filters: FilterStack,
    ) -> Self {
        Self {
            console: console.into(),
            name: name.into(),
            ids,
            filters,
        }
    }

    /// Sessions straight from the play log, or from the cached snapshot if
    /// the log cannot be read.
    fn sessions(&self, ctx: &ScreenContext<'_>, predicate: &Predicate) -> Vec<PlaySession> {
        match ctx
            .app
            .cache
            .store()
            .list_sessions_matching(&self.ids, predicate)
        {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(error = %e, game = %self.name, "Reading history from cache");
                let ids: HashSet<RomId> = self.ids.iter().copied().collect();
                let mut sessions: Vec<PlaySession> = ctx
                    .app
                    .cache
                    .get()
                    .sessions
                    .iter()
                    .filter(|s| ids.contains(&s.rom_id) && predicate.matches(s))
                    .copied()
                    .collect();
                sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
                sessions
            }
        }
    }

    pub(super) fn draw(
        &self,
        ctx: &mut ScreenContext<'_>,
        prior: Cursor,
    ) -> anyhow::Result<ScreenOutcome<Selection>> {
        let sessions = self.sessions(ctx, &self.filters.current_predicate());
        let items = sessions
            .iter()
            .map(|s| {
                format!(
                    "{} ~ {}",
                    format_timestamp(s.start_time),
                    format_duration(s.duration)
                )
            })
            .collect();

        let title = format!("{}{}", filter_prefix(&self.filters, ": "), self.name);
        let view = ListView::new(title, items, prior)
            .empty_message("No Play Records Found")
            .with_action()
            .hints(vec![(Button::B, "Back"), (Button::X, "Filter")])
            .banner(ctx.app.banner());

        let response = ctx.toolkit.list(&view)?;
        Ok(list_outcome(response.choice, response.cursor, |_| {
            Some(Selection::None)
        }))
    }
}
