use super::{ScreenContext, Selection};
use crate::nav::{Cursor, ScreenOutcome};
use crate::toolkit::MESSAGE_DURATION;
use playdeck_core::models::RomId;
use tracing::warn;

/// Confirm, then delete every session of a game
#[derive(Debug, Clone, PartialEq)]
pub struct ClearHistoryScreen {
    pub name: String,
    pub ids: Vec<RomId>,
}

impl ClearHistoryScreen {
    pub fn new(name: impl Into<String>, ids: Vec<RomId>) -> Self {
        Self {
            name: name.into(),
            ids,
        }
    }

    pub(super) fn draw(
        &self,
        ctx: &mut ScreenContext<'_>,
        prior: Cursor,
    ) -> anyhow::Result<ScreenOutcome<Selection>> {
        if self.ids.is_empty() {
            return Ok(ScreenOutcome::no_data(
                Some("No play history for this game".to_string()),
                prior,
            ));
        }

        let message = format!("Delete all play history for {}?", self.name);
        if !ctx.toolkit.confirm("Clear History", &message)? {
            return Ok(ScreenOutcome::back(prior));
        }

        match ctx.app.library.clear_ids(&self.ids) {
            Ok(()) => Ok(ScreenOutcome::no_data(
                Some("Play history cleared".to_string()),
                prior,
            )),
            Err(e) => {
                warn!(game = %self.name, error = %e, "Clear history failed");
                ctx.toolkit.show_message(e.user_message(), MESSAGE_DURATION);
                Ok(ScreenOutcome::back(prior))
            }
        }
    }
}
