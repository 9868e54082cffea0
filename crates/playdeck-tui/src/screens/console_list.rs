use super::{filter_prefix, list_outcome, ScreenContext, Selection};
use crate::keybindings::Button;
use crate::nav::{Cursor, ScreenOutcome};
use crate::toolkit::ListView;
use playdeck_core::names::format_hours;
use playdeck_core::FilterStack;

/// Consoles ranked by play time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleListScreen {
    pub filters: FilterStack,
}

impl ConsoleListScreen {
    pub fn new(filters: FilterStack) -> Self {
        Self { filters }
    }

    pub(super) fn draw(
        &self,
        ctx: &mut ScreenContext<'_>,
        prior: Cursor,
    ) -> anyhow::Result<ScreenOutcome<Selection>> {
        let maps = ctx.app.cache.view(&self.filters.current_predicate());
        if maps.console_totals.is_empty() {
            return Ok(ScreenOutcome::no_data(
                Some("No Play Records Found".to_string()),
                prior,
            ));
        }

        let consoles: Vec<String> = maps
            .consoles_by_play_time()
            .into_iter()
            .map(|(console, _)| console.to_string())
            .collect();
        let items = consoles
            .iter()
            .map(|console| {
                let hours = format_hours(maps.console_total(console), 9999.0);
                format!("{hours} : {console}")
            })
            .collect();

        let title = format!(
            "{}{:.1} Total Hours Played",
            filter_prefix(&self.filters, " : "),
            maps.grand_total as f64 / 3600.0
        );
        let view = ListView::new(title, items, prior)
            .with_action()
            .hints(vec![
                (Button::B, "Back"),
                (Button::X, "Filter"),
                (Button::A, "Select"),
            ])
            .banner(ctx.app.banner());

        let response = ctx.toolkit.list(&view)?;
        Ok(list_outcome(response.choice, response.cursor, |index| {
            consoles.get(index).cloned().map(Selection::Console)
        }))
    }
}
