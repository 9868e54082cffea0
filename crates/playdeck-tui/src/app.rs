//! Shared application state handed to every screen

use playdeck_core::{
    AggregationCache, CheatIndex, CollectionIndex, DegradedState, FilterEngine, Library, Settings,
};
use std::sync::Arc;

/// Everything screens read from or mutate, owned once and passed down
pub struct AppState {
    pub settings: Arc<Settings>,
    pub cache: Arc<AggregationCache>,
    pub engine: FilterEngine,
    pub library: Library,
    pub collections: CollectionIndex,
    pub cheats: Arc<CheatIndex>,
}

impl AppState {
    pub fn new(
        settings: Arc<Settings>,
        cache: Arc<AggregationCache>,
        library: Library,
        collections: CollectionIndex,
        cheats: Arc<CheatIndex>,
    ) -> Self {
        Self {
            engine: FilterEngine::new(Arc::clone(&cache)),
            settings,
            cache,
            library,
            collections,
            cheats,
        }
    }

    /// Replace the filter engine, e.g. to pin its clock.
    pub fn with_engine(mut self, engine: FilterEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Collection tag for a game, empty when collections are hidden.
    pub fn collection_tag(&self, game_name: &str) -> String {
        if self.settings.play_history_show_collections {
            self.collections.tag(game_name)
        } else {
            String::new()
        }
    }

    /// Warning line while the play log cannot be read
    pub fn banner(&self) -> Option<String> {
        match self.cache.degraded_state() {
            DegradedState::Healthy => None,
            DegradedState::Stale { .. } => {
                Some("Play log unavailable, showing last loaded data".to_string())
            }
            DegradedState::Empty { .. } => Some("Play log unavailable".to_string()),
        }
    }
}
