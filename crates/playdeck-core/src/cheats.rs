//! Remote cheat index, prefetched in the background
//!
//! The index host serves Apache-style directory listings, one folder per console
//! (`<host>/<Console Name>/`), each holding `.cht` files named after the ROM.
//! A detached task walks the consoles once and fills a concurrent map; screens
//! only ever read from that map and never wait on the network.

use crate::error::CoreError;
use crate::names::{clean_name, strip_tags};
use dashmap::DashMap;
use parking_lot::RwLock;
use regex::Regex;
use reqwest::{Client, Url};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

fn href_regex() -> &'static Regex {
    static HREF_RE: OnceLock<Regex> = OnceLock::new();
    HREF_RE.get_or_init(|| Regex::new(r#"(?i)href="([^"?/]+\.cht)""#).unwrap())
}

/// Progress of the background fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexState {
    Pending,
    Ready,
    Unavailable(String),
}

/// Answer for one game, as shown on the details screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheatAvailability {
    /// Index still loading
    Pending,
    Available,
    NotFound,
    /// Index could not be fetched
    Unavailable,
}

impl CheatAvailability {
    pub fn label(&self) -> &'static str {
        match self {
            CheatAvailability::Pending => "Checking...",
            CheatAvailability::Available => "Available",
            CheatAvailability::NotFound => "None",
            CheatAvailability::Unavailable => "Unavailable",
        }
    }
}

/// Console folder → cleaned names of the games with a cheat file
pub struct CheatIndex {
    entries: DashMap<String, HashSet<String>>,
    state: RwLock<IndexState>,
}

impl Default for CheatIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl CheatIndex {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            state: RwLock::new(IndexState::Pending),
        }
    }

    /// Index that will never be filled (prefetch disabled).
    pub fn disabled() -> Self {
        let index = Self::new();
        index.set_state(IndexState::Unavailable("prefetch disabled".to_string()));
        index
    }

    pub fn state(&self) -> IndexState {
        self.state.read().clone()
    }

    fn set_state(&self, state: IndexState) {
        *self.state.write() = state;
    }

    /// Record the `.cht` entries of one console's listing. Returns how many were added.
    pub fn ingest_listing(&self, console: &str, html: &str) -> usize {
        let names: HashSet<String> = href_regex()
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| clean_name(&percent_decode(m.as_str())))
            .collect();

        let count = names.len();
        if count > 0 {
            self.entries
                .entry(console.to_string())
                .or_default()
                .extend(names);
        }
        count
    }

    /// Never blocks: answers from whatever has been fetched so far.
    pub fn availability(&self, console: &str, game_name: &str) -> CheatAvailability {
        if let Some(names) = self.entries.get(console) {
            if names.contains(&strip_tags(game_name)) {
                return CheatAvailability::Available;
            }
        }
        match &*self.state.read() {
            IndexState::Pending => CheatAvailability::Pending,
            IndexState::Ready => CheatAvailability::NotFound,
            IndexState::Unavailable(_) => CheatAvailability::Unavailable,
        }
    }

    /// Fetch listings for `consoles` on a detached task.
    pub fn spawn_prefetch(self: &Arc<Self>, base_url: String, consoles: Vec<String>) -> JoinHandle<()> {
        let index = Arc::clone(self);
        tokio::spawn(async move {
            index.prefetch(&base_url, &consoles).await;
        })
    }

    /// Fetch every console listing, then settle the state.
    ///
    /// Ready if at least one listing came back (or there was nothing to fetch),
    /// Unavailable otherwise.
    pub async fn prefetch(&self, base_url: &str, consoles: &[String]) {
        let client = match Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("playdeck/", env!("CARGO_PKG_VERSION")))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Cheat index client unavailable");
                self.set_state(IndexState::Unavailable(e.to_string()));
                return;
            }
        };

        let mut fetched = 0usize;
        let mut last_error = None;
        for console in consoles {
            match fetch_listing(&client, base_url, console).await {
                Ok(html) => {
                    let count = self.ingest_listing(console, &html);
                    debug!(console = %console, count, "Cheat listing fetched");
                    fetched += 1;
                }
                Err(e) => {
                    debug!(console = %console, error = %e, "Cheat listing unavailable");
                    last_error = Some(e.to_string());
                }
            }
        }

        match last_error {
            Some(reason) if fetched == 0 => {
                warn!(reason = %reason, "Cheat index unavailable");
                self.set_state(IndexState::Unavailable(reason));
            }
            _ => {
                info!(consoles = fetched, "Cheat index ready");
                self.set_state(IndexState::Ready);
            }
        }
    }
}

fn listing_url(base_url: &str, console: &str) -> Option<Url> {
    let mut url = Url::parse(base_url).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(&strip_tags(console))
        .push("");
    Some(url)
}

async fn fetch_listing(client: &Client, base_url: &str, console: &str) -> Result<String, CoreError> {
    let Some(url) = listing_url(base_url, console) else {
        return Err(CoreError::CheatIndexUrl {
            url: base_url.to_string(),
        });
    };
    let fetch_err = |source| CoreError::CheatIndexFetch {
        url: url.to_string(),
        source,
    };

    client
        .get(url.clone())
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(fetch_err)?
        .text()
        .await
        .map_err(fetch_err)
}

/// Decode `%XX` escapes in an href; invalid UTF-8 is replaced.
fn percent_decode(input: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(input.as_bytes())).into_owned()
}
