//! Play-log records and the aggregates derived from them

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Row id of a title in the play log's `rom` table
pub type RomId = i64;

/// One recorded play interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySession {
    pub rom_id: RomId,
    /// Epoch seconds
    pub start_time: i64,
    /// Seconds played
    pub duration: i64,
    /// Epoch seconds of the last write to this row
    pub update_time: i64,
}

/// Current id → name/path mapping entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomRecord {
    pub id: RomId,
    pub name: String,
    /// Path relative to the ROM root, e.g. `Game Boy Advance (GBA)/Metroid.gba`
    pub file_path: String,
}

impl RomRecord {
    /// Console folder: the first component of the relative path.
    pub fn console(&self) -> &str {
        console_of(&self.file_path)
    }
}

/// First path component of a ROM-root-relative path.
pub fn console_of(file_path: &str) -> &str {
    let trimmed = file_path.trim_start_matches('/');
    match trimmed.split_once('/') {
        Some((console, _)) => console,
        None => "",
    }
}

/// Where a title's ROM file currently lives
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RomHome {
    /// Not checked (no ROM tree configured)
    #[default]
    Unknown,
    /// ROM is at the path recorded in the play log
    Present,
    /// ROM lives under the named archive folder
    Archived(String),
    /// No ROM anywhere: orphaned history
    Missing,
}

impl RomHome {
    /// Tag shown in front of game names
    pub fn tag(&self) -> String {
        match self {
            RomHome::Unknown => String::new(),
            RomHome::Present => "(+) ".to_string(),
            RomHome::Missing => "(-) ".to_string(),
            RomHome::Archived(archive) => match archive.chars().next() {
                Some(c) => format!("({}) ", c.to_ascii_uppercase()),
                None => "(A) ".to_string(),
            },
        }
    }

    pub fn is_archived(&self) -> bool {
        matches!(self, RomHome::Archived(_))
    }
}

/// Per-title play totals, keyed by (console, display name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAggregate {
    /// Every log id that resolves to this title (sorted, unique)
    pub ids: Vec<RomId>,
    pub name: String,
    pub console: String,
    /// Path of the id played most recently
    pub path: String,
    pub total_play_secs: i64,
    pub play_count: u32,
    pub first_played: i64,
    pub last_played: i64,
    #[serde(default)]
    pub home: RomHome,
}

impl GameAggregate {
    /// Mean session length; `None` when there are no sessions.
    pub fn average_session_secs(&self) -> Option<i64> {
        if self.play_count == 0 {
            return None;
        }
        Some(self.total_play_secs / i64::from(self.play_count))
    }

    /// Share of `total` in percent; `None` when `total` is zero.
    pub fn percent_of(&self, total: i64) -> Option<f64> {
        if total <= 0 {
            return None;
        }
        Some(self.total_play_secs as f64 / total as f64 * 100.0)
    }

    pub fn first_played_at(&self) -> DateTime<Local> {
        to_local(self.first_played)
    }

    pub fn last_played_at(&self) -> DateTime<Local> {
        to_local(self.last_played)
    }
}

/// Epoch seconds to local time, clamping out-of-range values to the epoch.
pub fn to_local(epoch_secs: i64) -> DateTime<Local> {
    Utc.timestamp_opt(epoch_secs, 0)
        .single()
        .unwrap_or_default()
        .with_timezone(&Local)
}

/// Aggregated view: games per console, console totals, grand total
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayMaps {
    /// console → games, most played first
    pub games: BTreeMap<String, Vec<GameAggregate>>,
    pub console_totals: BTreeMap<String, i64>,
    pub grand_total: i64,
}

impl PlayMaps {
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Consoles ordered by play time, descending (stable on ties).
    pub fn consoles_by_play_time(&self) -> Vec<(&str, i64)> {
        let mut consoles: Vec<(&str, i64)> = self
            .console_totals
            .iter()
            .map(|(console, secs)| (console.as_str(), *secs))
            .collect();
        consoles.sort_by(|a, b| b.1.cmp(&a.1));
        consoles
    }

    pub fn games_for(&self, console: &str) -> &[GameAggregate] {
        self.games.get(console).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn console_total(&self, console: &str) -> i64 {
        self.console_totals.get(console).copied().unwrap_or(0)
    }

    pub fn find_game(&self, console: &str, name: &str) -> Option<&GameAggregate> {
        self.games_for(console).iter().find(|g| g.name == name)
    }

    /// Every id under one console, or under all consoles when `console` is `None`.
    pub fn ids(&self, console: Option<&str>) -> Vec<RomId> {
        let mut ids: Vec<RomId> = match console {
            Some(console) => self
                .games_for(console)
                .iter()
                .flat_map(|g| g.ids.iter().copied())
                .collect(),
            None => self
                .games
                .values()
                .flatten()
                .flat_map(|g| g.ids.iter().copied())
                .collect(),
        };
        ids.sort_unstable();
        ids
    }
}
