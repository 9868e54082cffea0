//! Play-map computation: sessions grouped into per-game, per-console and grand totals
//!
//! Pure functions over already-loaded rows; the cache decides when to call them.

use crate::filters::Predicate;
use crate::models::{GameAggregate, PlayMaps, PlaySession, RomHome, RomId, RomRecord};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

#[derive(Default)]
struct GameAccumulator {
    ids: BTreeSet<RomId>,
    total_play_secs: i64,
    play_count: u32,
    first_played: Option<i64>,
    last_played: Option<i64>,
    /// Latest start per id, to pick the canonical path
    last_by_id: HashMap<RomId, i64>,
}

impl GameAccumulator {
    fn add(&mut self, session: &PlaySession) {
        self.ids.insert(session.rom_id);
        self.total_play_secs += session.duration;
        self.play_count += 1;
        self.first_played = Some(
            self.first_played
                .map_or(session.start_time, |t| t.min(session.start_time)),
        );
        self.last_played = Some(
            self.last_played
                .map_or(session.start_time, |t| t.max(session.start_time)),
        );
        let last = self.last_by_id.entry(session.rom_id).or_insert(session.start_time);
        *last = (*last).max(session.start_time);
    }

    /// Id played most recently; larger id wins a tie.
    fn canonical_id(&self) -> Option<RomId> {
        self.last_by_id
            .iter()
            .max_by_key(|(id, last)| (**last, **id))
            .map(|(id, _)| *id)
    }
}

/// Display name for a rom row, falling back to the file stem.
pub fn display_name(rom: &RomRecord) -> String {
    let name = rom.name.trim();
    if !name.is_empty() {
        return name.to_string();
    }
    Path::new(&rom.file_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Group `sessions` matching `predicate` by (console, current display name).
///
/// Sessions whose id has no rom row are skipped. Titles with no matching
/// session never appear.
pub fn build_play_maps(
    roms: &[RomRecord],
    homes: &HashMap<RomId, RomHome>,
    sessions: &[PlaySession],
    predicate: &Predicate,
) -> PlayMaps {
    let by_id: HashMap<RomId, &RomRecord> = roms.iter().map(|r| (r.id, r)).collect();

    let mut groups: BTreeMap<(String, String), GameAccumulator> = BTreeMap::new();
    for session in sessions.iter().filter(|s| predicate.matches(s)) {
        let Some(rom) = by_id.get(&session.rom_id) else {
            continue;
        };
        groups
            .entry((rom.console().to_string(), display_name(rom)))
            .or_default()
            .add(session);
    }

    let mut maps = PlayMaps::default();
    for ((console, name), acc) in groups {
        let canonical = acc.canonical_id();
        let path = canonical
            .and_then(|id| by_id.get(&id))
            .map(|rom| rom.file_path.clone())
            .unwrap_or_default();
        let home = canonical
            .and_then(|id| homes.get(&id))
            .cloned()
            .unwrap_or_default();

        let game = GameAggregate {
            ids: acc.ids.into_iter().collect(),
            name,
            console: console.clone(),
            path,
            total_play_secs: acc.total_play_secs,
            play_count: acc.play_count,
            first_played: acc.first_played.unwrap_or_default(),
            last_played: acc.last_played.unwrap_or_default(),
            home,
        };

        *maps.console_totals.entry(console.clone()).or_insert(0) += game.total_play_secs;
        maps.grand_total += game.total_play_secs;
        maps.games.entry(console).or_default().push(game);
    }

    for games in maps.games.values_mut() {
        games.sort_by(|a, b| {
            b.total_play_secs
                .cmp(&a.total_play_secs)
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    maps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom(id: RomId, name: &str, file_path: &str) -> RomRecord {
        RomRecord {
            id,
            name: name.into(),
            file_path: file_path.into(),
        }
    }

    fn session(rom_id: RomId, start_time: i64, duration: i64) -> PlaySession {
        PlaySession {
            rom_id,
            start_time,
            duration,
            update_time: start_time + duration,
        }
    }

    #[test]
    fn test_single_game_totals() {
        let roms = vec![rom(1, "Foo", "Game Boy (GB)/Foo.gb")];
        let sessions = vec![session(1, 100, 3600), session(1, 900, 1800)];

        let maps = build_play_maps(&roms, &HashMap::new(), &sessions, &Predicate::All);
        let foo = maps.find_game("Game Boy (GB)", "Foo").unwrap();

        assert_eq!(foo.ids, vec![1]);
        assert_eq!(foo.total_play_secs, 5400);
        assert_eq!(foo.play_count, 2);
        assert_eq!(foo.first_played, 100);
        assert_eq!(foo.last_played, 900);
        assert_eq!(maps.console_total("Game Boy (GB)"), 5400);
        assert_eq!(maps.grand_total, 5400);
    }

    #[test]
    fn test_ids_sharing_a_name_merge() {
        // Same title logged under an old and a new path
        let roms = vec![
            rom(1, "Foo", "Game Boy (GB)/Foo (USA).gb"),
            rom(4, "Foo", "Game Boy (GB)/Foo.gb"),
        ];
        let sessions = vec![session(1, 100, 60), session(4, 500, 120), session(1, 200, 30)];

        let maps = build_play_maps(&roms, &HashMap::new(), &sessions, &Predicate::All);
        let games = maps.games_for("Game Boy (GB)");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].ids, vec![1, 4]);
        assert_eq!(games[0].total_play_secs, 210);
        assert_eq!(games[0].play_count, 3);
        assert_eq!(games[0].path, "Game Boy (GB)/Foo.gb");
    }

    #[test]
    fn test_orphan_sessions_skipped_and_order() {
        let roms = vec![
            rom(1, "Alpha", "Game Boy (GB)/Alpha.gb"),
            rom(2, "Beta", "Game Boy (GB)/Beta.gb"),
            rom(3, "Gamma", "Sega Genesis (MD)/Gamma.md"),
        ];
        let sessions = vec![
            session(1, 10, 100),
            session(2, 10, 300),
            session(3, 10, 50),
            session(99, 10, 10_000),
        ];

        let maps = build_play_maps(&roms, &HashMap::new(), &sessions, &Predicate::All);
        let names: Vec<_> = maps
            .games_for("Game Boy (GB)")
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
        assert_eq!(maps.grand_total, 450);
        assert_eq!(
            maps.consoles_by_play_time(),
            vec![("Game Boy (GB)", 400), ("Sega Genesis (MD)", 50)]
        );
    }

    #[test]
    fn test_predicate_restricts_and_drops_empty_titles() {
        let roms = vec![
            rom(1, "Alpha", "Game Boy (GB)/Alpha.gb"),
            rom(2, "Beta", "Game Boy (GB)/Beta.gb"),
        ];
        let sessions = vec![session(1, 10, 5000), session(2, 10, 60)];

        let maps = build_play_maps(
            &roms,
            &HashMap::new(),
            &sessions,
            &Predicate::DurationAtLeast(3600),
        );
        assert_eq!(maps.games_for("Game Boy (GB)").len(), 1);
        assert!(maps.find_game("Game Boy (GB)", "Beta").is_none());
        assert_eq!(maps.grand_total, 5000);
    }

    #[test]
    fn test_display_name_falls_back_to_stem() {
        assert_eq!(display_name(&rom(1, "", "Game Boy (GB)/Tetris.gb")), "Tetris");
        assert_eq!(display_name(&rom(1, " Tetris ", "x/y.gb")), "Tetris");
    }
}
