//! Integration tests: play log → aggregation cache → filter engine

mod support;

use playdeck_core::filters::engine::generate_for;
use playdeck_core::names::format_percent;
use playdeck_core::{
    DegradedState, FilterClock, FilterEngine, FilterStack, Library, PlayLogStore, Predicate,
};
use support::Fixture;

const T0: i64 = 1_710_583_200; // 2024-03-16 10:00 UTC
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

fn clock() -> FilterClock {
    FilterClock::fixed(T0 + 10 * DAY, 0)
}

/// Three consoles, five titles, a title logged under two paths
fn library_fixture() -> Fixture {
    let fx = Fixture::new();
    fx.add_rom(1, "Tetris", "Game Boy (GB)/Tetris.gb")
        .add_rom(2, "Tetris", "Game Boy (GB)/Tetris (World).gb")
        .add_rom(3, "Kirby", "Game Boy (GB)/Kirby.gb")
        .add_rom(4, "Metroid Fusion", "Game Boy Advance (GBA)/Metroid Fusion.gba")
        .add_rom(5, "Sonic", "Sega Genesis (MD)/Sonic.md")
        .add_rom(6, "Unplayed", "Sega Genesis (MD)/Unplayed.md");
    fx.add_session(1, T0, HOUR)
        .add_session(2, T0 + DAY, 2 * HOUR)
        .add_session(3, T0 + 2 * DAY, 600)
        .add_session(4, T0 - 200 * DAY, 3 * HOUR)
        .add_session(4, T0 + 3 * DAY + 9 * HOUR, 1_200)
        .add_session(5, T0 + 4 * DAY, 300);
    fx
}

#[test]
fn test_single_title_scenario() {
    let fx = Fixture::new();
    fx.add_rom(1, "Foo", "Game Boy (GB)/Foo.gb")
        .add_rom(2, "Bar", "Game Boy (GB)/Bar.gb")
        .add_session(1, T0, 3_600)
        .add_session(1, T0 + HOUR * 5, 1_800)
        .add_session(2, T0 + DAY, 5_400);

    let snapshot = fx.cache().get();
    let foo = snapshot.maps.find_game("Game Boy (GB)", "Foo").unwrap();

    assert_eq!(foo.ids, vec![1]);
    assert_eq!(foo.total_play_secs, 5_400);
    assert_eq!(foo.play_count, 2);
    assert_eq!(foo.first_played, T0);
    assert_eq!(foo.last_played, T0 + HOUR * 5);
    assert_eq!(snapshot.maps.grand_total, 10_800);
    assert_eq!(
        format_percent(foo.percent_of(snapshot.maps.grand_total)),
        "50.00%"
    );
}

#[test]
fn test_totals_are_consistent() {
    let fx = library_fixture();
    let store = fx.store();
    let snapshot = fx.cache().get();
    let maps = &snapshot.maps;

    for (console, games) in &maps.games {
        for game in games {
            let sessions = store.list_sessions(&game.ids).unwrap();
            assert_eq!(
                game.total_play_secs,
                sessions.iter().map(|s| s.duration).sum::<i64>()
            );
            assert_eq!(game.play_count as usize, sessions.len());
        }
        assert_eq!(
            maps.console_total(console),
            games.iter().map(|g| g.total_play_secs).sum::<i64>()
        );
    }
    assert_eq!(maps.grand_total, maps.console_totals.values().sum::<i64>());

    let tetris = maps.find_game("Game Boy (GB)", "Tetris").unwrap();
    assert_eq!(tetris.ids, vec![1, 2]);
    assert_eq!(tetris.path, "Game Boy (GB)/Tetris (World).gb");
    assert!(maps.find_game("Sega Genesis (MD)", "Unplayed").is_none());
}

#[test]
fn test_terminal_tier_generates_nothing() {
    let fx = library_fixture();
    let cache = fx.cache();
    let engine = FilterEngine::new(cache.clone()).with_clock(clock());
    let all_ids = cache.get().maps.ids(None);

    for candidates in [vec![], vec![1], all_ids.clone(), vec![99]] {
        assert!(engine
            .generate(&candidates, &Predicate::All, Some(1))
            .is_empty());
    }
    assert!(!engine.generate(&all_ids, &Predicate::All, None).is_empty());
}

#[test]
fn test_zero_play_console_generates_nothing() {
    let fx = library_fixture();
    fx.add_rom(7, "Pong", "Atari 2600 (A26)/Pong.a26");
    let cache = fx.cache();
    let engine = FilterEngine::new(cache.clone()).with_clock(clock());

    let ids = cache.get().maps.ids(Some("Atari 2600 (A26)"));
    assert!(engine.generate(&ids, &Predicate::All, None).is_empty());
    // Unplayed title id directly
    assert!(engine.generate(&[6], &Predicate::All, None).is_empty());
}

#[test]
fn test_push_pop_restores_view() {
    let fx = library_fixture();
    let cache = fx.cache();
    let snapshot = cache.get();
    let ids = snapshot.maps.ids(None);

    let mut stack = FilterStack::new();
    let year = generate_for(&snapshot, clock(), &ids, &stack.current_predicate(), None)
        .into_iter()
        .find(|c| c.display_name == "2024")
        .unwrap();
    stack.push(year.clone());

    let predicate_before = stack.current_predicate();
    let view_before = cache.view(&predicate_before);

    let child = generate_for(
        &snapshot,
        clock(),
        &ids,
        &predicate_before,
        stack.last_tier(),
    )
    .into_iter()
    .find(|c| c.display_name == "Long Sessions (1H+)")
    .unwrap();
    stack.push(child);
    let narrowed = cache.view(&stack.current_predicate());
    assert!(narrowed.grand_total < view_before.grand_total);

    stack.pop();
    assert_eq!(stack.current_predicate(), predicate_before);
    assert_eq!(*cache.view(&stack.current_predicate()), *view_before);
    assert_eq!(view_before.grand_total, year.matched_play_secs);
}

#[test]
fn test_sql_and_memory_filtering_agree() {
    let fx = library_fixture();
    let store = fx.store();
    let snapshot = fx.cache().get();
    let ids = snapshot.maps.ids(None);

    let predicates = [
        Predicate::DurationAtLeast(HOUR),
        Predicate::Weekend {
            weekend: true,
            utc_offset: 0,
        },
        Predicate::HourOfDay {
            from: 17,
            until: 22,
            utc_offset: 0,
        },
        Predicate::MonthOfYear {
            month: 3,
            utc_offset: 3_600,
        },
        Predicate::StartedSince(T0).and(Predicate::DurationBelow(HOUR)),
    ];

    for predicate in predicates {
        let mut from_sql: Vec<_> = store.list_sessions_matching(&ids, &predicate).unwrap();
        let mut in_memory: Vec<_> = snapshot
            .sessions
            .iter()
            .filter(|s| predicate.matches(s))
            .copied()
            .collect();
        from_sql.sort_by_key(|s| (s.start_time, s.rom_id));
        in_memory.sort_by_key(|s| (s.start_time, s.rom_id));
        assert_eq!(from_sql, in_memory, "predicate {predicate:?}");
    }
}

#[test]
fn test_unavailable_log_degrades() {
    let fx = library_fixture();
    let cache = fx.cache();
    let total = cache.get().maps.grand_total;

    std::fs::remove_file(&fx.db).unwrap();
    let snapshot = cache.refresh();

    assert_eq!(snapshot.maps.grand_total, total);
    assert!(matches!(
        cache.degraded_state(),
        DegradedState::Stale { .. }
    ));
}

#[test]
fn test_missing_log_serves_empty() {
    let fx = Fixture::new();
    std::fs::remove_file(&fx.db).unwrap();

    let cache = fx.cache();
    assert!(cache.get().maps.is_empty());
    assert!(matches!(
        cache.degraded_state(),
        DegradedState::Empty { .. }
    ));
}

#[test]
fn test_archived_titles_follow_setting() {
    let fx = library_fixture();
    fx.place_rom("Game Boy (GB)/Tetris (World).gb")
        .place_rom("Game Boy (GB)/Kirby.gb")
        .place_archived("Backlog", "Game Boy Advance (GBA)/Metroid Fusion.gba");

    let hidden = fx.cache_with_archives(false).get();
    assert!(hidden
        .maps
        .find_game("Game Boy Advance (GBA)", "Metroid Fusion")
        .is_none());
    assert!(!hidden.maps.console_totals.contains_key("Game Boy Advance (GBA)"));

    let shown = fx.cache_with_archives(true).get();
    let metroid = shown
        .maps
        .find_game("Game Boy Advance (GBA)", "Metroid Fusion")
        .unwrap();
    assert_eq!(metroid.home.tag(), "(B) ");
    let sonic = shown.maps.find_game("Sega Genesis (MD)", "Sonic").unwrap();
    assert_eq!(sonic.home.tag(), "(-) ");
    let tetris = shown.maps.find_game("Game Boy (GB)", "Tetris").unwrap();
    assert_eq!(tetris.home.tag(), "(+) ");
}

#[test]
fn test_rename_and_clear_refresh_aggregates() {
    let fx = library_fixture();
    fx.place_rom("Game Boy (GB)/Kirby.gb");
    let cache = fx.cache();
    let library = Library::new(fx.store(), fx.locator()).with_cache(cache.clone());
    let before = cache.get().maps.grand_total;

    let new_path = library
        .rename_title("Game Boy (GB)/Kirby.gb", "Kirby's Dream Land")
        .unwrap();
    assert_eq!(new_path, "Game Boy (GB)/Kirby's Dream Land.gb");

    let maps = cache.get().maps.clone();
    assert!(maps.find_game("Game Boy (GB)", "Kirby").is_none());
    let kirby = maps
        .find_game("Game Boy (GB)", "Kirby's Dream Land")
        .unwrap();
    assert_eq!(kirby.total_play_secs, 600);
    assert_eq!(maps.grand_total, before);

    let sessions_before = fx.session_count();
    library.clear_history(&new_path).unwrap();
    assert_eq!(fx.session_count(), sessions_before - 1);
    let maps = cache.get().maps.clone();
    assert!(maps.find_game("Game Boy (GB)", "Kirby's Dream Land").is_none());
    assert_eq!(maps.grand_total, before - 600);
}

#[test]
fn test_clear_title_failure_leaves_every_id() {
    let fx = library_fixture();
    fx.block_deletes_of(2);
    let cache = fx.cache();
    let library = Library::new(fx.store(), fx.locator()).with_cache(cache.clone());
    let tetris = cache
        .get()
        .maps
        .find_game("Game Boy (GB)", "Tetris")
        .unwrap()
        .clone();
    assert_eq!(tetris.ids, vec![1, 2]);
    let sessions_before = fx.session_count();

    assert!(library.clear_ids(&tetris.ids).is_err());

    assert_eq!(fx.session_count(), sessions_before);
    assert_eq!(fx.store().list_sessions(&[1]).unwrap().len(), 1);
    assert_eq!(fx.store().list_sessions(&[2]).unwrap().len(), 1);
    let after = cache.refresh();
    let kept = after.maps.find_game("Game Boy (GB)", "Tetris").unwrap();
    assert_eq!(kept.total_play_secs, 3 * HOUR);
}
