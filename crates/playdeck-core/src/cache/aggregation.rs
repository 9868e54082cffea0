//! Aggregation cache over the play log
//!
//! Holds one immutable [`Snapshot`] at a time behind an atomically swapped
//! reference. The first reader after an invalidation computes it; concurrent
//! readers wait on the same one-shot initializer instead of scanning again.
//! Filtered views are memoized per predicate and keyed by snapshot generation.

use crate::aggregate::build_play_maps;
use crate::error::{CoreError, DegradedState};
use crate::filters::Predicate;
use crate::library::RomLocator;
use crate::models::{PlayMaps, PlaySession, RomHome, RomId, RomRecord};
use crate::store::PlayLogStore;
use chrono::{DateTime, Utc};
use moka::sync::Cache;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Immutable result of one play-log scan
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Unfiltered play maps
    pub maps: Arc<PlayMaps>,
    /// Id → name/path mapping as of this scan
    pub roms: Vec<RomRecord>,
    pub homes: HashMap<RomId, RomHome>,
    /// Sessions of the titles included in `maps`
    pub sessions: Vec<PlaySession>,
    pub computed_at: DateTime<Utc>,
    pub generation: u64,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            maps: Arc::new(PlayMaps::default()),
            roms: Vec::new(),
            homes: HashMap::new(),
            sessions: Vec::new(),
            computed_at: Utc::now(),
            generation: 0,
        }
    }

    pub fn from_parts(
        roms: Vec<RomRecord>,
        homes: HashMap<RomId, RomHome>,
        sessions: Vec<PlaySession>,
    ) -> Self {
        let maps = build_play_maps(&roms, &homes, &sessions, &Predicate::All);
        Self {
            maps: Arc::new(maps),
            roms,
            homes,
            sessions,
            computed_at: Utc::now(),
            generation: 0,
        }
    }

    pub fn rom(&self, id: RomId) -> Option<&RomRecord> {
        self.roms.iter().find(|r| r.id == id)
    }
}

/// Process-wide memoized view of the play log
pub struct AggregationCache {
    store: Arc<dyn PlayLogStore>,
    locator: Option<RomLocator>,
    show_archives: bool,

    /// Swapped wholesale on invalidate; readers clone the Arc and init at most once
    current: RwLock<Arc<OnceCell<Arc<Snapshot>>>>,

    /// Last snapshot read successfully, served while the store is unreachable
    last_good: RwLock<Option<Arc<Snapshot>>>,

    /// Filtered play maps, keyed by `<generation>:<predicate sql>`
    views: Cache<String, Arc<PlayMaps>>,

    degraded_state: RwLock<DegradedState>,
    generation: AtomicU64,
    scans: AtomicU64,
}

impl AggregationCache {
    pub fn new(store: Arc<dyn PlayLogStore>) -> Self {
        Self {
            store,
            locator: None,
            show_archives: true,
            current: RwLock::new(Arc::new(OnceCell::new())),
            last_good: RwLock::new(None),
            views: Cache::builder().max_capacity(64).build(),
            degraded_state: RwLock::new(DegradedState::Healthy),
            generation: AtomicU64::new(0),
            scans: AtomicU64::new(0),
        }
    }

    /// Classify each title's ROM location; titles living only in an archive
    /// are dropped unless `show_archives`.
    pub fn with_locator(mut self, locator: RomLocator, show_archives: bool) -> Self {
        self.locator = Some(locator);
        self.show_archives = show_archives;
        self
    }

    pub fn store(&self) -> &Arc<dyn PlayLogStore> {
        &self.store
    }

    /// Current snapshot, computing it on first access.
    pub fn get(&self) -> Arc<Snapshot> {
        let cell = self.current.read().clone();
        cell.get_or_init(|| self.compute()).clone()
    }

    /// Drop the current snapshot and compute a fresh one.
    pub fn refresh(&self) -> Arc<Snapshot> {
        self.invalidate();
        self.get()
    }

    /// Drop the current snapshot and every memoized view. The next `get` rescans.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.current.write() = Arc::new(OnceCell::new());
        self.views.invalidate_all();
        debug!("Aggregation cache invalidated");
    }

    /// Play maps restricted to sessions matching `predicate`.
    pub fn view(&self, predicate: &Predicate) -> Arc<PlayMaps> {
        let snapshot = self.get();
        if predicate.is_match_all() {
            return snapshot.maps.clone();
        }

        let key = format!("{}:{}", snapshot.generation, predicate.to_sql());
        self.views.get_with(key, || {
            Arc::new(build_play_maps(
                &snapshot.roms,
                &snapshot.homes,
                &snapshot.sessions,
                predicate,
            ))
        })
    }

    pub fn degraded_state(&self) -> DegradedState {
        self.degraded_state.read().clone()
    }

    /// Number of play-log scans performed so far.
    pub fn scan_count(&self) -> u64 {
        self.scans.load(Ordering::SeqCst)
    }

    fn compute(&self) -> Arc<Snapshot> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        let generation = self.generation.load(Ordering::SeqCst);

        match self.scan() {
            Ok(mut snapshot) => {
                snapshot.generation = generation;
                let snapshot = Arc::new(snapshot);
                *self.last_good.write() = Some(snapshot.clone());
                *self.degraded_state.write() = DegradedState::Healthy;
                info!(
                    games = snapshot.maps.games.values().map(Vec::len).sum::<usize>(),
                    consoles = snapshot.maps.console_totals.len(),
                    grand_total = snapshot.maps.grand_total,
                    "Play maps computed"
                );
                snapshot
            }
            Err(e) => {
                let reason = e.to_string();
                let previous = self.last_good.read().clone();
                match previous {
                    Some(previous) => {
                        warn!(error = %e, "Play log unavailable, serving previous snapshot");
                        *self.degraded_state.write() = DegradedState::Stale { reason };
                        previous
                    }
                    None => {
                        warn!(error = %e, "Play log unavailable, serving empty snapshot");
                        *self.degraded_state.write() = DegradedState::Empty { reason };
                        let mut empty = Snapshot::empty();
                        empty.generation = generation;
                        Arc::new(empty)
                    }
                }
            }
        }
    }

    fn scan(&self) -> Result<Snapshot, CoreError> {
        let mut roms = self.store.list_roms()?;

        let mut homes = HashMap::new();
        if let Some(locator) = &self.locator {
            for rom in &roms {
                homes.insert(rom.id, locator.locate(&rom.file_path));
            }
            if !self.show_archives {
                roms.retain(|rom| !homes.get(&rom.id).is_some_and(RomHome::is_archived));
            }
        }

        let ids: Vec<RomId> = roms.iter().map(|r| r.id).collect();
        let included: HashSet<RomId> = ids.iter().copied().collect();
        let mut sessions = self.store.list_sessions(&ids)?;
        sessions.retain(|s| included.contains(&s.rom_id));

        debug!(
            roms = roms.len(),
            sessions = sessions.len(),
            "Play log scanned"
        );
        Ok(Snapshot::from_parts(roms, homes, sessions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    /// Scriptable store: fixed rows, optional failure, optional delay
    #[derive(Default)]
    struct FakeLog {
        roms: Vec<RomRecord>,
        sessions: Vec<PlaySession>,
        failing: Mutex<bool>,
        delay: Option<Duration>,
    }

    impl PlayLogStore for FakeLog {
        fn find_id(&self, path: &str) -> Result<Option<RomId>, CoreError> {
            Ok(self.roms.iter().find(|r| r.file_path == path).map(|r| r.id))
        }

        fn list_roms(&self) -> Result<Vec<RomRecord>, CoreError> {
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            if *self.failing.lock() {
                return Err(CoreError::StoreQuery {
                    operation: "list roms",
                    source: rusqlite::Error::InvalidQuery,
                });
            }
            Ok(self.roms.clone())
        }

        fn list_sessions_matching(
            &self,
            ids: &[RomId],
            predicate: &Predicate,
        ) -> Result<Vec<PlaySession>, CoreError> {
            Ok(self
                .sessions
                .iter()
                .filter(|s| ids.contains(&s.rom_id) && predicate.matches(s))
                .copied()
                .collect())
        }

        fn update_path(&self, id: RomId, _: &str, _: &str) -> Result<(), CoreError> {
            Err(CoreError::IdNotFound { id })
        }

        fn delete_titles(&self, ids: &[RomId]) -> Result<(), CoreError> {
            Err(CoreError::IdNotFound {
                id: ids.first().copied().unwrap_or_default(),
            })
        }
    }

    fn fake_log() -> FakeLog {
        FakeLog {
            roms: vec![
                RomRecord {
                    id: 1,
                    name: "Foo".into(),
                    file_path: "Game Boy (GB)/Foo.gb".into(),
                },
                RomRecord {
                    id: 2,
                    name: "Bar".into(),
                    file_path: "Sega Genesis (MD)/Bar.md".into(),
                },
            ],
            sessions: vec![
                PlaySession {
                    rom_id: 1,
                    start_time: 1_000,
                    duration: 3_600,
                    update_time: 4_600,
                },
                PlaySession {
                    rom_id: 1,
                    start_time: 9_000,
                    duration: 1_800,
                    update_time: 10_800,
                },
                PlaySession {
                    rom_id: 2,
                    start_time: 5_000,
                    duration: 5_400,
                    update_time: 10_400,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_get_is_memoized() {
        let cache = AggregationCache::new(Arc::new(fake_log()));

        let first = cache.get();
        let second = cache.get();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.scan_count(), 1);
        assert_eq!(first.maps.grand_total, 10_800);
        assert!(cache.degraded_state().is_healthy());
    }

    #[test]
    fn test_concurrent_first_access_scans_once() {
        let log = FakeLog {
            delay: Some(Duration::from_millis(50)),
            ..fake_log()
        };
        let cache = AggregationCache::new(Arc::new(log));
        let barrier = Barrier::new(8);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    barrier.wait();
                    assert_eq!(cache.get().maps.grand_total, 10_800);
                });
            }
        });

        assert_eq!(cache.scan_count(), 1);
    }

    #[test]
    fn test_invalidate_rescans() {
        let cache = AggregationCache::new(Arc::new(fake_log()));
        let before = cache.get();

        cache.invalidate();
        let after = cache.get();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(cache.scan_count(), 2);
        assert_eq!(before.maps, after.maps);
    }

    #[test]
    fn test_unavailable_store_serves_previous_snapshot() {
        let log = Arc::new(fake_log());
        let cache = AggregationCache::new(log.clone());
        let good = cache.get();

        *log.failing.lock() = true;
        let stale = cache.refresh();

        assert!(Arc::ptr_eq(&good, &stale));
        assert!(matches!(
            cache.degraded_state(),
            DegradedState::Stale { .. }
        ));

        *log.failing.lock() = false;
        cache.refresh();
        assert!(cache.degraded_state().is_healthy());
    }

    #[test]
    fn test_unavailable_store_without_history_serves_empty() {
        let log = fake_log();
        *log.failing.lock() = true;
        let cache = AggregationCache::new(Arc::new(log));

        let snapshot = cache.get();

        assert!(snapshot.maps.is_empty());
        assert_eq!(snapshot.maps.grand_total, 0);
        assert!(matches!(
            cache.degraded_state(),
            DegradedState::Empty { .. }
        ));
    }

    #[test]
    fn test_view_filters_and_memoizes() {
        let cache = AggregationCache::new(Arc::new(fake_log()));
        let long = Predicate::DurationAtLeast(3_600);

        let first = cache.view(&long);
        let second = cache.view(&long);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.grand_total, 9_000);
        assert_eq!(first.console_total("Game Boy (GB)"), 3_600);
        assert!(Arc::ptr_eq(&cache.view(&Predicate::All), &cache.get().maps));
    }
}
