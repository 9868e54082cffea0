//! Candidate filter generation
//!
//! The catalogue is fixed; what varies is which entries survive. Each entry is
//! scored by the play seconds it matches within the current scope (candidate ids
//! AND the parent predicate). Entries matching nothing are dropped and the rest are
//! ranked most-played first.

use super::predicate::Predicate;
use super::stack::{FilterCriterion, MAX_TIER};
use crate::cache::{AggregationCache, Snapshot};
use crate::models::{PlaySession, RomId};
use chrono::{Datelike, Local, Month, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

const DAY: i64 = 86_400;
const LONG_SESSION_SECS: i64 = 3_600;
const SHORT_SESSION_SECS: i64 = 900;

/// Reference time for recency and calendar criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterClock {
    /// Epoch seconds
    pub now: i64,
    /// Local offset from UTC, seconds
    pub utc_offset: i32,
}

impl FilterClock {
    /// Wall clock in the process's local zone.
    pub fn local() -> Self {
        let now = Local::now();
        Self {
            now: now.timestamp(),
            utc_offset: now.offset().local_minus_utc(),
        }
    }

    pub fn fixed(now: i64, utc_offset: i32) -> Self {
        Self { now, utc_offset }
    }

    fn local_year(&self, epoch_secs: i64) -> Option<i32> {
        Utc.timestamp_opt(epoch_secs + i64::from(self.utc_offset), 0)
            .single()
            .map(|t| t.year())
    }

    fn local_month(&self, epoch_secs: i64) -> Option<u32> {
        Utc.timestamp_opt(epoch_secs + i64::from(self.utc_offset), 0)
            .single()
            .map(|t| t.month())
    }

    /// Epoch seconds of local midnight on the given date.
    fn local_midnight(&self, year: i32, month: u32, day: u32) -> Option<i64> {
        let utc = NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(0, 0, 0)?
            .and_utc()
            .timestamp();
        Some(utc - i64::from(self.utc_offset))
    }
}

/// Builds ranked candidate criteria from the aggregation cache
pub struct FilterEngine {
    cache: Arc<AggregationCache>,
    clock: Option<FilterClock>,
}

impl FilterEngine {
    pub fn new(cache: Arc<AggregationCache>) -> Self {
        Self { cache, clock: None }
    }

    /// Pin the reference time instead of reading the wall clock per call.
    pub fn with_clock(mut self, clock: FilterClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Candidate criteria narrowing `parent` over the titles in `candidates`.
    ///
    /// `parent_tier` is the tier of the criterion currently applied, `None` at the
    /// root. Terminal tiers yield nothing.
    pub fn generate(
        &self,
        candidates: &[RomId],
        parent: &Predicate,
        parent_tier: Option<u8>,
    ) -> Vec<FilterCriterion> {
        if parent_tier.is_some_and(|tier| tier >= MAX_TIER) {
            return Vec::new();
        }
        let snapshot = self.cache.get();
        let clock = self.clock.unwrap_or_else(FilterClock::local);
        generate_for(&snapshot, clock, candidates, parent, parent_tier)
    }
}

/// [`FilterEngine::generate`] over an explicit snapshot.
pub fn generate_for(
    snapshot: &Snapshot,
    clock: FilterClock,
    candidates: &[RomId],
    parent: &Predicate,
    parent_tier: Option<u8>,
) -> Vec<FilterCriterion> {
    if parent_tier.is_some_and(|tier| tier >= MAX_TIER) {
        return Vec::new();
    }

    let candidate_set: HashSet<RomId> = candidates.iter().copied().collect();
    let scoped: Vec<&PlaySession> = snapshot
        .sessions
        .iter()
        .filter(|s| candidate_set.contains(&s.rom_id) && parent.matches(s))
        .collect();

    if scoped.iter().map(|s| s.duration).sum::<i64>() <= 0 {
        debug!(candidates = candidates.len(), "No play time in scope, no filters");
        return Vec::new();
    }

    let catalogue = match parent_tier {
        None => root_catalogue(snapshot, &scoped, clock),
        Some(_) => narrowing_catalogue(snapshot, &scoped, clock),
    };

    let mut ranked: Vec<FilterCriterion> = catalogue
        .into_iter()
        .filter_map(|mut criterion| {
            criterion.matched_play_secs = scoped
                .iter()
                .filter(|s| criterion.predicate.matches(s))
                .map(|s| s.duration)
                .sum();
            (criterion.matched_play_secs > 0).then_some(criterion)
        })
        .collect();

    // Stable: catalogue order breaks ties
    ranked.sort_by(|a, b| b.matched_play_secs.cmp(&a.matched_play_secs));

    debug!(
        parent_tier = ?parent_tier,
        count = ranked.len(),
        "Filters generated"
    );
    ranked
}

fn root_catalogue(
    snapshot: &Snapshot,
    scoped: &[&PlaySession],
    clock: FilterClock,
) -> Vec<FilterCriterion> {
    let mut catalogue = Vec::new();

    // Calendar period: one entry per year with play, newest first
    let years: BTreeSet<i32> = scoped
        .iter()
        .filter_map(|s| clock.local_year(s.start_time))
        .collect();
    for year in years.into_iter().rev() {
        let bounds = clock
            .local_midnight(year, 1, 1)
            .zip(clock.local_midnight(year + 1, 1, 1));
        if let Some((from, until)) = bounds {
            catalogue.push(FilterCriterion::new(
                year.to_string(),
                Predicate::StartedBetween { from, until },
                0,
            ));
        }
    }

    // Recency
    for days in [7, 30, 90] {
        catalogue.push(FilterCriterion::new(
            format!("Last {days} Days"),
            Predicate::StartedSince(clock.now - days * DAY),
            0,
        ));
    }

    catalogue.extend(most_played(snapshot, scoped, &[5, 10]));
    catalogue.extend(session_length());
    catalogue.extend(day_and_time(clock));
    catalogue
}

fn narrowing_catalogue(
    snapshot: &Snapshot,
    scoped: &[&PlaySession],
    clock: FilterClock,
) -> Vec<FilterCriterion> {
    let mut catalogue = Vec::new();

    let months: BTreeSet<u32> = scoped
        .iter()
        .filter_map(|s| clock.local_month(s.start_time))
        .collect();
    for month in months {
        let name = u8::try_from(month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| month.to_string());
        catalogue.push(FilterCriterion::new(
            name,
            Predicate::MonthOfYear {
                month,
                utc_offset: clock.utc_offset,
            },
            1,
        ));
    }

    catalogue.extend(day_and_time(clock));
    catalogue.extend(session_length());
    catalogue.extend(most_played(snapshot, scoped, &[5]));
    catalogue
}

/// "Top N" entries over games, only where N actually narrows the scope.
fn most_played(snapshot: &Snapshot, scoped: &[&PlaySession], sizes: &[usize]) -> Vec<FilterCriterion> {
    let mut ranked: Vec<(i64, &[RomId])> = snapshot
        .maps
        .games
        .values()
        .flatten()
        .filter_map(|game| {
            let secs: i64 = scoped
                .iter()
                .filter(|s| game.ids.contains(&s.rom_id))
                .map(|s| s.duration)
                .sum();
            (secs > 0).then_some((secs, game.ids.as_slice()))
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    sizes
        .iter()
        .filter(|&&n| ranked.len() > n)
        .map(|&n| {
            let mut ids: Vec<RomId> = ranked
                .iter()
                .take(n)
                .flat_map(|(_, ids)| ids.iter().copied())
                .collect();
            ids.sort_unstable();
            FilterCriterion::new(format!("Top {n} Most Played"), Predicate::RomIn(ids), 1)
        })
        .collect()
}

fn session_length() -> Vec<FilterCriterion> {
    vec![
        FilterCriterion::new(
            "Long Sessions (1H+)",
            Predicate::DurationAtLeast(LONG_SESSION_SECS),
            1,
        ),
        FilterCriterion::new(
            "Short Sessions (<15M)",
            Predicate::DurationBelow(SHORT_SESSION_SECS),
            1,
        ),
    ]
}

fn day_and_time(clock: FilterClock) -> Vec<FilterCriterion> {
    let utc_offset = clock.utc_offset;
    let mut catalogue = vec![
        FilterCriterion::new(
            "Weekends",
            Predicate::Weekend {
                weekend: true,
                utc_offset,
            },
            1,
        ),
        FilterCriterion::new(
            "Weekdays",
            Predicate::Weekend {
                weekend: false,
                utc_offset,
            },
            1,
        ),
    ];

    for (name, from, until) in [
        ("Mornings", 5, 12),
        ("Afternoons", 12, 17),
        ("Evenings", 17, 22),
        ("Nights", 22, 5),
    ] {
        catalogue.push(FilterCriterion::new(
            name,
            Predicate::HourOfDay {
                from,
                until,
                utc_offset,
            },
            1,
        ));
    }
    catalogue
}
