//! Structured play-log predicates
//!
//! A predicate renders to a SQL `WHERE` fragment over `play_activity`
//! (`rom_id`, `play_time`, `created_at`) and evaluates in memory against a
//! [`PlaySession`]. Both paths must agree for every session.
//!
//! Calendar predicates carry a fixed UTC offset (seconds) instead of relying on
//! the process time zone, so SQLite and Rust compute the same local calendar.

use crate::models::{PlaySession, RomId};
use chrono::{Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const SECS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Matches every session
    #[default]
    All,
    /// `from <= start < until`
    StartedBetween { from: i64, until: i64 },
    /// `start >= from`
    StartedSince(i64),
    /// Local calendar month, 1-12
    MonthOfYear { month: u32, utc_offset: i32 },
    /// Local hour in `[from, until)`, wrapping past midnight when `from > until`
    HourOfDay { from: u32, until: u32, utc_offset: i32 },
    /// Saturday/Sunday (`weekend = true`) or Monday-Friday
    Weekend { weekend: bool, utc_offset: i32 },
    DurationAtLeast(i64),
    DurationBelow(i64),
    RomIn(Vec<RomId>),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn is_match_all(&self) -> bool {
        match self {
            Predicate::All => true,
            Predicate::And(parts) => parts.iter().all(Predicate::is_match_all),
            _ => false,
        }
    }

    /// Conjunction, flattening nested `And`s and dropping `All`.
    pub fn and(self, other: Predicate) -> Predicate {
        let mut parts = Vec::new();
        for p in [self, other] {
            match p {
                Predicate::All => {}
                Predicate::And(inner) => parts.extend(inner),
                p => parts.push(p),
            }
        }
        match parts.len() {
            0 => Predicate::All,
            1 => parts.remove(0),
            _ => Predicate::And(parts),
        }
    }

    pub fn matches(&self, session: &PlaySession) -> bool {
        let start = session.start_time;
        match self {
            Predicate::All => true,
            Predicate::StartedBetween { from, until } => start >= *from && start < *until,
            Predicate::StartedSince(from) => start >= *from,
            Predicate::MonthOfYear { month, utc_offset } => {
                local_month(start + i64::from(*utc_offset)) == Some(*month)
            }
            Predicate::HourOfDay {
                from,
                until,
                utc_offset,
            } => {
                let hour = local_hour(start + i64::from(*utc_offset));
                if from <= until {
                    hour >= *from && hour < *until
                } else {
                    hour >= *from || hour < *until
                }
            }
            Predicate::Weekend {
                weekend,
                utc_offset,
            } => {
                let dow = local_weekday(start + i64::from(*utc_offset));
                (dow == 0 || dow == 6) == *weekend
            }
            Predicate::DurationAtLeast(secs) => session.duration >= *secs,
            Predicate::DurationBelow(secs) => session.duration < *secs,
            Predicate::RomIn(ids) => ids.contains(&session.rom_id),
            Predicate::And(parts) => parts.iter().all(|p| p.matches(session)),
        }
    }

    /// SQL `WHERE` fragment over `play_activity`.
    pub fn to_sql(&self) -> String {
        match self {
            Predicate::All => "1 = 1".to_string(),
            Predicate::StartedBetween { from, until } => {
                format!("(created_at >= {from} AND created_at < {until})")
            }
            Predicate::StartedSince(from) => format!("created_at >= {from}"),
            Predicate::MonthOfYear { month, utc_offset } => format!(
                "CAST(strftime('%m', created_at + {utc_offset}, 'unixepoch') AS INTEGER) = {month}"
            ),
            Predicate::HourOfDay {
                from,
                until,
                utc_offset,
            } => {
                let hour = format!(
                    "CAST(strftime('%H', created_at + {utc_offset}, 'unixepoch') AS INTEGER)"
                );
                let joiner = if from <= until { "AND" } else { "OR" };
                format!("({hour} >= {from} {joiner} {hour} < {until})")
            }
            Predicate::Weekend {
                weekend,
                utc_offset,
            } => {
                let op = if *weekend { "IN" } else { "NOT IN" };
                format!("strftime('%w', created_at + {utc_offset}, 'unixepoch') {op} ('0', '6')")
            }
            Predicate::DurationAtLeast(secs) => format!("play_time >= {secs}"),
            Predicate::DurationBelow(secs) => format!("play_time < {secs}"),
            Predicate::RomIn(ids) if ids.is_empty() => "0 = 1".to_string(),
            Predicate::RomIn(ids) => {
                let list: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                format!("rom_id IN ({})", list.join(", "))
            }
            Predicate::And(parts) if parts.is_empty() => "1 = 1".to_string(),
            Predicate::And(parts) => parts
                .iter()
                .map(|p| format!("({})", p.to_sql()))
                .collect::<Vec<_>>()
                .join(" AND "),
        }
    }
}

fn local_month(local_secs: i64) -> Option<u32> {
    Utc.timestamp_opt(local_secs, 0).single().map(|t| t.month())
}

fn local_hour(local_secs: i64) -> u32 {
    (local_secs.rem_euclid(SECS_PER_DAY) / 3600) as u32
}

/// Day of week with Sunday = 0, matching SQLite's `%w`.
fn local_weekday(local_secs: i64) -> u32 {
    // 1970-01-01 was a Thursday
    (local_secs.div_euclid(SECS_PER_DAY) + 4).rem_euclid(7) as u32
}
