//! Filter criteria and the cumulative filter stack

use super::predicate::Predicate;
use serde::{Deserialize, Serialize};

/// Highest tier a criterion can carry; criteria at this tier are terminal.
pub const MAX_TIER: u8 = 1;

/// One selectable narrowing of the play log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriterion {
    pub display_name: String,
    pub predicate: Predicate,
    /// 0 = can be narrowed once more, 1 = terminal
    pub tier: u8,
    /// Play seconds matched by this criterion combined with its parent
    pub matched_play_secs: i64,
}

impl FilterCriterion {
    pub fn new(display_name: impl Into<String>, predicate: Predicate, tier: u8) -> Self {
        Self {
            display_name: display_name.into(),
            predicate,
            tier,
            matched_play_secs: 0,
        }
    }

    pub fn sql_predicate(&self) -> String {
        self.predicate.to_sql()
    }

    pub fn is_terminal(&self) -> bool {
        self.tier >= MAX_TIER
    }
}

/// Ordered, AND-combined criteria chosen by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStack {
    criteria: Vec<FilterCriterion>,
}

impl FilterStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, criterion: FilterCriterion) {
        self.criteria.push(criterion);
    }

    /// Copy of this stack with `criterion` appended.
    pub fn with(&self, criterion: FilterCriterion) -> Self {
        let mut next = self.clone();
        next.push(criterion);
        next
    }

    /// Removes the last criterion. Popping an empty stack does nothing.
    pub fn pop(&mut self) -> Option<FilterCriterion> {
        self.criteria.pop()
    }

    /// Conjunction of every criterion; match-all when empty.
    pub fn current_predicate(&self) -> Predicate {
        self.criteria
            .iter()
            .fold(Predicate::All, |acc, c| acc.and(c.predicate.clone()))
    }

    pub fn last(&self) -> Option<&FilterCriterion> {
        self.criteria.last()
    }

    /// Tier of the most recent criterion, `None` when nothing is applied.
    pub fn last_tier(&self) -> Option<u8> {
        self.last().map(|c| c.tier)
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterCriterion> {
        self.criteria.iter()
    }

    /// Title prefix such as `2024 > Evenings`.
    pub fn label(&self) -> Option<String> {
        if self.criteria.is_empty() {
            return None;
        }
        Some(
            self.criteria
                .iter()
                .map(|c| c.display_name.as_str())
                .collect::<Vec<_>>()
                .join(" > "),
        )
    }
}
