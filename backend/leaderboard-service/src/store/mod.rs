//! Ordered ranking index: a span-augmented skip list plus an id -> score
//! side index, Redis-sorted-set style. The side index is what makes
//! id-keyed operations correct in a score-ordered structure: deletes and
//! rank lookups first resolve the id to its exact composite key, then
//! navigate by (score desc, id asc).

pub mod skiplist;

use crate::models::{LeaderboardRow, RankedEntry, Score};
use skiplist::SkipList;
use std::collections::HashMap;

/// Skip list height used when no population hint is given.
const DEFAULT_MAX_LEVEL: usize = 16;

/// Ordered collection of ranked entries keyed by (score desc, id asc).
///
/// Owns all structural mutation. Identity-agnostic about *why* a score
/// changed; business rules live in the leaderboard engine. Not
/// synchronized: the engine wraps it in a readers-writer lock.
#[derive(Debug)]
pub struct RankedStore {
    scores: HashMap<i64, Score>,
    list: SkipList,
}

impl RankedStore {
    pub fn new(max_level: usize) -> Self {
        RankedStore {
            scores: HashMap::new(),
            list: SkipList::new(max_level),
        }
    }

    /// Sizes the skip list height as ~log2 of the expected population.
    pub fn for_population(expected_entries: u64) -> Self {
        let bits = 64 - expected_entries.max(1).leading_zeros() as usize;
        Self::new(bits.clamp(DEFAULT_MAX_LEVEL / 2, skiplist::MAX_HEIGHT))
    }

    /// Deterministic tower heights for reproducible tests.
    pub fn with_seed(max_level: usize, seed: u64) -> Self {
        RankedStore {
            scores: HashMap::new(),
            list: SkipList::with_seed(max_level, seed),
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn score(&self, id: i64) -> Option<Score> {
        self.scores.get(&id).copied()
    }

    /// Inserts a new entry preserving total order. A duplicate id or a
    /// non-positive score is a no-op returning `false`: callers that need
    /// to change an existing id's score go through `update_score`, and
    /// only strictly positive scores are ever ranked.
    pub fn insert(&mut self, entry: RankedEntry) -> bool {
        if !entry.score.is_ranked() {
            return false;
        }
        match self.scores.entry(entry.id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(entry.score);
                self.list.insert(entry);
                true
            }
        }
    }

    /// Removes the entry with this id; returns whether it was found.
    pub fn delete(&mut self, id: i64) -> bool {
        match self.scores.remove(&id) {
            Some(score) => {
                let removed = self.list.remove(&RankedEntry::new(id, score));
                debug_assert!(removed, "index and list disagree on id {id}");
                removed
            }
            None => false,
        }
    }

    /// Repositions an existing entry under a new score: delete, then
    /// reinsert while the new score is still ranked. Returns whether the
    /// id existed. Score changes never mutate a node's key in place.
    pub fn update_score(&mut self, id: i64, new_score: Score) -> bool {
        if !self.delete(id) {
            return false;
        }
        if new_score.is_ranked() {
            self.insert(RankedEntry::new(id, new_score));
        }
        true
    }

    /// 1-based rank of this id; 0 if absent. O(log n).
    pub fn rank(&self, id: i64) -> u64 {
        match self.scores.get(&id) {
            Some(&score) => self.list.rank(&RankedEntry::new(id, score)),
            None => 0,
        }
    }

    /// Rows whose rank lies in `[start, end]` inclusive, 1-based.
    /// O(log n + k).
    pub fn range(&self, start: u64, end: u64) -> Vec<LeaderboardRow> {
        self.list
            .range(start, end)
            .into_iter()
            .map(|(entry, rank)| LeaderboardRow {
                customer_id: entry.id,
                score: entry.score,
                rank,
            })
            .collect()
    }
}
