// ============================================
// Leaderboard Engine
// ============================================
//
// Domain rules over the ranked store:
// - delta-based score updates with create-on-first-positive-score
// - eviction when a score drops to zero or below
// - rank-range and neighbor-window queries
//
// One shared store behind a readers-writer lock: structural mutations
// hold the write guard for the whole read-modify-delete-insert sequence
// so concurrent deltas to the same id compose instead of racing; queries
// hold a read guard for the duration of a single query.

use crate::config::LeaderboardConfig;
use crate::metrics;
use crate::models::{LeaderboardRow, RankedEntry, Score};
use crate::store::RankedStore;
use rand::Rng;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub struct LeaderboardEngine {
    store: RwLock<RankedStore>,
    seed_max_score: i64,
}

impl LeaderboardEngine {
    pub fn new(config: &LeaderboardConfig) -> Self {
        LeaderboardEngine {
            store: RwLock::new(RankedStore::for_population(config.expected_participants)),
            seed_max_score: config.seed_max_score,
        }
    }

    /// Applies `delta` to the participant's score and returns the new
    /// score, including non-positive results so callers can observe drops.
    ///
    /// An unknown participant has an effective prior score of 0: a
    /// positive result creates its entry, anything else leaves it
    /// unranked. A known participant is repositioned, or evicted when the
    /// result is no longer positive.
    pub async fn apply_score_delta(&self, customer_id: i64, delta: Score) -> Score {
        let mut store = self.store.write().await;

        let old_score = store.score(customer_id);
        let new_score = old_score.unwrap_or(Score::ZERO).saturating_add(delta);

        let outcome = match old_score {
            Some(_) => {
                store.update_score(customer_id, new_score);
                if new_score.is_ranked() {
                    "updated"
                } else {
                    "evicted"
                }
            }
            None => {
                if new_score.is_ranked() {
                    store.insert(RankedEntry::new(customer_id, new_score));
                    "created"
                } else {
                    "unchanged"
                }
            }
        };

        metrics::SCORE_UPDATES_TOTAL
            .with_label_values(&[outcome])
            .inc();
        metrics::RANKED_PARTICIPANTS.set(store.len() as f64);

        debug!(
            customer_id,
            old_score = %old_score.unwrap_or(Score::ZERO),
            delta = %delta,
            new_score = %new_score,
            outcome,
            "score delta applied"
        );

        new_score
    }

    /// Rows ranked in `[start, end]`. Non-positive or omitted bounds are
    /// absent; unless both bounds are present and `start <= end`, the
    /// result is empty.
    pub async fn range(&self, start: Option<i64>, end: Option<i64>) -> Vec<LeaderboardRow> {
        let (start, end) = match (normalize_bound(start), normalize_bound(end)) {
            (Some(start), Some(end)) if start <= end => (start, end),
            _ => return Vec::new(),
        };

        let store = self.store.read().await;
        store.range(start, end)
    }

    /// Up to `high` higher-ranked neighbors, the participant itself, and
    /// up to `low` lower-ranked neighbors. Unknown participant: empty.
    /// Rank resolution and the window fetch share one read guard, so the
    /// window is a consistent snapshot.
    pub async fn neighbors(&self, customer_id: i64, high: i64, low: i64) -> Vec<LeaderboardRow> {
        let high = high.max(0) as u64;
        let low = low.max(0) as u64;

        let store = self.store.read().await;
        let rank = store.rank(customer_id);
        if rank == 0 {
            return Vec::new();
        }

        let start = rank.saturating_sub(high).max(1);
        let end = rank.saturating_add(low);
        store.range(start, end)
    }

    /// Bulk-inserts `count` random participants for load testing: random
    /// positive ids, whole-point scores in `[1, seed_max_score)`. Ids
    /// that collide with existing participants are skipped. Returns how
    /// many entries were actually inserted.
    pub async fn seed_test_data(&self, count: u64) -> u64 {
        let started = Instant::now();
        let mut store = self.store.write().await;
        let mut rng = rand::thread_rng();

        let mut inserted = 0u64;
        for _ in 0..count {
            let customer_id = rng.gen_range(1..=i64::from(i32::MAX));
            let score = Score::from_points(rng.gen_range(1..self.seed_max_score.max(2)));
            if store.insert(RankedEntry::new(customer_id, score)) {
                inserted += 1;
            }
        }

        metrics::RANKED_PARTICIPANTS.set(store.len() as f64);
        drop(store);

        info!(
            requested = count,
            inserted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "test participants seeded"
        );
        inserted
    }

    /// Current ranked population.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

fn normalize_bound(bound: Option<i64>) -> Option<u64> {
    bound.filter(|b| *b > 0).map(|b| b as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> LeaderboardEngine {
        LeaderboardEngine::new(&LeaderboardConfig::default())
    }

    fn points(p: i64) -> Score {
        Score::from_points(p)
    }

    /// Ten participants with the scores 124, 113, 100, 100, 96, 95, 93,
    /// 93, 93, 92 assigned to ids 1..=10 in order.
    async fn seeded_engine() -> LeaderboardEngine {
        let engine = engine();
        let scores = [124, 113, 100, 100, 96, 95, 93, 93, 93, 92];
        for (i, &score) in scores.iter().enumerate() {
            engine
                .apply_score_delta(i as i64 + 1, points(score))
                .await;
        }
        engine
    }

    #[tokio::test]
    async fn first_positive_delta_creates_participant() {
        let engine = engine();
        assert_eq!(engine.apply_score_delta(7, points(10)).await, points(10));
        assert_eq!(engine.len().await, 1);

        let rows = engine.range(Some(1), Some(1)).await;
        assert_eq!(rows[0].customer_id, 7);
        assert_eq!(rows[0].rank, 1);
    }

    #[tokio::test]
    async fn non_positive_result_for_unknown_id_creates_nothing() {
        let engine = engine();
        assert_eq!(engine.apply_score_delta(7, points(-5)).await, points(-5));
        assert_eq!(engine.len().await, 0);
        assert!(engine.neighbors(7, 1, 1).await.is_empty());
    }

    #[tokio::test]
    async fn dropping_to_zero_or_below_evicts() {
        let engine = engine();
        engine.apply_score_delta(1, points(10)).await;
        engine.apply_score_delta(2, points(5)).await;

        assert_eq!(engine.apply_score_delta(1, points(-15)).await, points(-5));
        assert_eq!(engine.len().await, 1);
        assert!(engine.neighbors(1, 0, 0).await.is_empty());
        let rows = engine.range(Some(1), Some(10)).await;
        assert!(rows.iter().all(|r| r.customer_id != 1));
    }

    #[tokio::test]
    async fn deltas_compose_commutatively() {
        let d1 = Score::from_centis(550);
        let d2 = points(-2);

        let forward = engine();
        forward.apply_score_delta(1, points(100)).await;
        forward.apply_score_delta(1, d1).await;
        let a = forward.apply_score_delta(1, d2).await;

        let backward = engine();
        backward.apply_score_delta(1, points(100)).await;
        backward.apply_score_delta(1, d2).await;
        let b = backward.apply_score_delta(1, d1).await;

        assert_eq!(a, b);
        assert_eq!(a, Score::from_centis(10_350));
    }

    #[tokio::test]
    async fn range_requires_both_meaningful_bounds() {
        let engine = seeded_engine().await;

        assert!(engine.range(None, None).await.is_empty());
        assert!(engine.range(Some(0), Some(0)).await.is_empty());
        assert!(engine.range(Some(-3), Some(5)).await.is_empty());
        assert!(engine.range(Some(2), None).await.is_empty());
        assert!(engine.range(Some(3), Some(2)).await.is_empty());

        let top = engine.range(Some(1), Some(1)).await;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].customer_id, 1);
    }

    #[tokio::test]
    async fn concrete_ranking_scenario() {
        let engine = seeded_engine().await;

        let rows = engine.range(Some(1), Some(10)).await;
        let expected: Vec<(i64, i64, u64)> = vec![
            (1, 124, 1),
            (2, 113, 2),
            (3, 100, 3),
            (4, 100, 4),
            (5, 96, 5),
            (6, 95, 6),
            (7, 93, 7),
            (8, 93, 8),
            (9, 93, 9),
            (10, 92, 10),
        ];
        for (row, (id, score, rank)) in rows.iter().zip(expected) {
            assert_eq!(row.customer_id, id);
            assert_eq!(row.score, points(score));
            assert_eq!(row.rank, rank);
        }
    }

    #[tokio::test]
    async fn neighbors_window_around_participant() {
        let engine = seeded_engine().await;

        let window = engine.neighbors(7, 1, 1).await;
        let ids: Vec<i64> = window.iter().map(|r| r.customer_id).collect();
        let ranks: Vec<u64> = window.iter().map(|r| r.rank).collect();
        assert_eq!(ids, vec![6, 7, 8]);
        assert_eq!(ranks, vec![6, 7, 8]);

        // Negative counts are treated as zero.
        let only_self = engine.neighbors(7, -4, -1).await;
        assert_eq!(only_self.len(), 1);
        assert_eq!(only_self[0].customer_id, 7);

        // Window clipped at the top of the board.
        let top = engine.neighbors(1, 5, 1).await;
        let ids: Vec<i64> = top.iter().map(|r| r.customer_id).collect();
        assert_eq!(ids, vec![1, 2]);

        assert!(engine.neighbors(404, 3, 3).await.is_empty());
    }

    #[tokio::test]
    async fn seeding_populates_the_board() {
        let engine = engine();
        let inserted = engine.seed_test_data(200).await;

        assert!(inserted <= 200);
        assert_eq!(engine.len().await, inserted as usize);

        let rows = engine.range(Some(1), Some(inserted as i64)).await;
        assert_eq!(rows.len(), inserted as usize);
        for window in rows.windows(2) {
            assert!(
                window[0].score > window[1].score
                    || (window[0].score == window[1].score
                        && window[0].customer_id < window[1].customer_id)
            );
        }
    }
}
