use crate::models::RankedEntry;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// End-of-level sentinel for forward links.
const NIL: usize = usize::MAX;

/// Arena slot of the head sentinel.
const HEAD: usize = 0;

/// Hard cap on tower height; construction clamps to this.
pub const MAX_HEIGHT: usize = 32;

/// Probability of growing a tower by one more level.
const LEVEL_PROBABILITY: f64 = 0.5;

/// Forward link at one level of a node's tower. `span` counts the
/// base-level entries the link skips over, including the destination.
#[derive(Debug, Clone, Copy)]
struct Link {
    to: usize,
    span: usize,
}

impl Default for Link {
    fn default() -> Self {
        Link { to: NIL, span: 0 }
    }
}

#[derive(Debug)]
struct Node {
    entry: RankedEntry,
    links: Vec<Link>,
}

/// Span-augmented skip list over `RankedEntry`, ordered by
/// (score desc, id asc).
///
/// Nodes live in a growable arena and reference each other by index, so
/// there are no ownership cycles to manage; freed slots are recycled
/// through a free list. Spans along every link make rank and rank-range
/// lookups O(log n) instead of a base-level walk.
///
/// The list is key-addressed: callers must present the exact
/// (score, id) pair for `remove` and `rank`, and must guarantee id
/// uniqueness on `insert`. `RankedStore` layers the id index on top.
#[derive(Debug)]
pub struct SkipList {
    arena: Vec<Node>,
    free: Vec<usize>,
    /// Number of occupied levels, 1..=max_level.
    level: usize,
    len: usize,
    max_level: usize,
    rng: StdRng,
}

impl SkipList {
    pub fn new(max_level: usize) -> Self {
        Self::with_rng(max_level, StdRng::from_entropy())
    }

    /// Deterministic tower heights for reproducible tests.
    pub fn with_seed(max_level: usize, seed: u64) -> Self {
        Self::with_rng(max_level, StdRng::seed_from_u64(seed))
    }

    fn with_rng(max_level: usize, rng: StdRng) -> Self {
        let max_level = max_level.clamp(1, MAX_HEIGHT);
        let head = Node {
            entry: RankedEntry::new(0, crate::models::Score::ZERO),
            links: vec![Link::default(); max_level],
        };
        SkipList {
            arena: vec![head],
            free: Vec::new(),
            level: 1,
            len: 0,
            max_level,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Geometric tower height: p = 0.5 per additional level, capped at the
    /// height fixed at construction.
    fn random_level(&mut self) -> usize {
        let mut level = 1;
        while level < self.max_level && self.rng.gen_bool(LEVEL_PROBABILITY) {
            level += 1;
        }
        level
    }

    fn alloc(&mut self, entry: RankedEntry, height: usize) -> usize {
        match self.free.pop() {
            Some(idx) => {
                let node = &mut self.arena[idx];
                node.entry = entry;
                node.links.clear();
                node.links.resize(height, Link::default());
                idx
            }
            None => {
                self.arena.push(Node {
                    entry,
                    links: vec![Link::default(); height],
                });
                self.arena.len() - 1
            }
        }
    }

    /// Splices `entry` at its composite-key position, maintaining spans.
    ///
    /// The caller guarantees no node with this id is present.
    pub fn insert(&mut self, entry: RankedEntry) {
        let mut update = vec![HEAD; self.max_level];
        // rank[i]: base-level offset of update[i].
        let mut rank = vec![0usize; self.max_level];

        let mut x = HEAD;
        for i in (0..self.level).rev() {
            rank[i] = if i + 1 < self.level { rank[i + 1] } else { 0 };
            loop {
                let link = self.arena[x].links[i];
                if link.to != NIL && self.arena[link.to].entry < entry {
                    rank[i] += link.span;
                    x = link.to;
                } else {
                    break;
                }
            }
            update[i] = x;
        }

        let height = self.random_level();
        if height > self.level {
            for i in self.level..height {
                rank[i] = 0;
                update[i] = HEAD;
                self.arena[HEAD].links[i] = Link {
                    to: NIL,
                    span: self.len,
                };
            }
            self.level = height;
        }

        let node = self.alloc(entry, height);
        for i in 0..height {
            let prev = update[i];
            let prev_link = self.arena[prev].links[i];
            self.arena[node].links[i] = Link {
                to: prev_link.to,
                span: prev_link.span - (rank[0] - rank[i]),
            };
            self.arena[prev].links[i] = Link {
                to: node,
                span: rank[0] - rank[i] + 1,
            };
        }

        // Levels above the new tower now skip one more entry.
        for i in height..self.level {
            self.arena[update[i]].links[i].span += 1;
        }

        self.len += 1;
    }

    /// Unlinks the node carrying exactly this (score, id) pair.
    pub fn remove(&mut self, entry: &RankedEntry) -> bool {
        let mut update = vec![HEAD; self.level];

        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let link = self.arena[x].links[i];
                if link.to != NIL && self.arena[link.to].entry < *entry {
                    x = link.to;
                } else {
                    break;
                }
            }
            update[i] = x;
        }

        let target = self.arena[x].links[0].to;
        if target == NIL || self.arena[target].entry != *entry {
            return false;
        }

        for i in 0..self.level {
            let prev = update[i];
            let prev_link = self.arena[prev].links[i];
            if prev_link.to == target {
                let target_link = self.arena[target].links[i];
                self.arena[prev].links[i] = Link {
                    to: target_link.to,
                    span: prev_link.span + target_link.span - 1,
                };
            } else {
                self.arena[prev].links[i].span -= 1;
            }
        }

        while self.level > 1 && self.arena[HEAD].links[self.level - 1].to == NIL {
            self.level -= 1;
        }

        self.len -= 1;
        self.free.push(target);
        true
    }

    /// 1-based rank of exactly this (score, id) pair; 0 if absent.
    pub fn rank(&self, entry: &RankedEntry) -> u64 {
        let mut rank = 0usize;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let link = self.arena[x].links[i];
                if link.to != NIL && self.arena[link.to].entry <= *entry {
                    rank += link.span;
                    x = link.to;
                } else {
                    break;
                }
            }
            if x != HEAD && self.arena[x].entry.id == entry.id {
                return rank as u64;
            }
        }
        0
    }

    /// Entries whose 1-based rank lies in `[start, end]`, with their ranks.
    /// Locates `start` by span descent, then walks base links.
    pub fn range(&self, start: u64, end: u64) -> Vec<(RankedEntry, u64)> {
        if start == 0 || start > end {
            return Vec::new();
        }
        let start = start as usize;

        let mut traversed = 0usize;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let link = self.arena[x].links[i];
                if link.to != NIL && traversed + link.span < start {
                    traversed += link.span;
                    x = link.to;
                } else {
                    break;
                }
            }
        }

        let mut out = Vec::new();
        let mut cur = self.arena[x].links[0].to;
        let mut rank = traversed as u64 + 1;
        while cur != NIL && rank <= end {
            out.push((self.arena[cur].entry, rank));
            cur = self.arena[cur].links[0].to;
            rank += 1;
        }
        out
    }

    /// Base-level traversal in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &RankedEntry> + '_ {
        let mut cur = self.arena[HEAD].links[0].to;
        std::iter::from_fn(move || {
            if cur == NIL {
                None
            } else {
                let entry = &self.arena[cur].entry;
                cur = self.arena[cur].links[0].to;
                Some(entry)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Score;

    fn entry(id: i64, points: i64) -> RankedEntry {
        RankedEntry::new(id, Score::from_points(points))
    }

    fn assert_ranks_consistent(list: &SkipList) {
        for (position, e) in list.iter().enumerate() {
            assert_eq!(
                list.rank(e),
                position as u64 + 1,
                "rank of id {} disagrees with enumeration order",
                e.id
            );
        }
    }

    #[test]
    fn keeps_total_order_under_random_churn() {
        let mut list = SkipList::with_seed(16, 7);
        let mut rng = StdRng::seed_from_u64(11);

        let mut ids: Vec<i64> = (1..=300).collect();
        for &id in &ids {
            list.insert(entry(id, rng.gen_range(1..500)));
        }
        assert_eq!(list.len(), 300);

        // Remove a third of them, by exact key.
        let entries: Vec<RankedEntry> = list.iter().copied().collect();
        for e in entries.iter().step_by(3) {
            assert!(list.remove(e));
            ids.retain(|&id| id != e.id);
        }
        assert_eq!(list.len(), ids.len());

        let after: Vec<RankedEntry> = list.iter().copied().collect();
        let mut sorted = after.clone();
        sorted.sort();
        assert_eq!(after, sorted, "base level must stay totally ordered");
        assert_ranks_consistent(&list);
    }

    #[test]
    fn spans_stay_consistent_after_interleaved_inserts_and_removes() {
        let mut list = SkipList::with_seed(12, 3);
        let mut rng = StdRng::seed_from_u64(5);

        for round in 0..5 {
            for id in (round * 40)..(round * 40 + 40) {
                list.insert(entry(id, rng.gen_range(1..100)));
            }
            let victims: Vec<RankedEntry> =
                list.iter().copied().filter(|e| e.id % 7 == 0).collect();
            for v in &victims {
                assert!(list.remove(v));
            }
            assert_ranks_consistent(&list);
        }
    }

    #[test]
    fn remove_unknown_key_is_a_miss() {
        let mut list = SkipList::with_seed(8, 1);
        list.insert(entry(1, 10));
        // Same id, different score: not the stored key.
        assert!(!list.remove(&entry(1, 11)));
        assert!(!list.remove(&entry(2, 10)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn height_shrinks_when_top_levels_empty() {
        let mut list = SkipList::with_seed(16, 42);
        for id in 1..=200 {
            list.insert(entry(id, id));
        }
        assert!(list.level > 1, "200 entries should occupy several levels");

        let entries: Vec<RankedEntry> = list.iter().copied().collect();
        for e in &entries {
            assert!(list.remove(e));
        }
        assert!(list.is_empty());
        assert_eq!(list.level, 1);

        // Arena slots are recycled.
        assert_eq!(list.free.len(), 200);
        list.insert(entry(9, 9));
        assert_eq!(list.free.len(), 199);
        assert_eq!(list.rank(&entry(9, 9)), 1);
    }

    #[test]
    fn range_walks_by_rank() {
        let mut list = SkipList::with_seed(16, 9);
        for id in 1..=50 {
            // Descending scores so rank == id.
            list.insert(entry(id, 1000 - id));
        }

        let rows = list.range(10, 14);
        assert_eq!(rows.len(), 5);
        for (offset, (e, rank)) in rows.iter().enumerate() {
            assert_eq!(*rank, 10 + offset as u64);
            assert_eq!(e.id, 10 + offset as i64);
        }

        assert!(list.range(0, 5).is_empty());
        assert!(list.range(6, 5).is_empty());
        assert!(list.range(51, 60).is_empty());
        // End past the population stops at the last entry.
        assert_eq!(list.range(48, 1000).len(), 3);
    }

    #[test]
    fn random_level_stays_within_bounds() {
        let mut list = SkipList::with_seed(4, 13);
        for _ in 0..1000 {
            let level = list.random_level();
            assert!((1..=4).contains(&level));
        }
    }
}
