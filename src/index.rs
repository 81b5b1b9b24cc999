//! Deduplication index: a hash map keyed by `(player, crate bitset)`
//! storing pointers (arena indices) into the state arena, grounded on
//! the original solver's `state_hash`/`state_compare`.

use crate::arena::Arena;
use crate::bitset;
use crate::grid::Pos;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Combine a hash of the player position with a hash of the crate
/// bitset. The combination must not reduce to either component alone;
/// this is the exact rule from the original `state_hash`.
fn combined_hash(player: Pos, crates_words: &[u64]) -> u64 {
    let mut player_hasher = DefaultHasher::new();
    player.hash(&mut player_hasher);
    let player_hash = player_hasher.finish();

    let mut crates_hasher = DefaultHasher::new();
    crates_words.hash(&mut crates_hasher);
    let crates_hash = crates_hasher.finish();

    player_hash ^ (crates_hash << 1)
}

/// Buckets by combined hash rather than owning a copy of each state's
/// key: the value stored is the arena index, and comparisons go back
/// through the arena, so no crate bitset is ever duplicated outside the
/// arena's own pool.
pub struct DedupIndex {
    buckets: HashMap<u64, Vec<usize>>,
}

impl DedupIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: HashMap::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Find a previously admitted state with this exact key. Comparison
    /// is player first, then bitset equality (the total order from
    /// `bitset::cmp` collapses to equality here since we only need to
    /// detect duplicates, not rank them).
    pub fn find(&self, arena: &Arena, player: Pos, crates_words: &[u64]) -> Option<usize> {
        let hash = combined_hash(player, crates_words);
        let bucket = self.buckets.get(&hash)?;
        bucket.iter().copied().find(|&idx| {
            let state = arena.state(idx);
            state.player == player && bitset::equals(arena.crates_words(state.crates), crates_words)
        })
    }

    pub fn insert(&mut self, arena: &Arena, state_index: usize) {
        let state = arena.state(state_index);
        let hash = combined_hash(state.player, arena.crates_words(state.crates));
        self.buckets.entry(hash).or_default().push(state_index);
    }
}
