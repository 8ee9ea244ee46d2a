//! Track shuffling without immediate repeats

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// How many recently played indices are remembered
pub const RECENT_LEN: usize = 3;

/// Seeded shuffle over a playlist of `count` tracks
#[derive(Debug, Clone)]
pub struct Shuffle {
    recent: VecDeque<usize>,
    rng: Pcg32,
}

impl Shuffle {
    pub fn new(seed: u64) -> Self {
        Self {
            recent: VecDeque::with_capacity(RECENT_LEN + 1),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn last(&self) -> Option<usize> {
        self.recent.back().copied()
    }

    pub fn recent(&self) -> impl Iterator<Item = usize> + '_ {
        self.recent.iter().copied()
    }

    /// Record a track that started without going through `pick`
    pub fn note_played(&mut self, index: usize) {
        self.recent.push_back(index);
        while self.recent.len() > RECENT_LEN {
            self.recent.pop_front();
        }
    }

    /// Pick the next index; never the one just played when there is a choice
    pub fn pick(&mut self, count: usize) -> usize {
        if count <= 1 {
            return 0;
        }
        let last = self.last().filter(|&i| i < count);
        let pool: Vec<usize> = (0..count).filter(|&i| Some(i) != last).collect();
        let idx = pool[self.rng.random_range(0..pool.len())];
        self.note_played(idx);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_track_always_zero() {
        let mut s = Shuffle::new(1);
        for _ in 0..10 {
            assert_eq!(s.pick(1), 0);
        }
        assert_eq!(s.pick(0), 0);
    }

    #[test]
    fn test_never_repeats_immediately() {
        let mut s = Shuffle::new(42);
        let mut prev = s.pick(2);
        for _ in 0..200 {
            let next = s.pick(2);
            assert_ne!(next, prev);
            prev = next;
        }
    }

    #[test]
    fn test_recent_ring_is_bounded() {
        let mut s = Shuffle::new(7);
        for _ in 0..10 {
            s.pick(5);
        }
        assert_eq!(s.recent().count(), RECENT_LEN);
    }

    #[test]
    fn test_note_played_excluded_next() {
        let mut s = Shuffle::new(3);
        s.note_played(1);
        for _ in 0..50 {
            let mut t = s.clone();
            assert_ne!(t.pick(2), 1);
        }
    }
}
