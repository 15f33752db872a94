//! Max-heap over arm indices with in-place re-keying.
//!
//! lil'UCB pulls the top arm and then changes only that arm's score, so the
//! heap tracks where every arm sits and restores order from that slot alone.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;

/// Scheduling key of one arm.
///
/// Ordered by score; among equal scores the arm with fewer pulls ranks
/// higher, so an entry is strictly below an equal-scored one whenever its
/// arm has been pulled at least as often.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Priority {
    pub score: OrderedFloat<f64>,
    pub pulls: u64,
}

impl Priority {
    pub fn new(score: f64, pulls: u64) -> Self {
        Self {
            score: OrderedFloat(score),
            pulls,
        }
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.pulls.cmp(&self.pulls))
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Binary max-heap holding every arm index exactly once.
#[derive(Clone, Debug)]
pub(crate) struct IndexedHeap {
    /// Arm indices in heap order
    slots: Vec<usize>,
    /// `position[arm]` is the slot holding `arm`
    position: Vec<usize>,
    /// `keys[arm]` is the current priority of `arm`
    keys: Vec<Priority>,
}

impl IndexedHeap {
    /// Builds a heap over arms `0..keys.len()`.
    pub fn from_keys(keys: Vec<Priority>) -> Self {
        let len = keys.len();
        let mut heap = Self {
            slots: (0..len).collect(),
            position: (0..len).collect(),
            keys,
        };

        for slot in (0..len / 2).rev() {
            heap.sift_down(slot);
        }
        heap
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Highest-priority arm and its key.
    pub fn peek(&self) -> Option<(usize, Priority)> {
        self.slots.first().map(|&arm| (arm, self.keys[arm]))
    }

    pub fn priority(&self, arm: usize) -> Priority {
        self.keys[arm]
    }

    /// Replaces the key of `arm` and moves it to its new place.
    pub fn update(&mut self, arm: usize, key: Priority) {
        let old = std::mem::replace(&mut self.keys[arm], key);
        let slot = self.position[arm];

        match key.cmp(&old) {
            Ordering::Greater => self.sift_up(slot),
            Ordering::Less => self.sift_down(slot),
            Ordering::Equal => {}
        }
    }

    fn key_at(&self, slot: usize) -> Priority {
        self.keys[self.slots[slot]]
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
        self.position[self.slots[a]] = a;
        self.position[self.slots[b]] = b;
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.key_at(slot) <= self.key_at(parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut largest = slot;

            if left < len && self.key_at(left) > self.key_at(largest) {
                largest = left;
            }
            if right < len && self.key_at(right) > self.key_at(largest) {
                largest = right;
            }
            if largest == slot {
                break;
            }
            self.swap(slot, largest);
            slot = largest;
        }
    }
}
