// RollingWindow - fixed-capacity FIFO shared by every per-session history
//
// Phase votes, tracked angles, recent poses, and quality scores all keep
// the last N values and drop the oldest on overflow.

use std::collections::VecDeque;

/// Bounded FIFO; pushing past capacity evicts the oldest element
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create an empty window; a zero capacity is bumped to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, returning the evicted one if the window was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.items.iter()
    }

    /// The most recent `n` values, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> + '_ {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: PartialEq + Copy> RollingWindow<T> {
    /// Most frequent value; ties go to the value seen first (oldest)
    pub fn mode(&self) -> Option<T> {
        let mut best: Option<(T, usize)> = None;
        for (i, candidate) in self.items.iter().enumerate() {
            // Only score the first occurrence so earlier values win ties
            if self.items.iter().take(i).any(|seen| seen == candidate) {
                continue;
            }
            let count = self.items.iter().filter(|v| *v == candidate).count();
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((*candidate, count)),
            }
        }
        best.map(|(value, _)| value)
    }
}

impl RollingWindow<f32> {
    pub fn mean(&self) -> Option<f32> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.items.iter().sum::<f32>() / self.items.len() as f32)
    }
}
