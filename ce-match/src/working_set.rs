//! Removable view over a borrowed slice
//!
//! Tracks which items are still pending without rebuilding lists between
//! matching passes and rounds. Iteration preserves input order.

/// Pending subset of a slice
#[derive(Debug, Clone)]
pub struct WorkingSet<'a, T> {
    items: &'a [T],
    live: Vec<bool>,
    remaining: usize,
}

impl<'a, T> WorkingSet<'a, T> {
    /// All items start pending
    pub fn new(items: &'a [T]) -> Self {
        Self {
            items,
            live: vec![true; items.len()],
            remaining: items.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.live.get(idx).copied().unwrap_or(false)
    }

    /// Item by original index, if still pending
    pub fn get(&self, idx: usize) -> Option<&'a T> {
        if self.contains(idx) {
            Some(&self.items[idx])
        } else {
            None
        }
    }

    /// Mark an item consumed
    ///
    /// Returns `false` if it was already consumed or out of range.
    pub fn remove(&mut self, idx: usize) -> bool {
        match self.live.get_mut(idx) {
            Some(live) if *live => {
                *live = false;
                self.remaining -= 1;
                true
            }
            _ => false,
        }
    }

    /// Pending items with their original indices
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a T)> + '_ {
        let items = self.items;
        self.live
            .iter()
            .enumerate()
            .filter(|(_, live)| **live)
            .map(move |(idx, _)| (idx, &items[idx]))
    }

    /// Snapshot of pending indices, for loops that remove while walking
    pub fn indices(&self) -> Vec<usize> {
        self.iter().map(|(idx, _)| idx).collect()
    }
}
