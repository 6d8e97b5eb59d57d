//! Linear-scan nearest-neighbor container over ids.
//!
//! Distances are supplied per query and resolved by the caller through its own
//! storage: node ids through the roadmap arena, goal ids through the heuristic's
//! goal snapshot. A slot map keeps `remove` constant time.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Clone, Debug)]
pub struct NearestNeighbors<T> {
    items: Vec<T>,
    slots: HashMap<T, usize>,
}

impl<T> Default for NearestNeighbors<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

impl<T: Copy + Eq + Hash> NearestNeighbors<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item`; returns false if it was already present.
    pub fn add(&mut self, item: T) -> bool {
        if self.slots.contains_key(&item) {
            return false;
        }
        self.slots.insert(item, self.items.len());
        self.items.push(item);
        true
    }

    /// Remove `item`; returns whether it was present.
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(slot) = self.slots.remove(item) else {
            return false;
        };
        self.items.swap_remove(slot);
        if let Some(&moved) = self.items.get(slot) {
            self.slots.insert(moved, slot);
        }
        true
    }

    pub fn contains(&self, item: &T) -> bool {
        self.slots.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Item minimizing `dist`, with its distance. Ties keep the earliest slot.
    pub fn nearest<F>(&self, dist: F) -> Option<(T, f64)>
    where
        F: Fn(&T) -> f64,
    {
        let mut best: Option<(T, f64)> = None;
        for item in &self.items {
            let d = dist(item);
            match best {
                Some((_, bd)) if bd <= d => {}
                _ => best = Some((*item, d)),
            }
        }
        best
    }

    /// All items with `dist(item) <= radius`.
    pub fn nearest_r<F>(&self, radius: f64, dist: F) -> Vec<T>
    where
        F: Fn(&T) -> f64,
    {
        self.items
            .iter()
            .copied()
            .filter(|x| dist(x) <= radius)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<f64> {
        vec![1.0, 4.0, -2.0, 3.5, 7.0]
    }

    #[test]
    fn nearest_and_radius() {
        let xs = points();
        let mut nn = NearestNeighbors::new();
        for i in 0..xs.len() {
            assert!(nn.add(i));
        }
        assert!(!nn.add(2));
        let dist = |i: &usize| (xs[*i] - 3.0).abs();
        let (best, d) = nn.nearest(dist).unwrap();
        assert_eq!(best, 3);
        assert!((d - 0.5).abs() < 1e-12);
        let mut within = nn.nearest_r(1.0, dist);
        within.sort_unstable();
        assert_eq!(within, vec![1, 3]);
        assert!(NearestNeighbors::<usize>::new().nearest(|_| 0.0).is_none());
    }

    #[test]
    fn removal_keeps_the_swapped_item_reachable() {
        let xs = points();
        let mut nn = NearestNeighbors::new();
        for i in 0..xs.len() {
            nn.add(i);
        }
        // removing slot 1 moves the last item (4) into it
        assert!(nn.remove(&1));
        assert!(!nn.remove(&1));
        assert!(!nn.contains(&1));
        assert_eq!(nn.len(), 4);
        assert!(nn.remove(&4));
        assert!(nn.remove(&0));
        let mut rest: Vec<usize> = nn.iter().copied().collect();
        rest.sort_unstable();
        assert_eq!(rest, vec![2, 3]);
        let (best, _) = nn.nearest(|i| (xs[*i] - 8.0).abs()).unwrap();
        assert_eq!(best, 3);
        assert!(nn.add(1));
        assert!(nn.contains(&1));
        assert_eq!(nn.len(), 3);
    }
}
