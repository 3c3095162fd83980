use std::{collections::HashMap, hash::Hash, ops::AddAssign};

use crate::quantity::Zero;

/// Per-key sums that keep the keys in the order they were first seen.
#[must_use]
pub struct OrderedSums<K, V> {
    entries: Vec<(K, V)>,
    positions: HashMap<K, usize>,
}

impl<K, V> Default for OrderedSums<K, V> {
    fn default() -> Self {
        Self { entries: Vec::new(), positions: HashMap::new() }
    }
}

impl<K, V> OrderedSums<K, V>
where
    K: Clone + Eq + Hash,
    V: AddAssign + Zero,
{
    pub fn add(&mut self, key: K, value: V) {
        let entries = &mut self.entries;
        let position = *self.positions.entry(key).or_insert_with_key(|key| {
            entries.push((key.clone(), V::ZERO));
            entries.len() - 1
        });
        self.entries[position].1 += value;
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedSums<K, V>
where
    K: Clone + Eq + Hash,
    V: AddAssign + Zero,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut sums = Self::default();
        for (key, value) in iter {
            sums.add(key, value);
        }
        sums
    }
}

impl<K, V> IntoIterator for OrderedSums<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
