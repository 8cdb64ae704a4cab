//! Sequences labeled with their order.
//!
//! A ledger is newest-first while blocks and chains are oldest-first. Keeping
//! the two conventions in distinct types means the only way between them is an
//! explicit reversal.

use std::{slice, vec};

/// Items ordered from the most recent to the oldest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewestFirst<T>(Vec<T>);

/// Items ordered from the oldest to the most recent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OldestFirst<T>(Vec<T>);

impl<T> NewestFirst<T> {
    /// Wrap `items`, which must already be newest-first.
    pub fn new(items: Vec<T>) -> Self {
        Self(items)
    }

    /// Reverse into oldest-first order.
    pub fn into_oldest_first(self) -> OldestFirst<T> {
        let mut items = self.0;
        items.reverse();
        OldestFirst(items)
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> OldestFirst<T> {
    /// Wrap `items`, which must already be oldest-first.
    pub fn new(items: Vec<T>) -> Self {
        Self(items)
    }

    /// Reverse into newest-first order.
    pub fn into_newest_first(self) -> NewestFirst<T> {
        let mut items = self.0;
        items.reverse();
        NewestFirst(items)
    }

    /// Add `item` as the most recent element.
    pub fn push(&mut self, item: T) {
        self.0.push(item);
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Default for NewestFirst<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Default for OldestFirst<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> FromIterator<T> for NewestFirst<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> FromIterator<T> for OldestFirst<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for NewestFirst<T> {
    type Item = T;
    type IntoIter = vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a NewestFirst<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T> IntoIterator for OldestFirst<T> {
    type Item = T;
    type IntoIter = vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a OldestFirst<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversal_round_trips() {
        let oldest = OldestFirst::new(vec![1, 2, 3]);
        let newest = oldest.clone().into_newest_first();
        assert_eq!(newest.as_slice(), &[3, 2, 1]);
        assert_eq!(newest.into_oldest_first(), oldest);
    }

    #[test]
    fn push_appends_most_recent() {
        let mut items = OldestFirst::default();
        items.push('a');
        items.push('b');
        assert_eq!(items.into_newest_first().into_inner(), vec!['b', 'a']);
    }
}
