//! Ordered, keyed collections with merge-by-key combine semantics.

use serde::{Deserialize, Serialize};

use crate::merge::{Combine, Defaultable, Keyed};

/// An ordered collection of keyed elements.
///
/// Elements are owned by the collection (value semantics; a clone is a fully
/// disjoint copy). Lookup is by ordinal, case-sensitive key comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedList<T> {
    items: Vec<T>,
}

impl<T> Default for KeyedList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed> KeyedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.key() == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Append an element; an existing element with the same key is replaced
    /// in place so keys stay unique within the collection.
    pub fn push(&mut self, item: T) {
        let key = item.key().to_owned();
        if let Some(existing) = self.get_mut(&key) {
            *existing = item;
        } else {
            self.items.push(item);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.key() == key)?;
        Some(self.items.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }
}

impl<'a, T> IntoIterator for &'a KeyedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Keyed> FromIterator<T> for KeyedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for item in iter {
            list.push(item);
        }
        list
    }
}

impl<T: Defaultable> Defaultable for KeyedList<T> {
    fn is_default(&self) -> bool {
        self.items.iter().all(Defaultable::is_default)
    }
}

impl<T: Keyed + Clone + Combine> Combine for KeyedList<T> {
    /// Merge-by-key union, existing entries win:
    ///
    /// - empty target: clone every reference element in source order;
    /// - otherwise: combine each existing element with its same-key reference
    ///   counterpart, then append clones of reference elements whose key has
    ///   no counterpart here.
    fn combine(&mut self, reference: &Self) {
        if self.items.is_empty() {
            self.items = reference.items.clone();
            return;
        }
        for item in &mut self.items {
            let key = item.key().to_owned();
            if let Some(counterpart) = reference.get(&key) {
                item.combine(counterpart);
            }
        }
        for counterpart in &reference.items {
            if !self.contains(counterpart.key()) {
                self.items.push(counterpart.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge_field;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    struct Entry {
        name: String,
        value: u32,
    }

    impl Entry {
        fn new(name: &str, value: u32) -> Self {
            Self {
                name: name.into(),
                value,
            }
        }
    }

    impl Keyed for Entry {
        fn key(&self) -> &str {
            &self.name
        }
    }

    impl Combine for Entry {
        fn combine(&mut self, reference: &Self) {
            let d = Self::default();
            merge_field(&mut self.value, &d.value, &reference.value);
        }
    }

    #[test]
    fn combine_into_empty_clones_in_source_order() {
        let mut target: KeyedList<Entry> = KeyedList::new();
        let reference: KeyedList<Entry> =
            [Entry::new("c", 3), Entry::new("a", 1), Entry::new("b", 2)]
                .into_iter()
                .collect();
        target.combine(&reference);
        let names: Vec<&str> = target.iter().map(|e| e.key()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(target, reference);
    }

    #[test]
    fn combine_merges_matches_and_appends_the_rest() {
        let mut target: KeyedList<Entry> = [Entry::new("a", 0), Entry::new("b", 9)]
            .into_iter()
            .collect();
        let reference: KeyedList<Entry> = [Entry::new("a", 5), Entry::new("z", 7)]
            .into_iter()
            .collect();
        target.combine(&reference);
        assert_eq!(target.get("a").unwrap().value, 5); // default 0 overwritten
        assert_eq!(target.get("b").unwrap().value, 9); // untouched, no counterpart
        assert_eq!(target.get("z").unwrap().value, 7); // appended clone
        assert_eq!(target.len(), 3);
    }

    #[test]
    fn combine_is_idempotent() {
        let mut target: KeyedList<Entry> = [Entry::new("a", 0)].into_iter().collect();
        let reference: KeyedList<Entry> = [Entry::new("a", 5), Entry::new("b", 1)]
            .into_iter()
            .collect();
        target.combine(&reference);
        let once = target.clone();
        target.combine(&reference);
        assert_eq!(target, once);
    }

    #[test]
    fn push_replaces_same_key() {
        let mut list: KeyedList<Entry> = KeyedList::new();
        list.push(Entry::new("a", 1));
        list.push(Entry::new("a", 2));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("a").unwrap().value, 2);
    }

    #[test]
    fn clone_is_disjoint() {
        let source: KeyedList<Entry> = [Entry::new("a", 1)].into_iter().collect();
        let mut copy = source.clone();
        copy.push(Entry::new("b", 2));
        copy.get_mut("a").unwrap().value = 99;
        assert_eq!(source.len(), 1);
        assert_eq!(source.get("a").unwrap().value, 1);
    }
}
