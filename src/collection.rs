use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::collections::HashMap;
use std::hash::Hash;

/// Domain identity of a published entity.
///
/// Two values with the same key are the same logical entity; an upsert
/// replaces rather than duplicates.
pub trait Identify {
    type Key: Eq + Hash + Clone + std::fmt::Debug;

    fn identity(&self) -> Self::Key;
}

/// Insertion-ordered collection with at-most-one-entry-per-identity.
///
/// Backed by a Vec for display order plus a key index for O(1) upsert.
#[derive(Debug, Clone)]
pub struct IdentitySet<T: Identify> {
    items: Vec<T>,
    index: HashMap<T::Key, usize>,
}

impl<T: Identify> Default for IdentitySet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Identify> IdentitySet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        let i = *self.index.get(key)?;
        Some(&mut self.items[i])
    }

    /// Replace the entry sharing `value`'s identity, else append.
    /// Returns true when the value was newly inserted.
    pub fn upsert(&mut self, value: T) -> bool {
        let key = value.identity();
        match self.index.get(&key) {
            Some(&i) => {
                self.items[i] = value;
                false
            }
            None => {
                self.index.insert(key, self.items.len());
                self.items.push(value);
                true
            }
        }
    }

    /// Remove and return the entry with `key`, preserving the order of
    /// the remaining entries.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        let i = self.index.remove(key)?;
        let removed = self.items.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = T::Key> + '_ {
        self.items.iter().map(|item| item.identity())
    }
}

impl<T: Identify> FromIterator<T> for IdentitySet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.upsert(item);
        }
        set
    }
}

impl<'a, T: Identify> IntoIterator for &'a IdentitySet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// Persisted and exposed as a plain ordered sequence; the key index is
// rebuilt on load.
impl<T: Identify + Serialize> Serialize for IdentitySet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Identify + Deserialize<'de>> Deserialize<'de> for IdentitySet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(items.into_iter().collect())
    }
}
