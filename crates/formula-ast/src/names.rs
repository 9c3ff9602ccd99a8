//! Case-insensitive name table.
//!
//! Names are keyed by their lowercased form while the first-seen spelling is
//! kept for display. Iteration follows insertion order.

use std::collections::HashMap;

/// Canonical (lowercased) key of a name.
pub fn canonical(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Debug, Clone)]
struct Entry<V> {
    key: String,
    original: String,
    value: V,
}

/// Insertion-ordered map from case-insensitive names to values.
#[derive(Debug, Clone)]
pub struct CaseMap<V> {
    entries: Vec<Entry<V>>,
    index: HashMap<String, usize>,
}

impl<V> Default for CaseMap<V> {
    fn default() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }
}

impl<V> CaseMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; the original spelling of an existing name is kept.
    /// Returns the previous value.
    pub fn insert(&mut self, name: &str, value: V) -> Option<V> {
        let key = canonical(name);
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].value, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(Entry { key, original: name.to_string(), value });
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.index.get(&canonical(name)).map(|&i| &self.entries[i].value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        let i = *self.index.get(&canonical(name))?;
        Some(&mut self.entries[i].value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&canonical(name))
    }

    /// First-seen spelling of `name`.
    pub fn case(&self, name: &str) -> Option<&str> {
        self.index.get(&canonical(name)).map(|&i| self.entries[i].original.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// `(original spelling, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|e| (e.original.as_str(), &e.value))
    }
}

impl<V, S: AsRef<str>> FromIterator<(S, V)> for CaseMap<V> {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut m = CaseMap::new();
        for (k, v) in iter {
            m.insert(k.as_ref(), v);
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookups_ignore_case_and_keep_first_spelling() {
        let mut m = CaseMap::new();
        assert_eq!(m.insert("Test", 1), None);
        assert_eq!(m.insert("TEST", 2), Some(1));
        assert_eq!(m.get("test"), Some(&2));
        assert_eq!(m.case("tEsT"), Some("Test"));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let m: CaseMap<i32> = [("b", 1), ("A", 2), ("c", 3)].into_iter().collect();
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(m.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["b", "A", "c"]);
    }
}
