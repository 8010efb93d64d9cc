//! PathMap
//!
//! Flat mapping from path keys to leaf values. Besides the entries a map
//! produced by the parser carries two advisory side tables: the document
//! position of every element and attribute path, and the namespace
//! declarations seen. Neither takes part in equality.

use std::collections::hash_map;
use std::collections::HashMap;

use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct PathMap {
    entries: HashMap<String, String>,
    order: HashMap<String, u64>,
    namespaces: Vec<(String, String)>,
}

impl PathMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PathMap {
            entries: HashMap::with_capacity(capacity),
            ..Default::default()
        }
    }

    /// Insert or overwrite a value, returning the previous one
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(path.into(), value.into())
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Keys in ascending byte order
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys
    }

    /// Document position recorded for an element or attribute path
    pub fn order_of(&self, path: &str) -> Option<u64> {
        self.order.get(path).copied()
    }

    pub fn set_order(&mut self, path: impl Into<String>, position: u64) {
        self.order.insert(path.into(), position);
    }

    /// Namespace declarations as (prefix, uri); "" is the default namespace
    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    /// Record a declaration; the first binding for a prefix wins
    pub fn declare_namespace(&mut self, prefix: &str, uri: &str) {
        if !self.namespaces.iter().any(|(p, _)| p == prefix) {
            self.namespaces.push((prefix.to_string(), uri.to_string()));
        }
    }

    /// Serialize back to markup
    pub fn to_xml(&self, indent: bool) -> Result<Vec<u8>> {
        let tree = crate::tree::build(self)?;
        crate::serialize::serialize(&tree, indent)
    }
}

impl PartialEq for PathMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for PathMap {}

impl From<HashMap<String, String>> for PathMap {
    fn from(entries: HashMap<String, String>) -> Self {
        PathMap {
            entries,
            ..Default::default()
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PathMap::from(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect::<HashMap<String, String>>(),
        )
    }
}

impl<'m> IntoIterator for &'m PathMap {
    type Item = (&'m String, &'m String);
    type IntoIter = hash_map::Iter<'m, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
