//! Keyed entity stores.
//!
//! The server's index endpoints each deliver an array of records keyed by
//! an ID attribute. [`EntityStore`] keeps one such collection in retrieval
//! order with a key index on the side, replaced wholesale on refresh and
//! patched in place when an operation returns an updated record.
//!
//! Built chains are cached per (comparison, variable) in a [`ChainCache`];
//! a fresh build replaces the cached tree wholesale.

use arachne_api::{CaseRecord, CompRecord, FileRecord};
use arachne_core::Chain;
use std::collections::HashMap;

/// A record with a unique key attribute.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for CaseRecord {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for CompRecord {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for FileRecord {
    fn key(&self) -> &str {
        &self.id
    }
}

/// An ordered collection of keyed records with O(1) lookup.
#[derive(Debug, Clone)]
pub struct EntityStore<T: Keyed> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Keyed> Default for EntityStore<T> {
    fn default() -> Self {
        EntityStore {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection, as after a refresh.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.key().to_string(), i))
            .collect();
    }

    /// Insert a record, or replace the one sharing its key in place.
    pub fn add(&mut self, item: T) {
        match self.index.get(item.key()) {
            Some(&i) => self.items[i] = item,
            None => {
                self.index.insert(item.key().to_string(), self.items.len());
                self.items.push(item);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All records, in retrieval order.
    pub fn all(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Built chains by (comparison ID, output variable name).
#[derive(Debug, Clone, Default)]
pub struct ChainCache {
    chains: HashMap<(String, String), Chain>,
}

impl ChainCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache a freshly built chain, replacing any previous tree for the
    /// same comparison and variable.
    pub fn insert(&mut self, comp: &str, varname: &str, chain: Chain) {
        self.chains
            .insert((comp.to_string(), varname.to_string()), chain);
    }

    pub fn get(&self, comp: &str, varname: &str) -> Option<&Chain> {
        self.chains
            .get(&(comp.to_string(), varname.to_string()))
    }
}
