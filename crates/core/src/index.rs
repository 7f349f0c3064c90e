//! Key indexes (`briefings/index.json`, `monthly/index.json`).
//!
//! An index is a JSON array of record keys. The daily index is kept as the descending set of
//! existing keys; the monthly index is newest-first by insertion and never re-sorted.

use crate::error::{PublishError, PublishResult};
use crate::store::RecordStore;
use serde::Serialize;
use std::collections::BTreeSet;

/// Encodes a record as two-space indented JSON with non-ASCII text written raw.
pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> PublishResult<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(PublishError::Serialization)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyIndex {
    keys: Vec<String>,
}

impl KeyIndex {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// Loads the index stored under `key`. A missing index is empty.
    pub fn load(store: &impl RecordStore, key: &str) -> PublishResult<Self> {
        match store.read(key)? {
            Some(bytes) => {
                let keys: Vec<String> =
                    serde_json::from_slice(&bytes).map_err(PublishError::Deserialization)?;
                Ok(Self { keys })
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, store: &impl RecordStore, key: &str) -> PublishResult<()> {
        store.write(key, &to_pretty_json(&self.keys)?)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Moves `key` to the front, then re-sorts the whole set descending.
    ///
    /// The re-sort overrides the front insertion, so the result is always the deduplicated
    /// set of keys in descending order.
    pub fn insert_sorted_desc(&mut self, key: &str) {
        self.keys.retain(|k| k != key);
        self.keys.insert(0, key.to_string());

        let set: BTreeSet<String> = self.keys.drain(..).collect();
        self.keys = set.into_iter().rev().collect();
    }

    /// Inserts `key` at the front unless already present. Returns whether the index changed.
    pub fn insert_front_if_absent(&mut self, key: &str) -> bool {
        if self.contains(key) {
            return false;
        }
        self.keys.insert(0, key.to_string());
        true
    }

    /// Splits the index into `(kept, removed)` by `remove`, preserving relative order.
    pub fn partition(self, mut remove: impl FnMut(&str) -> bool) -> (Self, Vec<String>) {
        let (removed, kept): (Vec<String>, Vec<String>) =
            self.keys.into_iter().partition(|k| remove(k));
        (Self { keys: kept }, removed)
    }
}
