//! Identity-indexed record store.
//!
//! The working set for deduplication: records are kept in first-seen order
//! and a second record with an already-seen identity is dropped. Map and
//! table collaborators look records up here by [`IdentityKey`] instead of
//! holding references to each other.

use std::collections::HashMap;

use shelter_map_source_models::{IdentityKey, ResolvedRecord};

/// Deduplicated records with an identity index.
#[derive(Debug, Clone, Default)]
pub struct RecordArena {
    records: Vec<ResolvedRecord>,
    index: HashMap<IdentityKey, usize>,
}

impl RecordArena {
    /// An empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `record` unless its identity is already present. Returns
    /// whether it was inserted.
    pub fn insert(&mut self, record: ResolvedRecord) -> bool {
        if self.index.contains_key(&record.identity_key) {
            return false;
        }
        self.index
            .insert(record.identity_key.clone(), self.records.len());
        self.records.push(record);
        true
    }

    /// Inserts every record, returning the ones that were new.
    pub fn extend_new<'a, I>(&mut self, records: I) -> Vec<&'a ResolvedRecord>
    where
        I: IntoIterator<Item = &'a ResolvedRecord>,
    {
        records
            .into_iter()
            .filter(|record| self.insert((*record).clone()))
            .collect()
    }

    /// The record stored under `key`.
    #[must_use]
    pub fn get(&self, key: &IdentityKey) -> Option<&ResolvedRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    /// Whether a record with identity `key` has been inserted.
    #[must_use]
    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.index.contains_key(key)
    }

    /// Records in first-seen order.
    #[must_use]
    pub fn records(&self) -> &[ResolvedRecord] {
        &self.records
    }

    /// Iterates records in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedRecord> {
        self.records.iter()
    }

    /// Number of distinct identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Consumes the arena, returning records in first-seen order.
    #[must_use]
    pub fn into_records(self) -> Vec<ResolvedRecord> {
        self.records
    }
}

impl FromIterator<ResolvedRecord> for RecordArena {
    fn from_iter<I: IntoIterator<Item = ResolvedRecord>>(iter: I) -> Self {
        let mut arena = Self::new();
        for record in iter {
            arena.insert(record);
        }
        arena
    }
}

impl<'a> IntoIterator for &'a RecordArena {
    type Item = &'a ResolvedRecord;
    type IntoIter = std::slice::Iter<'a, ResolvedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Drops later duplicates, keeping the first record of each identity.
#[must_use]
pub fn dedupe<I>(records: I) -> Vec<ResolvedRecord>
where
    I: IntoIterator<Item = ResolvedRecord>,
{
    records.into_iter().collect::<RecordArena>().into_records()
}
