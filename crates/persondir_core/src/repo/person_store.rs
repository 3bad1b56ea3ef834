//! Person store contract and in-memory implementation.
//!
//! # Responsibility
//! - Keep person records in insertion order.
//! - Hand out live entries so callers can merge updates in place.
//!
//! # Invariants
//! - `insert` never checks for an existing `email`; callers own uniqueness.
//! - Lookups and removals act on the first record whose `email` matches.

use crate::model::person::PersonRecord;

/// Ordered custody of person records keyed by `email`.
pub trait PersonStore {
    /// Appends `record` at the end of the sequence.
    fn insert(&mut self, record: PersonRecord);
    /// Returns every record in insertion order.
    fn all(&self) -> &[PersonRecord];
    /// Returns the first record with a matching `email`.
    fn find_by_email(&self, email: &str) -> Option<&PersonRecord>;
    /// Mutable variant of [`PersonStore::find_by_email`]; edits land in the
    /// store directly.
    fn find_by_email_mut(&mut self, email: &str) -> Option<&mut PersonRecord>;
    /// Removes the first matching record. Returns whether one was removed.
    fn remove_by_email(&mut self, email: &str) -> bool;

    fn len(&self) -> usize {
        self.all().len()
    }

    fn is_empty(&self) -> bool {
        self.all().is_empty()
    }
}

/// `Vec`-backed volatile store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersonStore {
    records: Vec<PersonRecord>,
}

impl InMemoryPersonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store with `records` in the given order, without any checks.
    pub fn with_records(records: impl IntoIterator<Item = PersonRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }
}

impl PersonStore for InMemoryPersonStore {
    fn insert(&mut self, record: PersonRecord) {
        self.records.push(record);
    }

    fn all(&self) -> &[PersonRecord] {
        &self.records
    }

    fn find_by_email(&self, email: &str) -> Option<&PersonRecord> {
        self.records.iter().find(|record| record.email == email)
    }

    fn find_by_email_mut(&mut self, email: &str) -> Option<&mut PersonRecord> {
        self.records.iter_mut().find(|record| record.email == email)
    }

    fn remove_by_email(&mut self, email: &str) -> bool {
        match self.records.iter().position(|record| record.email == email) {
            Some(index) => {
                self.records.remove(index);
                true
            }
            None => false,
        }
    }
}
