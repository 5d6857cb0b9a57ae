use std::collections::{HashSet, VecDeque};

use homeval_interchange::{PredictionRecord, RecordId};

use crate::error::StorageError;

/// In-memory prediction history for one session, most recent first.
///
/// ## Write Semantics
///
/// The store has exactly two writes:
///
/// 1. [`initialize`](Self::initialize) -- seed from the server snapshot,
///    at most once per store.
/// 2. [`prepend`](Self::prepend) -- add the record returned by a
///    successful submission, once per submission.
///
/// There is no removal. The store only grows for the lifetime of the
/// session.
///
/// ## Late Snapshots
///
/// A submission may complete before the history fetch does. Records
/// prepended before `initialize` are kept ahead of the snapshot, and
/// snapshot entries whose id is already held are skipped (the server has
/// usually persisted the just-submitted record by the time it answers
/// the fetch).
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    records: VecDeque<PredictionRecord>,
    initialized: bool,
}

/// What a call to [`HistoryStore::initialize`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    /// Records in the server snapshot.
    pub fetched: usize,
    /// Snapshot records actually appended.
    pub inserted: usize,
    /// Locally prepended records that stayed ahead of the snapshot.
    pub kept_local: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a server snapshot (most recent first).
    ///
    /// Returns `Err(StorageError::AlreadyInitialized)` on a second call;
    /// the store is left untouched in that case.
    pub fn initialize(&mut self, snapshot: Vec<PredictionRecord>) -> Result<Merge, StorageError> {
        if self.initialized {
            return Err(StorageError::AlreadyInitialized {
                held: self.records.len(),
            });
        }
        self.initialized = true;

        let fetched = snapshot.len();
        let kept_local = self.records.len();
        let local_ids: HashSet<RecordId> = self.records.iter().map(|r| r.id.clone()).collect();

        let mut inserted = 0;
        for record in snapshot {
            if local_ids.contains(&record.id) {
                tracing::debug!(id = %record.id, "snapshot record already held locally");
                continue;
            }
            self.records.push_back(record);
            inserted += 1;
        }

        Ok(Merge {
            fetched,
            inserted,
            kept_local,
        })
    }

    /// Insert a freshly created record at the front.
    ///
    /// No value-based deduplication happens here: two predictions with the
    /// same inputs and price are still two records.
    pub fn prepend(&mut self, record: PredictionRecord) {
        self.records.push_front(record);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The most recent record, if any.
    pub fn head(&self) -> Option<&PredictionRecord> {
        self.records.front()
    }

    pub fn get(&self, index: usize) -> Option<&PredictionRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &PredictionRecord> {
        self.records.iter()
    }

    /// Copy the records out, most recent first.
    pub fn to_vec(&self) -> Vec<PredictionRecord> {
        self.records.iter().cloned().collect()
    }
}
