//! In-memory sample store.

use parking_lot::RwLock;

use crate::error::StorageError;

use super::models::LocationSample;
use super::store::SampleStore;

#[derive(Debug, Default)]
struct MemoryRows {
    rows: Vec<LocationSample>,
    next_id: i64,
}

/// Vec-backed store with the same ordering contract as the SQLite store.
#[derive(Debug, Default)]
pub struct MemorySampleStore {
    inner: RwLock<MemoryRows>,
}

impl MemorySampleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SampleStore for MemorySampleStore {
    fn append(&self, samples: &[LocationSample]) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        for sample in samples {
            inner.next_id += 1;
            let id = inner.next_id;
            inner.rows.push(sample.clone().with_id(id));
        }
        Ok(())
    }

    fn query_all(&self) -> Result<Vec<LocationSample>, StorageError> {
        let mut rows = self.inner.read().rows.clone();
        // Stable: rows sharing a timestamp stay in insertion order.
        rows.sort_by_key(|s| s.time);
        Ok(rows)
    }

    fn query_latest(&self, n: usize) -> Result<Vec<LocationSample>, StorageError> {
        let mut rows = self.inner.read().rows.clone();
        rows.sort_by(|a, b| b.time.cmp(&a.time).then(b.id.cmp(&a.id)));
        rows.truncate(n);
        Ok(rows)
    }

    fn count(&self) -> Result<u64, StorageError> {
        Ok(self.inner.read().rows.len() as u64)
    }

    fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let mut inner = self.inner.write();
        let before = inner.rows.len();
        inner.rows.retain(|s| s.id != Some(id));
        Ok(inner.rows.len() != before)
    }
}
