//! Sample store capability.

use crate::error::StorageError;

use super::models::LocationSample;

/// Append-only sample store.
///
/// The sampler is the only writer. Readers may call concurrently; each
/// implementation owns its own locking.
pub trait SampleStore: Send + Sync {
    /// Persist samples in the given order. Ids on the input are ignored.
    fn append(&self, samples: &[LocationSample]) -> Result<(), StorageError>;

    /// Every sample ordered by capture time ascending.
    fn query_all(&self) -> Result<Vec<LocationSample>, StorageError>;

    /// At most `n` samples ordered by capture time descending.
    fn query_latest(&self, n: usize) -> Result<Vec<LocationSample>, StorageError>;

    fn count(&self) -> Result<u64, StorageError>;

    /// Administrative delete. Returns whether a row was removed.
    fn delete(&self, id: i64) -> Result<bool, StorageError>;
}
