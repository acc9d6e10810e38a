//! Write batches and the in-memory key-value store.
//!
//! [`MemoryKvStore`] is suitable for testing and simulation; the host uses a
//! RocksDB-backed store (furrow-host).

use std::collections::BTreeMap;

use crate::error::FurrowError;
use crate::traits::KvStore;

/// One staged write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KvOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// An ordered set of writes applied atomically by [`KvStore::commit`].
///
/// Later operations on the same key win.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KvBatch {
    ops: Vec<KvOp>,
}

impl KvBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(KvOp::Put {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.push(KvOp::Delete { key: key.into() });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[KvOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<KvOp> {
        self.ops
    }
}

/// In-memory key-value store.
///
/// Keys are kept ordered so dumps and iteration are deterministic.
#[derive(Clone, Debug, Default)]
pub struct MemoryKvStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, FurrowError> {
        Ok(self.entries.get(key).cloned())
    }

    fn commit(&mut self, batch: KvBatch) -> Result<(), FurrowError> {
        for op in batch.into_ops() {
            match op {
                KvOp::Put { key, value } => {
                    self.entries.insert(key, value);
                }
                KvOp::Delete { key } => {
                    self.entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store() {
        let store = MemoryKvStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get(b"missing").unwrap(), None);
        assert!(!store.contains(b"missing").unwrap());
    }

    #[test]
    fn commit_put_and_delete() {
        let mut store = MemoryKvStore::new();
        let mut batch = KvBatch::new();
        batch.put(b"a".to_vec(), b"1".to_vec());
        batch.put(b"b".to_vec(), b"2".to_vec());
        store.commit(batch).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));

        let mut batch = KvBatch::new();
        batch.delete(b"a".to_vec());
        store.commit(batch).unwrap();
        assert!(!store.contains(b"a").unwrap());
        assert!(store.contains(b"b").unwrap());
    }

    #[test]
    fn later_ops_on_same_key_win() {
        let mut store = MemoryKvStore::new();
        let mut batch = KvBatch::new();
        batch.put(b"k".to_vec(), b"old".to_vec());
        batch.delete(b"k".to_vec());
        batch.put(b"k".to_vec(), b"new".to_vec());
        assert_eq!(batch.len(), 3);
        store.commit(batch).unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"new".to_vec()));
    }

    #[test]
    fn iteration_is_key_ordered() {
        let mut store = MemoryKvStore::new();
        let mut batch = KvBatch::new();
        batch.put(vec![2u8], vec![0u8]);
        batch.put(vec![0u8], vec![0u8]);
        batch.put(vec![1u8], vec![0u8]);
        store.commit(batch).unwrap();
        let keys: Vec<&[u8]> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![&[0u8][..], &[1u8][..], &[2u8][..]]);
    }

    #[test]
    fn empty_batch_is_noop() {
        let mut store = MemoryKvStore::new();
        let batch = KvBatch::new();
        assert!(batch.is_empty());
        store.commit(batch).unwrap();
        assert!(store.is_empty());
    }
}
