//! RocksDB-backed persistent contract storage.
//!
//! Implements [`KvStore`] over a single `contract` column family holding the
//! tag-prefixed records. Every commit is one atomic [`WriteBatch`].

use std::path::Path;

use rocksdb::{ColumnFamilyDescriptor, Options, WriteBatch, DB};

use furrow_core::error::FurrowError;
use furrow_core::kv::{KvBatch, KvOp};
use furrow_core::traits::KvStore;

const CF_CONTRACT: &str = "contract";

/// RocksDB-backed contract record store.
pub struct RocksKvStore {
    db: DB,
}

impl RocksKvStore {
    /// Open or create a RocksDB database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FurrowError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf = ColumnFamilyDescriptor::new(CF_CONTRACT, Options::default());
        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), vec![cf])
            .map_err(|e| FurrowError::Storage(e.to_string()))?;

        Ok(Self { db })
    }

    /// Flush all in-memory buffers to disk.
    pub fn flush(&self) -> Result<(), FurrowError> {
        self.db
            .flush()
            .map_err(|e| FurrowError::Storage(e.to_string()))
    }

    /// Every stored record in key order.
    pub fn entries(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, FurrowError> {
        let cf = self.cf_handle()?;
        self.db
            .iterator_cf(cf, rocksdb::IteratorMode::Start)
            .map(|item| {
                item.map(|(k, v)| (k.to_vec(), v.to_vec()))
                    .map_err(|e| FurrowError::Storage(e.to_string()))
            })
            .collect()
    }

    fn cf_handle(&self) -> Result<&rocksdb::ColumnFamily, FurrowError> {
        self.db
            .cf_handle(CF_CONTRACT)
            .ok_or_else(|| FurrowError::Storage(format!("missing column family: {CF_CONTRACT}")))
    }
}

impl KvStore for RocksKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, FurrowError> {
        let cf = self.cf_handle()?;
        self.db
            .get_cf(cf, key)
            .map_err(|e| FurrowError::Storage(e.to_string()))
    }

    fn commit(&mut self, batch: KvBatch) -> Result<(), FurrowError> {
        let cf = self.cf_handle()?;
        let mut wb = WriteBatch::default();
        for op in batch.into_ops() {
            match op {
                KvOp::Put { key, value } => wb.put_cf(cf, key, value),
                KvOp::Delete { key } => wb.delete_cf(cf, key),
            }
        }
        self.db
            .write(wb)
            .map_err(|e| FurrowError::Storage(e.to_string()))
    }
}
