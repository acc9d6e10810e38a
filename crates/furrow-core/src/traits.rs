//! Trait interfaces for the Furrow protocol.
//!
//! These traits define the contracts between crates:
//! - [`WeightCurve`] - deposit-to-weight mapping (furrow-farming implements)
//! - [`KvStore`] - the host's persistent key-value ledger (furrow-core
//!   provides an in-memory store, furrow-host a RocksDB one)

use crate::error::FurrowError;
use crate::kv::KvBatch;
use crate::types::{Amount, Weight};

/// Maps a deposited amount to the weight it earns rewards with.
///
/// Implementations must be pure and monotonic non-decreasing, and must
/// return 0 for deposits that do not participate.
pub trait WeightCurve: Send + Sync {
    fn weight(&self, amount: Amount) -> Weight;
}

/// Byte-oriented key-value store holding contract records.
///
/// Reads go straight to the store. Writes are staged in a [`KvBatch`] and
/// applied by [`commit`](Self::commit) all at once, so an invocation that
/// fails part-way never leaves partial state behind.
///
/// Not thread-safe: callers serialise invocations against one store.
pub trait KvStore: Send + Sync {
    /// Read a value. Returns `None` if the key is absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, FurrowError>;

    /// Apply every operation in `batch` atomically.
    fn commit(&mut self, batch: KvBatch) -> Result<(), FurrowError>;

    /// Check whether a key is present.
    ///
    /// Default implementation delegates to [`get`](Self::get).
    fn contains(&self, key: &[u8]) -> Result<bool, FurrowError> {
        Ok(self.get(key)?.is_some())
    }
}
