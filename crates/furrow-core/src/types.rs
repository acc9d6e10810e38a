//! Core protocol types shared by every Furrow crate.
//!
//! All monetary values are in groth. All heights are block heights.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::constants::SIGMA_WORDS;
use crate::wide::WideUint;

/// An amount of some asset, in its smallest unit.
pub type Amount = u64;

/// A block height.
pub type Height = u64;

/// Weight derived from a deposit via the farming curve.
pub type Weight = u32;

/// Host-ledger asset identifier. `0` is the native asset.
pub type AssetId = u32;

/// The reward-per-weight accumulator: 160-bit fixed point, 2^96 scale.
pub type Sigma = WideUint<SIGMA_WORDS>;

/// A 32-byte participant public key.
///
/// Positions are keyed by it; signature checks on it happen in the host.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct PubKey(pub [u8; 32]);

impl PubKey {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; 32]> for PubKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for PubKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for PubKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
