//! Fixed-layout records exchanged with the host ledger.
//!
//! Method arguments arrive as packed little-endian bytes and state is stored
//! the same way, under keys that start with a one-byte tag:
//!
//! | key           | value                         |
//! |---------------|-------------------------------|
//! | `[0]`         | [`ContractState`], 4 bytes    |
//! | `[2]`         | `FarmingState`, 52 bytes      |
//! | `[2] ++ pk`   | `UserPos`, 36 bytes           |
//!
//! Tag 1 belongs to the vesting module and is never written here.

use serde::Serialize;

use furrow_core::codec::{decode_record, encode_record};
use furrow_core::constants::{METHOD_UPDATE_FARMING, TAG_CONTRACT_STATE, TAG_FARMING};
use furrow_core::error::RecordError;
use furrow_core::types::{Amount, AssetId, PubKey};
use furrow_farming::PositionChange;

/// Encoded size of [`ContractState`].
pub const CONTRACT_STATE_SIZE: usize = 4;

/// Encoded size of [`UpdatePositionArgs`].
pub const UPDATE_POSITION_ARGS_SIZE: usize = 32 + 8 + 8 + 1;

/// Contract-wide state, written once at initialisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, bincode::Encode, bincode::Decode)]
pub struct ContractState {
    /// The reward asset paid out by the farming pool.
    pub asset_id: AssetId,
}

impl ContractState {
    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        encode_record(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        decode_record(bytes, "contract state", CONTRACT_STATE_SIZE)
    }
}

/// Arguments of the farming position update (method 4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, bincode::Encode, bincode::Decode)]
pub struct UpdatePositionArgs {
    /// Position owner; the host requires a signature by this key.
    pub pk: PubKey,
    pub reward_withdraw: Amount,
    pub principal: Amount,
    /// Nonzero to lock `principal` into the position, zero to unlock it.
    pub lock: u8,
}

impl UpdatePositionArgs {
    pub fn new(pk: PubKey, change: &PositionChange) -> Self {
        Self {
            pk,
            reward_withdraw: change.reward_withdraw,
            principal: change.principal,
            lock: change.lock as u8,
        }
    }

    pub fn change(&self) -> PositionChange {
        PositionChange {
            reward_withdraw: self.reward_withdraw,
            principal: self.principal,
            lock: self.lock != 0,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        encode_record(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        decode_record(bytes, "update position args", UPDATE_POSITION_ARGS_SIZE)
    }
}

/// A decoded contract method call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    UpdatePosition(UpdatePositionArgs),
}

impl Method {
    /// Decode the arguments of method `id`.
    ///
    /// Only the farming update is served here; every other id, including
    /// the vesting method, is [`RecordError::UnknownMethod`].
    pub fn decode(id: u32, args: &[u8]) -> Result<Self, RecordError> {
        match id {
            METHOD_UPDATE_FARMING => Ok(Self::UpdatePosition(UpdatePositionArgs::decode(args)?)),
            other => Err(RecordError::UnknownMethod(other)),
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::UpdatePosition(_) => METHOD_UPDATE_FARMING,
        }
    }

    /// Key the host must hold a signature from.
    pub fn signer(&self) -> PubKey {
        match self {
            Self::UpdatePosition(args) => args.pk,
        }
    }
}

pub fn contract_state_key() -> [u8; 1] {
    [TAG_CONTRACT_STATE]
}

pub fn farming_pool_key() -> [u8; 1] {
    [TAG_FARMING]
}

pub fn position_key(pk: &PubKey) -> [u8; 33] {
    let mut key = [0u8; 33];
    key[0] = TAG_FARMING;
    key[1..].copy_from_slice(pk.as_bytes());
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use furrow_core::constants::METHOD_GET_PREALLOCATED;

    fn args() -> UpdatePositionArgs {
        UpdatePositionArgs {
            pk: PubKey([0xAB; 32]),
            reward_withdraw: 0x0102,
            principal: 0x0304,
            lock: 1,
        }
    }

    #[test]
    fn update_args_layout() {
        let bytes = args().encode().unwrap();
        assert_eq!(bytes.len(), UPDATE_POSITION_ARGS_SIZE);
        assert_eq!(bytes.len(), 49);
        assert_eq!(&bytes[..32], &[0xAB; 32]);
        assert_eq!(&bytes[32..40], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[40..48], &[0x04, 0x03, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes[48], 1);
    }

    #[test]
    fn update_args_decode() {
        let bytes = args().encode().unwrap();
        assert_eq!(UpdatePositionArgs::decode(&bytes).unwrap(), args());
    }

    #[test]
    fn update_args_rejects_wrong_length() {
        let mut bytes = args().encode().unwrap();
        bytes.push(0);
        assert_eq!(
            UpdatePositionArgs::decode(&bytes).unwrap_err(),
            RecordError::InvalidLength {
                kind: "update position args",
                expected: 49,
                got: 50
            }
        );
    }

    #[test]
    fn any_nonzero_lock_byte_locks() {
        let a = UpdatePositionArgs { lock: 7, ..args() };
        assert!(a.change().lock);
        let a = UpdatePositionArgs { lock: 0, ..args() };
        assert!(!a.change().lock);
    }

    #[test]
    fn change_conversion() {
        let change = PositionChange::withdraw(5).with_claim(9);
        let a = UpdatePositionArgs::new(PubKey::ZERO, &change);
        assert_eq!(a.lock, 0);
        assert_eq!(a.change(), change);
    }

    #[test]
    fn contract_state_layout() {
        let s = ContractState { asset_id: 0x0A0B };
        let bytes = s.encode().unwrap();
        assert_eq!(bytes, vec![0x0B, 0x0A, 0, 0]);
        assert_eq!(ContractState::decode(&bytes).unwrap(), s);
    }

    #[test]
    fn method_dispatch() {
        let bytes = args().encode().unwrap();
        let m = Method::decode(METHOD_UPDATE_FARMING, &bytes).unwrap();
        assert_eq!(m.id(), 4);
        assert_eq!(m.signer(), PubKey([0xAB; 32]));
    }

    #[test]
    fn vesting_and_unknown_methods_rejected() {
        let bytes = args().encode().unwrap();
        assert_eq!(
            Method::decode(METHOD_GET_PREALLOCATED, &bytes).unwrap_err(),
            RecordError::UnknownMethod(3)
        );
        assert_eq!(
            Method::decode(99, &[]).unwrap_err(),
            RecordError::UnknownMethod(99)
        );
    }

    #[test]
    fn keys() {
        assert_eq!(contract_state_key(), [0]);
        assert_eq!(farming_pool_key(), [2]);
        let k = position_key(&PubKey([5; 32]));
        assert_eq!(k[0], 2);
        assert_eq!(&k[1..], &[5; 32]);
    }
}
