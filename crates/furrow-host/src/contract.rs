//! The DAO farming contract as seen by the host ledger.
//!
//! [`DaoContract`] owns a [`KvStore`] and serves one invocation at a time.
//! Each invocation reads the records it needs, runs the farming engine on
//! in-memory copies, stages every write in one [`KvBatch`] and commits it
//! only when the whole invocation succeeded. A failed invocation writes
//! nothing.
//!
//! The contract never moves funds itself. The returned [`Receipt`] lists
//! the locks and unlocks the host must apply, and the key whose signature
//! the host must check.

use serde::Serialize;
use tracing::{debug, info, warn};

use furrow_core::codec::{decode_record, encode_record};
use furrow_core::constants::{METHOD_UPDATE_FARMING, NATIVE_ASSET_ID};
use furrow_core::error::{ContractError, FurrowError};
use furrow_core::kv::KvBatch;
use furrow_core::traits::KvStore;
use furrow_core::types::{Amount, AssetId, Height, PubKey};
use furrow_farming::{FarmingEngine, FarmingState, UserPos, FARMING_STATE_SIZE, USER_POS_SIZE};

use crate::records::{
    contract_state_key, farming_pool_key, position_key, ContractState, Method,
    UpdatePositionArgs,
};

/// A funds movement between a participant and the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FundsMove {
    pub asset: AssetId,
    pub amount: Amount,
    /// `true` moves funds into the contract, `false` releases them.
    pub lock: bool,
}

/// Outcome of a successful invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub method: u32,
    /// Key that must have signed the invocation.
    pub signer: PubKey,
    /// Reward credited to the position by settlement.
    pub reward_credited: Amount,
    /// Funds movements for the host to apply, in order.
    pub funds: Vec<FundsMove>,
}

/// The farming contract over a key-value store.
pub struct DaoContract<S> {
    store: S,
    engine: FarmingEngine,
}

impl<S: KvStore> DaoContract<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            engine: FarmingEngine::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn engine(&self) -> &FarmingEngine {
        &self.engine
    }

    pub fn is_initialized(&self) -> Result<bool, FurrowError> {
        self.store.contains(&contract_state_key())
    }

    /// Create the contract with `asset_id` as the reward asset and an empty pool.
    pub fn initialize(&mut self, asset_id: AssetId) -> Result<(), FurrowError> {
        if self.is_initialized()? {
            return Err(ContractError::AlreadyInitialized.into());
        }

        let mut batch = KvBatch::new();
        batch.put(contract_state_key(), ContractState { asset_id }.encode()?);
        batch.put(farming_pool_key(), encode_record(&FarmingState::new())?);
        self.store.commit(batch)?;

        info!(asset_id, "contract: initialized");
        Ok(())
    }

    pub fn contract_state(&self) -> Result<ContractState, FurrowError> {
        let bytes = self
            .store
            .get(&contract_state_key())?
            .ok_or(ContractError::NotInitialized)?;
        Ok(ContractState::decode(&bytes)?)
    }

    pub fn pool_state(&self) -> Result<FarmingState, FurrowError> {
        let bytes = self
            .store
            .get(&farming_pool_key())?
            .ok_or(ContractError::MissingPoolState)?;
        Ok(decode_record(&bytes, "farming state", FARMING_STATE_SIZE)?)
    }

    pub fn position(&self, pk: &PubKey) -> Result<Option<UserPos>, FurrowError> {
        self.store
            .get(&position_key(pk))?
            .map(|bytes| decode_record::<UserPos>(&bytes, "user position", USER_POS_SIZE))
            .transpose()
            .map_err(FurrowError::from)
    }

    /// Decode and run method `method` with raw `args` at `height`.
    pub fn invoke(&mut self, method: u32, args: &[u8], height: Height) -> Result<Receipt, FurrowError> {
        let result = Method::decode(method, args)
            .map_err(FurrowError::from)
            .and_then(|m| self.dispatch(&m, height));
        if let Err(e) = &result {
            warn!(method, height, error = %e, "contract: invocation rejected");
        }
        result
    }

    fn dispatch(&mut self, method: &Method, height: Height) -> Result<Receipt, FurrowError> {
        match method {
            Method::UpdatePosition(args) => self.update_position(args, height),
        }
    }

    /// Run the farming position update for `args.pk` at `height`.
    pub fn update_position(
        &mut self,
        args: &UpdatePositionArgs,
        height: Height,
    ) -> Result<Receipt, FurrowError> {
        let contract = self.contract_state()?;
        let mut pool = self.pool_state()?;
        let existing = self.position(&args.pk)?;
        let change = args.change();

        let update = self
            .engine
            .update_position(&mut pool, existing, &change, height)?;

        let key = position_key(&args.pk);
        let mut batch = KvBatch::new();
        batch.put(farming_pool_key(), encode_record(&pool)?);
        match &update.position {
            Some(pos) => batch.put(key, encode_record(pos)?),
            None => batch.delete(key),
        }
        self.store.commit(batch)?;

        let mut funds = Vec::new();
        if change.reward_withdraw > 0 {
            funds.push(FundsMove {
                asset: contract.asset_id,
                amount: change.reward_withdraw,
                lock: false,
            });
        }
        if change.principal > 0 {
            funds.push(FundsMove {
                asset: NATIVE_ASSET_ID,
                amount: change.principal,
                lock: change.lock,
            });
        }

        debug!(
            pk = %args.pk,
            removed = update.position.is_none(),
            "contract: position stored"
        );
        info!(
            pk = %args.pk,
            height,
            accrued = update.accrued,
            principal = change.principal,
            lock = change.lock,
            reward_withdraw = change.reward_withdraw,
            "contract: position updated"
        );

        Ok(Receipt {
            method: METHOD_UPDATE_FARMING,
            signer: args.pk,
            reward_credited: update.accrued,
            funds,
        })
    }
}
