//! Shared helpers for driving a contract in tests.

use furrow_core::constants::{METHOD_UPDATE_FARMING, TAG_FARMING};
use furrow_core::codec::decode_record;
use furrow_core::error::FurrowError;
use furrow_core::kv::MemoryKvStore;
use furrow_core::types::{Amount, Height, PubKey};
use furrow_farming::{FarmingState, PositionChange, UserPos, USER_POS_SIZE};
use furrow_host::records::UpdatePositionArgs;
use furrow_host::{DaoContract, Receipt};

/// Reward asset id used by every simulation.
pub const REWARD_ASSET: u32 = 1;

/// Participant key from a seed byte.
pub fn pk(seed: u8) -> PubKey {
    PubKey([seed; 32])
}

/// One step of a simulated farming history.
#[derive(Clone, Debug)]
pub enum Op {
    /// Lock `amount` of principal.
    Deposit { who: u8, amount: Amount },
    /// Unlock `bps` basis points of the current principal.
    Withdraw { who: u8, bps: u16 },
    /// Withdraw the whole reward balance known before the call.
    Claim { who: u8 },
    /// Settle without moving anything.
    Settle { who: u8 },
    /// Let blocks pass.
    Skip { blocks: Height },
}

/// A contract over an in-memory store plus the bookkeeping tests check
/// against it.
pub struct Sim {
    pub contract: DaoContract<MemoryKvStore>,
    pub height: Height,
    /// Sum of every `reward_credited` reported by a receipt.
    pub credited: Amount,
    /// Sum of every reward unlocked to participants.
    pub claimed: Amount,
}

impl Default for Sim {
    fn default() -> Self {
        Self::new()
    }
}

impl Sim {
    pub fn new() -> Self {
        let mut contract = DaoContract::new(MemoryKvStore::new());
        contract
            .initialize(REWARD_ASSET)
            .expect("fresh store initializes");
        Self {
            contract,
            height: 0,
            credited: 0,
            claimed: 0,
        }
    }

    pub fn pool(&self) -> FarmingState {
        self.contract.pool_state().expect("pool state present")
    }

    pub fn position(&self, who: u8) -> Option<UserPos> {
        self.contract.position(&pk(who)).expect("position decodes")
    }

    /// Every stored position, in key order.
    pub fn positions(&self) -> Vec<(PubKey, UserPos)> {
        self.contract
            .store()
            .iter()
            .filter(|(k, _)| k.len() == 33 && k[0] == TAG_FARMING)
            .map(|(k, v)| {
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(&k[1..]);
                let pos: UserPos = decode_record(v, "user position", USER_POS_SIZE)
                    .expect("position decodes");
                (PubKey(bytes), pos)
            })
            .collect()
    }

    /// Send a position update through the raw method interface.
    pub fn update(&mut self, who: u8, change: PositionChange) -> Result<Receipt, FurrowError> {
        let args = UpdatePositionArgs::new(pk(who), &change)
            .encode()
            .expect("args encode");
        let receipt = self
            .contract
            .invoke(METHOD_UPDATE_FARMING, &args, self.height)?;
        self.credited += receipt.reward_credited;
        self.claimed += change.reward_withdraw;
        Ok(receipt)
    }

    /// Apply one op. Ops that make no sense for the current state (withdrawing
    /// from an absent position) become plain settlements.
    pub fn apply(&mut self, op: &Op) -> Result<(), FurrowError> {
        match *op {
            Op::Deposit { who, amount } => {
                self.update(who, PositionChange::deposit(amount))?;
            }
            Op::Withdraw { who, bps } => {
                let principal = self.position(who).map_or(0, |p| p.principal);
                let amount = (principal as u128 * bps.min(10_000) as u128 / 10_000) as Amount;
                self.update(who, PositionChange::withdraw(amount))?;
            }
            Op::Claim { who } => {
                let balance = self.position(who).map_or(0, |p| p.reward_balance);
                self.update(who, PositionChange::claim(balance))?;
            }
            Op::Settle { who } => {
                self.update(who, PositionChange::default())?;
            }
            Op::Skip { blocks } => {
                self.height += blocks;
            }
        }
        Ok(())
    }

    /// Withdraw every principal and claim every reward balance.
    pub fn drain(&mut self) -> Result<(), FurrowError> {
        for (key, pos) in self.positions() {
            let who = key.0[0];
            if pos.principal > 0 {
                self.update(who, PositionChange::withdraw(pos.principal))?;
            }
            let balance = self.position(who).map_or(0, |p| p.reward_balance);
            if balance > 0 {
                self.update(who, PositionChange::claim(balance))?;
            }
        }
        Ok(())
    }

    /// Panic if any accounting invariant of the pool does not hold.
    pub fn check_invariants(&self) {
        let pool = self.pool();
        let engine = self.contract.engine();

        let weight_sum: u64 = self
            .positions()
            .iter()
            .map(|(_, p)| engine.weight(p.principal) as u64)
            .sum();
        assert_eq!(weight_sum, pool.weight_total, "weight_total out of sync");

        assert_eq!(
            self.credited, pool.total_distributed,
            "credited rewards differ from total_distributed"
        );

        let emitted = engine.emission_so_far(&pool);
        assert!(
            pool.total_distributed <= emitted,
            "distributed {} exceeds emitted {}",
            pool.total_distributed,
            emitted
        );
        assert!(emitted <= engine.schedule().total());
        assert!(pool.h_total <= engine.schedule().duration());

        let balances: Amount = self.positions().iter().map(|(_, p)| p.reward_balance).sum();
        assert_eq!(
            balances + self.claimed,
            self.credited,
            "reward balances plus claims differ from credited"
        );

        for (key, pos) in self.positions() {
            assert!(!pos.is_empty(), "empty position stored for {key}");
            assert!(pos.sigma_last <= pool.sigma, "position sigma ahead of pool");
        }
    }
}
