//! Per-participant farming positions and the changes applied to them.

use serde::Serialize;

use furrow_core::constants::SIGMA_WORDS;
use furrow_core::types::{Amount, Sigma};

/// Encoded size of [`UserPos`] in bytes.
pub const USER_POS_SIZE: usize = SIGMA_WORDS * 4 + 8 + 8;

/// A participant's stake in the farming pool.
///
/// `sigma_last` is the pool sigma at the last settlement; the reward owed
/// since then is `(sigma - sigma_last) * weight(principal)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize,
    bincode::Encode, bincode::Decode,
)]
pub struct UserPos {
    pub sigma_last: Sigma,
    /// Deposited native-asset principal.
    pub principal: Amount,
    /// Accrued reward not yet withdrawn.
    pub reward_balance: Amount,
}

impl UserPos {
    /// A position with nothing deposited and nothing owed is not stored.
    pub fn is_empty(&self) -> bool {
        self.principal == 0 && self.reward_balance == 0
    }
}

/// The requested change to a position in one update.
///
/// `principal` moves in the direction given by `lock`: locked into the
/// position when set, unlocked back to the participant otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PositionChange {
    pub reward_withdraw: Amount,
    pub principal: Amount,
    pub lock: bool,
}

impl PositionChange {
    pub fn deposit(amount: Amount) -> Self {
        Self {
            principal: amount,
            lock: true,
            ..Self::default()
        }
    }

    pub fn withdraw(amount: Amount) -> Self {
        Self {
            principal: amount,
            lock: false,
            ..Self::default()
        }
    }

    pub fn claim(amount: Amount) -> Self {
        Self {
            reward_withdraw: amount,
            ..Self::default()
        }
    }

    /// Also withdraw `amount` of accrued reward in the same update.
    pub fn with_claim(mut self, amount: Amount) -> Self {
        self.reward_withdraw = amount;
        self
    }

    /// A change that only settles the position.
    pub fn is_noop(&self) -> bool {
        self.reward_withdraw == 0 && self.principal == 0
    }
}
